mod clock;

pub use self::clock::{Clock, SystemClock};
use crate::{
    CacheEntry, CacheKey, Context, Error, Keyblock, Principal, ServiceTicketCache, Ticket,
    Timestamp,
};
use anyhow::Context as _;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::{debug, error, info, warn};

/// The TGS exchange, seen from the cache.
///
/// `renew` sends a renewal request for `ticket` and, on success, must have
/// added the renewed ticket to the same `ServiceTicketCache` before
/// returning. The cache never retries a failed call.
pub trait TicketRenewer: Send + Sync {
    fn renew(
        &self,
        ticket: &Ticket,
        session_key: &Keyblock,
        server: &Principal,
        realm: &str,
    ) -> anyhow::Result<()>;
}

/// Outcome of looking up a service ticket.
#[derive(Debug)]
pub enum Resolution {
    /// The cached ticket is inside its validity window.
    Valid(CacheEntry),
    /// The cached ticket had expired and was renewed.
    Renewed(CacheEntry),
    /// Renewal was attempted and failed. `stale` is the expired entry; its
    /// ticket must not be presented as current.
    RenewalFailed {
        stale: CacheEntry,
        error: anyhow::Error,
    },
    /// Past the renewal deadline, or renewal disabled.
    Expired,
    NotCached,
}

impl Resolution {
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Valid(_) | Self::Renewed(_))
    }

    pub fn entry(&self) -> Option<&CacheEntry> {
        match self {
            Self::Valid(entry) | Self::Renewed(entry) => Some(entry),
            Self::RenewalFailed { stale, .. } => Some(stale),
            Self::Expired | Self::NotCached => None,
        }
    }

    /// `(ticket, session_key, usable)`. A failed renewal still hands back the
    /// stale ticket and key, flagged unusable.
    pub fn into_parts(self) -> (Option<Ticket>, Option<Keyblock>, bool) {
        let usable = self.is_usable();
        match self {
            Self::Valid(entry) | Self::Renewed(entry) | Self::RenewalFailed { stale: entry, .. } => {
                (Some(entry.ticket), Some(entry.session_key), usable)
            }
            Self::Expired | Self::NotCached => (None, None, false),
        }
    }
}

/// Result of one renewal exchange, kept so that resolvers queued behind it
/// get the same answer without a second exchange.
#[derive(Debug, Clone)]
enum RenewalOutcome {
    Renewed(CacheEntry),
    Failed {
        stale: CacheEntry,
        error: SharedRenewalError,
    },
    Missing,
}

impl RenewalOutcome {
    fn resolution(&self) -> anyhow::Result<Resolution> {
        match self {
            Self::Renewed(entry) => Ok(Resolution::Renewed(entry.clone())),
            Self::Failed { stale, error } => Ok(Resolution::RenewalFailed {
                stale: stale.clone(),
                error: anyhow::Error::new(error.clone()),
            }),
            Self::Missing => Err(Error::KRB5_CC_RENEWED_MISSING)?,
        }
    }
}

/// An exchange error handed to every resolver that waited on it.
#[derive(Debug, Clone)]
struct SharedRenewalError(Arc<anyhow::Error>);

impl std::fmt::Display for SharedRenewalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SharedRenewalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

// Holds the outcome of the last exchange made under it, if any.
type RenewalSlot = Arc<Mutex<Option<RenewalOutcome>>>;

/// Hands out cached service tickets, renewing expired-but-renewable ones
/// through a `TicketRenewer`.
pub struct ServiceTicketResolver {
    cache: Arc<ServiceTicketCache>,
    renewer: Arc<dyn TicketRenewer>,
    clock: Arc<dyn Clock>,
    auto_renew: bool,
    dedupe_renewals: bool,
    in_flight: Mutex<HashMap<CacheKey, RenewalSlot>>,
}

impl std::fmt::Debug for ServiceTicketResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceTicketResolver")
            .field("cache", &self.cache)
            .field("auto_renew", &self.auto_renew)
            .field("dedupe_renewals", &self.dedupe_renewals)
            .finish_non_exhaustive()
    }
}

impl ServiceTicketResolver {
    pub fn new(
        context: &Context,
        cache: Arc<ServiceTicketCache>,
        renewer: Arc<dyn TicketRenewer>,
    ) -> Self {
        Self {
            cache,
            renewer,
            clock: Arc::new(SystemClock),
            auto_renew: context.auto_renew,
            dedupe_renewals: context.dedupe_renewals,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn cache(&self) -> &Arc<ServiceTicketCache> {
        &self.cache
    }

    pub fn resolve(&self, cname: &str, spn: &str) -> anyhow::Result<Resolution> {
        self.resolve_at(cname, spn, self.clock.now())
    }

    /// Looks up the ticket for `(cname, spn)` as of `now`.
    ///
    /// Returns `Err` only when the renewer reported success but no entry
    /// could be found afterwards (`KRB5_CC_RENEWED_MISSING`).
    /// Finding the unchanged pre-renewal entry counts as not found.
    pub fn resolve_at(&self, cname: &str, spn: &str, now: Timestamp) -> anyhow::Result<Resolution> {
        let key = CacheKey::encode(cname, spn);
        let Some(entry) = self.cache.get_by_key(&key) else {
            return Ok(Resolution::NotCached);
        };
        if entry.times.is_valid_at(now) {
            debug!(spn, "ticket received from cache");
            return Ok(Resolution::Valid(entry));
        }
        if !entry.times.is_renewable_at(now) {
            debug!(spn, renew_till = %entry.times.renew_till, "ticket past renewable lifetime");
            return Ok(Resolution::Expired);
        }
        if !self.auto_renew {
            debug!(spn, "ticket expired and automatic renewal is disabled");
            return Ok(Resolution::Expired);
        }
        if self.dedupe_renewals {
            self.renew_once(&key, now)
        } else {
            self.renew(&key, entry).resolution()
        }
    }

    // Resolvers of the same key queue on one slot. The first to take it runs
    // the exchange and leaves the outcome there; everyone queued behind it
    // returns that outcome instead of exchanging again.
    fn renew_once(&self, key: &CacheKey, now: Timestamp) -> anyhow::Result<Resolution> {
        let slot = Arc::clone(
            self.in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(key.clone())
                .or_default(),
        );
        let result = {
            let mut outcome = slot.lock().unwrap_or_else(PoisonError::into_inner);
            match outcome.clone() {
                Some(shared) => {
                    debug!(key = key.as_str(), "sharing result of a concurrent renewal");
                    shared.resolution()
                }
                None => match self.cache.get_by_key(key) {
                    Some(current) if current.times.is_valid_at(now) => {
                        debug!(spn = %current.spn, "ticket renewed by a concurrent resolver");
                        Ok(Resolution::Renewed(current))
                    }
                    Some(current) if !current.times.is_renewable_at(now) => {
                        Ok(Resolution::Expired)
                    }
                    Some(current) => {
                        let renewed = self.renew(key, current);
                        let result = renewed.resolution();
                        *outcome = Some(renewed);
                        result
                    }
                    None => Ok(Resolution::NotCached),
                },
            }
        };
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map and this call still hold the slot: nobody is waiting.
        if Arc::strong_count(&slot) == 2 {
            in_flight.remove(key);
        }
        result
    }

    fn renew(&self, key: &CacheKey, entry: CacheEntry) -> RenewalOutcome {
        let ticket = &entry.ticket;
        info!(spn = %entry.spn, endtime = %entry.times.endtime, "renewing expired ticket");
        let renewed = self
            .renewer
            .renew(ticket, &entry.session_key, &ticket.server, &ticket.realm)
            .with_context(|| format!("Ticket renewal failed for {}", entry.spn));
        if let Err(err) = renewed {
            warn!(spn = %entry.spn, "{:#}", err);
            return RenewalOutcome::Failed {
                stale: entry,
                error: SharedRenewalError(Arc::new(err)),
            };
        }
        // An unchanged entry means the renewer never stored its result.
        match self.cache.get_by_key(key) {
            Some(renewed) if renewed != entry => {
                info!(spn = %renewed.spn, endtime = %renewed.times.endtime, "ticket renewed");
                RenewalOutcome::Renewed(renewed)
            }
            _ => {
                error!(spn = %entry.spn, "{}", Error::KRB5_CC_RENEWED_MISSING);
                RenewalOutcome::Missing
            }
        }
    }
}
