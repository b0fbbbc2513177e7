mod cache_entry;
mod cache_key;
mod snapshot;

pub use self::{
    cache_entry::{CacheEntry, TicketTimes},
    cache_key::CacheKey,
    snapshot::EntrySummary,
};
use crate::{Keyblock, Principal, Ticket};
use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::debug;

/// Service tickets held by a client, keyed by (client, service) identity.
///
/// A single reader/writer lock guards the whole map. Lookups and snapshots
/// share it; inserts, removals and clears take it exclusively. The lock is
/// only held around map access.
#[derive(Debug, Default)]
pub struct ServiceTicketCache {
    entries: RwLock<BTreeMap<CacheKey, CacheEntry>>,
}

impl ServiceTicketCache {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave a half-written entry
    // behind, so a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<CacheKey, CacheEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<CacheKey, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_entry(&self, cname: &str, spn: &str) -> Option<CacheEntry> {
        self.get_by_key(&CacheKey::encode(cname, spn))
    }

    pub fn get_by_key(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.read().get(key).cloned()
    }

    /// Stores a ticket for `client`, replacing any entry for the same
    /// client and service. The service is taken from the ticket itself.
    pub fn add_entry(
        &self,
        client: Principal,
        ticket: Ticket,
        times: TicketTimes,
        session_key: Keyblock,
    ) -> CacheEntry {
        let spn = ticket.spn();
        let key = CacheKey::encode(&client.name_string(), &spn);
        let entry = CacheEntry {
            client,
            spn,
            ticket,
            times,
            session_key,
        };
        debug!(spn = %entry.spn, endtime = %entry.times.endtime, "adding ticket to cache");
        self.write().insert(key, entry.clone());
        entry
    }

    pub fn remove_entry(&self, cname: &str, spn: &str) {
        self.write().remove(&CacheKey::encode(cname, spn));
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// All entries in ascending key order.
    pub fn snapshot(&self) -> Vec<CacheEntry> {
        self.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{EncData, Enctype, Timestamp};
    use chrono::{Duration, TimeZone, Utc};
    use std::{sync::Arc, thread};

    pub(crate) fn entry_for(cname: &str, spn: &str, ticket: &[u8]) -> (Principal, Ticket, Keyblock) {
        let client = Principal::parse_name(cname, Some("EXAMPLE.COM"), 0).unwrap();
        let server = Principal::parse_name(spn, Some("EXAMPLE.COM"), 0).unwrap();
        let ticket = Ticket::new(
            server,
            EncData {
                enctype: Enctype::AES256_CTS_HMAC_SHA1_96,
                kvno: 2,
                ciphertext: ticket.to_vec(),
            },
        );
        let key = Keyblock::new(Enctype::AES256_CTS_HMAC_SHA1_96, vec![0x5a; 32]);
        (client, ticket, key)
    }

    pub(crate) fn times_from(start: Timestamp) -> TicketTimes {
        TicketTimes {
            authtime: start,
            starttime: start,
            endtime: start + Duration::hours(10),
            renew_till: start + Duration::days(7),
        }
    }

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn add_then_get() {
        let cache = ServiceTicketCache::new();
        let (client, ticket, key) = entry_for("alice", "HTTP/server", b"t1");
        let stored = cache.add_entry(client, ticket, times_from(now()), key);
        assert_eq!(stored.spn, "HTTP/server");
        assert_eq!(stored.cname(), "alice");
        assert_eq!(cache.get_entry("alice", "HTTP/server"), Some(stored));
        assert_eq!(cache.get_entry("bob", "HTTP/server"), None);
        assert_eq!(cache.get_entry("alice", "HTTP/other"), None);
    }

    #[test]
    fn add_overwrites_whole_entry() {
        let cache = ServiceTicketCache::new();
        let (client, ticket, key) = entry_for("alice", "HTTP/server", b"old");
        cache.add_entry(client, ticket, times_from(now()), key);

        let (client, ticket, _) = entry_for("alice", "HTTP/server", b"new");
        let new_key = Keyblock::new(Enctype::AES128_CTS_HMAC_SHA1_96, vec![0x11; 16]);
        let new_times = times_from(now() + Duration::hours(1));
        cache.add_entry(client, ticket, new_times, new_key.clone());

        assert_eq!(cache.len(), 1);
        let entry = cache.get_entry("alice", "HTTP/server").unwrap();
        assert_eq!(entry.ticket.enc_part.ciphertext, b"new");
        assert_eq!(entry.session_key, new_key);
        assert_eq!(entry.times, new_times);
    }

    #[test]
    fn remove_and_clear() {
        let cache = ServiceTicketCache::new();
        for spn in ["HTTP/a", "HTTP/b", "HTTP/c"] {
            let (client, ticket, key) = entry_for("alice", spn, b"t");
            cache.add_entry(client, ticket, times_from(now()), key);
        }
        cache.remove_entry("alice", "HTTP/b");
        cache.remove_entry("alice", "HTTP/missing");
        assert_eq!(cache.len(), 2);
        assert!(cache.get_entry("alice", "HTTP/b").is_none());

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.snapshot().is_empty());
    }

    #[test]
    fn snapshot_is_ordered_by_key() {
        let cache = ServiceTicketCache::new();
        for (cname, spn) in [("bob", "HTTP/x"), ("alice", "ldap/y"), ("alice", "HTTP/x")] {
            let (client, ticket, key) = entry_for(cname, spn, b"t");
            cache.add_entry(client, ticket, times_from(now()), key);
        }
        let keys: Vec<CacheKey> = cache
            .snapshot()
            .iter()
            .map(|e| CacheKey::encode(&e.cname(), &e.spn))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn concurrent_writers_and_readers() {
        let cache = Arc::new(ServiceTicketCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for j in 0..50 {
                        let spn = format!("HTTP/host{}", j % 10);
                        let (client, ticket, key) = entry_for(&format!("user{}", i), &spn, b"t");
                        cache.add_entry(client, ticket, times_from(now()), key);
                        let entry = cache.get_entry(&format!("user{}", i), &spn).unwrap();
                        assert_eq!(entry.spn, spn);
                        let _ = cache.snapshot();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 80);
    }
}
