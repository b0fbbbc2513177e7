//! Client-side cache of Kerberos service tickets.
//!
//! [`ServiceTicketCache`] stores one ticket per (client, service) pair and
//! [`ServiceTicketResolver`] hands them out, renewing tickets that have
//! expired but are still inside their renewable lifetime.

mod context;
mod credential_cache;
mod crypto;
mod error;
mod principal;
mod renewal;
mod ticket;

pub use self::{
    context::{Conf, Context, Profile},
    credential_cache::{CacheEntry, CacheKey, EntrySummary, ServiceTicketCache, TicketTimes},
    crypto::{Enctype, Keyblock},
    error::{Error, ErrorCode},
    principal::{NameType, Principal},
    renewal::{Clock, Resolution, ServiceTicketResolver, SystemClock, TicketRenewer},
    ticket::{EncData, Ticket},
};

pub type Kvno = u32;
pub type Flags = i32;
pub type Timestamp = chrono::DateTime<chrono::Utc>;
