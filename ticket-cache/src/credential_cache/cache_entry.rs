use crate::{Keyblock, Principal, Ticket, Timestamp};
use serde::Serialize;

/// One cached service ticket. Replaced as a whole, never updated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub client: Principal,
    pub spn: String,
    pub ticket: Ticket,
    pub times: TicketTimes,
    pub session_key: Keyblock,
}

impl CacheEntry {
    pub fn cname(&self) -> String {
        self.client.name_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TicketTimes {
    pub authtime: Timestamp,
    pub starttime: Timestamp,
    pub endtime: Timestamp,
    pub renew_till: Timestamp,
}

impl TicketTimes {
    /// Inside the validity window, bounds excluded.
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        now > self.starttime && now < self.endtime
    }

    /// Still before the renewal deadline.
    pub fn is_renewable_at(&self, now: Timestamp) -> bool {
        now < self.renew_till
    }
}
