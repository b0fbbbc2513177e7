use super::{CacheEntry, ServiceTicketCache};
use crate::{Principal, Timestamp};
use serde::Serialize;

/// Exported view of a cache entry. Ticket and session key have no field
/// here, so they cannot reach any serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub client: Principal,
    pub spn: String,
    pub authtime: Timestamp,
    pub starttime: Timestamp,
    pub endtime: Timestamp,
    pub renew_till: Timestamp,
}

impl From<&CacheEntry> for EntrySummary {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            client: entry.client.clone(),
            spn: entry.spn.clone(),
            authtime: entry.times.authtime,
            starttime: entry.times.starttime,
            endtime: entry.times.endtime,
            renew_till: entry.times.renew_till,
        }
    }
}

impl ServiceTicketCache {
    pub fn summaries(&self) -> Vec<EntrySummary> {
        self.snapshot().iter().map(EntrySummary::from).collect()
    }

    /// Pretty printed JSON of every entry, ordered by cache key.
    pub fn json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(&self.summaries())?)
    }
}
