use crate::Error;
use base64::{engine::general_purpose::STANDARD, Engine as _};

// Never produced by the standard base64 alphabet.
const KEY_SEP: char = ':';

/// Composite lookup key for a (client, service) identity pair.
///
/// Each component is base64 encoded before joining, so a separator inside an
/// identity string can never make two distinct pairs collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn encode(cname: &str, spn: &str) -> Self {
        Self(format!(
            "{}{}{}",
            STANDARD.encode(cname),
            KEY_SEP,
            STANDARD.encode(spn)
        ))
    }

    /// Recovers the `(cname, spn)` pair the key was built from.
    pub fn decode(&self) -> anyhow::Result<(String, String)> {
        let (cname, spn) = self.0.split_once(KEY_SEP).ok_or(Error::KRB5_CC_BADNAME)?;
        let cname = String::from_utf8(STANDARD.decode(cname)?)?;
        let spn = String::from_utf8(STANDARD.decode(spn)?)?;
        Ok((cname, spn))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
