mod profile;

pub use self::profile::Profile;
use crate::{Error, Principal};

const DEFAULT_AUTO_RENEW: bool = true;
const DEFAULT_DEDUPE_RENEWALS: bool = true;

pub struct Conf;

macro_rules! conf {
    ($name:ident, $value:expr) => {
        pub const $name: &'static str = $value;
    };
}

impl Conf {
    conf!(AUTO_RENEW, "auto_renew");
    conf!(DEDUPE_RENEWALS, "dedupe_renewals");
    conf!(DEFAULT_REALM, "default_realm");
    conf!(LIBDEFAULTS, "libdefaults");
}

/// Library settings resolved from the krb5 profile.
#[derive(Debug)]
pub struct Context {
    pub profile: Profile,
    pub default_realm: Option<String>,
    /// Renew expired tickets that are still inside their renewable lifetime.
    pub auto_renew: bool,
    /// Let concurrent lookups of one expired ticket share a single renewal.
    pub dedupe_renewals: bool,
}

impl Context {
    pub fn init() -> anyhow::Result<Self> {
        Self::new(false)
    }

    pub fn new(secure: bool) -> anyhow::Result<Self> {
        Ok(Self::from_profile(Profile::new(secure)?))
    }

    pub fn from_profile(profile: Profile) -> Self {
        let default_realm = Self::get_string(&profile, Conf::DEFAULT_REALM);
        let auto_renew = Self::get_bool(&profile, Conf::AUTO_RENEW, DEFAULT_AUTO_RENEW);
        let dedupe_renewals =
            Self::get_bool(&profile, Conf::DEDUPE_RENEWALS, DEFAULT_DEDUPE_RENEWALS);
        Self {
            profile,
            default_realm,
            auto_renew,
            dedupe_renewals,
        }
    }

    fn get_bool(profile: &Profile, name: &str, default: bool) -> bool {
        profile
            .get_bool(&format!("{}.{}", Conf::LIBDEFAULTS, name))
            .unwrap_or(default)
    }

    fn get_string(profile: &Profile, name: &str) -> Option<String> {
        profile.get_string(&format!("{}.{}", Conf::LIBDEFAULTS, name))
    }

    pub fn get_default_realm(&self) -> anyhow::Result<&str> {
        match self.default_realm.as_deref() {
            Some(realm) if !realm.is_empty() => Ok(realm),
            _ => Err(Error::KRB5_CONFIG_NODEFREALM)?,
        }
    }

    pub fn parse_name(&self, name: &str) -> anyhow::Result<Principal> {
        Principal::parse_name(name, self.default_realm.as_deref(), 0)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::from_profile(Profile::default())
    }
}
