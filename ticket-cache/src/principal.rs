use crate::{Error, Flags};
use serde::Serialize;

const REALM_SEP: char = '@';
const COMPONENT_SEP: &str = "/";
const KRB5_TGS_NAME: &str = "krbtgt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub name_type: NameType,
    pub components: Vec<String>,
    pub realm: String,
}

macro_rules! principal_flag {
    ($name:ident, $value:expr) => {
        pub const $name: Flags = $value;
    };
}

impl Principal {
    principal_flag!(PARSE_NO_REALM, 0x1);
    principal_flag!(PARSE_REQUIRE_REALM, 0x2);

    pub fn new(name_type: NameType, components: &[&str], realm: &str) -> Self {
        Self {
            name_type,
            components: components.iter().map(|c| (*c).to_owned()).collect(),
            realm: realm.to_owned(),
        }
    }

    /// Parses `comp[/comp...][@REALM]`, falling back to `default_realm` when
    /// the name carries none.
    pub fn parse_name(name: &str, default_realm: Option<&str>, flags: Flags) -> anyhow::Result<Self> {
        if name.is_empty() || name.ends_with('\\') {
            Err(Error::KRB5_PARSE_MALFORMED)?
        }
        let require_realm = flags & Self::PARSE_REQUIRE_REALM != 0;
        let no_realm = flags & Self::PARSE_NO_REALM != 0;

        let (components, realm) = match name.split_once(REALM_SEP) {
            None => (name, None),
            Some((components, realm)) => (components, Some(realm)),
        };

        let components: Vec<String> = components
            .split(COMPONENT_SEP)
            .map(|c| c.to_owned())
            .collect();
        if components.iter().any(|c| c.is_empty()) {
            Err(Error::KRB5_PARSE_MALFORMED)?
        }

        let realm = match realm {
            Some(realm) => {
                if no_realm || realm.contains(COMPONENT_SEP) || realm.contains(REALM_SEP) {
                    Err(Error::KRB5_PARSE_MALFORMED)?
                }
                realm.to_owned()
            }
            None => {
                if require_realm {
                    Err(Error::KRB5_PARSE_MALFORMED)?
                }
                match (no_realm, default_realm) {
                    (true, _) => String::new(),
                    (false, Some(realm)) => realm.to_owned(),
                    (false, None) => Err(Error::KRB5_CONFIG_NODEFREALM)?,
                }
            }
        };

        let name_type = Self::infer_principal_type(&components);
        Ok(Principal {
            name_type,
            components,
            realm,
        })
    }

    fn infer_principal_type(components: &[String]) -> NameType {
        match components {
            [first, _] if first == KRB5_TGS_NAME => NameType::SRV_INST,
            [_, _] => NameType::SRV_HST,
            _ => NameType::PRINCIPAL,
        }
    }

    /// Components joined by `/`, without the realm. This is the identity
    /// string the ticket cache is keyed on.
    pub fn name_string(&self) -> String {
        self.components.join(COMPONENT_SEP)
    }

    pub fn unparse_name(&self) -> String {
        if self.realm.is_empty() {
            return self.name_string();
        }
        format!("{}{}{}", self.name_string(), REALM_SEP, self.realm)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NameType(pub i32);

macro_rules! name_type {
    ($name_type:ident, $int:expr) => {
        pub const $name_type: NameType = NameType($int);
    };
}

impl NameType {
    // Just the name of the principal as in DCE, or for users
    name_type!(PRINCIPAL, 1);
    // Service and other unique instance (krbtgt)
    name_type!(SRV_INST, 2);
    // Service with host name as instance (telnet, rcommands)
    name_type!(SRV_HST, 3);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_service_name_with_realm() {
        let principal = Principal::parse_name("HTTP/server@EXAMPLE.COM", None, 0).unwrap();
        assert_eq!(principal.components, vec!["HTTP", "server"]);
        assert_eq!(principal.realm, "EXAMPLE.COM");
        assert_eq!(principal.name_type, NameType::SRV_HST);
        assert_eq!(principal.name_string(), "HTTP/server");
        assert_eq!(principal.unparse_name(), "HTTP/server@EXAMPLE.COM");
        assert_eq!(
            principal,
            Principal::new(NameType::SRV_HST, &["HTTP", "server"], "EXAMPLE.COM")
        );
    }

    #[test]
    fn parse_uses_default_realm() {
        let principal = Principal::parse_name("alice", Some("EXAMPLE.COM"), 0).unwrap();
        assert_eq!(principal.name_type, NameType::PRINCIPAL);
        assert_eq!(principal.realm, "EXAMPLE.COM");
    }

    #[test]
    fn parse_tgs_name() {
        let principal = Principal::parse_name("krbtgt/EXAMPLE.COM@EXAMPLE.COM", None, 0).unwrap();
        assert_eq!(principal.name_type, NameType::SRV_INST);
    }

    #[test]
    fn parse_without_realm_and_default_fails() {
        let err = Principal::parse_name("alice", None, 0).unwrap_err();
        assert_eq!(Error::find(&err), Some(Error::KRB5_CONFIG_NODEFREALM));
    }

    #[test]
    fn parse_rejects_malformed_names() {
        for name in ["", "alice\\", "a//b@R", "alice@R/X", "alice@R@S"] {
            let err = Principal::parse_name(name, Some("R"), 0).unwrap_err();
            assert_eq!(Error::find(&err), Some(Error::KRB5_PARSE_MALFORMED), "{name}");
        }
        let err = Principal::parse_name("alice", None, Principal::PARSE_REQUIRE_REALM).unwrap_err();
        assert_eq!(Error::find(&err), Some(Error::KRB5_PARSE_MALFORMED));
    }

    #[test]
    fn parse_no_realm_flag() {
        let principal = Principal::parse_name("alice", Some("R"), Principal::PARSE_NO_REALM).unwrap();
        assert!(principal.realm.is_empty());
        assert_eq!(principal.unparse_name(), "alice");
    }
}
