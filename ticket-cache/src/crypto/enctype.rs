#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Enctype(pub i32);

macro_rules! enctype {
    ($enctype:ident, $int:expr) => {
        pub const $enctype: Enctype = Enctype($int);
    };
}

impl Enctype {
    enctype!(NULL, 0x0000);
    enctype!(DES3_CBC_SHA1, 0x0010);
    // RFC 3962
    enctype!(AES128_CTS_HMAC_SHA1_96, 0x0011);
    // RFC 3962
    enctype!(AES256_CTS_HMAC_SHA1_96, 0x0012);
    // RFC 8009
    enctype!(AES128_CTS_HMAC_SHA256_128, 0x0013);
    // RFC 8009
    enctype!(AES256_CTS_HMAC_SHA384_192, 0x0014);
    // RFC 4757
    enctype!(ARCFOUR_HMAC, 0x0017);

    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            Self::NULL => "null",
            Self::DES3_CBC_SHA1 => "des3-cbc-sha1",
            Self::AES128_CTS_HMAC_SHA1_96 => "aes128-cts-hmac-sha1-96",
            Self::AES256_CTS_HMAC_SHA1_96 => "aes256-cts-hmac-sha1-96",
            Self::AES128_CTS_HMAC_SHA256_128 => "aes128-cts-hmac-sha256-128",
            Self::AES256_CTS_HMAC_SHA384_192 => "aes256-cts-hmac-sha384-192",
            Self::ARCFOUR_HMAC => "arcfour-hmac",
            _ => return None,
        };
        Some(name)
    }
}

impl std::fmt::Display for Enctype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "unsupported encryption type {}", self.0),
        }
    }
}
