use super::Enctype;

/// Session key material bound to a ticket. Never interpreted here; `Debug`
/// prints only the enctype and length so keys do not leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Keyblock {
    pub enctype: Enctype,
    pub contents: Vec<u8>,
}

impl Keyblock {
    pub fn new(enctype: Enctype, contents: Vec<u8>) -> Self {
        Self { enctype, contents }
    }
}

impl std::fmt::Debug for Keyblock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keyblock")
            .field("enctype", &self.enctype)
            .field("contents", &format_args!("<{} bytes redacted>", self.contents.len()))
            .finish()
    }
}
