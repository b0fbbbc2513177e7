use crate::{Enctype, Kvno, Principal};

/// A service ticket as issued by the KDC. The encrypted part is carried
/// opaquely; only the realm and server principal are read by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub realm: String,
    pub server: Principal,
    pub enc_part: EncData,
}

impl Ticket {
    pub fn new(server: Principal, enc_part: EncData) -> Self {
        Self {
            realm: server.realm.clone(),
            server,
            enc_part,
        }
    }

    /// Identity string of the service this ticket is for.
    pub fn spn(&self) -> String {
        self.server.name_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncData {
    pub enctype: Enctype,
    pub kvno: Kvno,
    pub ciphertext: Vec<u8>,
}
