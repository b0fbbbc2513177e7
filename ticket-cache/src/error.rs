mod krb5_error;

pub type ErrorCode = i32;

#[derive(Debug, PartialEq, Eq)]
pub struct Error {
    pub code: ErrorCode,
    pub message: &'static str,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Returns the table entry carried by `err`, if any.
    pub fn find(err: &anyhow::Error) -> Option<&'static Error> {
        err.downcast_ref::<&'static Error>().copied()
    }
}

macro_rules! error {
    ($error:ident, $code:expr, $message:expr) => {
        pub const $error: &'static Error = &Error {
            code: $code,
            message: $message,
        };
    };
}

pub(self) use error;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_recovers_coded_error() {
        let err = anyhow::Error::from(Error::KRB5_CC_RENEWED_MISSING);
        assert_eq!(Error::find(&err), Some(Error::KRB5_CC_RENEWED_MISSING));
        assert_eq!(err.to_string(), "Renewed credential missing from cache");
    }

    #[test]
    fn find_ignores_foreign_errors() {
        let err = anyhow::anyhow!("KDC unreachable");
        assert_eq!(Error::find(&err), None);
    }
}
