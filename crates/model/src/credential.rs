use std::fmt::{self, Debug, Formatter};

/// A credential for the remote service.
///
/// An `ApiKey` is never empty: [`ApiKey::new`] refuses blank input, so
/// holding one means a usable credential was found.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates an `ApiKey`, returning `None` if `key` is empty or only
    /// contains whitespace. Surrounding whitespace is trimmed.
    pub fn new<S: Into<String>>(key: S) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    /// Returns the raw credential, for use in request headers.
    #[inline]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}
