#![forbid(unsafe_code)]

use std::fmt;

use serde::Deserialize;

/// Short-lived credential returned by the token exchange.
///
/// Built fresh for every top-level operation and dropped with it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct BearerSession {
    pub subject: String,
    pub token: String,
}

impl BearerSession {
    /// Value of the `Authorization` query parameter the permit service expects.
    pub fn authorization_param(&self) -> String {
        format!("bearer {}", self.token)
    }
}

impl fmt::Debug for BearerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerSession")
            .field("subject", &self.subject)
            .field("token", &"<redacted>")
            .finish()
    }
}
