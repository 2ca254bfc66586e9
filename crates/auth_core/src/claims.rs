use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Assertions carried inside a token.
///
/// Timestamps are seconds since the Unix epoch, which is what the JWT
/// registered claims `iat` and `exp` expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

impl Claims {
    pub fn new(subject: impl Into<String>, issued_at: u64, validity: Duration) -> Self {
        Self {
            sub: subject.into(),
            iat: issued_at,
            exp: issued_at.saturating_add(validity.as_secs()),
        }
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// A token is expired once `now` has moved past `exp`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.exp < now
    }
}
