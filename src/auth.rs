use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// A Quickbase user token with a client-side expiry horizon.
///
/// The token string itself is issued out of band (realm admin UI or the
/// temporary-token endpoint); this type only tracks how long the caller
/// intends to trust it.
#[derive(Debug, Clone)]
pub struct UserToken {
    token: String,
    expiration: DateTime<Utc>,
}

impl UserToken {
    pub fn new(token: impl Into<String>, hours: i64) -> Self {
        Self {
            token: token.into(),
            expiration: Utc::now() + Duration::hours(hours),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expiration
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for UserToken {
    /// Masks everything but the last five characters.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail: String = self
            .token
            .chars()
            .rev()
            .take(5)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        let stars = "*".repeat(self.token.chars().count().saturating_sub(tail.chars().count()));
        write!(f, "{stars}{tail}")
    }
}
