use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

/// Tokens are refreshed once they are this close to expiring.
pub const TOKEN_REFRESH_BUFFER: Duration = Duration::from_secs(5 * 60);
/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// A bearer token obtained from the token endpoint, with its expiry.
#[derive(Clone)]
pub struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    pub fn new(access_token: impl Into<String>, expires_at: Instant) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Builds a token that expires `lifetime` after `issued_at`.
    pub fn issued(access_token: impl Into<String>, issued_at: Instant, lifetime: Duration) -> Self {
        Self::new(access_token, issued_at + lifetime)
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// True while `now` is more than the refresh buffer before expiry.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now + TOKEN_REFRESH_BUFFER < self.expires_at
    }
}

// Keeps the token out of logs.
impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
