use chrono::{DateTime, TimeDelta, Utc};

use crate::helpers::time::{expiry_after_secs, now};
use crate::types::{FlexString, LoginData};
use crate::utils::constants::{DEFAULT_TOKEN_TTL_SECS, TOKEN_BUFFER_SECS};

/// Bearer token and its absolute expiry, always replaced together.
#[derive(Clone, PartialEq)]
pub struct AccessToken {
    pub value: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub merchant_id: FlexString,
    pub merchant_name: String,
}

impl AccessToken {
    pub fn from_login(data: LoginData) -> Self {
        let ttl = if data.expires_in > 0.0 { data.expires_in } else { DEFAULT_TOKEN_TTL_SECS };
        Self {
            value: data.access_token.trim().to_owned(),
            token_type: data.token_type,
            expires_at: expiry_after_secs(ttl),
            merchant_id: data.merchant_id,
            merchant_name: data.merchant_name,
        }
    }

    /// Usable means non-empty and not inside the buffer window before expiry.
    pub fn is_usable_at(&self, at: DateTime<Utc>) -> bool {
        !self.value.is_empty() && at + TimeDelta::seconds(TOKEN_BUFFER_SECS) < self.expires_at
    }

    pub fn is_usable(&self) -> bool {
        self.is_usable_at(now())
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"***")
            .field("expires_at", &self.expires_at)
            .field("merchant_id", &self.merchant_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(expires_in: f64) -> LoginData {
        LoginData {
            access_token: " tok ".into(),
            token_type: "Bearer".into(),
            expires_in,
            merchant_id: "206".into(),
            merchant_name: "Acme".into(),
        }
    }

    #[test]
    fn non_positive_ttl_defaults_to_an_hour() {
        let token = AccessToken::from_login(login(0.0));
        let ttl = (token.expires_at - now()).num_seconds();
        assert!((3590..=3600).contains(&ttl), "ttl {}", ttl);
        assert_eq!(token.value, "tok");
        assert_eq!(token.bearer(), "Bearer tok");
    }

    #[test]
    fn buffer_window_marks_token_stale() {
        let token = AccessToken::from_login(login(3600.0));
        assert!(token.is_usable());
        assert!(!token.is_usable_at(token.expires_at - TimeDelta::seconds(TOKEN_BUFFER_SECS)));
        assert!(!token.is_usable_at(token.expires_at - TimeDelta::seconds(60)));
        assert!(token.is_usable_at(token.expires_at - TimeDelta::seconds(TOKEN_BUFFER_SECS + 1)));

        // shorter than the buffer: stale straight away
        let short = AccessToken::from_login(login(120.0));
        assert!(!short.is_usable());
    }

    #[test]
    fn empty_token_is_never_usable() {
        let mut token = AccessToken::from_login(login(3600.0));
        token.value.clear();
        assert!(!token.is_usable());
    }
}
