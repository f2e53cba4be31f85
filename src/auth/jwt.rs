use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::auth::claims::Claims;
use crate::state::AppState;

/// Signs and verifies bearer tokens. The secret is process-wide configuration
/// loaded once at startup; there is no revocation, a leaked token stays valid
/// until its natural expiry.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt.secret, state.config.jwt.ttl_hours)
    }
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, username: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + self.ttl;
        let claims = Claims {
            sub: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user = %username, "token issued");
        Ok(token)
    }

    /// Parses the subject claim, verifying the signature but not expiry.
    pub fn extract_subject(&self, token: &str) -> anyhow::Result<String> {
        let mut validation = Validation::default();
        validation.validate_exp = false;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims.sub)
    }

    /// Fails closed: false on bad signature, malformed token, subject
    /// mismatch, or expiry.
    pub fn validate(&self, token: &str, expected_username: &str) -> bool {
        let mut validation = Validation::default();
        validation.leeway = 0;
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => {
                let ok = data.claims.sub == expected_username;
                if !ok {
                    debug!(
                        subject = %data.claims.sub,
                        expected = %expected_username,
                        "token subject mismatch"
                    );
                }
                ok
            }
            Err(e) => {
                debug!(error = %e, "token rejected");
                false
            }
        }
    }
}
