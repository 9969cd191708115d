//! Signed token codec used for cookies that must survive a round trip
//! through the browser untouched.
//!
//! Tokens are HS256 JWTs. The payload is flattened next to `iat`/`exp`, so the
//! cookie content stays readable by client script while any change to it
//! breaks the signature. Callers supply "now" for both signing and
//! verification, so expiry follows the session clock rather than wall time.

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::session::{AUTH_SERVER_SECRET, SessionError};

#[derive(Serialize)]
struct SignedClaims<'a, T> {
    iat: i64,
    exp: i64,
    #[serde(flatten)]
    payload: &'a T,
}

#[derive(Deserialize)]
struct VerifiedClaims<T> {
    exp: i64,
    #[serde(flatten)]
    payload: T,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Codec keyed with `AUTH_SERVER_SECRET`.
    pub fn from_env() -> Self {
        Self::new(&AUTH_SERVER_SECRET)
    }

    /// Sign `payload` at `now`; the token stops verifying `ttl` seconds later.
    pub fn encode<T: Serialize>(
        &self,
        payload: &T,
        now: i64,
        ttl: i64,
    ) -> Result<String, SessionError> {
        let claims = SignedClaims {
            iat: now,
            exp: now + ttl,
            payload,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SessionError::Token(e.to_string()))
    }

    /// Verify signature and expiry at `now`, then deserialize. Any failure is
    /// `None`.
    pub fn decode<T: DeserializeOwned>(&self, token: &str, now: i64) -> Option<T> {
        // Expiry is checked against `now` below, not the system clock
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims =
            match jsonwebtoken::decode::<VerifiedClaims<T>>(token, &self.decoding, &validation) {
                Ok(data) => data.claims,
                Err(e) => {
                    tracing::debug!(error = %e, "Rejected signed token");
                    return None;
                }
            };

        if claims.exp < now {
            tracing::debug!(exp = claims.exp, now, "Rejected expired signed token");
            return None;
        }
        Some(claims.payload)
    }
}
