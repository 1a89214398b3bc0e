//! Admin authentication: shared-credential login and time-boxed session tokens.
//!
//! Session validity depends only on the token, the current time and the
//! configuration handed to [`AdminSessionAuth::new`].

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

use crate::app_error::{AppError, AppResult};

pub const ADMIN_SESSION_COOKIE: &str = "admin_session";
/// No session token is valid once this old.
pub const SESSION_TTL: Duration = Duration::hours(24);

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct AdminSessionAuth {
    username: String,
    password: SecretString,
    secret: SecretString,
}

impl AdminSessionAuth {
    pub fn new(username: String, password: SecretString, secret: SecretString) -> Self {
        Self {
            username,
            password,
            secret,
        }
    }

    pub fn ttl(&self) -> Duration {
        SESSION_TTL
    }

    pub fn verify_credentials(&self, username: &str, password: &str) -> bool {
        // Evaluate both comparisons so timing does not reveal which one failed.
        let user_ok = digest_eq(username, &self.username);
        let pass_ok = digest_eq(password, self.password.expose_secret());
        user_ok & pass_ok
    }

    pub fn issue(&self, now: OffsetDateTime) -> AppResult<String> {
        let iat = now.unix_timestamp();
        let claims = AdminClaims {
            sub: self.username.clone(),
            iat,
            exp: iat + SESSION_TTL.whole_seconds(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| AppError::Internal(e.to_string()))
    }

    pub fn is_valid(&self, token: &str, now: OffsetDateTime) -> bool {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against `now` below, not the system clock.
        validation.validate_exp = false;

        let claims = match decode::<AdminClaims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &validation,
        ) {
            Ok(data) => data.claims,
            Err(err) => {
                tracing::debug!(error = %err, "Rejected admin session token");
                return false;
            }
        };

        let age = now.unix_timestamp() - claims.iat;
        claims.sub == self.username && age >= 0 && age < SESSION_TTL.whole_seconds()
    }
}

fn digest_eq(a: &str, b: &str) -> bool {
    let a = Sha256::digest(a.as_bytes());
    let b = Sha256::digest(b.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
