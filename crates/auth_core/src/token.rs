use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use secrecy::{ExposeSecret, Secret};

use crate::claims::Claims;

const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Problems with the signing setup. These are startup errors: a service
/// that cannot build its issuer must not start.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SigningConfigError {
    #[error("the token signing secret is missing or empty")]
    MissingSecret,
    #[error("the token validity window must be at least one second")]
    ZeroValidity,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("a token subject must not be empty")]
    EmptySubject,
    #[error("the token has expired")]
    Expired,
    #[error("the token signature does not match its contents")]
    InvalidSignature,
    #[error("the token could not be decoded")]
    Malformed(#[source] jsonwebtoken::errors::Error),
    #[error("failed to sign the token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed(e),
        }
    }
}

fn secret_bytes(secret: &Secret<String>) -> Result<&[u8], SigningConfigError> {
    let raw = secret.expose_secret();
    if raw.trim().is_empty() {
        return Err(SigningConfigError::MissingSecret);
    }
    Ok(raw.as_bytes())
}

/// Produces signed, time-bounded tokens for authenticated subjects.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    validity: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &Secret<String>, validity: Duration) -> Result<Self, SigningConfigError> {
        let key = EncodingKey::from_secret(secret_bytes(secret)?);
        if validity.as_secs() == 0 {
            return Err(SigningConfigError::ZeroValidity);
        }
        Ok(Self { key, validity })
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, get_current_timestamp())
    }

    /// Issue a token as if the clock read `issued_at` (seconds since the
    /// Unix epoch).
    pub fn issue_at(&self, subject: &str, issued_at: u64) -> Result<String, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::EmptySubject);
        }
        let claims = Claims::new(subject, issued_at, self.validity);
        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.key).map_err(TokenError::Signing)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("key", &"[REDACTED]")
            .field("validity", &self.validity)
            .finish()
    }
}

/// Checks tokens produced by a [`TokenIssuer`] sharing the same secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &Secret<String>) -> Result<Self, SigningConfigError> {
        let key = DecodingKey::from_secret(secret_bytes(secret)?);
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // `exp` must be present, but expiry itself is judged by `Claims`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);
        Ok(Self { key, validation })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, get_current_timestamp())
    }

    /// Verify as if the clock read `now` (seconds since the Unix epoch).
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)?.claims;
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        if claims.sub.is_empty() {
            return Err(TokenError::EmptySubject);
        }
        Ok(claims)
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("key", &"[REDACTED]")
            .field("algorithm", &TOKEN_ALGORITHM)
            .finish()
    }
}
