//! HS256 JWT implementation of the `TokenService` port.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{TokenService, TokenServiceError, TokenSubject};
use crate::domain::Role;

/// Default token lifetime: 24 hours.
const DEFAULT_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Registered and private claims carried by issued tokens.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    role: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies bearer tokens with a shared HS256 secret.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtTokenService {
    /// Create a service with the default 24 hour token lifetime.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::seconds(DEFAULT_TTL_SECONDS),
        }
    }

    /// Override the token lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, subject: TokenSubject) -> Result<String, TokenServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.user_id,
            role: subject.role.as_str().to_owned(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenServiceError::issue(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<TokenSubject, TokenServiceError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| TokenServiceError::invalid())?;
        let role: Role = data
            .claims
            .role
            .parse()
            .map_err(|_| TokenServiceError::invalid())?;

        Ok(TokenSubject {
            user_id: data.claims.sub,
            role,
        })
    }
}
