//! Port abstraction for bearer-token adapters.

use uuid::Uuid;

use crate::domain::Role;

use super::define_port_error;

define_port_error! {
    /// Failures raised by token adapters.
    pub enum TokenServiceError {
        /// The token could not be signed.
        Issue { message: String } => "token issuance failed: {message}",
        /// The presented token is malformed, forged, or expired.
        Invalid => "token is invalid or has expired",
    }
}

/// Authenticated subject decoded from a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub role: Role,
}

/// Issues and verifies bearer tokens for the REST API.
pub trait TokenService: Send + Sync {
    /// Sign a token for the given subject.
    fn issue(&self, subject: TokenSubject) -> Result<String, TokenServiceError>;

    /// Verify a presented token and decode its subject.
    fn verify(&self, token: &str) -> Result<TokenSubject, TokenServiceError>;
}
