//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers declare an [`AuthenticatedUser`] parameter to require a valid
//! `Authorization: Bearer <token>` header. Role checks stay in the handlers
//! via [`AuthenticatedUser::require_admin`] and
//! [`AuthenticatedUser::require_self_or_admin`].

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use crate::domain::ports::TokenSubject;
use crate::domain::{Error, Role};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Verified caller identity decoded from the bearer token.
///
/// Token claims carry the role, so no database round trip happens during
/// extraction; handlers that need the full account load it themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: Uuid,
    role: Role,
}

impl AuthenticatedUser {
    /// Identifier of the authenticated account.
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Role claimed by the verified token.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Require administrative access or fail with `403 Forbidden`.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden("admin access required"))
        }
    }

    /// Require the caller to be the given account or an administrator.
    pub fn require_self_or_admin(&self, owner_id: Uuid) -> Result<(), Error> {
        if self.user_id == owner_id || self.role.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden("access denied"))
        }
    }
}

impl From<TokenSubject> for AuthenticatedUser {
    fn from(subject: TokenSubject) -> Self {
        Self {
            user_id: subject.user_id,
            role: subject.role,
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let header = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    header
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("malformed authorization header"))
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let token = bearer_token(req)?;
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let subject = state
        .tokens
        .verify(token)
        .map_err(|_| Error::unauthorized("token is invalid or has expired"))?;
    Ok(subject.into())
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
