//! Account handlers: registration, login, profile, and user administration.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{NewUser, TokenSubject, UserChanges};
use crate::domain::{EmailAddress, Error, Role, User, Username};
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::orders::OrderBody;
use crate::inbound::http::state::HttpState;

/// Minimum accepted password length for new credentials.
pub const PASSWORD_MIN: usize = 8;

/// Public representation of an account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserBody {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            role: user.role().to_string(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued token plus the account it belongs to.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    pub user: UserBody,
}

/// The caller's account together with their order history.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileBody {
    #[serde(flatten)]
    pub user: UserBody,
    pub orders: Vec<OrderBody>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

fn validated_password(password: &str) -> Result<&str, Error> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(Error::invalid_request(format!(
            "password must be at least {PASSWORD_MIN} characters"
        )));
    }
    Ok(password)
}

/// Register a new customer account.
///
/// The role is always `user`; administrators are promoted through the user
/// update endpoint, never self-assigned at registration.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    security(()),
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Validation failed or identity taken", body = Error)
    )
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    body: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let username =
        Username::new(body.username).map_err(|e| Error::invalid_request(e.to_string()))?;
    let email = EmailAddress::new(body.email).map_err(|e| Error::invalid_request(e.to_string()))?;
    let password_hash = state.password_hasher.hash(validated_password(&body.password)?)?;

    let user = state
        .users
        .create(NewUser {
            username,
            email,
            password_hash,
            role: Role::User,
        })
        .await?;

    let token = state.tokens.issue(TokenSubject {
        user_id: user.id(),
        role: user.role(),
    })?;

    Ok(HttpResponse::Created().json(TokenResponse {
        token,
        user: UserBody::from(&user),
    }))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    security(()),
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = Error)
    )
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    body: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    // Unknown email and wrong password are indistinguishable to the caller.
    let rejected = || Error::unauthorized("invalid credentials");

    let email = EmailAddress::new(body.email).map_err(|_| rejected())?;
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(rejected)?;

    if !state
        .password_hasher
        .verify(&body.password, user.password_hash())?
    {
        return Err(rejected());
    }

    let token = state.tokens.issue(TokenSubject {
        user_id: user.id(),
        role: user.role(),
    })?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        token,
        user: UserBody::from(&user),
    }))
}

/// Return the caller's account together with their order history.
#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    tag = "auth",
    responses(
        (status = 200, description = "The caller's profile", body = ProfileBody),
        (status = 401, description = "Missing or invalid token", body = Error)
    )
)]
#[get("/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(caller.user_id())
        .await?
        .ok_or_else(|| Error::not_found("user not found"))?;
    let orders = state.orders.list_for_user(caller.user_id()).await?;

    Ok(HttpResponse::Ok().json(ProfileBody {
        user: UserBody::from(&user),
        orders: orders.iter().map(OrderBody::from).collect(),
    }))
}

/// List all accounts. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "All registered users", body = [UserBody]),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Caller is not an administrator", body = Error)
    )
)]
#[get("")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    caller.require_admin()?;
    let users = state.users.list().await?;
    let bodies: Vec<UserBody> = users.iter().map(UserBody::from).collect();
    Ok(HttpResponse::Ok().json(bodies))
}

/// Fetch one account. Self or admin.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "The requested user", body = UserBody),
        (status = 403, description = "Caller may not view this user", body = Error),
        (status = 404, description = "No such user", body = Error)
    )
)]
#[get("/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let id = id.into_inner();
    caller.require_self_or_admin(id)?;
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("user not found"))?;
    Ok(HttpResponse::Ok().json(UserBody::from(&user)))
}

/// Update an account. Self or admin; only admins may change the role.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "The updated user", body = UserBody),
        (status = 400, description = "Validation failed", body = Error),
        (status = 403, description = "Caller may not edit this user", body = Error),
        (status = 404, description = "No such user", body = Error)
    )
)]
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    id: web::Path<Uuid>,
    body: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    let id = id.into_inner();
    caller.require_self_or_admin(id)?;
    let body = body.into_inner();

    let mut changes = UserChanges::default();
    if let Some(username) = body.username {
        changes.username =
            Some(Username::new(username).map_err(|e| Error::invalid_request(e.to_string()))?);
    }
    if let Some(email) = body.email {
        changes.email =
            Some(EmailAddress::new(email).map_err(|e| Error::invalid_request(e.to_string()))?);
    }
    if let Some(password) = body.password {
        changes.password_hash = Some(state.password_hasher.hash(validated_password(&password)?)?);
    }
    if let Some(role) = body.role {
        caller.require_admin()?;
        changes.role = Some(
            role.parse::<Role>()
                .map_err(|e| Error::invalid_request(e.to_string()))?,
        );
    }
    if changes.is_empty() {
        return Err(Error::invalid_request("no fields to update"));
    }

    let user = state
        .users
        .update(id, changes)
        .await?
        .ok_or_else(|| Error::not_found("user not found"))?;
    Ok(HttpResponse::Ok().json(UserBody::from(&user)))
}

/// Delete an account. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Caller is not an administrator", body = Error),
        (status = 404, description = "No such user", body = Error)
    )
)]
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    caller.require_admin()?;
    if state.users.delete(id.into_inner()).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(Error::not_found("user not found"))
    }
}
