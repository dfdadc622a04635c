//! Registration, login, logout and identity handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"email":"new@test.com","password":"test1234"}
//! POST /api/v1/auth/login    {"email":"new@test.com","password":"test1234"}
//! GET  /api/v1/auth/user
//! POST /api/v1/auth/logout
//! ```
//!
//! Registration only ever creates non-admin identities; administrators are
//! provisioned with the `add-user` CLI command.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{IssuedToken, TOKEN_INVALID_MESSAGE, hash_password, verify_password};
use crate::domain::ports::IdentityRepositoryError;
use crate::domain::{
    ApiResult, Email, Error, Identity, IdentityValidationError, NewIdentity, StoredIdentity,
};

use super::bearer::authenticate;
use super::state::HttpState;
use super::validation::FieldErrors;

/// Message returned when login credentials do not match a stored identity.
pub const CREDENTIAL_MISMATCH_MESSAGE: &str = "email or password does not match";

/// Request body for register and login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CredentialsRequest {
    /// Identity email address.
    pub email: Option<String>,
    /// Plaintext password; hashed before storage, never logged.
    pub password: Option<String>,
}

/// Successful register/login response carrying a fresh access token.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Always `success`.
    pub status: String,
    /// Human-readable outcome.
    pub message: String,
    /// The encoded JWT.
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

impl TokenResponse {
    fn new(message: &str, issued: IssuedToken) -> Self {
        Self {
            status: "success".to_owned(),
            message: message.to_owned(),
            access_token: issued.token,
            token_type: "bearer".to_owned(),
            expires_in: issued.expires_in,
        }
    }
}

/// Identity representation for `GET /api/v1/auth/user`.
#[derive(Debug, Serialize, ToSchema)]
pub struct IdentityDto {
    /// Unique email address.
    pub email: String,
    /// Stable public identifier.
    pub public_id: Uuid,
    /// Whether the identity holds the administrator role.
    pub admin: bool,
    /// Registration timestamp.
    pub registered_on: DateTime<Utc>,
}

impl From<Identity> for IdentityDto {
    fn from(identity: Identity) -> Self {
        Self {
            email: identity.email.as_str().to_owned(),
            public_id: identity.public_id,
            admin: identity.admin,
            registered_on: identity.registered_on,
        }
    }
}

struct Credentials {
    email: Email,
    password: String,
}

fn validate_credentials(payload: CredentialsRequest) -> ApiResult<Credentials> {
    let mut errors = FieldErrors::new();
    let email = match payload.email {
        Some(raw) => errors.capture("email", Email::parse(raw)),
        None => {
            errors.push("email", "required field");
            None
        }
    };
    let password = match payload.password {
        Some(raw) if !raw.is_empty() => Some(raw),
        Some(_) => {
            errors.push("password", IdentityValidationError::EmptyPassword.to_string());
            None
        }
        None => {
            errors.push("password", "required field");
            None
        }
    };
    if let (Some(email), Some(password)) = (email, password) {
        Ok(Credentials { email, password })
    } else {
        Err(errors.into_error())
    }
}

fn map_identity_error(err: IdentityRepositoryError) -> Error {
    match err {
        IdentityRepositoryError::DuplicateEmail { email } => {
            Error::conflict(format!("{email} is already registered"))
        }
        IdentityRepositoryError::Connection { message }
        | IdentityRepositoryError::Query { message } => {
            error!(error = %message, "identity store failure");
            Error::internal("database error")
        }
    }
}

/// Register a new non-admin identity and issue its first token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Identity registered", body = TokenResponse),
        (status = 409, description = "Email already registered", body = Error),
        (status = 422, description = "Validation failed", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = validate_credentials(payload.into_inner())?;
    let password_hash = hash_password(&credentials.password)
        .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;
    let stored = state
        .identities
        .insert(NewIdentity {
            email: credentials.email,
            password_hash,
            admin: false,
        })
        .await
        .map_err(map_identity_error)?;
    info!(email = %stored.identity.email, "identity registered");
    let issued = state.tokens.issue(&stored.identity)?;
    Ok(HttpResponse::Created().json(TokenResponse::new("successfully registered", issued)))
}

/// Exchange credentials for an access token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login success", body = TokenResponse),
        (status = 401, description = "Credentials do not match", body = Error),
        (status = 422, description = "Validation failed", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = validate_credentials(payload.into_inner())?;
    let stored = state
        .identities
        .find_by_email(&credentials.email)
        .await
        .map_err(map_identity_error)?;
    // One rejection path for unknown emails and wrong passwords.
    let Some(StoredIdentity {
        identity,
        password_hash,
    }) = stored
    else {
        return Err(Error::unauthorized(CREDENTIAL_MISMATCH_MESSAGE));
    };
    if !verify_password(&credentials.password, &password_hash) {
        return Err(Error::unauthorized(CREDENTIAL_MISMATCH_MESSAGE));
    }
    let issued = state.tokens.issue(&identity)?;
    info!(email = %identity.email, "identity logged in");
    Ok(HttpResponse::Ok().json(TokenResponse::new("successfully logged in", issued)))
}

/// Return the identity behind the presented token.
#[utoipa::path(
    get,
    path = "/api/v1/auth/user",
    responses(
        (status = 200, description = "The caller's identity", body = IdentityDto),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/user")]
pub async fn current_user(
    req: HttpRequest,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<IdentityDto>> {
    let caller = authenticate(&req, &state).await?;
    let stored = state
        .identities
        .find_by_public_id(caller.public_id)
        .await
        .map_err(map_identity_error)?
        // A verified token whose subject no longer exists is treated like
        // any other invalid token.
        .ok_or_else(|| Error::unauthorized(TOKEN_INVALID_MESSAGE))?;
    Ok(web::Json(stored.identity.into()))
}

/// Revoke the presented token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Token revoked"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(req: HttpRequest, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let caller = authenticate(&req, &state).await?;
    state
        .blacklist
        .revoke(caller.token_id, caller.expires_at)
        .await
        .map_err(|err| Error::internal(format!("blacklist insert failed: {err}")))?;
    info!(public_id = %caller.public_id, "token revoked");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "message": "successfully logged out",
    })))
}
