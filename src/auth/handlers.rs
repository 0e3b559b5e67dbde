use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::auth::dto::{LoginRequest, RegisterRequest, TokenResponse, UserResponse};
use crate::auth::extractors::AuthUser;
use crate::auth::jwt::{removal_cookie, JwtKeys};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::{is_unique_violation, Role, User};
use crate::error::ApiError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    payload.identifier = payload.identifier.trim().to_string();

    if payload.identifier.is_empty() {
        return Err(ApiError::InvalidInput("identifier must not be blank".into()));
    }
    if payload.password.trim().is_empty() {
        return Err(ApiError::InvalidInput("password must not be blank".into()));
    }
    let role = Role::parse(&payload.role)
        .ok_or_else(|| ApiError::InvalidRole(payload.role.clone()))?;

    if User::find_by_identifier(&state.db, &payload.identifier)
        .await?
        .is_some()
    {
        warn!(identifier = %payload.identifier, "identifier already registered");
        return Err(ApiError::DuplicateIdentifier);
    }

    let hash = hash_password(&payload.password)?;

    // A concurrent register can slip past the pre-check; the unique index has
    // the final word.
    let user = User::create(&state.db, &payload.identifier, &hash, &payload.full_name, role)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::DuplicateIdentifier
            } else {
                ApiError::from(e)
            }
        })?;

    info!(user_id = user.id, identifier = %user.identifier, "user registered");
    Ok(Json(UserResponse::from(user)))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), ApiError> {
    payload.identifier = payload.identifier.trim().to_string();

    // Unknown identifier and wrong password collapse into one failure so the
    // response never confirms whether an identifier is registered.
    let Some(user) = User::find_by_identifier(&state.db, &payload.identifier).await? else {
        warn!(identifier = %payload.identifier, "login with unknown identifier");
        return Err(ApiError::AuthFailure);
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = user.id, "login with wrong password");
        return Err(ApiError::AuthFailure);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user.identifier, user.role)?;
    let jar = jar.add(keys.session_cookie(&token, state.config.secure_cookies));

    info!(user_id = user.id, identifier = %user.identifier, "user logged in");
    Ok((
        jar,
        Json(TokenResponse {
            access_token: token,
            token_type: "bearer".into(),
            role: user.role,
            identifier: user.identifier,
        }),
    ))
}

/// Clears the session cookie. Stateless tokens have no server-side revocation,
/// so an already-issued token stays valid until it expires.
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    (
        jar.remove(removal_cookie()),
        Json(json!({ "message": "logged out" })),
    )
}

#[instrument(skip(user))]
pub async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}
