use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::jwt::{JwtKeys, ACCESS_TOKEN_COOKIE};
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Caller authenticated by the session token. Token validation resolves the
/// subject identifier to the stored user record.
pub struct AuthUser(pub User);

/// Optional caller for endpoints that also accept anonymous submissions. No
/// token means anonymous; a token that is present but invalid is rejected.
pub struct MaybeAuthUser(pub Option<User>);

/// Token from the `access_token` cookie, or the `Authorization` header for
/// non-browser clients.
fn bearer_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        let value = cookie.value();
        let token = value.strip_prefix("Bearer ").unwrap_or(value);
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

async fn resolve(state: &AppState, token: &str) -> Result<User, ApiError> {
    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify(token)?;
    User::find_by_identifier(&state.db, &claims.sub)
        .await?
        .ok_or(ApiError::AuthFailure)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::AuthFailure)?;
        Ok(AuthUser(resolve(state, &token).await?))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            None => Ok(MaybeAuthUser(None)),
            Some(token) => Ok(MaybeAuthUser(Some(resolve(state, &token).await?))),
        }
    }
}
