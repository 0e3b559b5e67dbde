use axum::extract::FromRef;
use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::auth::repo::Role;
use crate::config::JwtConfig;
use crate::state::AppState;

/// Name of the session cookie. Its value is `Bearer <jwt>`.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Session token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // institutional identifier
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

/// Holds JWT signing and verification keys with config data.
///
/// Tokens are stateless: a valid signature plus an unexpired timestamp is the
/// whole proof. There is no revocation list, so logout cannot invalidate a
/// token that is already out; it stays usable until its ttl elapses.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: TimeDuration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: TimeDuration::minutes(ttl_minutes),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, identifier: &str, role: Role) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + self.ttl;
        let claims = Claims {
            sub: identifier.to_string(),
            role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(identifier, role = role.as_str(), "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?;
        debug!(identifier = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }

    /// Session cookie carrying the signed token; cookie lifetime matches the
    /// token ttl.
    pub fn session_cookie(&self, token: &str, secure: bool) -> Cookie<'static> {
        Cookie::build((ACCESS_TOKEN_COOKIE, format!("Bearer {token}")))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure)
            .max_age(self.ttl)
            .build()
    }
}

/// Cookie shape used to clear the session on logout.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, ttl_minutes: i64) -> JwtKeys {
        JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl: TimeDuration::minutes(ttl_minutes),
        }
    }

    #[test]
    fn sign_and_verify_roundtrip_preserves_claims() {
        let keys = make_keys("dev-secret", 5);
        let token = keys.sign("12345", Role::Student).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, "12345");
        assert_eq!(claims.role, Role::Student);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = make_keys("dev-secret", -2);
        let token = keys.sign("12345", Role::Staff).expect("sign");
        assert_eq!(keys.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let good = make_keys("secret-a", 5);
        let bad = make_keys("secret-b", 5);
        let token = good.sign("12345", Role::Admin).expect("sign");
        assert_eq!(bad.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let keys = make_keys("dev-secret", 5);
        assert_eq!(keys.verify("not-a-token"), Err(TokenError::Malformed));
    }

    #[test]
    fn session_cookie_flags() {
        let keys = make_keys("dev-secret", 5);
        let token = keys.sign("12345", Role::Student).expect("sign");
        let cookie = keys.session_cookie(&token, false);
        assert_eq!(cookie.name(), ACCESS_TOKEN_COOKIE);
        assert!(cookie.value().starts_with("Bearer "));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.max_age(), Some(TimeDuration::minutes(5)));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn secure_flag_follows_config() {
        let keys = make_keys("dev-secret", 5);
        let token = keys.sign("12345", Role::Student).expect("sign");
        assert_eq!(keys.session_cookie(&token, true).secure(), Some(true));
    }
}
