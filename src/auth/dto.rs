use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::repo::{Role, User};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub identifier: String,
    pub password: String,
    pub full_name: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "student".into()
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Response returned after login. The same token also travels in the
/// `access_token` cookie.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub role: Role,
    pub identifier: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub identifier: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            identifier: u.identifier,
            full_name: u.full_name,
            role: u.role,
            created_at: u.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_response_never_carries_the_hash() {
        let user = User {
            id: 1,
            identifier: "12345".into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".into(),
            full_name: "Siti Rahma".into(),
            role: Role::Student,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert!(json.contains("\"role\":\"student\""));
    }

    #[test]
    fn register_request_defaults_to_student() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"identifier":"12345","password":"pass1","full_name":"Siti Rahma"}"#,
        )
        .unwrap();
        assert_eq!(req.role, "student");
    }
}
