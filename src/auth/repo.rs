use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Closed set of user roles. Parsed from text once at the boundary; everything
/// past the boundary carries the typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Student,
    Staff,
    Admin,
}

impl Role {
    /// The intake frontend predates the English role names, so the original
    /// Indonesian spellings are still accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" | "mahasiswa" => Some(Self::Student),
            "staff" | "staf" => Some(Self::Staff),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub identifier: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Find a user by institutional identifier.
    pub async fn find_by_identifier(
        db: &PgPool,
        identifier: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, identifier, password_hash, full_name, role, created_at
            FROM users
            WHERE identifier = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(db)
        .await
    }

    /// Create a new user with an already-hashed password.
    pub async fn create(
        db: &PgPool,
        identifier: &str,
        password_hash: &str,
        full_name: &str,
        role: Role,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (identifier, password_hash, full_name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, identifier, password_hash, full_name, role, created_at
            "#,
        )
        .bind(identifier)
        .bind(password_hash)
        .bind(full_name)
        .bind(role)
        .fetch_one(db)
        .await
    }
}

/// Postgres unique-constraint violation, used to catch the register race
/// between the duplicate pre-check and the insert.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|d| d.code())
        .is_some_and(|code| code.as_ref() == "23505")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_english_role_names() {
        assert_eq!(Role::parse("student"), Some(Role::Student));
        assert_eq!(Role::parse("staff"), Some(Role::Staff));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
    }

    #[test]
    fn parses_legacy_role_names() {
        assert_eq!(Role::parse("mahasiswa"), Some(Role::Student));
        assert_eq!(Role::parse("staf"), Some(Role::Staff));
    }

    #[test]
    fn rejects_unknown_roles() {
        assert_eq!(Role::parse("dosen"), None);
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("Admin"), None);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Student).unwrap(), "\"student\"");
        assert_eq!(Role::Staff.as_str(), "staff");
    }
}
