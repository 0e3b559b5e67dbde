use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Status every ticket starts in. Later values are free-form text.
pub const INITIAL_STATUS: &str = "Submitted";

/// Ticket record in the database. The receipt number is derived from `id` on
/// the way out and never stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: i64,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub filed_date: Option<String>,
    pub problem: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: String,
    pub owner_id: Option<i64>,
    pub created_at: OffsetDateTime,
}

pub struct NewTicket<'a> {
    pub name: Option<&'a str>,
    pub organization: Option<&'a str>,
    pub filed_date: Option<&'a str>,
    pub problem: &'a str,
    pub description: Option<&'a str>,
    pub category: &'a str,
    pub owner_id: Option<i64>,
}

pub async fn insert(db: &PgPool, new: &NewTicket<'_>) -> Result<Ticket, sqlx::Error> {
    sqlx::query_as::<_, Ticket>(
        r#"
        INSERT INTO tickets (name, organization, filed_date, problem, description, category, status, owner_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, name, organization, filed_date, problem, description, category, status, owner_id, created_at
        "#,
    )
    .bind(new.name)
    .bind(new.organization)
    .bind(new.filed_date)
    .bind(new.problem)
    .bind(new.description)
    .bind(new.category)
    .bind(INITIAL_STATUS)
    .bind(new.owner_id)
    .fetch_one(db)
    .await
}

pub async fn find(db: &PgPool, id: i64) -> Result<Option<Ticket>, sqlx::Error> {
    sqlx::query_as::<_, Ticket>(
        r#"
        SELECT id, name, organization, filed_date, problem, description, category, status, owner_id, created_at
        FROM tickets
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn list_all(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<Ticket>, sqlx::Error> {
    sqlx::query_as::<_, Ticket>(
        r#"
        SELECT id, name, organization, filed_date, problem, description, category, status, owner_id, created_at
        FROM tickets
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

pub async fn list_by_owner(
    db: &PgPool,
    owner_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<Ticket>, sqlx::Error> {
    sqlx::query_as::<_, Ticket>(
        r#"
        SELECT id, name, organization, filed_date, problem, description, category, status, owner_id, created_at
        FROM tickets
        WHERE owner_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(owner_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

/// Unconditional overwrite; `None` when the id does not exist.
pub async fn update_category(
    db: &PgPool,
    id: i64,
    category: &str,
) -> Result<Option<Ticket>, sqlx::Error> {
    sqlx::query_as::<_, Ticket>(
        r#"
        UPDATE tickets SET category = $2
        WHERE id = $1
        RETURNING id, name, organization, filed_date, problem, description, category, status, owner_id, created_at
        "#,
    )
    .bind(id)
    .bind(category)
    .fetch_optional(db)
    .await
}

/// Unconditional overwrite; `None` when the id does not exist. Any status
/// string is accepted, matching the intake workflow's loose state machine.
pub async fn update_status(
    db: &PgPool,
    id: i64,
    status: &str,
) -> Result<Option<Ticket>, sqlx::Error> {
    sqlx::query_as::<_, Ticket>(
        r#"
        UPDATE tickets SET status = $2
        WHERE id = $1
        RETURNING id, name, organization, filed_date, problem, description, category, status, owner_id, created_at
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(db)
    .await
}
