use sqlx::PgPool;

use crate::auth::repo::{Role, User};
use crate::error::ApiError;
use crate::tickets::repo::{self, Ticket};

/// Whether `requester` may see `ticket`. Admins see everything, everyone else
/// only what they own. Anonymous callers own nothing, including tickets that
/// were themselves filed anonymously.
pub fn can_view(requester: Option<&User>, ticket: &Ticket) -> bool {
    match requester {
        Some(u) if u.role == Role::Admin => true,
        Some(u) => ticket.owner_id == Some(u.id),
        None => false,
    }
}

/// Listing scoped by role and ownership, newest first.
pub async fn list_tickets(
    db: &PgPool,
    requester: Option<&User>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Ticket>, ApiError> {
    let tickets = match requester {
        Some(u) if u.role == Role::Admin => repo::list_all(db, limit, offset).await?,
        Some(u) => repo::list_by_owner(db, u.id, limit, offset).await?,
        None => Vec::new(),
    };
    Ok(tickets)
}

/// Scoped single-ticket fetch. A ticket the requester may not see yields the
/// same `NotFound` as a missing id, so probing ids reveals nothing about
/// other users' tickets.
pub async fn get_ticket(
    db: &PgPool,
    requester: Option<&User>,
    id: i64,
) -> Result<Ticket, ApiError> {
    let ticket = repo::find(db, id).await?.ok_or(ApiError::NotFound)?;
    if !can_view(requester, &ticket) {
        return Err(ApiError::NotFound);
    }
    Ok(ticket)
}
