use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::tickets::repo::Ticket;
use crate::tickets::service::receipt_number;

/// Request body for ticket creation. Everything except `problem` is optional;
/// an omitted `category` is filled in by the classifier.
#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub filed_date: Option<String>,
    pub problem: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: i64,
    pub receipt_number: String,
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

impl From<Ticket> for TicketResponse {
    fn from(t: Ticket) -> Self {
        Self {
            id: t.id,
            receipt_number: receipt_number(t.id),
            name: t.name,
            organization: t.organization,
            filed_date: t.filed_date,
            problem: t.problem,
            description: t.description,
            category: t.category,
            status: t.status,
            owner_id: t.owner_id,
            created_at: t.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickets::repo::INITIAL_STATUS;

    fn sample_ticket(id: i64) -> Ticket {
        Ticket {
            id,
            name: Some("Budi".into()),
            organization: None,
            filed_date: None,
            problem: "Wifi lambat".into(),
            description: Some("".into()),
            category: Some("Jaringan".into()),
            status: INITIAL_STATUS.into(),
            owner_id: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn response_derives_receipt_number() {
        let resp = TicketResponse::from(sample_ticket(1));
        assert_eq!(resp.receipt_number, "TCK-00001");

        let resp = TicketResponse::from(sample_ticket(23));
        assert_eq!(resp.receipt_number, "TCK-00023");
    }

    #[test]
    fn pagination_defaults() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.limit, 100);
        assert_eq!(p.offset, 0);
    }
}
