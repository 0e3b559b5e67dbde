use tracing::info;

use crate::auth::repo::User;
use crate::classifier::Classifier;
use crate::error::ApiError;
use crate::state::AppState;
use crate::tickets::dto::CreateTicketRequest;
use crate::tickets::repo::{self, NewTicket, Ticket};

/// Display label for a ticket, derived from its id. Never persisted, always
/// recomputed, so the two can never diverge.
pub fn receipt_number(id: i64) -> String {
    format!("TCK-{id:05}")
}

/// Text handed to the classifier: the problem line, plus the description when
/// one was actually written.
pub fn classification_text(problem: &str, description: Option<&str>) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => format!("{problem}. {d}"),
        None => problem.to_string(),
    }
}

/// A caller-supplied category always wins; only when it is missing or blank
/// does the classifier get a say.
pub async fn resolve_category(
    classifier: &dyn Classifier,
    supplied: Option<String>,
    problem: &str,
    description: Option<&str>,
) -> Result<String, ApiError> {
    if let Some(category) = supplied.filter(|c| !c.trim().is_empty()) {
        return Ok(category);
    }
    let text = classification_text(problem, description);
    let prediction = classifier
        .predict(&text)
        .await
        .map_err(ApiError::Classifier)?;
    Ok(prediction.category)
}

/// Creates a ticket. The classifier runs before anything touches the
/// database, so a classifier failure aborts the create without a partial row.
pub async fn create_ticket(
    state: &AppState,
    requester: Option<&User>,
    input: CreateTicketRequest,
) -> Result<Ticket, ApiError> {
    let problem = input.problem.trim();
    if problem.is_empty() {
        return Err(ApiError::InvalidInput("problem must not be blank".into()));
    }

    let category = resolve_category(
        state.classifier.as_ref(),
        input.category,
        problem,
        input.description.as_deref(),
    )
    .await?;

    let ticket = repo::insert(
        &state.db,
        &NewTicket {
            name: input.name.as_deref(),
            organization: input.organization.as_deref(),
            filed_date: input.filed_date.as_deref(),
            problem,
            description: input.description.as_deref(),
            category: &category,
            owner_id: requester.map(|u| u.id),
        },
    )
    .await?;

    info!(
        ticket_id = ticket.id,
        category = %category,
        owner_id = ?ticket.owner_id,
        "ticket created"
    );
    Ok(ticket)
}

pub async fn update_category(
    db: &sqlx::PgPool,
    id: i64,
    category: &str,
) -> Result<Ticket, ApiError> {
    let ticket = repo::update_category(db, id, category)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(ticket_id = id, category, "ticket category updated");
    Ok(ticket)
}

pub async fn update_status(db: &sqlx::PgPool, id: i64, status: &str) -> Result<Ticket, ApiError> {
    let ticket = repo::update_status(db, id, status)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(ticket_id = id, status, "ticket status updated");
    Ok(ticket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Prediction;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingClassifier {
        calls: AtomicUsize,
        label: &'static str,
    }

    impl CountingClassifier {
        fn new(label: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                label,
            }
        }
    }

    #[async_trait]
    impl Classifier for CountingClassifier {
        async fn predict(&self, _text: &str) -> anyhow::Result<Prediction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Prediction {
                category: self.label.into(),
                scores: Default::default(),
            })
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl Classifier for FailingClassifier {
        async fn predict(&self, _text: &str) -> anyhow::Result<Prediction> {
            anyhow::bail!("model backend unreachable")
        }
    }

    #[test]
    fn receipt_number_is_zero_padded() {
        assert_eq!(receipt_number(1), "TCK-00001");
        assert_eq!(receipt_number(23), "TCK-00023");
        assert_eq!(receipt_number(99999), "TCK-99999");
        assert_eq!(receipt_number(123456), "TCK-123456");
    }

    #[test]
    fn classification_text_appends_description() {
        assert_eq!(
            classification_text("Wifi lambat", Some("di lantai 3")),
            "Wifi lambat. di lantai 3"
        );
    }

    #[test]
    fn classification_text_skips_blank_description() {
        assert_eq!(classification_text("Wifi lambat", None), "Wifi lambat");
        assert_eq!(classification_text("Wifi lambat", Some("")), "Wifi lambat");
        assert_eq!(classification_text("Wifi lambat", Some("  ")), "Wifi lambat");
    }

    #[tokio::test]
    async fn supplied_category_never_calls_the_classifier() {
        let classifier = CountingClassifier::new("Jaringan");
        let category = resolve_category(
            &classifier,
            Some("Akun".into()),
            "Wifi lambat",
            None,
        )
        .await
        .expect("resolve");
        assert_eq!(category, "Akun");
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_category_is_classified() {
        let classifier = CountingClassifier::new("Jaringan");
        let category = resolve_category(&classifier, None, "Wifi lambat", Some(""))
            .await
            .expect("resolve");
        assert_eq!(category, "Jaringan");
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_category_is_classified() {
        let classifier = CountingClassifier::new("Jaringan");
        let category = resolve_category(&classifier, Some("  ".into()), "Wifi lambat", None)
            .await
            .expect("resolve");
        assert_eq!(category, "Jaringan");
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn classifier_failure_is_retryable() {
        let err = resolve_category(&FailingClassifier, None, "Wifi lambat", None)
            .await
            .expect_err("should fail");
        assert!(matches!(err, ApiError::Classifier(_)));
    }
}
