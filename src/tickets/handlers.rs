use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::auth::extractors::{AuthUser, MaybeAuthUser};
use crate::classifier::Prediction;
use crate::error::ApiError;
use crate::state::AppState;
use crate::tickets::access;
use crate::tickets::dto::{
    CreateTicketRequest, Pagination, PredictRequest, TicketResponse, UpdateCategoryRequest,
    UpdateStatusRequest,
};
use crate::tickets::service;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", get(list_tickets))
        .route("/tickets/:id", get(get_ticket))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", post(create_ticket))
        .route("/tickets/:id/category", put(update_category))
        .route("/tickets/:id/status", put(update_status))
        .route("/predict", post(predict))
}

#[instrument(skip(state, requester, payload))]
pub async fn create_ticket(
    State(state): State<AppState>,
    MaybeAuthUser(requester): MaybeAuthUser,
    Json(payload): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    let ticket = service::create_ticket(&state, requester.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(TicketResponse::from(ticket))))
}

#[instrument(skip(state, requester))]
pub async fn list_tickets(
    State(state): State<AppState>,
    MaybeAuthUser(requester): MaybeAuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<TicketResponse>>, ApiError> {
    let tickets = access::list_tickets(&state.db, requester.as_ref(), p.limit, p.offset).await?;
    Ok(Json(tickets.into_iter().map(TicketResponse::from).collect()))
}

#[instrument(skip(state, requester))]
pub async fn get_ticket(
    State(state): State<AppState>,
    MaybeAuthUser(requester): MaybeAuthUser,
    Path(id): Path<i64>,
) -> Result<Json<TicketResponse>, ApiError> {
    let ticket = access::get_ticket(&state.db, requester.as_ref(), id).await?;
    Ok(Json(TicketResponse::from(ticket)))
}

/// Not ownership-scoped: meant for the staff triage screen. Which roles may
/// call this is still an open product decision, so for now any authenticated
/// caller can.
#[instrument(skip(state, _auth, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<TicketResponse>, ApiError> {
    let ticket = service::update_category(&state.db, id, &payload.category).await?;
    Ok(Json(TicketResponse::from(ticket)))
}

/// Same access posture as `update_category`.
#[instrument(skip(state, _auth, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<TicketResponse>, ApiError> {
    let ticket = service::update_status(&state.db, id, &payload.status).await?;
    Ok(Json(TicketResponse::from(ticket)))
}

/// Direct pass-through to the classifier, used by the intake form preview.
#[instrument(skip(state, payload))]
pub async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<PredictRequest>,
) -> Result<Json<Prediction>, ApiError> {
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(ApiError::InvalidInput("text is empty".into()));
    }
    let prediction = state
        .classifier
        .predict(text)
        .await
        .map_err(ApiError::Classifier)?;
    Ok(Json(prediction))
}
