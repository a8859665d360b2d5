// HTTP request handlers for the StakeChain API

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::MutexGuard;
use thiserror::Error;

use crate::app_state::{AppState, SharedState};
use crate::errors::LedgerError;
use crate::ledger::{EventId, Settlement};
use crate::models::*;

/// Header carrying the calling account. Authenticating it is the job of the
/// gateway in front of this service.
pub const CALLER_HEADER: &str = "x-stakechain-account";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Missing or empty x-stakechain-account header")]
    MissingCaller,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Ledger(err) => (ledger_status(err), err.code()),
            ApiError::MissingCaller => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(json!({
            "error": code,
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}

fn ledger_status(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::InvalidOptions { .. }
        | LedgerError::InvalidOutcome { .. }
        | LedgerError::InsufficientAmount => StatusCode::BAD_REQUEST,
        LedgerError::EventClosed { .. } | LedgerError::AlreadySettled { .. } => StatusCode::CONFLICT,
        LedgerError::TransferFailure { .. } => StatusCode::BAD_GATEWAY,
        LedgerError::Overflow => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn caller(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::MissingCaller)
}

fn lock(state: &SharedState) -> Result<MutexGuard<'_, AppState>, ApiError> {
    state
        .lock()
        .map_err(|_| ApiError::Internal("ledger lock poisoned".to_string()))
}

pub async fn health_check() -> &'static str {
    "StakeChain ledger - online"
}

// ===== EVENTS =====

pub async fn create_event(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<CreateEventResponse>), ApiError> {
    let caller = caller(&headers)?;
    let mut app = lock(&state)?;
    let event_id = app.ledger.create_event(
        &caller,
        request.title,
        request.description,
        request.options,
    )?;
    Ok((StatusCode::CREATED, Json(CreateEventResponse { event_id })))
}

pub async fn get_event(
    State(state): State<SharedState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<EventResponse>, ApiError> {
    let app = lock(&state)?;
    let event = app.ledger.get_event(event_id)?.clone();
    Ok(Json(EventResponse {
        held_total: app.ledger.held_total(event_id),
        event,
    }))
}

pub async fn get_bets(
    State(state): State<SharedState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<BetsResponse>, ApiError> {
    let app = lock(&state)?;
    let bets = app
        .ledger
        .bets_for_event(event_id)?
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(BetsResponse { event_id, bets }))
}

// ===== BETTING =====

pub async fn place_bet(
    State(state): State<SharedState>,
    Path(event_id): Path<EventId>,
    headers: HeaderMap,
    Json(request): Json<PlaceBetRequest>,
) -> Result<(StatusCode, Json<PlaceBetResponse>), ApiError> {
    let caller = caller(&headers)?;
    let mut app = lock(&state)?;
    let AppState { ledger, funds } = &mut *app;
    let bet_id = ledger.place_bet(&caller, event_id, request.outcome_index, request.amount, funds)?;
    Ok((
        StatusCode::CREATED,
        Json(PlaceBetResponse {
            bet_id,
            event_id,
            held_total: ledger.held_total(event_id),
        }),
    ))
}

// ===== SETTLEMENT & CLAIMS =====

pub async fn settle(
    State(state): State<SharedState>,
    Path(event_id): Path<EventId>,
    headers: HeaderMap,
    Json(request): Json<SettleRequest>,
) -> Result<Json<Settlement>, ApiError> {
    let caller = caller(&headers)?;
    let mut app = lock(&state)?;
    let settlement = app
        .ledger
        .settle(&caller, event_id, request.winning_outcome)?
        .clone();
    Ok(Json(settlement))
}

pub async fn get_settlement(
    State(state): State<SharedState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<Settlement>, ApiError> {
    let app = lock(&state)?;
    Ok(Json(app.ledger.get_settlement(event_id)?.clone()))
}

pub async fn claim(
    State(state): State<SharedState>,
    Path(event_id): Path<EventId>,
    headers: HeaderMap,
) -> Result<Json<ClaimResponse>, ApiError> {
    let caller = caller(&headers)?;
    let mut app = lock(&state)?;
    let AppState { ledger, funds } = &mut *app;
    let amount = ledger.claim(&caller, event_id, funds)?;
    Ok(Json(ClaimResponse {
        event_id,
        account: caller,
        amount,
    }))
}

pub async fn get_claimable(
    State(state): State<SharedState>,
    Path((event_id, account)): Path<(EventId, String)>,
) -> Result<Json<ClaimableResponse>, ApiError> {
    let app = lock(&state)?;
    app.ledger.get_event(event_id)?;
    Ok(Json(ClaimableResponse {
        event_id,
        claimable: app.ledger.claimable(event_id, &account),
        account,
    }))
}

// ===== ACCESS CONTROL =====

fn access_policy(app: &AppState) -> OwnerResponse {
    OwnerResponse {
        owner: app.ledger.owner().to_string(),
        resolver: app.ledger.resolver().map(str::to_string),
        creation_restricted: app.ledger.creation_restricted(),
    }
}

pub async fn get_owner(State(state): State<SharedState>) -> Result<Json<OwnerResponse>, ApiError> {
    let app = lock(&state)?;
    Ok(Json(access_policy(&app)))
}

pub async fn transfer_ownership(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<TransferOwnershipRequest>,
) -> Result<Json<OwnerResponse>, ApiError> {
    let caller = caller(&headers)?;
    if request.new_owner.trim().is_empty() {
        return Err(ApiError::BadRequest("new_owner must not be empty".to_string()));
    }
    let mut app = lock(&state)?;
    app.ledger.transfer_ownership(&caller, &request.new_owner)?;
    Ok(Json(access_policy(&app)))
}

pub async fn set_resolver(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<ResolverRequest>,
) -> Result<Json<OwnerResponse>, ApiError> {
    let caller = caller(&headers)?;
    let mut app = lock(&state)?;
    app.ledger.set_resolver(&caller, request.resolver)?;
    Ok(Json(access_policy(&app)))
}

pub async fn set_creation_policy(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<CreationPolicyRequest>,
) -> Result<Json<OwnerResponse>, ApiError> {
    let caller = caller(&headers)?;
    let mut app = lock(&state)?;
    app.ledger.set_creation_restricted(&caller, request.restricted)?;
    Ok(Json(access_policy(&app)))
}

// ===== FEED & AUDIT =====

pub async fn get_notifications(
    State(state): State<SharedState>,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let app = lock(&state)?;
    Ok(Json(NotificationsResponse {
        last_seq: app.ledger.last_seq(),
        notifications: app
            .ledger
            .notifications_since(query.after.unwrap_or(0))
            .to_vec(),
    }))
}

pub async fn prune_notifications(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<PruneQuery>,
) -> Result<Json<PruneResponse>, ApiError> {
    let caller = caller(&headers)?;
    let mut app = lock(&state)?;
    let dropped = app.ledger.prune_notifications(&caller, query.through)?;
    Ok(Json(PruneResponse {
        dropped,
        last_seq: app.ledger.last_seq(),
    }))
}

pub async fn audit(State(state): State<SharedState>) -> Result<Json<AuditResponse>, ApiError> {
    let app = lock(&state)?;
    let state_digest = app
        .ledger
        .state_digest()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let violation = app.ledger.audit().err().map(|v| v.to_string());
    Ok(Json(AuditResponse {
        healthy: violation.is_none(),
        violation,
        state_digest,
    }))
}

// ===== FUNDS =====

/// Credit an account in the in-memory gateway. Owner-only: this mints funds.
pub async fn deposit(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<DepositRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let caller = caller(&headers)?;
    if request.account.trim().is_empty() || request.amount == 0 {
        return Err(ApiError::BadRequest(
            "deposit needs an account and a positive amount".to_string(),
        ));
    }
    let mut app = lock(&state)?;
    app.ledger.require_owner(&caller)?;
    let balance = app
        .funds
        .deposit(&request.account, request.amount)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    tracing::info!(account = %request.account, amount = request.amount, balance, "funds deposited");
    Ok(Json(BalanceResponse {
        account: request.account,
        balance,
    }))
}

pub async fn get_balance(
    State(state): State<SharedState>,
    Path(account): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let app = lock(&state)?;
    Ok(Json(BalanceResponse {
        balance: app.funds.balance(&account),
        account,
    }))
}
