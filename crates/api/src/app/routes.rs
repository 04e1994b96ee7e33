//! Route handlers.
//!
//! Submission endpoints accept a typed payload, hand it to the submitter on
//! a blocking thread (the submitter is synchronous and may block on IO), and
//! return the assigned event id. The events listing is the operational
//! window into pipeline state.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use ledgerflow_core::EventType;
use ledgerflow_events::{
    DepositRequest, OpenAccountRequest, PaymentInstructionRequest, RegisterRequest,
};

use super::errors;
use super::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/open-account", post(open_account))
        .route("/deposit", post(deposit))
        .route("/payout", post(payout))
        .route("/events", get(list_events))
}

async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(request): Json<RegisterRequest>,
) -> Response {
    submit(services, RegisterRequest::EVENT_TYPE, request).await
}

async fn open_account(
    Extension(services): Extension<Arc<AppServices>>,
    Json(request): Json<OpenAccountRequest>,
) -> Response {
    submit(services, OpenAccountRequest::EVENT_TYPE, request).await
}

async fn deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Json(request): Json<DepositRequest>,
) -> Response {
    submit(services, DepositRequest::EVENT_TYPE, request).await
}

async fn payout(
    Extension(services): Extension<Arc<AppServices>>,
    Json(request): Json<PaymentInstructionRequest>,
) -> Response {
    submit(services, PaymentInstructionRequest::EVENT_TYPE, request).await
}

async fn submit<P: Serialize + Send + 'static>(
    services: Arc<AppServices>,
    event_type: EventType,
    payload: P,
) -> Response {
    let result =
        tokio::task::spawn_blocking(move || services.submit(event_type, &payload)).await;

    match result {
        Ok(Ok(event_id)) => Json(json!({ "eventId": event_id.to_string() })).into_response(),
        Ok(Err(e)) => errors::submit_error_to_response(&e),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            &format!("submission task failed: {e}"),
        ),
    }
}

async fn list_events(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let result = tokio::task::spawn_blocking(move || services.list_events()).await;

    match result {
        Ok(Ok(records)) => Json(records).into_response(),
        Ok(Err(e)) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "persistence_error",
            &e.to_string(),
        ),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            &format!("listing task failed: {e}"),
        ),
    }
}
