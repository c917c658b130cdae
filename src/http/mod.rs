//! HTTP API for triage-desk.
//!
//! Three endpoints, each a single stateless request/response cycle:
//! - `POST /tickets` — validate, classify, persist, return the ticket.
//! - `GET /tickets` — every ticket, ascending by id.
//! - `PATCH /tickets/:id/resolve` — the one OPEN -> RESOLVED transition.
//!
//! Client input errors and domain conflicts are reported at the boundary
//! with structured JSON bodies; storage failures are the single catch-all
//! path to a 500 body carrying the error text.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{patch, post},
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument, warn};

use crate::{base::types::TicketStatus, runtime::Runtime};

/// Build the application router.
pub fn router(runtime: Runtime) -> Router {
    Router::new()
        .route("/tickets", post(create_ticket).get(list_tickets))
        .route("/tickets/:id/resolve", patch(resolve_ticket))
        .with_state(runtime)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// Handlers.

/// `POST /tickets`: validate the body, classify the message, persist.
#[instrument(skip_all)]
async fn create_ticket(State(runtime): State<Runtime>, body: Result<Json<Value>, JsonRejection>) -> Response {
    // An absent or malformed body never reaches the classifier or the store.
    let Ok(Json(body)) = body else {
        return error_response(StatusCode::BAD_REQUEST, json!({ "error": "Invalid JSON format" }));
    };

    // Shape validation, with per-field details.
    let details = shape_errors(&body);
    if !details.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, json!({ "error": "Validation Failed", "details": details }));
    }

    // Shape is valid, so the field is present and a string.
    let customer_message = body["customer_message"].as_str().unwrap_or_default();

    // Content validation: a whitespace-only message is rejected before any
    // external call.
    if customer_message.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, json!({ "error": "Message cannot be empty string" }));
    }

    // The classifier cannot fail observably; it always yields a decision.
    let decision = runtime.classifier.classify(customer_message).await;

    // Persist the original, untrimmed message.
    match runtime.store.insert(customer_message, &decision).await {
        Ok(ticket) => {
            info!("Created ticket {}.", ticket.id);
            (StatusCode::CREATED, Json(ticket)).into_response()
        }
        Err(err) => internal_error(err),
    }
}

/// `GET /tickets`: every ticket, ascending by id, `[]` when empty.
#[instrument(skip_all)]
async fn list_tickets(State(runtime): State<Runtime>) -> Response {
    match runtime.store.list_all().await {
        Ok(tickets) => (StatusCode::OK, Json(tickets)).into_response(),
        Err(err) => internal_error(err),
    }
}

/// `PATCH /tickets/:id/resolve`: the single forward status transition.
///
/// The transition guard lives here, not in the store: resolving an already
/// resolved ticket is rejected, never silently re-applied.
#[instrument(skip_all)]
async fn resolve_ticket(State(runtime): State<Runtime>, Path(id): Path<i64>) -> Response {
    let ticket = match runtime.store.get(id).await {
        Ok(Some(ticket)) => ticket,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, json!({ "error": "Ticket not found" })),
        Err(err) => return internal_error(err),
    };

    if ticket.status == TicketStatus::Resolved {
        return error_response(StatusCode::BAD_REQUEST, json!({ "error": "Ticket is already resolved" }));
    }

    match runtime.store.update_status(id, TicketStatus::Resolved).await {
        Ok(updated) => {
            info!("Resolved ticket {id}.");
            (StatusCode::OK, Json(json!({ "message": "Ticket resolved successfully", "ticket": updated }))).into_response()
        }
        Err(err) => internal_error(err),
    }
}

// Helpers.

/// Collect per-field shape errors for the create-ticket body.
fn shape_errors(body: &Value) -> Vec<Value> {
    let mut details = Vec::new();

    match body.get("customer_message") {
        None => details.push(json!({ "field": "customer_message", "message": "field required" })),
        Some(value) if !value.is_string() => {
            details.push(json!({ "field": "customer_message", "message": "expected a string" }));
        }
        Some(_) => {}
    }

    details
}

fn error_response(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

/// The catch-all path for storage failures. The error text ends up in the
/// response body; acceptable for an internal tool.
fn internal_error(err: crate::base::types::Err) -> Response {
    warn!("Request failed with internal error: {err}");

    error_response(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error", "message": err.to_string() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_errors_missing_field() {
        let details = shape_errors(&json!({}));

        assert_eq!(details.len(), 1);
        assert_eq!(details[0]["field"], "customer_message");
        assert_eq!(details[0]["message"], "field required");
    }

    #[test]
    fn test_shape_errors_wrong_type() {
        let details = shape_errors(&json!({ "customer_message": 42 }));

        assert_eq!(details.len(), 1);
        assert_eq!(details[0]["message"], "expected a string");
    }

    #[test]
    fn test_shape_errors_valid_body() {
        assert!(shape_errors(&json!({ "customer_message": "help" })).is_empty());
    }
}
