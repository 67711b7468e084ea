use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    app_state::AppState,
    domain::{RegistrationResult, SubscriptionDescriptor, ValidationError},
};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/subscribe", post(subscribe).delete(unsubscribe))
}

/// Register a push subscription. Responds 201 whether or not the endpoint was
/// already known; re-registration is a no-op by design.
#[instrument(name = "subscribe", skip(app_state, descriptor))]
async fn subscribe(
    State(app_state): State<AppState>,
    Json(descriptor): Json<SubscriptionDescriptor>,
) -> Result<(StatusCode, Json<RegistrationResult>), ValidationError> {
    let result = app_state.registrar.register(descriptor).await?;

    if result.already_registered {
        tracing::debug!("Subscription was already registered");
    } else {
        tracing::info!("Subscription added");
    }

    Ok((StatusCode::CREATED, Json(result)))
}

#[derive(Debug, Deserialize)]
struct UnsubscribeRequest {
    endpoint: String,
}

/// Drop a subscription by endpoint. 204 either way; removing an unknown
/// endpoint is not an error.
#[instrument(name = "unsubscribe", skip(app_state, body))]
async fn unsubscribe(
    State(app_state): State<AppState>,
    Json(body): Json<UnsubscribeRequest>,
) -> StatusCode {
    if app_state.registrar.unregister(&body.endpoint).await {
        tracing::info!("Subscription removed");
    }

    StatusCode::NO_CONTENT
}
