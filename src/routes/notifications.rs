use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    app_state::AppState,
    domain::{DispatchReport, PushNotification},
};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/send-notification", post(send_notification))
}

#[derive(Debug, Deserialize)]
struct SendNotificationRequest {
    message: Option<String>,
}

/// Broadcast one notification to every stored subscription. An empty or
/// missing message falls back to the configured default body. Partial
/// delivery failures only show up in the summary counts; the call itself
/// fails only when the transport is unusable as a whole.
#[instrument(name = "send_notification", skip(app_state, auth_header, body))]
async fn send_notification(
    State(app_state): State<AppState>,
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    Json(body): Json<SendNotificationRequest>,
) -> Result<Json<DispatchReport>, (StatusCode, String)> {
    if let Some(expected) = app_state.push.api_token.as_deref() {
        let provided = auth_header
            .as_ref()
            .map(|TypedHeader(Authorization(bearer))| bearer.token());
        if provided != Some(expected) {
            return Err((
                StatusCode::UNAUTHORIZED,
                "Missing or invalid API token".to_string(),
            ));
        }
    }

    let message = body
        .message
        .as_deref()
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .unwrap_or(&app_state.push.default_body);
    let notification = PushNotification::new(&app_state.push.default_title, message);

    let report = app_state
        .dispatcher
        .dispatch(&notification)
        .await
        .map_err(|e| {
            tracing::error!("Failed to dispatch notification: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to dispatch notification".to_string(),
            )
        })?;

    Ok(Json(report))
}
