//! Report and signup ingestion handlers.

use axum::{body::Bytes, extract::State, Json};
use tracing::{debug, error};

use ledger_core::{ClientProfile, Error, SessionReport};

use crate::response::{ApiError, SignupResponse, SyncResponse};
use crate::state::AppState;

/// POST /api/sync-session - Primary telemetry ingestion endpoint.
///
/// Accepts one session report per request; the bot fleet sends one at
/// login, periodically while trading, and once at logout. Returns 201 when
/// the report opened a new ledger row, 200 when it refreshed a known one.
pub async fn sync_session_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(axum::http::StatusCode, Json<SyncResponse>), ApiError> {
    let report = SessionReport::parse(&body).map_err(|e| {
        debug!("Rejected session report: {}", e);
        ApiError::from(e)
    })?;

    debug!(
        client_id = %report.client_id,
        login_time = %report.login_time,
        is_login = report.is_login(),
        "Received session report"
    );

    let outcome = state.reconciler.reconcile(report).await.map_err(|e| {
        if matches!(e, Error::Persistence { .. }) {
            error!("Failed to reconcile session report: {}", e);
        }
        ApiError::from(e)
    })?;

    let response = SyncResponse::from_outcome(outcome);
    Ok((response.http_status(), Json(response)))
}

/// POST /api/sync-signup - Client registry sync.
pub async fn sync_signup_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SignupResponse>, ApiError> {
    let profile: ClientProfile = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("invalid signup payload: {}", e)))?;

    let client_id = profile.client_id.clone();
    state.reconciler.sync_client(profile).await?;

    Ok(Json(SignupResponse {
        status: "success".to_string(),
        client_id,
    }))
}
