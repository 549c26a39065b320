//! Session timeline query handler.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::error;

use reconciler::DayView;

use crate::response::ApiError;
use crate::state::AppState;

/// GET /api/session-details/{client_id}/{date} - Day timeline query.
///
/// `date` accepts ISO `YYYY-MM-DD` or display `DD-Mon-YYYY`. An unparsable
/// date returns an empty view with HTTP 200, not an error; a broken
/// dashboard link should render an empty table, not a failure page.
pub async fn session_details_handler(
    State(state): State<AppState>,
    Path((client_id, date)): Path<(String, String)>,
) -> Result<Json<DayView>, ApiError> {
    let view = state
        .timeline
        .day_view(&client_id, &date)
        .await
        .map_err(|e| {
            error!(client_id = %client_id, "Timeline query failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(view))
}
