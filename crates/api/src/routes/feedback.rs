//! Customer feedback route.

use axum::{extract::State, Json};
use tracing::info;
use validator::Validate;

use domain::models::feedback::{CreateFeedbackRequest, CreateFeedbackResponse};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ClientInfo, JsonBody};

/// POST /api/feedback
///
/// Stores one submission together with the caller's user agent and IP.
pub async fn submit_feedback(
    State(state): State<AppState>,
    client: ClientInfo,
    JsonBody(request): JsonBody<CreateFeedbackRequest>,
) -> Result<Json<CreateFeedbackResponse>, ApiError> {
    request.validate()?;

    let entry = state
        .feedback
        .create(request.into_new_feedback(client.user_agent, client.ip))
        .await?;

    info!(
        feedback_id = %entry.id,
        feedback_type = %entry.feedback_type,
        "Feedback received"
    );

    Ok(Json(CreateFeedbackResponse {
        success: true,
        id: entry.id,
    }))
}
