//! AI completion proxy handler.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::error::{ApiJson, AppError, Result};
use crate::middleware::RequireAuth;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// `POST /api/ai/generate`
pub async fn generate(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<GenerateRequest>,
) -> Result<ApiResponse<GenerateResponse>> {
    let prompt = request
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Prompt is required".to_owned()))?;

    let client = state
        .completion()
        .ok_or_else(|| AppError::Unavailable("AI generation is not configured".to_owned()))?;

    tracing::info!(user_id = %user.id, prompt_len = prompt.len(), "generating completion");
    let response = client.generate(&prompt).await?;

    Ok(ApiResponse::ok("Response generated", GenerateResponse { response }))
}
