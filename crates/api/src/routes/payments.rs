//! Payment intent proxy handlers.

use axum::extract::State;

use crate::error::{ApiJson, ApiPath, AppError, Result};
use crate::middleware::RequireAuth;
use crate::response::{ApiResponse, Created};
use crate::services::payments::{CreateIntentRequest, PaymentClient, PaymentIntent};
use crate::state::AppState;

fn client(state: &AppState) -> Result<&PaymentClient> {
    state
        .payments()
        .ok_or_else(|| AppError::Unavailable("Payments are not configured".to_owned()))
}

/// `POST /api/payments/intents`
pub async fn create_intent(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<CreateIntentRequest>,
) -> Result<Created<PaymentIntent>> {
    let intent = request.validate()?;
    let created = client(&state)?.create_intent(&intent).await?;

    tracing::info!(user_id = %user.id, intent_id = %created.id, "payment intent created");
    Ok(Created(ApiResponse::ok("Payment intent created", created)))
}

/// `POST /api/payments/intents/{id}/confirm`
pub async fn confirm_intent(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<String>,
) -> Result<ApiResponse<PaymentIntent>> {
    let confirmed = client(&state)?.confirm_intent(&id).await?;

    tracing::info!(user_id = %user.id, intent_id = %confirmed.id, status = %confirmed.status, "payment intent confirmed");
    Ok(ApiResponse::ok("Payment intent confirmed", confirmed))
}
