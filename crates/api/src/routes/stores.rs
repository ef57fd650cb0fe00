//! Store handlers. All of them require a bearer token.

use axum::extract::State;

use crate::error::{ApiJson, ApiPath, Result};
use crate::middleware::RequireAuth;
use crate::models::Store;
use crate::response::{ApiResponse, Created};
use crate::services::stores::{CreateStoreRequest, StorePatch, StoreService};
use crate::state::AppState;

/// `POST /api/stores`
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<CreateStoreRequest>,
) -> Result<Created<Store>> {
    let store = StoreService::new(state.stores())
        .create(&user, request)
        .await?;

    Ok(Created(ApiResponse::ok("Store created", store)))
}

/// `PUT /api/stores/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<StorePatch>,
) -> Result<ApiResponse<Store>> {
    let store = StoreService::new(state.stores())
        .update(&user, &id, patch)
        .await?;

    Ok(ApiResponse::ok("Store updated", store))
}

/// `DELETE /api/stores/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<String>,
) -> Result<ApiResponse<()>> {
    StoreService::new(state.stores())
        .delete(&user, &id)
        .await?;

    Ok(ApiResponse::message("Store deleted"))
}
