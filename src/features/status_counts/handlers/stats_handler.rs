use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::status_counts::dtos::StatusCountResponseDto;
use crate::features::status_counts::services::StatusCounter;
use crate::shared::types::{ApiResponse, Meta};

/// Get the caller's equipment counts per status
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Status counts of the caller", body = ApiResponse<Vec<StatusCountResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "stats",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_stats(
    user: AuthenticatedUser,
    State(counter): State<Arc<StatusCounter>>,
) -> Result<Json<ApiResponse<Vec<StatusCountResponseDto>>>> {
    let counts = counter.list_for_owner(&user.sub).await?;
    let total = counts.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(counts),
        None,
        Some(Meta { total }),
    )))
}
