use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::equipment::handlers::parse_equipment_id;
use crate::features::equipment::EquipmentService;
use crate::features::file_history::dtos::{FileHistoryResponseDto, NotificationSummaryDto};
use crate::features::file_history::models::StorageEventNotification;
use crate::features::file_history::services::HistoryRecorder;
use crate::shared::types::{ApiResponse, Meta};

/// State for the history route, which needs both the recorder and an ownership check
#[derive(Clone)]
pub struct FileHistoryState {
    pub recorder: Arc<HistoryRecorder>,
    pub equipment: Arc<EquipmentService>,
}

/// Get the attachment upload and delete history of one of the caller's items
#[utoipa::path(
    get,
    path = "/api/equipment/{equipment_id}/history",
    params(
        ("equipment_id" = String, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Attachment history", body = ApiResponse<Vec<FileHistoryResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Equipment not owned by the caller")
    ),
    tag = "equipment",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_file_history(
    user: AuthenticatedUser,
    State(state): State<FileHistoryState>,
    Path(equipment_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<FileHistoryResponseDto>>>> {
    let equipment_id = parse_equipment_id(&equipment_id)?;

    if state.equipment.find(&user.sub, equipment_id).await?.is_none() {
        return Err(AppError::NotFound(
            "Equipment file history not returned. Equipment is not owned by user.".to_string(),
        ));
    }

    let events = state.recorder.list(&equipment_id.to_string()).await?;
    let total = events.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(events),
        None,
        Some(Meta { total }),
    )))
}

/// Receive bucket event notifications from the object store
#[utoipa::path(
    post,
    path = "/api/storage/events",
    request_body = StorageEventNotification,
    responses(
        (status = 200, description = "Notification processed", body = ApiResponse<NotificationSummaryDto>),
        (status = 401, description = "Invalid notification token")
    ),
    tag = "storage",
    security(
        ("webhook_token" = [])
    )
)]
pub async fn receive_storage_events(
    State(recorder): State<Arc<HistoryRecorder>>,
    AppJson(notification): AppJson<StorageEventNotification>,
) -> Json<ApiResponse<NotificationSummaryDto>> {
    tracing::info!(
        "Processing storage notification with {} records",
        notification.records.len()
    );

    let summary = recorder.record_storage_notification(notification).await;
    Json(ApiResponse::success(Some(summary), None, None))
}
