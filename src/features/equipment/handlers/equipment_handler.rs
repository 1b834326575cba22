use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::equipment::dtos::{
    CreateEquipmentDto, EquipmentResponseDto, UpdateEquipmentDto, UploadUrlResponseDto,
};
use crate::features::equipment::services::EquipmentService;
use crate::shared::types::{ApiResponse, Meta};

/// Parse an equipment id path segment; anything unparseable is simply unknown
pub fn parse_equipment_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Equipment {} not found", raw)))
}

/// List the caller's equipment, oldest first
#[utoipa::path(
    get,
    path = "/api/equipment",
    responses(
        (status = 200, description = "Equipment of the caller", body = ApiResponse<Vec<EquipmentResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "equipment",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_equipment(
    user: AuthenticatedUser,
    State(service): State<Arc<EquipmentService>>,
) -> Result<Json<ApiResponse<Vec<EquipmentResponseDto>>>> {
    let items = service.list_for_owner(&user.sub).await?;
    let total = items.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    post,
    path = "/api/equipment",
    request_body = CreateEquipmentDto,
    responses(
        (status = 201, description = "Equipment created", body = ApiResponse<EquipmentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Malformed request body")
    ),
    tag = "equipment",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_equipment(
    user: AuthenticatedUser,
    State(service): State<Arc<EquipmentService>>,
    AppJson(dto): AppJson<CreateEquipmentDto>,
) -> Result<(StatusCode, Json<ApiResponse<EquipmentResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let equipment = service.create(&user.sub, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(equipment),
            Some("Equipment created successfully".to_string()),
            None,
        )),
    ))
}

/// Replace name and status of one item
#[utoipa::path(
    patch,
    path = "/api/equipment/{equipment_id}",
    params(
        ("equipment_id" = String, Path, description = "Equipment ID")
    ),
    request_body = UpdateEquipmentDto,
    responses(
        (status = 200, description = "Equipment updated", body = ApiResponse<EquipmentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Equipment not owned by the caller")
    ),
    tag = "equipment",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_equipment(
    user: AuthenticatedUser,
    State(service): State<Arc<EquipmentService>>,
    Path(equipment_id): Path<String>,
    AppJson(dto): AppJson<UpdateEquipmentDto>,
) -> Result<Json<ApiResponse<EquipmentResponseDto>>> {
    let equipment_id = parse_equipment_id(&equipment_id)?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let equipment = service.update(&user.sub, equipment_id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(equipment),
        Some("Equipment updated successfully".to_string()),
        None,
    )))
}

/// Delete one item together with its attachment
#[utoipa::path(
    delete,
    path = "/api/equipment/{equipment_id}",
    params(
        ("equipment_id" = String, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Equipment deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Equipment not owned by the caller")
    ),
    tag = "equipment",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_equipment(
    user: AuthenticatedUser,
    State(service): State<Arc<EquipmentService>>,
    Path(equipment_id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let equipment_id = parse_equipment_id(&equipment_id)?;
    service.delete(&user.sub, equipment_id).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Equipment deleted successfully".to_string()),
        None,
    )))
}

/// Issue a presigned URL for uploading the item's attachment
#[utoipa::path(
    post,
    path = "/api/equipment/{equipment_id}/attachment",
    params(
        ("equipment_id" = String, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Presigned upload URL", body = ApiResponse<UploadUrlResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Equipment not owned by the caller")
    ),
    tag = "equipment",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_attachment_upload_url(
    user: AuthenticatedUser,
    State(service): State<Arc<EquipmentService>>,
    Path(equipment_id): Path<String>,
) -> Result<Json<ApiResponse<UploadUrlResponseDto>>> {
    let equipment_id = parse_equipment_id(&equipment_id)?;
    let response = service
        .create_attachment_upload_url(&user.sub, equipment_id)
        .await?;

    Ok(Json(ApiResponse::success(Some(response), None, None)))
}
