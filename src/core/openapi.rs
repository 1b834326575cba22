use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::equipment::{
    dtos as equipment_dtos, handlers as equipment_handlers, models as equipment_models,
};
use crate::features::file_history::{
    dtos as file_history_dtos, handlers as file_history_handlers, models as file_history_models,
};
use crate::features::status_counts::{dtos as status_counts_dtos, handlers as stats_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handler::get_me,
        // Equipment
        equipment_handlers::list_equipment,
        equipment_handlers::create_equipment,
        equipment_handlers::update_equipment,
        equipment_handlers::delete_equipment,
        equipment_handlers::create_attachment_upload_url,
        // File history
        file_history_handlers::get_file_history,
        file_history_handlers::receive_storage_events,
        // Stats
        stats_handlers::get_stats,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::dto::MeResponseDto,
            auth::model::AuthenticatedUser,
            ApiResponse<auth::dto::MeResponseDto>,
            // Equipment
            equipment_models::EquipmentStatus,
            equipment_dtos::CreateEquipmentDto,
            equipment_dtos::UpdateEquipmentDto,
            equipment_dtos::EquipmentResponseDto,
            equipment_dtos::UploadUrlResponseDto,
            ApiResponse<Vec<equipment_dtos::EquipmentResponseDto>>,
            ApiResponse<equipment_dtos::EquipmentResponseDto>,
            ApiResponse<equipment_dtos::UploadUrlResponseDto>,
            // File history
            file_history_models::FileEventName,
            file_history_models::StorageEventNotification,
            file_history_models::StorageEventRecord,
            file_history_models::StorageEventEntity,
            file_history_models::StorageObject,
            file_history_dtos::FileHistoryResponseDto,
            file_history_dtos::NotificationSummaryDto,
            ApiResponse<Vec<file_history_dtos::FileHistoryResponseDto>>,
            ApiResponse<file_history_dtos::NotificationSummaryDto>,
            // Stats
            status_counts_dtos::StatusCountResponseDto,
            ApiResponse<Vec<status_counts_dtos::StatusCountResponseDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Caller identity"),
        (name = "equipment", description = "Equipment records and attachments"),
        (name = "stats", description = "Equipment counts per status"),
        (name = "storage", description = "Object store event notifications"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Equipment Status API",
        version = "0.1.0",
        description = "API documentation for the equipment status service",
    )
)]
pub struct ApiDoc;

/// Adds the bearer JWT and webhook token security schemes to the OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "webhook_token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
