use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::features::equipment::handlers;
use crate::features::equipment::services::EquipmentService;

/// Create routes for the equipment feature
///
/// All routes expect an authenticated caller and only ever touch the caller's items.
pub fn routes(service: Arc<EquipmentService>) -> Router {
    Router::new()
        .route(
            "/api/equipment",
            get(handlers::list_equipment).post(handlers::create_equipment),
        )
        .route(
            "/api/equipment/{equipment_id}",
            patch(handlers::update_equipment).delete(handlers::delete_equipment),
        )
        .route(
            "/api/equipment/{equipment_id}/attachment",
            post(handlers::create_attachment_upload_url),
        )
        .with_state(service)
}
