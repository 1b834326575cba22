use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::equipment::EquipmentService;
use crate::features::file_history::handlers::{self, FileHistoryState};
use crate::features::file_history::services::HistoryRecorder;

/// History routes for authenticated callers
pub fn routes(recorder: Arc<HistoryRecorder>, equipment: Arc<EquipmentService>) -> Router {
    Router::new()
        .route(
            "/api/equipment/{equipment_id}/history",
            get(handlers::get_file_history),
        )
        .with_state(FileHistoryState {
            recorder,
            equipment,
        })
}

/// Notification route called by the object store
pub fn webhook_routes(recorder: Arc<HistoryRecorder>) -> Router {
    Router::new()
        .route("/api/storage/events", post(handlers::receive_storage_events))
        .with_state(recorder)
}
