use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::status_counts::handlers;
use crate::features::status_counts::services::StatusCounter;

pub fn routes(counter: Arc<StatusCounter>) -> Router {
    Router::new()
        .route("/api/stats", get(handlers::get_stats))
        .with_state(counter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::equipment::models::EquipmentStatus;
    use crate::features::status_counts::repository::memory::InMemoryStatusCountStore;
    use crate::shared::test_helpers::{with_authenticated_user, TEST_OWNER_ID};
    use axum_test::TestServer;
    use serde_json::Value;

    #[tokio::test]
    async fn test_stats_only_lists_callers_counters() {
        let store = Arc::new(InMemoryStatusCountStore::default());
        store.seed(TEST_OWNER_ID, EquipmentStatus::Up, 4);
        store.seed("someone-else", EquipmentStatus::Down, 2);
        let counter = Arc::new(StatusCounter::new(store));

        let server =
            TestServer::new(with_authenticated_user(routes(counter), TEST_OWNER_ID)).unwrap();
        let response = server.get("/api/stats").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["statusName"], "Up");
        assert_eq!(body["data"][0]["statusCount"], 4);
    }
}
