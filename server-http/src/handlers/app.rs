use crate::models::{StatsResponse, StatusResponse};
use crate::state::AppState;
use axum::{Json, extract::State};
use tracing::debug;

/// GET /status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        redis: state.cache.is_alive(),
        db: state.db.is_alive(),
    })
}

/// GET /stats
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let (users, files) = tokio::join!(state.db.nb_users(), state.db.nb_files());
    debug!("STATS: users={}, files={}", users, files);

    Json(StatsResponse { users, files })
}

#[cfg(test)]
mod tests {
    use crate::{AppState, build_router};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use files_core::{DocumentStoreFacade, KeyValueStoreFacade};
    use serde_json::{Value, json};
    use shared::config::DbConfig;
    use std::sync::Arc;
    use storage_engine::{MemoryDocumentStore, MemoryKeyValueStore};
    use tower::ServiceExt;

    fn state(documents: MemoryDocumentStore, kv: MemoryKeyValueStore) -> AppState {
        AppState::new(
            Arc::new(DocumentStoreFacade::create(
                DbConfig::default(),
                Arc::new(documents),
            )),
            Arc::new(KeyValueStoreFacade::create(Arc::new(kv))),
        )
    }

    async fn get_json(state: AppState, uri: &str) -> Value {
        let response = build_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_status_before_connect() {
        let state = state(MemoryDocumentStore::new(), MemoryKeyValueStore::new());
        let body = get_json(state, "/status").await;
        assert_eq!(body, json!({ "redis": false, "db": false }));
    }

    #[tokio::test]
    async fn test_status_after_connect() {
        let state = state(MemoryDocumentStore::new(), MemoryKeyValueStore::new());
        state.connect().await;

        let body = get_json(state, "/status").await;
        assert_eq!(body, json!({ "redis": true, "db": true }));
    }

    #[tokio::test]
    async fn test_status_with_unreachable_cache() {
        let state = state(MemoryDocumentStore::new(), MemoryKeyValueStore::unreachable());
        state.connect().await;

        let body = get_json(state, "/status").await;
        assert_eq!(body, json!({ "redis": false, "db": true }));
    }

    #[tokio::test]
    async fn test_stats_counts_users_and_files() {
        let documents = MemoryDocumentStore::new();
        documents.insert_document("files_manager", "users", json!({ "email": "bob@dylan.com" }));
        for i in 0..3 {
            documents.insert_document("files_manager", "files", json!({ "name": format!("f{i}") }));
        }

        let state = state(documents, MemoryKeyValueStore::new());
        state.connect().await;

        let body = get_json(state, "/stats").await;
        assert_eq!(body, json!({ "users": 1, "files": 3 }));
    }

    #[tokio::test]
    async fn test_stats_with_unreachable_db() {
        let documents = MemoryDocumentStore::unreachable();
        documents.insert_document("files_manager", "files", json!({}));

        let state = state(documents, MemoryKeyValueStore::new());
        state.connect().await;

        let body = get_json(state, "/stats").await;
        assert_eq!(body, json!({ "users": 0, "files": 0 }));
    }
}
