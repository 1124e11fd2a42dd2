use crate::state::{FactoryEngine, FactorySummary, Snapshot};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use std::sync::Arc;

/// Shared state for the read-only API
pub struct QueryAppState {
    pub engine: Arc<FactoryEngine>,
}

/// Create query API router
pub fn create_query_router(state: Arc<QueryAppState>) -> Router {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/state/summary", get(get_summary))
        .route("/api/sustainability/report", get(get_sustainability_report))
        .with_state(state)
}

/// GET /api/state - Whole snapshot of every collection
async fn get_state(State(state): State<Arc<QueryAppState>>) -> Json<Snapshot> {
    Json(state.engine.snapshot())
}

/// GET /api/state/summary - Dashboard, maintenance and sustainability figures
async fn get_summary(State(state): State<Arc<QueryAppState>>) -> Json<FactorySummary> {
    Json(state.engine.snapshot().summary())
}

/// GET /api/sustainability/report - Plain-text report as a download
async fn get_sustainability_report(State(state): State<Arc<QueryAppState>>) -> Response {
    let now = Utc::now();
    let report = state.engine.snapshot().sustainability_report(now);
    let disposition = format!(
        "attachment; filename=\"sustainability-report-{}.txt\"",
        now.format("%Y-%m-%d")
    );

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::KeywordResponder;
    use crate::state::SimulationConfig;
    use std::time::Duration;

    fn create_test_state() -> Arc<QueryAppState> {
        let engine = FactoryEngine::new(
            SimulationConfig {
                seed: Some(5),
                ..SimulationConfig::default()
            },
            Arc::new(KeywordResponder::new()),
            Duration::from_secs(1),
        );
        Arc::new(QueryAppState {
            engine: Arc::new(engine),
        })
    }

    #[tokio::test]
    async fn test_get_state_returns_seed() {
        let state = create_test_state();
        let Json(snapshot) = get_state(State(state)).await;

        assert_eq!(snapshot.machines.len(), 4);
        assert_eq!(snapshot.production_metrics.len(), 12);
        assert_eq!(snapshot.sustainability_metrics.len(), 7);
        assert_eq!(snapshot.optimizations.len(), 2);
        assert_eq!(snapshot.notifications.len(), 2);
        assert!(snapshot.chat_messages.is_empty());
    }

    #[tokio::test]
    async fn test_get_summary_tracks_revision() {
        let state = create_test_state();
        state.engine.tick();

        let Json(summary) = get_summary(State(state.clone())).await;
        assert_eq!(summary.revision, 1);
        assert_eq!(summary.maintenance.total, 4);
    }
}
