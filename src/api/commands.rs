use crate::error::EngineError;
use crate::state::{ChatExchange, CommandOutcome, FactoryEngine};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for the command API
pub struct CommandAppState {
    pub engine: Arc<FactoryEngine>,
}

/// Result of a state-changing command
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// False when the command was accepted but changed nothing
    pub applied: bool,
    /// Store revision after the command
    pub revision: u64,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create command API router
pub fn create_command_router(state: Arc<CommandAppState>) -> Router {
    Router::new()
        .route(
            "/api/machines/:id/maintenance/schedule",
            post(schedule_maintenance),
        )
        .route(
            "/api/machines/:id/maintenance/complete",
            post(complete_maintenance),
        )
        .route("/api/optimizations/:id/approve", post(approve_optimization))
        .route("/api/optimizations/:id/reject", post(reject_optimization))
        .route("/api/notifications/:id/read", post(mark_notification_read))
        .route("/api/chat", post(post_chat_message))
        .with_state(state)
}

fn respond(engine: &FactoryEngine, outcome: CommandOutcome) -> Json<CommandResponse> {
    Json(CommandResponse {
        applied: outcome.is_applied(),
        revision: engine.revision(),
    })
}

/// POST /api/machines/:id/maintenance/schedule
async fn schedule_maintenance(
    State(state): State<Arc<CommandAppState>>,
    Path(id): Path<String>,
) -> Result<Json<CommandResponse>, CommandError> {
    let outcome = state.engine.schedule_maintenance(&id)?;
    Ok(respond(&state.engine, outcome))
}

/// POST /api/machines/:id/maintenance/complete
async fn complete_maintenance(
    State(state): State<Arc<CommandAppState>>,
    Path(id): Path<String>,
) -> Result<Json<CommandResponse>, CommandError> {
    let outcome = state.engine.complete_maintenance(&id)?;
    Ok(respond(&state.engine, outcome))
}

/// POST /api/optimizations/:id/approve
async fn approve_optimization(
    State(state): State<Arc<CommandAppState>>,
    Path(id): Path<String>,
) -> Result<Json<CommandResponse>, CommandError> {
    let outcome = state.engine.approve_optimization(&id)?;
    Ok(respond(&state.engine, outcome))
}

/// POST /api/optimizations/:id/reject
async fn reject_optimization(
    State(state): State<Arc<CommandAppState>>,
    Path(id): Path<String>,
) -> Result<Json<CommandResponse>, CommandError> {
    let outcome = state.engine.reject_optimization(&id)?;
    Ok(respond(&state.engine, outcome))
}

/// POST /api/notifications/:id/read - Unknown ids are accepted as a no-op
async fn mark_notification_read(
    State(state): State<Arc<CommandAppState>>,
    Path(id): Path<String>,
) -> Json<CommandResponse> {
    let outcome = state.engine.mark_notification_read(&id);
    respond(&state.engine, outcome)
}

/// POST /api/chat - Append a user message and the assistant reply
async fn post_chat_message(
    State(state): State<Arc<CommandAppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatExchange>, CommandError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(CommandError::BadRequest("message must not be empty".to_string()));
    }

    Ok(Json(state.engine.post_chat_message(message).await))
}

/// Command error types
#[derive(Debug)]
enum CommandError {
    NotFound(String),
    BadRequest(String),
}

impl From<EngineError> for CommandError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound { .. } => CommandError::NotFound(err.to_string()),
        }
    }
}

impl IntoResponse for CommandError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            CommandError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            CommandError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::MachineStatus;
    use crate::responder::KeywordResponder;
    use crate::state::SimulationConfig;
    use std::time::Duration;

    fn create_test_state() -> Arc<CommandAppState> {
        let engine = FactoryEngine::new(
            SimulationConfig {
                seed: Some(9),
                ..SimulationConfig::default()
            },
            Arc::new(KeywordResponder::new()),
            Duration::from_secs(1),
        );
        Arc::new(CommandAppState {
            engine: Arc::new(engine),
        })
    }

    #[tokio::test]
    async fn test_schedule_then_repeat() {
        let state = create_test_state();
        let id = state.engine.snapshot().machines[0].id.clone();

        let first = schedule_maintenance(State(state.clone()), Path(id.clone()))
            .await
            .unwrap();
        assert!(first.applied);
        assert_eq!(first.revision, 1);
        assert_eq!(
            state.engine.snapshot().machine(&id).unwrap().status,
            MachineStatus::Maintenance
        );

        let second = schedule_maintenance(State(state), Path(id)).await.unwrap();
        assert!(!second.applied);
        assert_eq!(second.revision, 1);
    }

    #[tokio::test]
    async fn test_unknown_optimization_is_not_found() {
        let state = create_test_state();
        let result = approve_optimization(State(state), Path("missing".to_string())).await;

        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_blank_chat_rejected() {
        let state = create_test_state();
        let request = ChatRequest {
            message: "   ".to_string(),
        };

        let result = post_chat_message(State(state.clone()), Json(request)).await;
        assert!(matches!(result, Err(CommandError::BadRequest(_))));
        assert!(state.engine.snapshot().chat_messages.is_empty());
    }
}
