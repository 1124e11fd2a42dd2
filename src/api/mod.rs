// HTTP and WebSocket APIs

pub mod commands;
pub mod query;
pub mod websocket;

pub use commands::{create_command_router, ChatRequest, CommandAppState, CommandResponse};
pub use query::{create_query_router, QueryAppState};
pub use websocket::{create_ws_router, ws_handler, WsAppState};

use crate::state::FactoryEngine;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Full HTTP surface over one engine
pub fn create_app(engine: Arc<FactoryEngine>) -> Router {
    let query = Arc::new(QueryAppState {
        engine: Arc::clone(&engine),
    });
    let commands = Arc::new(CommandAppState {
        engine: Arc::clone(&engine),
    });
    let ws = Arc::new(WsAppState { engine });

    Router::new()
        .merge(create_query_router(query))
        .merge(create_command_router(commands))
        .merge(create_ws_router(ws))
        .layer(CorsLayer::permissive())
}
