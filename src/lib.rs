// Domain records
pub mod entity;

// Engine errors
pub mod error;

// Entity store, tick simulator and command handlers
pub mod state;

// Assistant replies for the chat command
pub mod responder;

// Snapshot synchronization for readers
pub mod sync;

// HTTP and WebSocket APIs
pub mod api;

// TOML configuration
pub mod config;
