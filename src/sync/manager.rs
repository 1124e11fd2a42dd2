use crate::state::FactoryEngine;
use crate::sync::protocol::{ClientMessage, ErrorMessage, SnapshotMessage};
use crate::sync::{SnapshotFeed, SyncCause, SyncFrame};
use axum::extract::ws::{Message, WebSocket};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Drives one WebSocket connection: every refresh pushes the whole snapshot
pub struct ConnectionManager {
    feed: SnapshotFeed,
}

impl ConnectionManager {
    pub fn new(engine: Arc<FactoryEngine>) -> Self {
        Self {
            feed: SnapshotFeed::new(engine),
        }
    }

    /// Handle WebSocket connection lifecycle
    pub async fn handle(mut self, mut socket: WebSocket) {
        info!("WebSocket connection established");

        loop {
            tokio::select! {
                // Handle incoming client messages
                msg = socket.recv() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Err(e) = self.handle_client_message(&mut socket, &text).await {
                                error!(error = %e, "Error handling client message");
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("WebSocket client disconnected");
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = socket.send(Message::Pong(data)).await {
                                error!(error = %e, "Failed to send pong");
                                break;
                            }
                        }
                        Some(Ok(_)) => {
                            // Ignore binary, pong messages
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "WebSocket error");
                            break;
                        }
                    }
                }

                // Push a fresh snapshot after every sync signal
                frame = self.feed.next() => {
                    match frame {
                        Some(frame) => {
                            if let Err(e) = send_frame(&mut socket, frame).await {
                                error!(error = %e, "Failed to send snapshot");
                                break;
                            }
                        }
                        None => {
                            error!("Sync channel closed");
                            break;
                        }
                    }
                }
            }
        }

        info!("WebSocket connection closed");
    }

    /// Handle client message (refresh); malformed input gets an error frame
    async fn handle_client_message(
        &mut self,
        socket: &mut WebSocket,
        text: &str,
    ) -> anyhow::Result<()> {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(ClientMessage::Refresh) => {
                let frame = SyncFrame {
                    cause: SyncCause::Resync,
                    snapshot: self.feed.get_all(),
                };
                send_frame(socket, frame).await
            }
            Err(e) => {
                warn!(error = %e, "Unrecognized client message");
                let json = serde_json::to_string(&ErrorMessage::new(e.to_string()))?;
                socket.send(Message::Text(json)).await?;
                Ok(())
            }
        }
    }
}

async fn send_frame(socket: &mut WebSocket, frame: SyncFrame) -> anyhow::Result<()> {
    let msg = SnapshotMessage::from(frame);
    let json = serde_json::to_string(&msg)?;
    socket.send(Message::Text(json)).await?;
    Ok(())
}
