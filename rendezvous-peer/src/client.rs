use crate::engine::{PeerEvent, SessionManager};
use crate::transport::{TransportConfig, TransportFactory};
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use rendezvous_core::{ClientMessage, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

/// A [`SessionManager`] wired to a signaling server over a websocket.
pub struct PeerClient {
    pub manager: SessionManager,
    pub events: mpsc::UnboundedReceiver<PeerEvent>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl PeerClient {
    /// `url` is the server's websocket endpoint, e.g. `ws://host:5000/ws`.
    pub async fn connect(
        url: &str,
        transports: Arc<dyn TransportFactory>,
        config: TransportConfig,
    ) -> Result<Self> {
        let (socket, _) = connect_async(url)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;
        info!("Connected to signaling server at {}", url);

        let (mut sink, mut stream) = socket.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<ClientMessage>();
        let (manager, events) = SessionManager::new(Arc::new(tx), transports, config);

        let writer = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                let text = match serde_json::to_string(&msg) {
                    Ok(text) => text,
                    Err(e) => {
                        error!("Failed to serialize {}: {}", msg.kind(), e);
                        continue;
                    }
                };
                if sink.send(Message::text(text)).await.is_err() {
                    break;
                }
            }
        });

        let reader = tokio::spawn({
            let manager = manager.clone();

            async move {
                while let Some(frame) = stream.next().await {
                    match frame {
                        Ok(Message::Text(text)) => {
                            match serde_json::from_str::<ServerMessage>(text.as_str()) {
                                Ok(msg) => manager.handle_server_message(msg),
                                Err(e) => warn!("Invalid frame from signaling server: {}", e),
                            }
                        }
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(e) => {
                            warn!("Signaling connection error: {}", e);
                            break;
                        }
                    }
                }

                manager.close_all();
                info!("Signaling connection closed");
            }
        });

        Ok(Self {
            manager,
            events,
            reader,
            writer,
        })
    }

    /// Drops the websocket without a `leave`; the server reconciles the
    /// disconnect on its side.
    pub fn disconnect(self) {
        self.manager.close_all();
        self.reader.abort();
        self.writer.abort();
    }
}
