//! Transport seam for the notification hub.
//!
//! The hub speaks a minimal protocol: JSON text frames of the form
//! `{"target": "<event name>"}` with no payload. The event itself is the
//! signal. Everything else on the wire (pings, binary frames, frames that
//! fail to parse) is ignored.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;
use url::Url;

use crate::error::{CoreError, Result};

/// A named event pushed by the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubEvent {
    /// Event name, e.g. "UpdateReminders".
    #[serde(rename = "target")]
    pub name: String,
}

/// Stream of decoded hub events. Ends (or yields an error) when the
/// connection drops.
pub type EventStream = BoxStream<'static, Result<HubEvent>>;

/// Connection factory for the notification hub.
///
/// The channel manager owns the state machine; implementations only open a
/// connection and surface decoded events. The access token travels in the
/// URL (`access_token` query parameter).
#[async_trait]
pub trait HubTransport: Send + Sync + std::fmt::Debug {
    async fn connect(&self, url: &Url) -> Result<EventStream>;
}

/// Production transport over tokio-tungstenite.
#[derive(Debug, Clone, Default)]
pub struct WebSocketTransport;

#[async_trait]
impl HubTransport for WebSocketTransport {
    async fn connect(&self, url: &Url) -> Result<EventStream> {
        let (ws, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| CoreError::channel("connect", e))?;

        let (_sink, stream) = ws.split();

        let events = stream
            .filter_map(|frame| async move {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<HubEvent>(&text) {
                        Ok(event) => Some(Ok(event)),
                        Err(e) => {
                            debug!("Ignoring unparseable hub frame: {}", e);
                            None
                        }
                    },
                    Ok(Message::Close(_)) => {
                        Some(Err(CoreError::channel("receive", "server closed connection")))
                    }
                    // Ping/pong are answered by tungstenite; binary frames
                    // are not part of the hub protocol.
                    Ok(_) => None,
                    Err(e) => Some(Err(CoreError::channel("receive", e))),
                }
            })
            .boxed();

        Ok(events)
    }
}
