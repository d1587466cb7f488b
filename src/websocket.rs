//! Live change feed.
//!
//! Clients subscribe to channels and are told when records behind those
//! channels change, so they can refetch over gRPC.

use crate::error::{AppError, AppResult};
use futures_util::{Sink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::RwLock;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Channel names
pub mod channels {
    use uuid::Uuid;

    pub const EVENTS: &str = "events";
    pub const GROUPS: &str = "groups";
    pub const FLATS: &str = "flats";

    pub fn event(id: Uuid) -> String {
        format!("event:{}", id)
    }

    pub fn group(id: Uuid) -> String {
        format!("group:{}", id)
    }

    /// Whether a client may subscribe to this channel name
    pub fn is_valid(channel: &str) -> bool {
        match channel.split_once(':') {
            None => matches!(channel, EVENTS | GROUPS | FLATS),
            Some(("event", id)) | Some(("group", id)) => Uuid::parse_str(id).is_ok(),
            Some(_) => false,
        }
    }
}

/// WebSocket message types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    Subscribe { channel: String },
    Unsubscribe { channel: String },
    Connected { client_id: String },
    Subscribed { channel: String },
    Unsubscribed { channel: String },
    EventChanged { event_id: String },
    GroupChanged { group_id: String },
    FlatsChanged,
    Error { message: String },
}

/// A change published to every channel in `channels`
#[derive(Debug, Clone)]
pub struct ChangeNotice {
    pub channels: Vec<String>,
    pub message: WsMessage,
}

/// Publisher side of the feed, shared by services
#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeNotice>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeNotice> {
        self.tx.subscribe()
    }

    pub fn publish(&self, notice: ChangeNotice) {
        // Err only means nobody is listening
        if self.tx.send(notice).is_err() {
            debug!("No change feed listeners");
        }
    }

    pub fn event_changed(&self, event_id: Uuid) {
        self.publish(ChangeNotice {
            channels: vec![channels::EVENTS.to_string(), channels::event(event_id)],
            message: WsMessage::EventChanged {
                event_id: event_id.to_string(),
            },
        });
    }

    pub fn group_changed(&self, group_id: Uuid) {
        self.publish(ChangeNotice {
            channels: vec![channels::GROUPS.to_string(), channels::group(group_id)],
            message: WsMessage::GroupChanged {
                group_id: group_id.to_string(),
            },
        });
    }

    pub fn flats_changed(&self) {
        self.publish(ChangeNotice {
            channels: vec![channels::FLATS.to_string()],
            message: WsMessage::FlatsChanged,
        });
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(1000) // Buffer up to 1000 notices
    }
}

/// Whether a client with `subscriptions` should receive `notice`
pub fn is_interested(subscriptions: &HashSet<String>, notice: &ChangeNotice) -> bool {
    notice.channels.iter().any(|c| subscriptions.contains(c))
}

/// Apply a client frame to its subscription set and build the reply
pub fn handle_client_text(text: &str, subscriptions: &mut HashSet<String>) -> WsMessage {
    match serde_json::from_str::<WsMessage>(text) {
        Ok(WsMessage::Subscribe { channel }) => {
            if !channels::is_valid(&channel) {
                return WsMessage::Error {
                    message: format!("Unknown channel: {}", channel),
                };
            }
            subscriptions.insert(channel.clone());
            WsMessage::Subscribed { channel }
        }
        Ok(WsMessage::Unsubscribe { channel }) => {
            subscriptions.remove(&channel);
            WsMessage::Unsubscribed { channel }
        }
        Ok(_) => WsMessage::Error {
            message: "Only subscribe and unsubscribe are accepted".to_string(),
        },
        Err(e) => WsMessage::Error {
            message: format!("Malformed message: {}", e),
        },
    }
}

/// WebSocket server for the change feed
#[derive(Clone)]
pub struct WebSocketServer {
    feed: ChangeFeed,
    /// Active subscriptions: client_id -> channels
    clients: Arc<RwLock<HashMap<Uuid, HashSet<String>>>>,
}

impl WebSocketServer {
    pub fn new(feed: ChangeFeed) -> Self {
        Self {
            feed,
            clients: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Number of connected clients subscribed to a channel
    pub async fn subscriber_count(&self, channel: &str) -> usize {
        self.clients
            .read()
            .await
            .values()
            .filter(|subs| subs.contains(channel))
            .count()
    }

    /// Handle a new WebSocket connection until the client goes away
    pub async fn handle_connection(&self, stream: TcpStream) -> AppResult<()> {
        let ws_stream = accept_async(stream)
            .await
            .map_err(|e| AppError::Message(format!("WebSocket handshake failed: {}", e)))?;

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let mut rx = self.feed.subscribe();
        let client_id = Uuid::new_v4();
        let mut subscriptions = HashSet::new();

        self.clients.write().await.insert(client_id, HashSet::new());
        info!("New WebSocket connection: {}", client_id);

        let result = async {
            send_json(
                &mut ws_sender,
                &WsMessage::Connected {
                    client_id: client_id.to_string(),
                },
            )
            .await?;

            loop {
                tokio::select! {
                    incoming = ws_receiver.next() => {
                        match incoming {
                            Some(Ok(Message::Text(text))) => {
                                let reply = handle_client_text(&text, &mut subscriptions);
                                self.clients.write().await.insert(client_id, subscriptions.clone());
                                send_json(&mut ws_sender, &reply).await?;
                            }
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                warn!("WebSocket error for {}: {}", client_id, e);
                                break;
                            }
                        }
                    }
                    notice = rx.recv() => {
                        match notice {
                            Ok(notice) if is_interested(&subscriptions, &notice) => {
                                send_json(&mut ws_sender, &notice.message).await?;
                            }
                            Ok(_) => {}
                            Err(RecvError::Lagged(skipped)) => {
                                warn!("Client {} lagged, skipped {} notices", client_id, skipped);
                            }
                            Err(RecvError::Closed) => break,
                        }
                    }
                }
            }

            Ok::<(), AppError>(())
        }
        .await;

        self.clients.write().await.remove(&client_id);
        info!("WebSocket connection closed: {}", client_id);
        result
    }
}

async fn send_json<S>(sender: &mut S, message: &WsMessage) -> AppResult<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let text = serde_json::to_string(message)?;
    sender
        .send(Message::Text(text))
        .await
        .map_err(|e| AppError::Message(format!("WebSocket send failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let mut subs = HashSet::new();

        let reply = handle_client_text(r#"{"type":"subscribe","channel":"events"}"#, &mut subs);
        assert_eq!(reply, WsMessage::Subscribed { channel: "events".to_string() });
        assert!(subs.contains("events"));

        let reply = handle_client_text(r#"{"type":"unsubscribe","channel":"events"}"#, &mut subs);
        assert_eq!(reply, WsMessage::Unsubscribed { channel: "events".to_string() });
        assert!(subs.is_empty());
    }

    #[test]
    fn test_unknown_channel_rejected() {
        let mut subs = HashSet::new();
        let reply = handle_client_text(r#"{"type":"subscribe","channel":"event:not-a-uuid"}"#, &mut subs);
        assert!(matches!(reply, WsMessage::Error { .. }));
        assert!(subs.is_empty());
    }

    #[test]
    fn test_malformed_frame_yields_error() {
        let mut subs = HashSet::new();
        assert!(matches!(handle_client_text("not json", &mut subs), WsMessage::Error { .. }));
    }

    #[test]
    fn test_notices_route_by_channel() {
        let event_id = Uuid::new_v4();
        let notice = ChangeNotice {
            channels: vec![channels::EVENTS.to_string(), channels::event(event_id)],
            message: WsMessage::EventChanged { event_id: event_id.to_string() },
        };

        let mut subs = HashSet::new();
        assert!(!is_interested(&subs, &notice));

        subs.insert(channels::event(event_id));
        assert!(is_interested(&subs, &notice));

        let only_flats: HashSet<String> = [channels::FLATS.to_string()].into_iter().collect();
        assert!(!is_interested(&only_flats, &notice));
    }

    #[test]
    fn test_message_wire_format() {
        let json = serde_json::to_string(&WsMessage::FlatsChanged).unwrap();
        assert_eq!(json, r#"{"type":"flats_changed"}"#);
    }

    #[tokio::test]
    async fn test_feed_delivers_group_changes() {
        let feed = ChangeFeed::default();
        let mut rx = feed.subscribe();
        let group_id = Uuid::new_v4();

        feed.group_changed(group_id);

        let notice = rx.recv().await.unwrap();
        assert!(notice.channels.contains(&channels::group(group_id)));
        assert_eq!(notice.message, WsMessage::GroupChanged { group_id: group_id.to_string() });
    }

    #[tokio::test]
    async fn test_new_server_has_no_clients() {
        let server = WebSocketServer::new(ChangeFeed::default());
        assert_eq!(server.connection_count().await, 0);
        assert_eq!(server.subscriber_count(channels::EVENTS).await, 0);
    }
}
