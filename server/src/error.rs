use presence_shared::ConnectionId;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors raised by the relay. None of them are fatal to the server process;
/// they are logged and confined to the connection or message that caused them.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Connection {0} is no longer reachable")]
    PeerGone(ConnectionId),
    #[error("Outbound queue for connection {0} is full")]
    PeerBusy(ConnectionId),
}
