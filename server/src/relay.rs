//! Broadcast relay: turns a [`ServerMessage`] into text frames and hands them
//! to the right connections.
//!
//! Delivery is immediate and best-effort. Nothing is queued for peers that are
//! not connected and nothing is retried.

use crate::client_manager::ClientManager;
use crate::error::RelayError;
use log::{debug, error, warn};
use presence_shared::{ConnectionId, ServerMessage};
use tokio_tungstenite::tungstenite::Message;

/// Who receives a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Exactly one connection
    Only(ConnectionId),
    /// Every open connection except the originator
    AllExcept(ConnectionId),
}

impl Audience {
    pub fn includes(&self, id: ConnectionId) -> bool {
        match *self {
            Audience::Only(target) => id == target,
            Audience::AllExcept(origin) => id != origin,
        }
    }
}

pub fn encode(message: &ServerMessage) -> Result<Message, RelayError> {
    let text = serde_json::to_string(message).map_err(RelayError::Encode)?;
    Ok(Message::text(text))
}

/// Sends `message` to every connection in `audience`.
///
/// Returns how many connections accepted the frame. An encoding failure drops
/// the message for everyone. A connection whose queue is full or closed
/// misses this frame only.
pub fn deliver(clients: &ClientManager, audience: Audience, message: &ServerMessage) -> usize {
    let frame = match encode(message) {
        Ok(frame) => frame,
        Err(e) => {
            error!("Dropping {} event: {}", message.event_name(), e);
            return 0;
        }
    };

    let mut delivered = 0;
    match audience {
        Audience::Only(id) => {
            if let Err(e) = clients.send_to(id, frame) {
                warn!("Failed to send {} to client {}: {}", message.event_name(), id, e);
            } else {
                delivered += 1;
            }
        }
        Audience::AllExcept(_) => {
            for client in clients.iter().filter(|c| audience.includes(c.id)) {
                match client.send(frame.clone()) {
                    Ok(()) => delivered += 1,
                    Err(e) => warn!(
                        "Failed to send {} to client {}: {}",
                        message.event_name(),
                        client.id,
                        e
                    ),
                }
            }
        }
    }

    debug!(
        "Relayed {} to {} client(s) ({:?})",
        message.event_name(),
        delivered,
        audience
    );
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client_manager::PeerSender;
    use presence_shared::Player;
    use std::net::SocketAddr;
    use tokio::sync::mpsc;

    fn addr() -> SocketAddr {
        "127.0.0.1:3000".parse().unwrap()
    }

    fn manager_with(ids: &[ConnectionId]) -> (ClientManager, Vec<mpsc::Receiver<Message>>) {
        manager_with_capacity(ids, 8)
    }

    fn manager_with_capacity(
        ids: &[ConnectionId],
        queue: usize,
    ) -> (ClientManager, Vec<mpsc::Receiver<Message>>) {
        let mut manager = ClientManager::new(16);
        let mut receivers = Vec::new();
        for &id in ids {
            let (tx, rx): (PeerSender, _) = mpsc::channel(queue);
            manager.add_client(id, addr(), tx);
            receivers.push(rx);
        }
        (manager, receivers)
    }

    fn decode(message: Message) -> ServerMessage {
        let text = message.into_text().unwrap();
        serde_json::from_str(text.as_str()).unwrap()
    }

    fn player(id: ConnectionId) -> Player {
        Player::new(id, 1.0, 2.0, "#ffffff".to_string(), "Player".to_string())
    }

    #[test]
    fn test_audience_includes() {
        assert!(Audience::Only(1).includes(1));
        assert!(!Audience::Only(1).includes(2));
        assert!(!Audience::AllExcept(1).includes(1));
        assert!(Audience::AllExcept(1).includes(2));
    }

    #[test]
    fn test_encode_produces_text_frame() {
        let frame = encode(&ServerMessage::PlayerLeft { id: 3 }).unwrap();
        assert!(frame.is_text());
        assert_eq!(decode(frame), ServerMessage::PlayerLeft { id: 3 });
    }

    #[test]
    fn test_deliver_only() {
        let (manager, mut receivers) = manager_with(&[1, 2]);
        let message = ServerMessage::CurrentPlayers(vec![player(1)]);

        assert_eq!(deliver(&manager, Audience::Only(1), &message), 1);
        assert_eq!(decode(receivers[0].try_recv().unwrap()), message);
        assert!(receivers[1].try_recv().is_err());
    }

    #[test]
    fn test_deliver_all_except_skips_origin() {
        let (manager, mut receivers) = manager_with(&[1, 2, 3]);
        let message = ServerMessage::PlayerMoved(player(2));

        assert_eq!(deliver(&manager, Audience::AllExcept(2), &message), 2);
        assert_eq!(decode(receivers[0].try_recv().unwrap()), message);
        assert!(receivers[1].try_recv().is_err());
        assert_eq!(decode(receivers[2].try_recv().unwrap()), message);
    }

    #[test]
    fn test_deliver_skips_full_peers() {
        let (manager, mut receivers) = manager_with_capacity(&[1, 2, 3], 1);
        let first = ServerMessage::PlayerMoved(player(1));
        let second = ServerMessage::PlayerLeft { id: 1 };

        assert_eq!(deliver(&manager, Audience::AllExcept(1), &first), 2);
        // Peer 3 drains its queue, peer 2 does not.
        assert_eq!(decode(receivers[2].try_recv().unwrap()), first);

        assert_eq!(deliver(&manager, Audience::AllExcept(1), &second), 1);
        assert_eq!(decode(receivers[2].try_recv().unwrap()), second);

        // The stalled peer only ever sees what fit in its queue.
        assert_eq!(decode(receivers[1].try_recv().unwrap()), first);
        assert!(receivers[1].try_recv().is_err());
        assert!(receivers[0].try_recv().is_err());
    }

    #[test]
    fn test_deliver_skips_closed_peers() {
        let (manager, mut receivers) = manager_with(&[1, 2]);
        let closed = receivers.remove(0);
        drop(closed);

        let message = ServerMessage::PlayerJoined(player(3));
        assert_eq!(deliver(&manager, Audience::AllExcept(3), &message), 1);
        assert_eq!(decode(receivers[0].try_recv().unwrap()), message);
    }

    #[test]
    fn test_deliver_to_unknown_connection() {
        let (manager, _receivers) = manager_with(&[1]);
        let message = ServerMessage::PlayerLeft { id: 1 };
        assert_eq!(deliver(&manager, Audience::Only(42), &message), 0);
    }
}
