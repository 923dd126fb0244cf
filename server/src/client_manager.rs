//! Connection tracking for the relay server
//!
//! This module keeps the list of open WebSocket connections, independent of
//! whether they have announced a player yet:
//! - Connection lifecycle (connect, disconnect)
//! - Outbound handles used by the broadcast relay
//! - Capacity enforcement
//!
//! A connection being present here is what makes it part of a broadcast
//! audience. Player records live in the session registry instead.

use crate::error::RelayError;
use log::{debug, info, warn};
use presence_shared::ConnectionId;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_tungstenite::tungstenite::Message;

/// Frames a connection may have waiting before new ones are dropped
pub const PEER_QUEUE_CAPACITY: usize = 256;

/// Outbound half of a connection, drained by its writer task.
pub type PeerSender = mpsc::Sender<Message>;

/// Represents one open connection
#[derive(Debug)]
pub struct Client {
    /// Identifier assigned by the accept loop
    pub id: ConnectionId,
    /// Remote address, for logging
    pub addr: SocketAddr,
    /// When the WebSocket handshake completed
    pub connected_at: Instant,
    /// Queue feeding this connection's socket
    pub sender: PeerSender,
}

impl Client {
    /// Creates a new client record for a freshly accepted connection
    pub fn new(id: ConnectionId, addr: SocketAddr, sender: PeerSender) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
            sender,
        }
    }

    /// Queues a message for this connection without waiting
    ///
    /// A connection that is not draining its queue loses the frame instead
    /// of holding up the dispatcher. `PeerGone` means the writer task has
    /// already exited, which happens between the socket closing and the
    /// disconnect event being dispatched.
    pub fn send(&self, message: Message) -> Result<(), RelayError> {
        match self.sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(RelayError::PeerBusy(self.id)),
            Err(TrySendError::Closed(_)) => Err(RelayError::PeerGone(self.id)),
        }
    }

    /// How long this connection has been open
    pub fn uptime(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

/// Manages all open connections
///
/// The ClientManager is the audience the broadcast relay iterates over. It
/// enforces the server's capacity limit and hands out outbound handles by
/// connection id.
pub struct ClientManager {
    /// Open connections indexed by id
    clients: HashMap<ConnectionId, Client>,
    /// Maximum number of concurrent connections allowed
    max_clients: usize,
}

impl ClientManager {
    /// Creates a new client manager with the specified capacity limit
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            max_clients,
        }
    }

    /// Registers an open connection
    ///
    /// Returns false if the server is at capacity or the id is already
    /// taken, in which case the sender is dropped and the connection's writer
    /// task closes the socket.
    pub fn add_client(&mut self, id: ConnectionId, addr: SocketAddr, sender: PeerSender) -> bool {
        if self.clients.len() >= self.max_clients {
            return false;
        }
        if self.clients.contains_key(&id) {
            warn!("Client id {} is already in use, refusing {}", id, addr);
            return false;
        }

        info!("Client {} connected from {}", id, addr);
        self.clients.insert(id, Client::new(id, addr, sender));
        true
    }

    /// Forgets a connection
    ///
    /// Returns the removed client, or None if it was already gone. Duplicate
    /// disconnect signals land here and are harmless.
    pub fn remove_client(&mut self, id: ConnectionId) -> Option<Client> {
        let client = self.clients.remove(&id)?;
        info!(
            "Client {} disconnected after {:.1}s",
            client.id,
            client.uptime().as_secs_f32()
        );
        Some(client)
    }

    /// Queues a message for a single connection
    pub fn send_to(&self, id: ConnectionId, message: Message) -> Result<(), RelayError> {
        match self.clients.get(&id) {
            Some(client) => client.send(message),
            None => {
                debug!("Dropping message for unknown client {}", id);
                Err(RelayError::PeerGone(id))
            }
        }
    }

    /// Returns true if the connection is currently open
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.clients.contains_key(&id)
    }

    /// Iterates over every open connection
    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    /// Returns the number of open connections
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no connections are open
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
