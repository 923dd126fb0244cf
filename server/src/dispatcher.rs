//! Serial event handling for the relay.
//!
//! The dispatcher is the only owner of the session registry and of the
//! connection list. Each [`ServerEvent`] runs to completion, registry update
//! and fan-out included, before the next one is looked at.

use crate::client_manager::{ClientManager, PeerSender};
use crate::registry::SessionRegistry;
use crate::relay::{deliver, Audience};
use log::{debug, warn};
use presence_shared::{ClientMessage, ConnectionId, ServerMessage};
use std::net::SocketAddr;

/// Messages sent from connection tasks to the dispatcher
#[derive(Debug)]
pub enum ServerEvent {
    Connected {
        client_id: ConnectionId,
        addr: SocketAddr,
        sender: PeerSender,
    },
    MessageReceived {
        client_id: ConnectionId,
        message: ClientMessage,
    },
    Disconnected {
        client_id: ConnectionId,
    },
}

pub struct Dispatcher {
    clients: ClientManager,
    registry: SessionRegistry,
}

impl Dispatcher {
    pub fn new(max_clients: usize, registry: SessionRegistry) -> Self {
        Self {
            clients: ClientManager::new(max_clients),
            registry,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn clients(&self) -> &ClientManager {
        &self.clients
    }

    pub fn handle(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Connected {
                client_id,
                addr,
                sender,
            } => {
                if !self.clients.add_client(client_id, addr, sender) {
                    warn!(
                        "Refusing client {} from {} ({} connections open)",
                        client_id,
                        addr,
                        self.clients.len()
                    );
                }
            }
            ServerEvent::MessageReceived { client_id, message } => {
                if !self.clients.contains(client_id) {
                    debug!("Ignoring message from unregistered client {}", client_id);
                    return;
                }
                self.handle_message(client_id, message);
            }
            ServerEvent::Disconnected { client_id } => {
                self.handle_disconnect(client_id);
            }
        }
    }

    fn handle_message(&mut self, client_id: ConnectionId, message: ClientMessage) {
        match message {
            ClientMessage::NewPlayer(request) => {
                let request = request.unwrap_or_default();
                let requested = [request.x, request.y];
                if requested.iter().flatten().any(|v| !v.is_finite()) {
                    warn!("Dropping new-player from client {} with non-finite position", client_id);
                    return;
                }
                let player = self.registry.join(client_id, request);

                let current = ServerMessage::CurrentPlayers(self.registry.snapshot());
                deliver(&self.clients, Audience::Only(client_id), &current);

                let joined = ServerMessage::PlayerJoined(player);
                deliver(&self.clients, Audience::AllExcept(client_id), &joined);
            }
            ClientMessage::Move { x, y } if !(x.is_finite() && y.is_finite()) => {
                warn!("Dropping move from client {} with non-finite position", client_id);
            }
            ClientMessage::Move { x, y } => match self.registry.move_player(client_id, x, y) {
                Some(player) => {
                    let moved = ServerMessage::PlayerMoved(player);
                    deliver(&self.clients, Audience::AllExcept(client_id), &moved);
                }
                None => debug!("Ignoring move from client {} before join", client_id),
            },
        }
    }

    fn handle_disconnect(&mut self, client_id: ConnectionId) {
        // Leave the departing connection out of the audience before relaying.
        self.clients.remove_client(client_id);

        if let Some(player) = self.registry.leave(client_id) {
            let left = ServerMessage::PlayerLeft { id: player.id };
            deliver(&self.clients, Audience::AllExcept(client_id), &left);
        }
    }
}
