use log::debug;
use presence_shared::{ConnectionId, Player, ServerMessage};
use std::collections::HashMap;

/// Client-side view of who is online, rebuilt from server events.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub players: HashMap<ConnectionId, Player>,
}

impl Roster {
    pub fn new() -> Self {
        Self {
            players: HashMap::new(),
        }
    }

    pub fn apply(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::CurrentPlayers(players) => {
                for player in players {
                    self.players.insert(player.id, player);
                }
            }
            ServerMessage::PlayerJoined(player) => {
                debug!("{} ({}) joined", player.name, player.id);
                self.players.insert(player.id, player);
            }
            ServerMessage::PlayerMoved(player) => match self.players.get_mut(&player.id) {
                Some(known) => known.set_position(player.x, player.y),
                // Moves can outrun the join event for peers we have not heard of yet.
                None => {
                    self.players.insert(player.id, player);
                }
            },
            ServerMessage::PlayerLeft { id } => {
                if let Some(player) = self.players.remove(&id) {
                    debug!("{} ({}) left", player.name, id);
                }
            }
        }
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Names with ids, sorted by id, for display.
    pub fn describe(&self) -> Vec<String> {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by_key(|p| p.id);
        players
            .iter()
            .map(|p| format!("{} ({}) at ({:.0}, {:.0})", p.name, p.id, p.x, p.y))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
