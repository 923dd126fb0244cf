use log::{debug, info};
use presence_shared::{ConnectionId, Player, SpawnArea, SpawnRequest};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

/// Who is online and where. Owned by the dispatcher, never shared.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    players: HashMap<ConnectionId, Player>,
    spawn: SpawnArea,
    rng: StdRng,
}

impl SessionRegistry {
    pub fn new(spawn: SpawnArea) -> Self {
        Self {
            players: HashMap::new(),
            spawn,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(spawn: SpawnArea, seed: u64) -> Self {
        Self {
            players: HashMap::new(),
            spawn,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn spawn_area(&self) -> &SpawnArea {
        &self.spawn
    }

    pub fn join(&mut self, client_id: ConnectionId, request: SpawnRequest) -> Player {
        let player = self.spawn.resolve(client_id, request, &mut self.rng);

        if self.players.insert(client_id, player.clone()).is_some() {
            debug!("Player {} joined again, replacing previous record", client_id);
        }

        info!(
            "Added player {} ({}) at ({}, {})",
            client_id, player.name, player.x, player.y
        );
        player
    }

    // Returns None when the connection never joined.
    pub fn move_player(&mut self, client_id: ConnectionId, x: f64, y: f64) -> Option<Player> {
        let player = self.players.get_mut(&client_id)?;
        player.set_position(x, y);
        Some(player.clone())
    }

    pub fn leave(&mut self, client_id: ConnectionId) -> Option<Player> {
        let player = self.players.remove(&client_id)?;
        info!("Removed player {}", client_id);
        Some(player)
    }

    pub fn snapshot(&self) -> Vec<Player> {
        self.players.values().cloned().collect()
    }

    pub fn get(&self, client_id: ConnectionId) -> Option<&Player> {
        self.players.get(&client_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(SpawnArea::default())
    }
}
