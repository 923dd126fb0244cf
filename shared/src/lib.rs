use rand::Rng;
use serde::{Deserialize, Serialize};

pub const SPAWN_MIN_X: f64 = 50.0;
pub const SPAWN_MIN_Y: f64 = 50.0;
pub const SPAWN_WIDTH: u32 = 400;
pub const SPAWN_HEIGHT: u32 = 300;
pub const DEFAULT_PLAYER_NAME: &str = "Player";
/// Exclusive upper bound for generated colors, `#fffffe` is the largest value produced.
pub const COLOR_RANGE: u32 = 0xFF_FFFF;

/// Opaque identifier of one live connection, handed out by the transport.
pub type ConnectionId = u64;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    NewPlayer(Option<SpawnRequest>),
    Move { x: f64, y: f64 },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    CurrentPlayers(Vec<Player>),
    PlayerJoined(Player),
    PlayerMoved(Player),
    PlayerLeft { id: ConnectionId },
}

impl ServerMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMessage::CurrentPlayers(_) => "current-players",
            ServerMessage::PlayerJoined(_) => "player-joined",
            ServerMessage::PlayerMoved(_) => "player-moved",
            ServerMessage::PlayerLeft { .. } => "player-left",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Player {
    pub id: ConnectionId,
    pub x: f64,
    pub y: f64,
    pub color: String,
    pub name: String,
}

impl Player {
    pub fn new(id: ConnectionId, x: f64, y: f64, color: String, name: String) -> Self {
        Self {
            id,
            x,
            y,
            color,
            name,
        }
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }
}

/// Announcement sent with `new-player`. Every field is optional, absent
/// fields are filled from a [`SpawnArea`].
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SpawnRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Defaults applied to a [`SpawnRequest`].
///
/// Positions are drawn as whole numbers in `[min_x, min_x + width)` and
/// `[min_y, min_y + height)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnArea {
    pub min_x: f64,
    pub min_y: f64,
    pub width: u32,
    pub height: u32,
    pub default_name: String,
}

impl Default for SpawnArea {
    fn default() -> Self {
        Self {
            min_x: SPAWN_MIN_X,
            min_y: SPAWN_MIN_Y,
            width: SPAWN_WIDTH,
            height: SPAWN_HEIGHT,
            default_name: DEFAULT_PLAYER_NAME.to_string(),
        }
    }
}

impl SpawnArea {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x
            && x < self.min_x + self.width as f64
            && y >= self.min_y
            && y < self.min_y + self.height as f64
    }

    pub fn random_position<R: Rng>(&self, rng: &mut R) -> (f64, f64) {
        let x = self.min_x + rng.gen_range(0..self.width.max(1)) as f64;
        let y = self.min_y + rng.gen_range(0..self.height.max(1)) as f64;
        (x, y)
    }

    /// Builds the record for `id`, keeping whatever the client asked for.
    pub fn resolve<R: Rng>(
        &self,
        id: ConnectionId,
        request: SpawnRequest,
        rng: &mut R,
    ) -> Player {
        let (default_x, default_y) = self.random_position(rng);
        Player {
            id,
            x: request.x.unwrap_or(default_x),
            y: request.y.unwrap_or(default_y),
            color: request.color.unwrap_or_else(|| random_color(rng)),
            name: request.name.unwrap_or_else(|| self.default_name.clone()),
        }
    }
}

pub fn random_color<R: Rng>(rng: &mut R) -> String {
    format!("#{:06x}", rng.gen_range(0..COLOR_RANGE))
}

/// True for `#` followed by exactly six hex digits.
pub fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(digits) => digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn test_player_creation() {
        let player = Player::new(1, 100.0, 200.0, "#00ff00".to_string(), "Ada".to_string());
        assert_eq!(player.id, 1);
        assert_eq!(player.x, 100.0);
        assert_eq!(player.y, 200.0);
        assert_eq!(player.color, "#00ff00");
        assert_eq!(player.name, "Ada");
    }

    #[test]
    fn test_player_set_position() {
        let mut player = Player::new(1, 0.0, 0.0, "#000000".to_string(), "Ada".to_string());
        player.set_position(-12.5, 9000.25);
        assert_approx_eq!(player.x, -12.5);
        assert_approx_eq!(player.y, 9000.25);
    }

    #[test]
    fn test_new_player_wire_format() {
        let message: ClientMessage = serde_json::from_value(json!({
            "event": "new-player",
            "data": { "x": 10.0, "name": "Ada" }
        }))
        .unwrap();

        match message {
            ClientMessage::NewPlayer(Some(request)) => {
                assert_eq!(request.x, Some(10.0));
                assert_eq!(request.y, None);
                assert_eq!(request.color, None);
                assert_eq!(request.name.as_deref(), Some("Ada"));
            }
            other => panic!("Unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_new_player_null_payload() {
        let message: ClientMessage =
            serde_json::from_str(r#"{"event":"new-player","data":null}"#).unwrap();
        assert_eq!(message, ClientMessage::NewPlayer(None));

        let message: ClientMessage =
            serde_json::from_str(r#"{"event":"new-player","data":{}}"#).unwrap();
        assert_eq!(message, ClientMessage::NewPlayer(Some(SpawnRequest::default())));
    }

    #[test]
    fn test_move_requires_both_coordinates() {
        let message: ClientMessage =
            serde_json::from_str(r#"{"event":"move","data":{"x":1.5,"y":-3}}"#).unwrap();
        assert_eq!(message, ClientMessage::Move { x: 1.5, y: -3.0 });

        let missing_y = serde_json::from_str::<ClientMessage>(r#"{"event":"move","data":{"x":1}}"#);
        assert!(missing_y.is_err());

        let unknown = serde_json::from_str::<ClientMessage>(r#"{"event":"teleport","data":{}}"#);
        assert!(unknown.is_err());
    }

    #[test]
    fn test_server_message_wire_format() {
        let player = Player::new(7, 1.0, 2.0, "#abcdef".to_string(), "Player".to_string());

        let joined = serde_json::to_value(ServerMessage::PlayerJoined(player.clone())).unwrap();
        assert_eq!(
            joined,
            json!({
                "event": "player-joined",
                "data": { "id": 7, "x": 1.0, "y": 2.0, "color": "#abcdef", "name": "Player" }
            })
        );

        let left = serde_json::to_value(ServerMessage::PlayerLeft { id: 7 }).unwrap();
        assert_eq!(left, json!({ "event": "player-left", "data": { "id": 7 } }));

        let current = serde_json::to_value(ServerMessage::CurrentPlayers(vec![player])).unwrap();
        assert_eq!(current["event"], "current-players");
        assert_eq!(current["data"].as_array().map(|a| a.len()), Some(1));
    }

    #[test]
    fn test_event_names_match_wire_tags() {
        let player = Player::new(1, 0.0, 0.0, "#000000".to_string(), "Player".to_string());
        let messages = vec![
            ServerMessage::CurrentPlayers(vec![]),
            ServerMessage::PlayerJoined(player.clone()),
            ServerMessage::PlayerMoved(player),
            ServerMessage::PlayerLeft { id: 1 },
        ];

        for message in messages {
            let value = serde_json::to_value(&message).unwrap();
            assert_eq!(value["event"], message.event_name());
        }
    }

    #[test]
    fn test_spawn_request_serialization_skips_absent_fields() {
        let request = SpawnRequest {
            name: Some("Ada".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(ClientMessage::NewPlayer(Some(request))).unwrap();
        assert_eq!(value, json!({ "event": "new-player", "data": { "name": "Ada" } }));
    }

    #[test]
    fn test_resolve_fills_defaults() {
        let area = SpawnArea::default();
        let mut rng = StdRng::seed_from_u64(42);

        for id in 0..200 {
            let player = area.resolve(id, SpawnRequest::default(), &mut rng);
            assert_eq!(player.id, id);
            assert!(area.contains(player.x, player.y), "{:?} outside spawn", player);
            assert_eq!(player.x.fract(), 0.0);
            assert_eq!(player.y.fract(), 0.0);
            assert!(is_hex_color(&player.color), "bad color {}", player.color);
            assert_eq!(player.name, DEFAULT_PLAYER_NAME);
        }
    }

    #[test]
    fn test_resolve_keeps_requested_fields() {
        let area = SpawnArea::default();
        let mut rng = StdRng::seed_from_u64(1);
        let request = SpawnRequest {
            x: Some(-500.0),
            y: Some(12345.0),
            color: Some("not-a-color".to_string()),
            name: Some("Grace".to_string()),
        };

        let player = area.resolve(3, request, &mut rng);
        assert_eq!(player.x, -500.0);
        assert_eq!(player.y, 12345.0);
        assert_eq!(player.color, "not-a-color");
        assert_eq!(player.name, "Grace");
    }

    #[test]
    fn test_spawn_area_contains() {
        let area = SpawnArea::default();
        assert!(area.contains(50.0, 50.0));
        assert!(area.contains(449.0, 349.0));
        assert!(!area.contains(450.0, 100.0));
        assert!(!area.contains(100.0, 350.0));
        assert!(!area.contains(49.9, 100.0));
    }

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#000000"));
        assert!(is_hex_color("#0a1B2c"));
        assert!(!is_hex_color("000000"));
        assert!(!is_hex_color("#00000"));
        assert!(!is_hex_color("#0000000"));
        assert!(!is_hex_color("#00000g"));
        assert!(!is_hex_color(""));
    }

    #[test]
    fn test_random_color_is_zero_padded() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let color = random_color(&mut rng);
            assert_eq!(color.len(), 7);
            assert!(is_hex_color(&color));
        }
    }
}
