//! # Presence Client Library
//!
//! A headless client for the presence relay. It speaks the same JSON-over-
//! WebSocket protocol as a browser client would, keeps a local mirror of
//! everyone online, and can drive its own avatar around without a keyboard.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! WebSocket connection to the relay:
//! - `new-player` announcement with optional position, color and name
//! - `move` updates
//! - Decoding of `current-players`, `player-joined`, `player-moved` and
//!   `player-left` events
//!
//! ### Roster Module (`roster`)
//! Applies server events to a local id → player map, the same bookkeeping a
//! rendering client does before drawing.
//!
//! ### Wander Module (`wander`)
//! Produces a stream of positions clamped to the viewport, standing in for
//! keyboard input when the client runs unattended.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use presence_client::network::Client;
//! use presence_client::roster::Roster;
//! use presence_shared::SpawnRequest;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = Client::connect("ws://127.0.0.1:3000").await?;
//! client.join(SpawnRequest::default()).await?;
//!
//! let mut roster = Roster::new();
//! if let Some(message) = client.next_message().await? {
//!     roster.apply(message);
//! }
//! client.send_move(120.0, 80.0).await?;
//! # Ok(())
//! # }
//! ```

pub mod network;
pub mod roster;
pub mod wander;
