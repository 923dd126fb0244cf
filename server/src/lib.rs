//! # Presence Relay Server Library
//!
//! This library provides the server side of a small real-time position sharing
//! service. Clients connect over WebSocket, announce a player, move it, and are
//! told about everyone else who is online and where they are.
//!
//! ## Core Responsibilities
//!
//! ### Session Registry
//! Keeps one player record per connection that has announced itself. Records
//! are created on `new-player`, have their position replaced on `move`, and are
//! removed when the connection closes. Absent announcement fields are filled
//! with defaults (random spawn point, random `#rrggbb` color, generic name).
//!
//! ### Broadcast Relay
//! Fans each change out to the right audience:
//! - `current-players` goes to the joining connection only
//! - `player-joined`, `player-moved` and `player-left` go to every other open
//!   connection, never back to the originator
//!
//! Delivery is immediate and best-effort: no acknowledgements, no retries and
//! no replay for peers that were not connected at the time.
//!
//! ## Architecture Design
//!
//! ### Single Dispatcher
//! Per-connection tasks only decode frames and move bytes. Every registry
//! mutation and broadcast runs on one dispatcher loop, one event at a time, so
//! the registry needs no locking and handlers never interleave.
//!
//! ### Tolerant Protocol
//! A `move` from a connection that never joined, a repeated disconnect, or an
//! undecodable frame is dropped (with a log line) rather than reported back.
//! Nothing a client sends can take the server down.
//!
//! ## Module Organization
//!
//! - `registry`: the session registry (`join`, `move_player`, `leave`, `snapshot`)
//! - `client_manager`: open connections and their outbound queues
//! - `relay`: audience selection and frame delivery
//! - `dispatcher`: serial handling of connect / message / disconnect events
//! - `network`: WebSocket accept loop and per-connection reader/writer tasks
//! - `error`: the [`error::RelayError`] type
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use presence_server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Listen on port 3000 and allow up to 256 concurrent connections
//!     let mut server = Server::bind("0.0.0.0:3000", 256).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod dispatcher;
pub mod error;
pub mod network;
pub mod registry;
pub mod relay;
