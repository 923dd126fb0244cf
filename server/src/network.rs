//! Server network layer handling WebSocket connections and event dispatch

use crate::client_manager::PEER_QUEUE_CAPACITY;
use crate::dispatcher::{Dispatcher, ServerEvent};
use crate::error::RelayError;
use crate::registry::SessionRegistry;
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use presence_shared::{ClientMessage, ConnectionId, SpawnArea};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Events waiting for the dispatcher; readers wait when it is full
pub const EVENT_QUEUE_CAPACITY: usize = 1000;

/// Main server: accepts connections and feeds their traffic to the dispatcher
pub struct Server {
    listener: Option<TcpListener>,
    local_addr: SocketAddr,
    dispatcher: Dispatcher,

    // Communication channels
    server_tx: mpsc::Sender<ServerEvent>,
    server_rx: mpsc::Receiver<ServerEvent>,
}

impl Server {
    pub async fn bind(addr: &str, max_clients: usize) -> Result<Self, RelayError> {
        Self::bind_with_registry(addr, max_clients, SessionRegistry::new(SpawnArea::default()))
            .await
    }

    pub async fn bind_with_registry(
        addr: &str,
        max_clients: usize,
        registry: SessionRegistry,
    ) -> Result<Self, RelayError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Server listening on {}", local_addr);

        let (server_tx, server_rx) = mpsc::channel::<ServerEvent>(EVENT_QUEUE_CAPACITY);

        Ok(Server {
            listener: Some(listener),
            local_addr,
            dispatcher: Dispatcher::new(max_clients, registry),
            server_tx,
            server_rx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Spawns task that accepts TCP connections and assigns connection ids
    fn spawn_acceptor(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut next_client_id: ConnectionId = 1;

            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        let client_id = next_client_id;
                        next_client_id += 1;

                        let server_tx = server_tx.clone();
                        tokio::spawn(async move {
                            if let Err(e) =
                                Self::handle_connection(client_id, stream, addr, server_tx).await
                            {
                                warn!("Connection {} from {} ended with error: {}", client_id, addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Runs one connection: handshake, writer task, then the read loop
    ///
    /// A `Disconnected` event is always sent once the connection has been
    /// announced, whatever the reason the read loop ended.
    async fn handle_connection(
        client_id: ConnectionId,
        stream: TcpStream,
        addr: SocketAddr,
        server_tx: mpsc::Sender<ServerEvent>,
    ) -> Result<(), RelayError> {
        let ws_stream = accept_async(stream).await?;
        let (mut ws_sink, mut ws_receiver) = ws_stream.split();
        let (peer_tx, mut peer_rx) = mpsc::channel::<Message>(PEER_QUEUE_CAPACITY);

        let writer = tokio::spawn(async move {
            while let Some(frame) = peer_rx.recv().await {
                if let Err(e) = ws_sink.send(frame).await {
                    debug!("Write to client {} failed: {}", client_id, e);
                    break;
                }
            }
            let _ = ws_sink.close().await;
        });

        if server_tx
            .send(ServerEvent::Connected {
                client_id,
                addr,
                sender: peer_tx,
            })
            .await
            .is_err()
        {
            writer.abort();
            return Ok(());
        }

        let result = Self::read_loop(client_id, &mut ws_receiver, &server_tx).await;

        let _ = server_tx.send(ServerEvent::Disconnected { client_id }).await;
        // The dispatcher drops our sender on disconnect, which ends the writer.
        let _ = writer.await;
        result
    }

    async fn read_loop<S>(
        client_id: ConnectionId,
        ws_receiver: &mut S,
        server_tx: &mpsc::Sender<ServerEvent>,
    ) -> Result<(), RelayError>
    where
        S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        while let Some(frame) = ws_receiver.next().await {
            match frame? {
                Message::Text(text) => match decode(text.as_str()) {
                    Ok(message) => {
                        debug!("Client {} sent {:?}", client_id, message);
                        if server_tx
                            .send(ServerEvent::MessageReceived { client_id, message })
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(e) => warn!("Dropping message from client {}: {}", client_id, e),
                },
                Message::Close(_) => {
                    debug!("Client {} requested close", client_id);
                    break;
                }
                Message::Binary(_) => {
                    warn!("Ignoring binary frame from client {}", client_id);
                }
                // Pings are answered by tungstenite itself.
                _ => {}
            }
        }
        Ok(())
    }

    /// Main server loop: every event is handled to completion before the next
    pub async fn run(&mut self) -> Result<(), RelayError> {
        self.spawn_acceptor();
        info!("Server started successfully");

        while let Some(event) = self.server_rx.recv().await {
            self.dispatcher.handle(event);
        }

        info!("Server shutting down");
        Ok(())
    }
}

pub fn decode(text: &str) -> Result<ClientMessage, RelayError> {
    serde_json::from_str(text).map_err(RelayError::Decode)
}
