use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use presence_shared::{ClientMessage, ServerMessage, SpawnRequest};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub struct Client {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Client {
    pub async fn connect(url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Connecting to {}", url);
        let (stream, _response) = connect_async(url).await?;
        Ok(Client { stream })
    }

    pub async fn send(&mut self, message: &ClientMessage) -> Result<(), Box<dyn std::error::Error>> {
        let text = serde_json::to_string(message)?;
        self.stream.send(Message::text(text)).await?;
        Ok(())
    }

    pub async fn join(&mut self, request: SpawnRequest) -> Result<(), Box<dyn std::error::Error>> {
        self.send(&ClientMessage::NewPlayer(Some(request))).await
    }

    pub async fn send_move(&mut self, x: f64, y: f64) -> Result<(), Box<dyn std::error::Error>> {
        self.send(&ClientMessage::Move { x, y }).await
    }

    /// Waits for the next server event.
    ///
    /// Returns `Ok(None)` once the server closes the connection. Frames that
    /// do not decode are logged and skipped.
    pub async fn next_message(&mut self) -> Result<Option<ServerMessage>, Box<dyn std::error::Error>> {
        while let Some(frame) = self.stream.next().await {
            match frame? {
                Message::Text(text) => match serde_json::from_str(text.as_str()) {
                    Ok(message) => return Ok(Some(message)),
                    Err(e) => warn!("Skipping undecodable server message: {}", e),
                },
                Message::Close(_) => {
                    debug!("Server closed the connection");
                    return Ok(None);
                }
                _ => {}
            }
        }
        Ok(None)
    }

    pub async fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.close(None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_bad_url() {
        let result = tokio_test::block_on(Client::connect("not a url"));
        assert!(result.is_err());
    }

    #[test]
    fn test_connect_refused() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .map(|addr| addr.port())
            .unwrap();
        // The listener is dropped above, so nothing accepts on this port.
        let url = format!("ws://127.0.0.1:{}", port);
        let result = tokio_test::block_on(Client::connect(&url));
        assert!(result.is_err());
    }
}
