use clap::Parser;
use log::{error, info};
use presence_client::network::Client;
use presence_client::roster::Roster;
use presence_client::wander::Wanderer;
use presence_shared::SpawnRequest;
use std::time::Duration;
use tokio::time::interval;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Relay URL to connect to
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:3000")]
    server: String,

    /// Display name, the server picks one if omitted
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Display color as #rrggbb, the server picks one if omitted
    #[arg(short = 'c', long)]
    color: Option<String>,

    /// Number of moves to make before disconnecting
    #[arg(long, default_value = "200")]
    steps: u32,

    /// Milliseconds between moves
    #[arg(short = 'i', long, default_value = "50")]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut client = Client::connect(&args.server).await?;
    let mut wanderer = Wanderer::new(100.0, 100.0, 3.0, 0.05);
    client
        .join(SpawnRequest {
            x: Some(wanderer.x),
            y: Some(wanderer.y),
            color: args.color,
            name: args.name,
        })
        .await?;

    let mut roster = Roster::new();
    let mut ticker = interval(Duration::from_millis(args.interval_ms.max(1)));
    let mut steps_left = args.steps;

    while steps_left > 0 {
        tokio::select! {
            message = client.next_message() => {
                match message {
                    Ok(Some(message)) => roster.apply(message),
                    Ok(None) => {
                        info!("Server closed the connection");
                        return Ok(());
                    }
                    Err(e) => {
                        error!("Connection error: {}", e);
                        return Ok(());
                    }
                }
            },

            _ = ticker.tick() => {
                if let Some((x, y)) = wanderer.step() {
                    client.send_move(x, y).await?;
                }
                steps_left -= 1;

                if steps_left % 40 == 0 {
                    info!("{} player(s) online: {}", roster.len(), roster.describe().join(", "));
                }
            },
        }
    }

    client.close().await?;
    info!("Done after {} moves", args.steps);
    Ok(())
}
