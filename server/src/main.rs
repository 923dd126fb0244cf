use clap::Parser;
use log::{error, info};
use presence_server::network::Server;

/// Main-method of the application.
/// Parses command-line arguments, then runs the relay until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, env = "PORT", default_value = "3000")]
        port: u16,
        /// Maximum number of concurrent connections
        #[clap(short, long, default_value = "256")]
        max_clients: usize,
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let address = format!("{}:{}", args.host, args.port);
    let mut server = Server::bind(&address, args.max_clients).await?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
