//! `murmur-server [PORT | CONFIG.json]`
//!
//! Starts a chat server and runs it until ctrl-c. With no argument it
//! listens on port 5000. Log verbosity follows `RUST_LOG` (default `info`).

use murmur::prelude::*;
use tracing_subscriber::EnvFilter;

fn config_from_args() -> Result<ServerConfig, MurmurError> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        None => ServerConfig::with_port(DEFAULT_PORT),
        Some(arg) => {
            if let Ok(port) = arg.parse::<u16>() {
                ServerConfig::with_port(port)
            } else if arg.ends_with(".json") {
                ServerConfig::load(&arg)?
            } else {
                return Err(MurmurError::Config(format!(
                    "expected a port number or a .json config file, got {arg:?}"
                )));
            }
        }
    };
    if args.next().is_some() {
        return Err(MurmurError::Config(
            "usage: murmur-server [PORT | CONFIG.json]".into(),
        ));
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config_from_args()?;
    let server = ChatServer::builder().config(config).build().await?;

    tracing::info!(
        addr = %server.local_addr()?,
        "Murmur v{} listening",
        env!("CARGO_PKG_VERSION")
    );

    server.run().await?;
    Ok(())
}
