//! Chat relay server
//!
//! Run with: cargo run --example chat_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example chat_server                    # binds to 0.0.0.0:12345
//!   cargo run --example chat_server 127.0.0.1:4000     # binds to 127.0.0.1:4000
//!
//! Connect with the bundled client:
//!   cargo run --example chat_client -- ana
//!
//! Or with any line-oriented tool:
//!   nc localhost 12345
//!   (first line is your username, then ASYNC:hello, SYNC:hello, /mute bob ...)

use std::net::SocketAddr;

use chat_relay::{ChatServer, ServerConfig};

fn print_usage() {
    eprintln!("Usage: chat_server [BIND_ADDR]");
    eprintln!();
    eprintln!("BIND_ADDR defaults to 0.0.0.0:12345");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return Ok(());
    }

    let mut config = ServerConfig::default();
    if let Some(addr_str) = args.get(1) {
        match addr_str.parse::<SocketAddr>() {
            Ok(addr) => config = config.bind(addr),
            Err(e) => {
                eprintln!("Error: invalid address '{}': {}", addr_str, e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chat_relay=info".parse()?)
                .add_directive("chat_server=debug".parse()?),
        )
        .init();

    println!("Starting chat server on {}", config.bind_addr);

    let server = ChatServer::new(config);

    let result = server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    if let Err(e) = result {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }

    println!("\nShutting down...");
    Ok(())
}
