//! Terminal chat client
//!
//! Run with: cargo run --example chat_client -- USERNAME [SERVER_ADDR] [--sync]
//!
//! Type a line and press enter to send it. Lines starting with `/` are
//! commands (`/mute <user>`, `/unmute <user>`, leader only). With `--sync`
//! every message waits for the server's ACK before the next one is accepted.

use std::net::SocketAddr;

use chat_relay::{ChatClient, ClientConfig, Error, MessageMode, ProtocolError, ServerEvent};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let sync = args.iter().any(|a| a == "--sync");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    let Some(username) = positional.first() else {
        eprintln!("Usage: chat_client USERNAME [SERVER_ADDR] [--sync]");
        std::process::exit(1);
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chat_relay=warn".parse()?),
        )
        .init();

    let mut config = ClientConfig::new(username.as_str());
    if let Some(addr) = positional.get(1) {
        config = config.server(addr.parse::<SocketAddr>()?);
    }
    if sync {
        config = config.mode(MessageMode::Sync);
    }

    let mut client = ChatClient::connect(&config).await?;
    println!("Connected to {} as {}", config.server_addr, client.username());

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            input = stdin.next_line() => {
                let Some(input) = input? else { break };

                match client.send(&input).await {
                    Ok(()) if client.is_awaiting_ack() => println!("[waiting for ACK...]"),
                    Ok(()) => {}
                    Err(Error::Protocol(ProtocolError::AckPending)) => {
                        println!("[still waiting for ACK, message not sent]");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            event = client.next_event() => {
                let Some(event) = event? else {
                    println!("Connection to server lost.");
                    break;
                };

                match event {
                    ServerEvent::Ack => println!("[ACK received]"),
                    ServerEvent::Typing { .. } => {
                        if let Some(status) = client.typing().status_line() {
                            println!("({})", status);
                        }
                    }
                    ServerEvent::System(text) => println!("[SISTEMA] {}", text),
                    ServerEvent::Sync { username, text } => {
                        println!("[SYNC] {}: {}", username, text)
                    }
                    ServerEvent::Async { username, text } => println!("{}: {}", username, text),
                    ServerEvent::Plain(line) => println!("{}", line),
                }
            }
        }
    }

    client.close().await?;
    Ok(())
}
