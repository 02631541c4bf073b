//! End-to-end chat scenarios over loopback TCP

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chat_relay::{ChatClient, ChatServer, ClientConfig, ServerConfig, ServerEvent, TypingState};
use tokio::net::{TcpListener, TcpStream};

async fn start_server(config: ServerConfig) -> (SocketAddr, Arc<ChatServer>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Arc::new(ChatServer::new(config.bind(addr)));

    let serving = Arc::clone(&server);
    tokio::spawn(async move {
        let _ = serving.serve(listener).await;
    });

    (addr, server)
}

async fn connect(addr: SocketAddr, username: &str) -> ChatClient<TcpStream> {
    ChatClient::connect(&ClientConfig::new(username).server(addr))
        .await
        .unwrap()
}

async fn expect(client: &mut ChatClient<TcpStream>) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(2), client.next_event())
        .await
        .expect("timed out waiting for event")
        .unwrap()
        .expect("server closed connection")
}

async fn expect_silence(client: &mut ChatClient<TcpStream>) {
    let next = tokio::time::timeout(Duration::from_millis(150), client.next_event()).await;
    assert!(next.is_err(), "unexpected event: {:?}", next);
}

fn system(text: &str) -> ServerEvent {
    ServerEvent::System(text.to_string())
}

async fn wait_for_connections(server: &ChatServer, count: usize) {
    for _ in 0..200 {
        if server.registry().connection_count().await == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("server never reached {} connections", count);
}

#[tokio::test]
async fn test_leader_mute_scenario() {
    let (addr, server) = start_server(ServerConfig::default()).await;

    let mut a = connect(addr, "A").await;
    assert_eq!(expect(&mut a).await, system("A é o novo líder."));

    let mut b = connect(addr, "B").await;
    assert_eq!(expect(&mut a).await, system("B entrou no chat."));
    expect_silence(&mut b).await;

    a.mute("B").await.unwrap();
    assert_eq!(expect(&mut a).await, system("Usuário B foi mutado pelo líder."));
    assert_eq!(expect(&mut b).await, system("Usuário B foi mutado pelo líder."));

    b.send("hello").await.unwrap();
    assert_eq!(
        expect(&mut b).await,
        system("Você está mutado e não pode enviar mensagens.")
    );
    expect_silence(&mut a).await;

    b.mute("A").await.unwrap();
    assert_eq!(
        expect(&mut b).await,
        system("Apenas o líder pode executar comandos.")
    );
    expect_silence(&mut a).await;
    assert!(!server.registry().is_muted("A").await);
    assert!(server.registry().is_muted("B").await);

    a.unmute("B").await.unwrap();
    assert_eq!(expect(&mut a).await, system("Usuário B foi desmutado pelo líder."));
    assert_eq!(expect(&mut b).await, system("Usuário B foi desmutado pelo líder."));

    // Unmuting again is silent
    a.unmute("B").await.unwrap();
    expect_silence(&mut a).await;
    expect_silence(&mut b).await;
}

#[tokio::test]
async fn test_sync_ack_only_to_sender() {
    let (addr, _server) = start_server(ServerConfig::default()).await;

    let mut a = connect(addr, "A").await;
    expect(&mut a).await;
    let mut b = connect(addr, "B").await;
    expect(&mut a).await;

    let interleaved = b.send_sync_and_wait("ola").await.unwrap();
    assert!(interleaved.is_empty());

    assert_eq!(
        expect(&mut a).await,
        ServerEvent::Sync {
            username: "B".into(),
            text: "ola".into()
        }
    );
    expect_silence(&mut a).await;
    expect_silence(&mut b).await;
}

#[tokio::test]
async fn test_typing_scenario() {
    let (addr, _server) = start_server(ServerConfig::default()).await;

    let mut a = connect(addr, "A").await;
    expect(&mut a).await;
    let mut b = connect(addr, "B").await;
    expect(&mut a).await;

    a.typing_started().await.unwrap();
    assert_eq!(
        expect(&mut b).await,
        ServerEvent::Typing {
            username: "A".into(),
            state: TypingState::Start
        }
    );
    assert!(b.typing().is_typing("A"));

    a.typing_stopped().await.unwrap();
    assert_eq!(
        expect(&mut b).await,
        ServerEvent::Typing {
            username: "A".into(),
            state: TypingState::Stop
        }
    );
    assert!(!b.typing().is_typing("A"));
    expect_silence(&mut a).await;
}

#[tokio::test]
async fn test_leader_departure_leaves_room_leaderless() {
    let (addr, server) = start_server(ServerConfig::default()).await;

    let mut a = connect(addr, "A").await;
    expect(&mut a).await;
    let mut b = connect(addr, "B").await;
    expect(&mut a).await;

    a.close().await.unwrap();
    assert_eq!(expect(&mut b).await, system("A saiu do chat."));
    wait_for_connections(&server, 1).await;
    assert_eq!(server.registry().current_leader().await, None);

    b.mute("A").await.unwrap();
    assert_eq!(
        expect(&mut b).await,
        system("Apenas o líder pode executar comandos.")
    );

    // The next registrant is the first since the room became leaderless
    let mut c = connect(addr, "C").await;
    assert_eq!(expect(&mut c).await, system("C é o novo líder."));
    assert_eq!(expect(&mut b).await, system("C é o novo líder."));
    assert_eq!(expect(&mut b).await, system("C entrou no chat."));
}

#[tokio::test]
async fn test_per_sender_order_preserved() {
    let (addr, _server) = start_server(ServerConfig::default()).await;

    let mut a = connect(addr, "A").await;
    expect(&mut a).await;
    let mut b = connect(addr, "B").await;
    expect(&mut a).await;

    for i in 0..50 {
        b.send(&format!("msg {}", i)).await.unwrap();
    }

    for i in 0..50 {
        assert_eq!(
            expect(&mut a).await,
            ServerEvent::Async {
                username: "B".into(),
                text: format!("msg {}", i)
            }
        );
    }
}

#[tokio::test]
async fn test_connection_limit() {
    let (addr, server) = start_server(ServerConfig::default().max_connections(1)).await;

    let mut a = connect(addr, "A").await;
    expect(&mut a).await;

    let mut b = connect(addr, "B").await;
    let next = tokio::time::timeout(Duration::from_secs(2), b.next_event())
        .await
        .expect("rejected connection was not closed");
    assert!(!matches!(next, Ok(Some(_))), "unexpected event: {:?}", next);

    assert_eq!(server.registry().connection_count().await, 1);
    expect_silence(&mut a).await;
}
