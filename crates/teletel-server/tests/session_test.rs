//! Whole sessions driven over in-memory pipes, plus one real TCP round trip.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use teletel_proto::parity;
use teletel_server::{
    ChatMessage, ChatRegistration, ChatRoom, HandlerRegistry, Server, ServerConfig, ServerState,
    Session, SessionEnd, SessionError,
};
use teletel_terminal::Terminal;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

const ENVOI: [u8; 2] = [0x13, 0x41];
const CONNEXION_FIN: [u8; 2] = [0x13, 0x49];

/// Time for a fresh session to get through connection detection and the
/// first-read drain, with margin.
const SETTLE: Duration = Duration::from_millis(700);

fn shared_state(pages_root: &Path) -> Arc<ServerState> {
    let chat = ChatRoom::new();
    Arc::new(ServerState {
        pages_root: pages_root.to_path_buf(),
        handlers: HandlerRegistry::builtin(Arc::clone(&chat)),
        chat,
        pacing: None,
    })
}

async fn type_keys(remote: &mut (impl AsyncWrite + Unpin), text: &str, keys: &[&[u8]]) {
    let mut bytes: Vec<u8> = text.bytes().collect();
    for key in keys {
        bytes.extend_from_slice(key);
    }
    remote.write_all(&parity::encode_all(&bytes)).await.unwrap();
}

async fn wait_for(mut reached: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !reached() {
        assert!(tokio::time::Instant::now() < deadline, "condition not reached in time");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn drain_until(registration: &ChatRegistration, count: usize) -> Vec<ChatMessage> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    let mut collected = Vec::new();
    while collected.len() < count && tokio::time::Instant::now() < deadline {
        collected.extend(registration.drain());
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    collected
}

#[tokio::test]
async fn connexion_fin_ends_the_session_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("3615")).unwrap();
    let state = shared_state(dir.path());

    let (local, mut remote) = tokio::io::duplex(64 * 1024);
    let running = tokio::spawn(Session::new(Terminal::new(local), 3615, state).run());

    tokio::time::sleep(SETTLE).await;
    type_keys(&mut remote, "", &[&CONNEXION_FIN]).await;

    assert_eq!(running.await.unwrap().unwrap(), SessionEnd::UserRequested);
}

#[tokio::test]
async fn peer_disconnect_is_reported_as_clean() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("3615")).unwrap();
    let state = shared_state(dir.path());

    let (local, remote) = tokio::io::duplex(64 * 1024);
    let running = tokio::spawn(Session::new(Terminal::new(local), 3615, state).run());

    tokio::time::sleep(SETTLE).await;
    drop(remote);

    assert_eq!(running.await.unwrap().unwrap(), SessionEnd::Disconnected);
}

#[tokio::test]
async fn unknown_handler_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let service_dir = dir.path().join("3615");
    std::fs::create_dir_all(&service_dir).unwrap();
    std::fs::write(service_dir.join("3615.toml"), "handler = \"mystery\"\n").unwrap();
    let state = shared_state(dir.path());

    // Keep the remote end alive; the failure must come from the descriptor,
    // not from a closed pipe.
    let (local, _remote) = tokio::io::duplex(64 * 1024);
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        Session::new(Terminal::new(local), 3615, state).run(),
    )
    .await
    .expect("session never finished");

    match result.unwrap_err() {
        SessionError::Config(reason) => assert!(reason.contains("mystery")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn chat_sessions_deregister_on_disconnect() {
    let dir = tempfile::tempdir().unwrap();
    let service_dir = dir.path().join("3615");
    std::fs::create_dir_all(&service_dir).unwrap();
    std::fs::write(
        service_dir.join("3615.toml"),
        concat!("handler = \"chat\"\n", "[[forms]]\nlocation = [21, 1]\nlength = 30\n"),
    )
    .unwrap();
    let state = shared_state(dir.path());

    let (local, remote) = tokio::io::duplex(64 * 1024);
    let running =
        tokio::spawn(Session::new(Terminal::new(local), 3615, Arc::clone(&state)).run());

    let joined_state = Arc::clone(&state);
    wait_for(move || joined_state.chat.client_count() == 1).await;

    drop(remote);
    assert_eq!(running.await.unwrap().unwrap(), SessionEnd::Disconnected);

    let left_state = Arc::clone(&state);
    wait_for(move || left_state.chat.client_count() == 0).await;
}

#[tokio::test]
async fn username_travels_from_ulla_to_the_chat_room() {
    let dir = tempfile::tempdir().unwrap();
    let service_dir = dir.path().join("3615");
    std::fs::create_dir_all(service_dir.join("ulla/chat")).unwrap();
    std::fs::write(
        service_dir.join("3615.toml"),
        concat!("handler = \"ulla\"\n", "[[forms]]\nlocation = [10, 2]\nlength = 10\n"),
    )
    .unwrap();
    std::fs::write(
        service_dir.join("ulla/chat/chat.toml"),
        concat!("handler = \"chat\"\n", "[[forms]]\nlocation = [21, 1]\nlength = 30\n"),
    )
    .unwrap();

    let state = shared_state(dir.path());
    let probe = state.chat.register();

    let (local, mut remote) = tokio::io::duplex(64 * 1024);
    let running =
        tokio::spawn(Session::new(Terminal::new(local), 3615, Arc::clone(&state)).run());

    tokio::time::sleep(SETTLE).await;
    type_keys(&mut remote, "anna", &[&ENVOI]).await;

    // The probe plus the session's chat handler.
    let joined_state = Arc::clone(&state);
    wait_for(move || joined_state.chat.client_count() == 2).await;

    type_keys(&mut remote, "salut", &[&ENVOI]).await;
    let seen = drain_until(&probe, 1).await;
    assert_eq!(
        seen,
        vec![ChatMessage { author: "anna".to_string(), body: "salut".to_string() }]
    );

    drop(remote);
    assert_eq!(running.await.unwrap().unwrap(), SessionEnd::Disconnected);

    let left_state = Arc::clone(&state);
    wait_for(move || left_state.chat.client_count() == 1).await;
}

#[tokio::test]
async fn server_accepts_tcp_and_honours_connexion_fin() {
    let dir = tempfile::tempdir().unwrap();
    // Service 0 binds an ephemeral port, so the test never collides.
    std::fs::create_dir_all(dir.path().join("0")).unwrap();

    let config = ServerConfig { pages_dir: dir.path().to_path_buf(), simulate_baud: false };
    let server = Server::bind("127.0.0.1", &config).await.unwrap();
    let addr = server.local_addrs()[0].1;
    tokio::spawn(server.run());

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    tokio::time::sleep(SETTLE).await;
    stream.write_all(&parity::encode_all(&CONNEXION_FIN)).await.unwrap();

    // The server tears the connection down once the session ends.
    let mut sink = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut sink))
        .await
        .expect("server never closed the connection")
        .unwrap();
}
