//! Integration tests for the table session.
//!
//! Tests the join handshake, the one-shot retry policy, error
//! classification, and teardown against an in-process websocket server.

use futures_util::{SinkExt, StreamExt};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use qp_client::session::{JOIN_RETRY_DELAY, SessionEvent, TableSession};
use quantum_poker::game::entities::{GameSnapshot, LobbySnapshot, Phase};
use quantum_poker::net::errors::JoinError;
use quantum_poker::net::messages::{ClientIntent, ErrorDetail, GameUpdate, ServerEvent};

/// A single-connection websocket server. Every intent frame it receives is
/// forwarded on the returned channel with its arrival time; every raw text
/// frame pushed on the outgoing channel is sent down to the client.
/// Dropping the push sender closes the connection.
async fn spawn_table_server() -> (
    String,
    mpsc::UnboundedReceiver<(Instant, ClientIntent)>,
    mpsc::UnboundedSender<String>,
) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (seen_tx, seen_rx) = mpsc::unbounded_channel();
    let (push_tx, mut push_rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let (mut write, mut read) = ws.split();
        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(intent) = serde_json::from_str::<ClientIntent>(&text) {
                            let _ = seen_tx.send((Instant::now(), intent));
                        }
                    }
                    Some(Ok(_)) => {}
                    _ => break,
                },
                frame = push_rx.recv() => match frame {
                    Some(frame) => {
                        if write.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
    });

    (format!("ws://{addr}"), seen_rx, push_tx)
}

/// Collect every intent the server sees within `window`.
async fn collect_intents(
    seen: &mut mpsc::UnboundedReceiver<(Instant, ClientIntent)>,
    window: Duration,
) -> Vec<(Instant, ClientIntent)> {
    let mut intents = Vec::new();
    let deadline = Instant::now() + window;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, seen.recv()).await {
            Ok(Some(intent)) => intents.push(intent),
            _ => break,
        }
    }
    intents
}

fn is_join(intent: &ClientIntent) -> bool {
    matches!(intent, ClientIntent::Join { .. })
}

fn frame(event: &ServerEvent) -> String {
    serde_json::to_string(event).unwrap()
}

fn game_update(phase: Phase) -> ServerEvent {
    ServerEvent::GameUpdate(GameUpdate {
        state: GameSnapshot {
            phase,
            ..GameSnapshot::default()
        },
        result: None,
    })
}

fn error_event(detail: &str) -> ServerEvent {
    ServerEvent::Error(ErrorDetail {
        detail: detail.to_string(),
    })
}

// ============================================================================
// Join Handshake Tests
// ============================================================================

#[tokio::test]
async fn test_join_emitted_immediately() {
    let (url, mut seen, _push) = spawn_table_server().await;
    let opened = Instant::now();
    let (_session, _events) = TableSession::open(&url, "l1", &"p1".to_string(), "Alice")
        .await
        .unwrap();

    let (at, intent) = timeout(Duration::from_millis(500), seen.recv())
        .await
        .expect("join should arrive promptly")
        .unwrap();
    assert!(at.duration_since(opened) < Duration::from_millis(500));
    let ClientIntent::Join {
        lobby_id,
        player_id,
        name,
    } = intent
    else {
        panic!("first frame should be the join intent");
    };
    assert_eq!(lobby_id, "l1");
    assert_eq!(player_id, "p1");
    assert_eq!(name, "Alice");
}

#[tokio::test]
async fn test_join_retried_exactly_once() {
    let (url, mut seen, _push) = spawn_table_server().await;
    let opened = Instant::now();
    let (_session, _events) = TableSession::open(&url, "l1", &"p1".to_string(), "Alice")
        .await
        .unwrap();

    // Watch well past the retry window; there must be the immediate join
    // plus exactly one retry, at or after the delay.
    let intents = collect_intents(&mut seen, JOIN_RETRY_DELAY * 2).await;
    let joins: Vec<_> = intents.iter().filter(|(_, i)| is_join(i)).collect();
    assert_eq!(joins.len(), 2, "expected the initial join and one retry");
    let retry_after = joins[1].0.duration_since(opened);
    assert!(
        retry_after >= JOIN_RETRY_DELAY - Duration::from_millis(50),
        "retry fired too early: {retry_after:?}"
    );
}

#[tokio::test]
async fn test_close_cancels_pending_retry() {
    let (url, mut seen, _push) = spawn_table_server().await;
    let (session, _events) = TableSession::open(&url, "l1", &"p1".to_string(), "Alice")
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    session.close();

    let intents = collect_intents(&mut seen, JOIN_RETRY_DELAY + Duration::from_millis(400)).await;
    let joins = intents.iter().filter(|(_, i)| is_join(i)).count();
    assert_eq!(joins, 1, "no retry may fire after close");
}

#[tokio::test]
async fn test_dropping_the_session_cancels_retry() {
    let (url, mut seen, _push) = spawn_table_server().await;
    let (session, _events) = TableSession::open(&url, "l1", &"p1".to_string(), "Alice")
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(session);

    let intents = collect_intents(&mut seen, JOIN_RETRY_DELAY + Duration::from_millis(400)).await;
    let joins = intents.iter().filter(|(_, i)| is_join(i)).count();
    assert_eq!(joins, 1, "no retry may fire after the session is dropped");
}

// ============================================================================
// Error Classification Tests
// ============================================================================

#[tokio::test]
async fn test_permanent_error_cancels_retry_and_surfaces() {
    let (url, mut seen, push) = spawn_table_server().await;
    let (_session, mut events) = TableSession::open(&url, "l1", &"p1".to_string(), "Alice")
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    push.send(frame(&error_event("Game already started"))).unwrap();

    let event = timeout(Duration::from_millis(500), events.recv())
        .await
        .expect("fatal error should surface")
        .unwrap();
    assert_eq!(event, SessionEvent::Fatal(JoinError::GameInProgress));

    let intents = collect_intents(&mut seen, JOIN_RETRY_DELAY + Duration::from_millis(400)).await;
    let joins = intents.iter().filter(|(_, i)| is_join(i)).count();
    assert_eq!(joins, 1, "a permanent error must cancel the retry");
}

#[tokio::test]
async fn test_transient_error_is_swallowed() {
    // Scenario: "Lobby not found" at ~200ms, a valid game update at ~900ms.
    // Nothing error-like may surface and the update must come through.
    let (url, mut seen, push) = spawn_table_server().await;
    let (_session, mut events) = TableSession::open(&url, "l1", &"p1".to_string(), "Alice")
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    push.send(frame(&error_event("Lobby not found"))).unwrap();
    tokio::time::sleep(Duration::from_millis(700)).await;
    push.send(frame(&game_update(Phase::Preflop))).unwrap();

    let mut delivered = Vec::new();
    let deadline = Instant::now() + Duration::from_millis(600);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, events.recv()).await {
            Ok(Some(event)) => delivered.push(event),
            _ => break,
        }
    }

    assert!(
        delivered
            .iter()
            .all(|event| !matches!(event, SessionEvent::Fatal(_) | SessionEvent::Notice(_))),
        "transient errors must not surface: {delivered:?}"
    );
    assert!(
        delivered
            .iter()
            .any(|event| matches!(event, SessionEvent::Game(_))),
        "the game update must be delivered"
    );

    // The transient error suppresses nothing: the initial join plus at most
    // the single retry.
    let intents = collect_intents(&mut seen, Duration::from_millis(400)).await;
    let joins = intents.iter().filter(|(_, i)| is_join(i)).count();
    assert!(joins <= 2, "never more than one retry");
}

#[tokio::test]
async fn test_unknown_error_surfaces_as_notice() {
    let (url, _seen, push) = spawn_table_server().await;
    let (_session, mut events) = TableSession::open(&url, "l1", &"p1".to_string(), "Alice")
        .await
        .unwrap();

    push.send(frame(&error_event("Not p1's turn. Current player: p2")))
        .unwrap();

    let event = timeout(Duration::from_millis(500), events.recv())
        .await
        .expect("notice should surface")
        .unwrap();
    assert_eq!(
        event,
        SessionEvent::Notice("Not p1's turn. Current player: p2".to_string())
    );
}

// ============================================================================
// Event Fan-out Tests
// ============================================================================

#[tokio::test]
async fn test_events_arrive_in_delivery_order() {
    let (url, _seen, push) = spawn_table_server().await;
    let (_session, mut events) = TableSession::open(&url, "l1", &"p1".to_string(), "Alice")
        .await
        .unwrap();

    push.send(frame(&ServerEvent::LobbyUpdate(LobbySnapshot {
        lobby_id: "l1".to_string(),
        ..LobbySnapshot::default()
    })))
    .unwrap();
    push.send(frame(&game_update(Phase::Preflop))).unwrap();
    push.send(frame(&game_update(Phase::Flop))).unwrap();

    let mut order = Vec::new();
    for _ in 0..3 {
        let event = timeout(Duration::from_millis(500), events.recv())
            .await
            .expect("event should arrive")
            .unwrap();
        match event {
            SessionEvent::Lobby(lobby) => order.push(format!("lobby:{}", lobby.lobby_id)),
            SessionEvent::Game(update) => order.push(format!("game:{}", update.state.phase)),
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert_eq!(order, vec!["lobby:l1", "game:preflop", "game:flop"]);
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let (url, _seen, push) = spawn_table_server().await;
    let (_session, mut events) = TableSession::open(&url, "l1", &"p1".to_string(), "Alice")
        .await
        .unwrap();

    // Garbage and unknown event shapes are dropped silently; the next
    // well-formed event still comes through.
    push.send("{ not json".to_string()).unwrap();
    push.send(r#"{"event": "unknown_thing", "data": 1}"#.to_string()).unwrap();
    push.send(frame(&game_update(Phase::Preflop))).unwrap();

    let event = timeout(Duration::from_millis(500), events.recv())
        .await
        .expect("well-formed event should arrive")
        .unwrap();
    assert!(matches!(event, SessionEvent::Game(_)));
}

#[tokio::test]
async fn test_server_close_is_delivered() {
    let (url, _seen, push) = spawn_table_server().await;
    let (_session, mut events) = TableSession::open(&url, "l1", &"p1".to_string(), "Alice")
        .await
        .unwrap();

    // Dropping the push sender makes the server hang up.
    drop(push);

    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, events.recv()).await {
            Ok(Some(SessionEvent::Closed)) => break,
            Ok(Some(_)) => continue,
            _ => panic!("expected a Closed event"),
        }
    }
}

#[tokio::test]
async fn test_intents_are_relayed() {
    let (url, mut seen, _push) = spawn_table_server().await;
    let (session, _events) = TableSession::open(&url, "l1", &"p1".to_string(), "Alice")
        .await
        .unwrap();

    session
        .send(ClientIntent::StartGame {
            lobby_id: "l1".to_string(),
        })
        .unwrap();

    let intents = collect_intents(&mut seen, Duration::from_millis(500)).await;
    assert!(
        intents
            .iter()
            .any(|(_, intent)| matches!(intent, ClientIntent::StartGame { lobby_id } if lobby_id == "l1")),
        "the start intent should reach the server"
    );
}
