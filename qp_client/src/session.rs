//! Push-channel session for one table view.
//!
//! A [`TableSession`] owns the websocket for the lifetime of a table view:
//! it emits the join handshake with its one-shot retry, translates user
//! intents into outgoing frames, and fans incoming frames out to the view's
//! subscriber. Dropping the session tears everything down, so every exit
//! path of the owning view (normal close, error, or navigation) releases
//! the channel and the retry timer deterministically.

use anyhow::{Context, Result, anyhow};
use futures_util::{SinkExt, StreamExt};
use log::{debug, warn};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use quantum_poker::game::entities::{LobbySnapshot, PlayerId};
use quantum_poker::net::errors::JoinError;
use quantum_poker::net::messages::{ClientIntent, GameUpdate, GatePreview, ServerEvent};

/// How long to wait before re-emitting the join intent once.
///
/// Covers the race where the join reaches the server before the room is
/// provisioned; the server joins already-joined players gracefully, so the
/// duplicate is harmless when the first join landed.
pub const JOIN_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Event delivered to the table view's subscriber.
///
/// Transient join-handshake errors and malformed frames never appear here;
/// the session swallows them.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// An authoritative game snapshot, with its optional result payload.
    Game(GameUpdate),
    /// An authoritative lobby snapshot.
    Lobby(LobbySnapshot),
    /// An ephemeral gate preview for the viewer.
    Preview(GatePreview),
    /// A server error worth showing but not fatal to the view.
    Notice(String),
    /// A permanent rejection; this table view cannot continue.
    Fatal(JoinError),
    /// The server closed the channel.
    Closed,
}

/// One owned push channel per table view.
pub struct TableSession {
    outgoing: mpsc::UnboundedSender<ClientIntent>,
    tasks: Vec<JoinHandle<()>>,
}

impl TableSession {
    /// Connect to `ws_url` and immediately emit the join intent for
    /// `lobby_id` as `viewer`.
    ///
    /// Returns the session handle and the subscriber end of the event
    /// stream.
    pub async fn open(
        ws_url: &str,
        lobby_id: &str,
        viewer: &PlayerId,
        name: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SessionEvent>)> {
        let (stream, _) = connect_async(ws_url)
            .await
            .context("failed to connect to table channel")?;
        let (mut write, mut read) = stream.split();

        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<ClientIntent>();
        let (events, events_rx) = mpsc::unbounded_channel::<SessionEvent>();

        // Writer pump: serialize intents onto the socket in send order.
        let writer = tokio::spawn(async move {
            while let Some(intent) = outgoing_rx.recv().await {
                let frame = match serde_json::to_string(&intent) {
                    Ok(frame) => frame,
                    Err(error) => {
                        warn!("dropping unserializable intent: {error}");
                        continue;
                    }
                };
                if write.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }
        });

        let join = ClientIntent::Join {
            lobby_id: lobby_id.to_string(),
            player_id: viewer.clone(),
            name: name.to_string(),
        };
        outgoing
            .send(join.clone())
            .map_err(|_| anyhow!("table channel closed before join"))?;

        // One-shot retry: re-emit the join after the delay unless a
        // permanent error or close cancels it first.
        let retry_outgoing = outgoing.clone();
        let retry = tokio::spawn(async move {
            tokio::time::sleep(JOIN_RETRY_DELAY).await;
            let _ = retry_outgoing.send(join);
        });
        let retry_abort = retry.abort_handle();

        // Reader pump: classify incoming frames and fan them out.
        let reader = tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        let event = match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => event,
                            Err(error) => {
                                // Malformed frames degrade to nothing.
                                debug!("ignoring unparseable frame: {error}");
                                continue;
                            }
                        };
                        match event {
                            ServerEvent::GameUpdate(update) => {
                                let _ = events.send(SessionEvent::Game(update));
                            }
                            ServerEvent::LobbyUpdate(lobby) => {
                                let _ = events.send(SessionEvent::Lobby(lobby));
                            }
                            ServerEvent::GatePreview(preview) => {
                                let _ = events.send(SessionEvent::Preview(preview));
                            }
                            ServerEvent::Error(error) => {
                                match JoinError::classify(&error.detail) {
                                    Some(join_error) if join_error.is_permanent() => {
                                        retry_abort.abort();
                                        let _ = events.send(SessionEvent::Fatal(join_error));
                                    }
                                    Some(_) => {
                                        warn!("transient table error: {}", error.detail);
                                    }
                                    None => {
                                        let _ = events.send(SessionEvent::Notice(error.detail));
                                    }
                                }
                            }
                        }
                    }
                    Ok(Message::Close(_)) | Err(_) => break,
                    _ => {}
                }
            }
            // Stream ended, cleanly or not.
            let _ = events.send(SessionEvent::Closed);
        });

        Ok((
            Self {
                outgoing,
                tasks: vec![writer, retry, reader],
            },
            events_rx,
        ))
    }

    /// Transmit an intent.
    ///
    /// There is no client-side queueing or state checking; the caller is
    /// responsible for the game state permitting the action.
    pub fn send(&self, intent: ClientIntent) -> Result<()> {
        self.outgoing
            .send(intent)
            .map_err(|_| anyhow!("table channel closed"))
    }

    /// Tear the session down: retry timer, pumps, and subscriptions.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for TableSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
