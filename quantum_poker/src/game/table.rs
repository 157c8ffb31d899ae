//! Reconciliation of pushed events into one consistent table view.

use log::debug;

use crate::game::entities::{GameSnapshot, LobbySnapshot, PlayerId};
use crate::game::ledger::{GateEvent, TransformationLedger, TransformationRecord};
use crate::game::outcome::{self, Outcome};
use crate::net::messages::{GameUpdate, GatePreview};

/// Client-held state for one table view.
///
/// Snapshots replace held state wholesale; nothing is merged field by field.
/// Re-applying a delivery the transport duplicated therefore leaves the view
/// unchanged: the snapshot is identical, the ledger dedups on content keys,
/// and the outcome only resolves on the transition into the terminal phase.
#[derive(Debug)]
pub struct TableState {
    lobby_id: String,
    viewer: PlayerId,
    game: Option<GameSnapshot>,
    lobby: Option<LobbySnapshot>,
    preview: Option<GatePreview>,
    ledger: TransformationLedger,
    outcome: Option<Outcome>,
}

impl TableState {
    pub fn new(lobby_id: impl Into<String>, viewer: impl Into<PlayerId>) -> Self {
        Self {
            lobby_id: lobby_id.into(),
            viewer: viewer.into(),
            game: None,
            lobby: None,
            preview: None,
            ledger: TransformationLedger::new(),
            outcome: None,
        }
    }

    /// Apply an authoritative game update.
    ///
    /// Clears any pending gate preview unconditionally: a preview is only
    /// valid until the next authoritative update, relevant or not. An
    /// embedded gate application is forwarded to the ledger, and a result
    /// payload accompanying the transition into the terminal phase is
    /// resolved into the table's outcome exactly once.
    pub fn apply_game(&mut self, update: GameUpdate) {
        self.preview = None;

        let GameUpdate { state, result } = update;

        if let Some(result) = &result {
            if result.gate_applied
                && let Some(info) = &result.gate_info
                && let Some(event) = GateEvent::from_info(info)
            {
                let owner = result.player_id.clone().unwrap_or_else(|| self.viewer.clone());
                self.ledger.record(&owner, event, state.phase);
            }

            let was_terminal = self.game.as_ref().is_some_and(|game| game.phase.is_terminal());
            if state.phase.is_terminal() && !was_terminal {
                self.outcome = outcome::resolve(&state, result, &self.viewer);
            }
        }

        if !state.phase.is_terminal() {
            // Next hand: the previous hand's result is no longer current.
            self.outcome = None;
        }

        self.game = Some(state);
    }

    /// Apply a lobby update, ignoring broadcasts for other tables.
    ///
    /// A shared channel can carry several tables' lobby broadcasts; only the
    /// one matching this view's identity replaces the held snapshot.
    pub fn apply_lobby(&mut self, lobby: LobbySnapshot) {
        if lobby.lobby_id != self.lobby_id {
            debug!(
                "ignoring lobby update for {} while viewing {}",
                lobby.lobby_id, self.lobby_id
            );
            return;
        }
        self.lobby = Some(lobby);
    }

    /// Hold a gate preview until the next authoritative update.
    pub fn apply_preview(&mut self, preview: GatePreview) {
        self.preview = Some(preview);
    }

    pub fn lobby_id(&self) -> &str {
        &self.lobby_id
    }

    pub fn viewer(&self) -> &PlayerId {
        &self.viewer
    }

    pub fn game(&self) -> Option<&GameSnapshot> {
        self.game.as_ref()
    }

    pub fn lobby(&self) -> Option<&LobbySnapshot> {
        self.lobby.as_ref()
    }

    pub fn preview(&self) -> Option<&GatePreview> {
        self.preview.as_ref()
    }

    /// The outcome of the current completed hand, if one has resolved.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Gate history for one player, in insertion order.
    pub fn history_for(&self, player: &PlayerId) -> &[TransformationRecord] {
        self.ledger.history_for(player)
    }

    /// Gate history for the local viewer.
    pub fn viewer_history(&self) -> &[TransformationRecord] {
        self.ledger.history_for(&self.viewer)
    }
}
