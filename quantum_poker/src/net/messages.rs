use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::entities::{Card, Chips, GameSnapshot, LobbySnapshot, Phase, PlayerId};

/// A betting action a player can take on their turn.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Raise,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Fold => "fold",
            Self::Check => "check",
            Self::Call => "call",
            Self::Raise => "raise",
        };
        write!(f, "{repr}")
    }
}

/// A quantum gate a player can apply to their hole cards.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Gate {
    X,
    Z,
    #[serde(rename = "CNOT")]
    Cnot,
}

impl Gate {
    /// How many hole cards the gate operates on.
    pub fn arity(self) -> usize {
        match self {
            Self::X | Self::Z => 1,
            Self::Cnot => 2,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::X => "X",
            Self::Z => "Z",
            Self::Cnot => "CNOT",
        };
        write!(f, "{repr}")
    }
}

/// A message from the client to the table, indicating a user intent.
///
/// Intents are sent as-is; there is no client-side queueing or buffering.
/// The caller is responsible for the game state permitting the action.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientIntent {
    /// Enter a lobby's room, identifying the viewer.
    Join {
        lobby_id: String,
        player_id: PlayerId,
        name: String,
    },
    /// Ask the server to start the game.
    StartGame { lobby_id: String },
    /// Take a betting action; raises carry the raise-to amount.
    Action {
        lobby_id: String,
        player_id: PlayerId,
        action: ActionKind,
        amount: Chips,
    },
    /// Apply (or preview) a gate on the viewer's hole cards.
    ApplyGate {
        lobby_id: String,
        player_id: PlayerId,
        gate: Gate,
        card_indices: Vec<usize>,
        preview_only: bool,
    },
}

/// A message pushed from the server to every subscriber of a table.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// An authoritative game snapshot, with an optional result payload.
    GameUpdate(GameUpdate),
    /// An authoritative lobby snapshot.
    LobbyUpdate(LobbySnapshot),
    /// The outcome of a preview-only gate request, sent only to the
    /// requesting player.
    GatePreview(GatePreview),
    /// A failure, described by a free-form detail string.
    Error(ErrorDetail),
}

/// Payload of a `game_update` event.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct GameUpdate {
    #[serde(default)]
    pub state: GameSnapshot,
    #[serde(default)]
    pub result: Option<ResultPayload>,
}

/// Payload of a `gate_preview` event.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct GatePreview {
    #[serde(default)]
    pub preview: bool,
    #[serde(default)]
    pub gate_info: Option<GateInfo>,
}

/// Payload of an `error` event.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: String,
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.detail)
    }
}

/// The result side-channel of a game update.
///
/// The server reuses one bag of fields for every kind of result: betting
/// acknowledgements, dealt streets, gate applications, auto-wins and
/// showdowns. Every field is optional and unrecognized combinations are
/// simply not acted on; a malformed result never fails reconciliation.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ResultPayload {
    /// Set when the hand ended because all but one player withdrew.
    #[serde(default)]
    pub auto_win: bool,
    /// The auto-win winner's identifier.
    #[serde(default)]
    pub winner: Option<PlayerId>,
    /// The auto-win winner's display name as the server knows it.
    #[serde(default)]
    pub winner_name: Option<String>,
    /// Chips awarded to the auto-win winner.
    #[serde(default)]
    pub winnings: Option<Chips>,
    /// Showdown winners, best hand first. More than one entry means a tie.
    #[serde(default)]
    pub winners: Vec<WinnerEntry>,
    /// Human-readable summary line, when the server offers one.
    #[serde(default)]
    pub message: Option<String>,
    /// The player a betting or gate result refers to.
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    #[serde(default)]
    pub betting_round_complete: Option<bool>,
    #[serde(default)]
    pub next_phase: Option<Phase>,
    #[serde(default)]
    pub next_player: Option<PlayerId>,
    /// Set when this update carries a gate application.
    #[serde(default)]
    pub gate_applied: bool,
    #[serde(default)]
    pub gate_info: Option<GateInfo>,
}

/// One showdown winner's entry in a result payload.
///
/// Winnings are carried through as reported; side pots can split a tie
/// unevenly and the client never recomputes a share.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct WinnerEntry {
    #[serde(default)]
    pub player_id: PlayerId,
    #[serde(default)]
    pub hand_rank: Option<u8>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub winnings: Chips,
}

/// Details of one gate application as reported by the server.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct GateInfo {
    #[serde(default)]
    pub gate: String,
    #[serde(default)]
    pub original_card: Option<Card>,
    #[serde(default)]
    pub result_card: Option<Card>,
    #[serde(default)]
    pub qubit_flipped: Option<i32>,
    /// Whether the resulting quantum state no longer decodes to a card.
    #[serde(default)]
    pub is_undefined: bool,
}
