use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

/// Stable identifier the server assigns a player for the lifetime of a
/// table. Identifiers are never reused within a table view.
pub type PlayerId = String;

/// Whole chips. All bets and stacks are non-negative whole amounts.
pub type Chips = u32;

/// A card as rendered by the server, e.g. `"A♥"` or `"7♣"`.
///
/// Quantum cards can collapse into labels the client has no rules for
/// (an undefined state renders as `"??"`), so cards stay opaque strings on
/// this side of the wire and are never parsed.
pub type Card = String;

/// Phase of the hand as reported in a game snapshot.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Waiting,
    Dealing,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    Complete,
}

impl Phase {
    /// Whether the hand has finished. Only terminal snapshots may carry a
    /// result payload worth resolving.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Dealing => "dealing",
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
            Self::Complete => "complete",
        };
        write!(f, "{repr}")
    }
}

/// One player's public state within a game snapshot.
///
/// `hole_cards` is only populated for the viewer's own record; the server
/// never reveals another player's live cards.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerView {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub chips: Chips,
    #[serde(default)]
    pub hole_cards: Vec<Card>,
    #[serde(default)]
    pub is_dealer: bool,
    #[serde(default)]
    pub is_small_blind: bool,
    #[serde(default)]
    pub is_big_blind: bool,
    /// False once the player has folded or been eliminated.
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub gates_used_this_round: u8,
    #[serde(default)]
    pub gates_used_this_game: u8,
    #[serde(default)]
    pub cards_collapsed: bool,
    /// Whether the server will currently accept a gate from this player.
    #[serde(default)]
    pub can_apply_gate: bool,
}

/// One player's wagering state for the current betting round.
///
/// `has_acted` resets at the start of every round, so it only means anything
/// relative to the snapshot it arrived in.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct BettingView {
    #[serde(default)]
    pub chips: Chips,
    #[serde(default)]
    pub bet_this_round: Chips,
    #[serde(default)]
    pub total_bet_in_pot: Chips,
    #[serde(default)]
    pub is_all_in: bool,
    #[serde(default)]
    pub has_folded: bool,
    #[serde(default)]
    pub has_acted: bool,
    #[serde(default)]
    pub can_check: bool,
    #[serde(default)]
    pub can_call: bool,
    #[serde(default)]
    pub can_raise: bool,
    #[serde(default)]
    pub call_amount: Chips,
    #[serde(default)]
    pub min_raise: Chips,
}

/// The wagering sub-state of a game snapshot.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct BettingState {
    #[serde(default)]
    pub current_bet: Chips,
    #[serde(default)]
    pub minimum_raise: Chips,
    #[serde(default)]
    pub total_pot: Chips,
    #[serde(default)]
    pub current_round: String,
    #[serde(default)]
    pub players: HashMap<PlayerId, BettingView>,
}

/// The complete authoritative game state pushed by the server.
///
/// Immutable once received; a new snapshot replaces the previous one
/// wholesale. There is no field-level merging anywhere in the client.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameSnapshot {
    #[serde(default)]
    pub hand_number: u32,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub dealer_position: usize,
    #[serde(default)]
    pub current_player: Option<PlayerId>,
    #[serde(default)]
    pub pot: Chips,
    #[serde(default)]
    pub current_bet: Chips,
    #[serde(default)]
    pub community_cards: Vec<Card>,
    #[serde(default)]
    pub players: HashMap<PlayerId, PlayerView>,
    #[serde(default)]
    pub betting_state: BettingState,
}

impl GameSnapshot {
    /// The viewer's own record, if seated at this table.
    pub fn player(&self, player_id: &PlayerId) -> Option<&PlayerView> {
        self.players.get(player_id)
    }

    /// Players in seating order.
    pub fn seats(&self) -> Vec<(&PlayerId, &PlayerView)> {
        let mut seats: Vec<_> = self.players.iter().collect();
        seats.sort_by_key(|(_, player)| player.position);
        seats
    }
}

/// The authoritative lobby state pushed by the server.
///
/// `players` and `waiting_players` are disjoint: whoever joins while a game
/// is running waits until the next hand promotes them.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct LobbySnapshot {
    #[serde(default)]
    pub lobby_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub max_players: u8,
    #[serde(default)]
    pub players: Vec<PlayerId>,
    #[serde(default)]
    pub waiting_players: Vec<PlayerId>,
    #[serde(default)]
    pub player_names: HashMap<PlayerId, String>,
    #[serde(default)]
    pub waiting_player_names: HashMap<PlayerId, String>,
    #[serde(default)]
    pub in_game: bool,
    #[serde(default)]
    pub game_id: Option<String>,
}

impl LobbySnapshot {
    /// Display name for a lobby member, falling back to the raw identifier.
    pub fn name_of<'a>(&'a self, player_id: &'a PlayerId) -> &'a str {
        self.player_names
            .get(player_id)
            .or_else(|| self.waiting_player_names.get(player_id))
            .map(String::as_str)
            .unwrap_or(player_id)
    }
}
