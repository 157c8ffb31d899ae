//! Normalization of terminal result payloads.
//!
//! The server describes a finished hand through several mutually-exclusive
//! payload shapes: an auto-win flag, a winners list, or nothing at all.
//! [`resolve`] collapses them into at most one [`Outcome`], so a display
//! layer never has to do field-presence archaeology.

use crate::game::entities::{Chips, GameSnapshot, PlayerId};
use crate::net::messages::ResultPayload;

/// Description fixed for wins earned without a showdown.
const AUTO_WIN_DESCRIPTION: &str = "all others folded";

/// One winner's share of a settled hand.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WinnerShare {
    pub player_id: PlayerId,
    /// Display name, falling back to the raw identifier when the snapshot
    /// has no usable name for this player.
    pub name: String,
    /// How the hand was won, e.g. `"Flush"`.
    pub description: String,
    pub winnings: Chips,
}

/// The normalized facts shared by every outcome variant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HandResult {
    /// Headline winnings, taken from the representative winner.
    pub winnings: Chips,
    /// Every winner's share, representative first. Never empty. Shares are
    /// carried through as reported; a tie does not have to split evenly.
    pub winners: Vec<WinnerShare>,
    /// Whether the local viewer appears anywhere among the winners.
    pub involves_viewer: bool,
}

/// How a completed hand was decided.
///
/// Exactly one variant is produced per terminal snapshot with a recognized
/// result payload, enforced by construction in [`resolve`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// All other players folded before a showdown.
    AutoWin(HandResult),
    /// A showdown with a single best hand.
    ShowdownWin(HandResult),
    /// A showdown that split the pot among several winners.
    TieSplit(HandResult),
}

impl Outcome {
    pub fn result(&self) -> &HandResult {
        match self {
            Self::AutoWin(result) | Self::ShowdownWin(result) | Self::TieSplit(result) => result,
        }
    }

    /// The representative winner used for headline display.
    pub fn headline(&self) -> &WinnerShare {
        // Winners are non-empty by construction.
        &self.result().winners[0]
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, Self::TieSplit(_))
    }
}

/// Resolve a terminal snapshot plus its result payload into at most one
/// outcome.
///
/// Priority order, mutually exclusive:
/// 1. an auto-win flag with a winner identifier,
/// 2. a non-empty winners list (a tie iff it has more than one entry),
/// 3. nothing: an absent or unrecognized payload produces no outcome,
///    which callers treat as "no popup", not as an error.
pub fn resolve(
    snapshot: &GameSnapshot,
    result: &ResultPayload,
    viewer: &PlayerId,
) -> Option<Outcome> {
    if !snapshot.phase.is_terminal() {
        return None;
    }

    if result.auto_win && let Some(winner_id) = &result.winner {
        let share = WinnerShare {
            player_id: winner_id.clone(),
            name: display_name(snapshot, winner_id),
            description: AUTO_WIN_DESCRIPTION.to_string(),
            winnings: result.winnings.unwrap_or(0),
        };
        return Some(Outcome::AutoWin(HandResult {
            winnings: share.winnings,
            involves_viewer: winner_id == viewer,
            winners: vec![share],
        }));
    }

    if result.winners.is_empty() {
        return None;
    }

    let winners: Vec<WinnerShare> = result
        .winners
        .iter()
        .map(|entry| WinnerShare {
            player_id: entry.player_id.clone(),
            name: display_name(snapshot, &entry.player_id),
            description: entry.description.clone(),
            winnings: entry.winnings,
        })
        .collect();
    let involves_viewer = winners.iter().any(|share| &share.player_id == viewer);
    let hand = HandResult {
        winnings: winners[0].winnings,
        involves_viewer,
        winners,
    };
    Some(if hand.winners.len() > 1 {
        Outcome::TieSplit(hand)
    } else {
        Outcome::ShowdownWin(hand)
    })
}

fn display_name(snapshot: &GameSnapshot, player_id: &PlayerId) -> String {
    snapshot
        .players
        .get(player_id)
        .map(|player| player.name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| player_id.clone())
}
