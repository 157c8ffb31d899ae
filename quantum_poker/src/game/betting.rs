//! Settlement check for the current wagering round.

use crate::game::entities::BettingState;

/// Whether the current betting round has been settled.
///
/// Players still contesting the pot are those who have neither folded nor
/// gone all-in. With at most one contester left there is nothing to decide;
/// otherwise the round is settled once every contester has acted.
///
/// `has_acted` flags are snapshot-local and reset every round, so the answer
/// must be recomputed from each snapshot and never cached.
pub fn is_round_complete(betting: &BettingState) -> bool {
    let contesting: Vec<_> = betting
        .players
        .values()
        .filter(|player| !player.has_folded && !player.is_all_in)
        .collect();
    if contesting.len() <= 1 {
        return true;
    }
    contesting.into_iter().all(|player| player.has_acted)
}
