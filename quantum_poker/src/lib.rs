//! # Quantum Poker
//!
//! Client-side state engine for a real-time quantum poker table.
//!
//! A table view owns one push channel to the server and receives a stream of
//! authoritative snapshots. This library holds everything needed to turn that
//! stream into a single consistent view of the game:
//!
//! - [`game::entities`]: snapshot and lobby data as the server reports them
//! - [`game::table`]: the reconciler that applies snapshots wholesale
//! - [`game::ledger`]: deduplicated per-player gate history
//! - [`game::outcome`]: normalization of "who won and how"
//! - [`game::betting`]: whether the current wagering round is settled
//! - [`net`]: the wire message types and error taxonomy
//!
//! Snapshots replace held state; nothing is merged field by field. The
//! transport may deliver the same snapshot more than once (retry, reconnect,
//! duplicate push) and every consumer here is safe against that.

/// Client-side game state: entities, reconciliation, and derived facts.
pub mod game;
pub use game::{
    betting,
    entities::{self, GameSnapshot, LobbySnapshot, Phase, PlayerId},
    ledger::TransformationLedger,
    outcome::Outcome,
    table::TableState,
};

/// Wire messages and the join-handshake error taxonomy.
pub mod net;
pub use net::{errors::JoinError, messages};
