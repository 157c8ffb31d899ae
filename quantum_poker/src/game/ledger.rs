//! Per-player history of gate applications.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::game::entities::{Card, Phase, PlayerId};
use crate::net::messages::GateInfo;

/// A gate application extracted from a snapshot's result side channel.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GateEvent {
    pub gate: String,
    pub original_card: Card,
    pub result_card: Card,
}

impl GateEvent {
    /// Build an event from wire-side gate info. Returns `None` when the
    /// payload is too incomplete to identify an application.
    pub fn from_info(info: &GateInfo) -> Option<Self> {
        match (&info.original_card, &info.result_card) {
            (Some(original), Some(result)) if !info.gate.is_empty() => Some(Self {
                gate: info.gate.clone(),
                original_card: original.clone(),
                result_card: result.clone(),
            }),
            _ => None,
        }
    }
}

/// Identity of a gate application, compared by value.
///
/// Two deliveries of the same real-world application always share this key,
/// however often the snapshot carrying them is re-pushed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct GateKey {
    pub original_card: Card,
    pub result_card: Card,
    pub gate: String,
    pub phase: Phase,
}

/// One recorded gate application.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransformationRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub gate: String,
    pub original_card: Card,
    pub result_card: Card,
    pub phase: Phase,
}

impl TransformationRecord {
    /// The identifying fields of this record.
    pub fn key(&self) -> GateKey {
        GateKey {
            original_card: self.original_card.clone(),
            result_card: self.result_card.clone(),
            gate: self.gate.clone(),
            phase: self.phase,
        }
    }
}

/// Append-only, per-player, duplicate-free history of gate applications.
///
/// The same authoritative snapshot may be delivered more than once (retry,
/// reconnect, duplicate push); content-keyed dedup keeps each real-world
/// application at exactly one record. Records are never mutated after
/// insertion and live for the life of the table view.
#[derive(Debug, Default)]
pub struct TransformationLedger {
    records: HashMap<PlayerId, Vec<TransformationRecord>>,
    seen: HashMap<PlayerId, HashSet<GateKey>>,
}

impl TransformationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a gate application for `player` during `phase`.
    ///
    /// Re-recording an application already present for that player is a
    /// no-op. Returns whether a new record was appended.
    pub fn record(&mut self, player: &PlayerId, event: GateEvent, phase: Phase) -> bool {
        let key = GateKey {
            original_card: event.original_card.clone(),
            result_card: event.result_card.clone(),
            gate: event.gate.clone(),
            phase,
        };
        if !self.seen.entry(player.clone()).or_default().insert(key) {
            return false;
        }
        self.records
            .entry(player.clone())
            .or_default()
            .push(TransformationRecord {
                id: Uuid::new_v4(),
                timestamp: Utc::now(),
                gate: event.gate,
                original_card: event.original_card,
                result_card: event.result_card,
                phase,
            });
        true
    }

    /// The full history for one player, in insertion order.
    pub fn history_for(&self, player: &PlayerId) -> &[TransformationRecord] {
        self.records.get(player).map(Vec::as_slice).unwrap_or_default()
    }
}
