//! Plain-text rendering of table state.

use chrono::Local;
use std::fmt::Write;

use quantum_poker::game::betting;
use quantum_poker::game::entities::{GameSnapshot, LobbySnapshot, PlayerId};
use quantum_poker::game::ledger::TransformationRecord;
use quantum_poker::game::outcome::Outcome;
use quantum_poker::net::messages::GatePreview;

const RULE_WIDTH: usize = 72;

/// Timestamp prefix for transcript lines.
pub fn stamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Render a game snapshot for the viewer.
pub fn render_game(view: &GameSnapshot, viewer: &PlayerId) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "═".repeat(RULE_WIDTH));
    let _ = writeln!(
        out,
        "HAND #{}  [{}]  pot ${}  to call ${}",
        view.hand_number, view.phase, view.pot, view.current_bet
    );
    if !view.community_cards.is_empty() {
        let _ = writeln!(out, "Board: {}", view.community_cards.join("  "));
    }
    let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));

    for (player_id, player) in view.seats() {
        let mut markers = Vec::new();
        if player.is_dealer {
            markers.push("D");
        }
        if player.is_small_blind {
            markers.push("SB");
        }
        if player.is_big_blind {
            markers.push("BB");
        }
        if view.current_player.as_ref() == Some(player_id) {
            markers.push("→");
        }
        let markers = if markers.is_empty() {
            String::new()
        } else {
            format!(" ({})", markers.join("/"))
        };

        let status = if player.is_active { "" } else { "  [folded]" };
        let you = if player_id == viewer { " (you)" } else { "" };
        let _ = writeln!(
            out,
            "  {}{}{} - ${}{}",
            if player.name.is_empty() { player_id } else { &player.name },
            you,
            markers,
            player.chips,
            status
        );

        if player_id == viewer && !player.hole_cards.is_empty() {
            let _ = writeln!(
                out,
                "     Cards: {}   gates used: {}/round {}/game{}",
                player.hole_cards.join("  "),
                player.gates_used_this_round,
                player.gates_used_this_game,
                if player.can_apply_gate { "" } else { "  [gates unavailable]" }
            );
        }
    }

    if betting::is_round_complete(&view.betting_state) {
        let _ = writeln!(out, "Betting round settled; waiting for the next street.");
    } else if let Some(current) = &view.current_player {
        let _ = writeln!(out, "Waiting on {current}.");
    }
    let _ = writeln!(out, "{}", "═".repeat(RULE_WIDTH));
    out
}

/// Render a lobby snapshot, waiting players listed separately.
pub fn render_lobby(lobby: &LobbySnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Lobby '{}' ({}/{} players){}",
        lobby.name,
        lobby.players.len(),
        lobby.max_players,
        if lobby.in_game { "  [in game]" } else { "" }
    );
    for player_id in &lobby.players {
        let _ = writeln!(out, "  - {}", lobby.name_of(player_id));
    }
    for player_id in &lobby.waiting_players {
        let _ = writeln!(out, "  - {} (waiting)", lobby.name_of(player_id));
    }
    out
}

/// Render a resolved hand outcome.
pub fn render_outcome(outcome: &Outcome) -> String {
    let mut out = String::new();
    let result = outcome.result();
    let headline = outcome.headline();
    match outcome {
        Outcome::AutoWin(_) => {
            let _ = writeln!(
                out,
                "*** {} wins ${} - {} ***",
                headline.name, result.winnings, headline.description
            );
        }
        Outcome::ShowdownWin(_) => {
            let _ = writeln!(
                out,
                "*** {} wins ${} with {} ***",
                headline.name, result.winnings, headline.description
            );
        }
        Outcome::TieSplit(_) => {
            let _ = writeln!(out, "*** Split pot ***");
            for share in &result.winners {
                let _ = writeln!(
                    out,
                    "    {} takes ${} with {}",
                    share.name, share.winnings, share.description
                );
            }
        }
    }
    if result.involves_viewer {
        let _ = writeln!(out, "    You are among the winners!");
    }
    out
}

/// Render a gate preview.
pub fn render_preview(preview: &GatePreview) -> String {
    match &preview.gate_info {
        Some(info) => {
            let original = info.original_card.as_deref().unwrap_or("?");
            let result = info.result_card.as_deref().unwrap_or("?");
            let undefined = if info.is_undefined { "  [undefined state]" } else { "" };
            format!("Preview {}: {} → {}{}\n", info.gate, original, result, undefined)
        }
        None => "Preview unavailable.\n".to_string(),
    }
}

/// Render the viewer's gate history, oldest first.
pub fn render_history(records: &[TransformationRecord]) -> String {
    if records.is_empty() {
        return "No gates applied yet.\n".to_string();
    }
    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "[{}] {}: {} → {} ({})",
            record.timestamp.format("%H:%M:%S"),
            record.gate,
            record.original_card,
            record.result_card,
            record.phase
        );
    }
    out
}
