//! Parsing of interactive commands into table intents.

use quantum_poker::game::entities::Chips;
use quantum_poker::net::messages::{ActionKind, Gate};
use std::fmt;

/// A parsed user command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Ask the server to start the game.
    Start,
    /// A betting action; raises carry the raise-to amount.
    Action { action: ActionKind, amount: Chips },
    /// Apply (or preview) a gate on the viewer's hole cards.
    Gate {
        gate: Gate,
        card_indices: Vec<usize>,
        preview_only: bool,
    },
    /// Print the viewer's gate history.
    History,
    /// Show the help text.
    Help,
    /// Clear the stored session and exit.
    Logout,
    /// Leave the table and exit.
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// Invalid raise amount (not a valid number).
    InvalidRaiseAmount(String),
    /// Raise command missing its amount.
    MissingRaiseAmount,
    /// Gate command missing the gate name.
    MissingGate,
    /// Unrecognized gate name.
    UnknownGate(String),
    /// Wrong number of card indices for the gate.
    WrongGateArity {
        gate: Gate,
        expected: usize,
        got: usize,
    },
    /// A card index that is not a small non-negative number.
    InvalidCardIndex(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRaiseAmount(value) => write!(
                f,
                "Invalid raise amount '{}'. Must be a positive number (e.g., 'raise 100')",
                value
            ),
            Self::MissingRaiseAmount => {
                write!(f, "Raise requires an amount (e.g., 'raise 100')")
            }
            Self::MissingGate => {
                write!(f, "Gate command requires a gate name (e.g., 'gate X 0')")
            }
            Self::UnknownGate(gate) => write!(
                f,
                "Unknown gate '{}'. Available gates: X, Z, CNOT",
                gate
            ),
            Self::WrongGateArity {
                gate,
                expected,
                got,
            } => write!(
                f,
                "Gate {} takes {} card index(es), got {} (e.g., 'gate {} 0{}')",
                gate,
                expected,
                got,
                gate,
                if *expected == 2 { " 1" } else { "" }
            ),
            Self::InvalidCardIndex(value) => {
                write!(f, "Invalid card index '{}'. Use 0 or 1", value)
            }
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a command string into a [`Command`].
///
/// # Examples
///
/// ```
/// use qp_client::commands::{Command, parse_command};
/// use quantum_poker::net::messages::{ActionKind, Gate};
///
/// assert!(matches!(
///     parse_command("call"),
///     Ok(Command::Action { action: ActionKind::Call, amount: 0 })
/// ));
/// assert!(matches!(
///     parse_command("raise 100"),
///     Ok(Command::Action { action: ActionKind::Raise, amount: 100 })
/// ));
/// assert!(matches!(parse_command("gate X 0"), Ok(Command::Gate { gate: Gate::X, .. })));
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    let Some((head, rest)) = parts.split_first() else {
        return Err(ParseError::UnrecognizedCommand(String::new()));
    };

    match (head.to_lowercase().as_str(), rest) {
        ("start", []) => Ok(Command::Start),
        ("fold", []) => Ok(Command::Action {
            action: ActionKind::Fold,
            amount: 0,
        }),
        ("check", []) => Ok(Command::Action {
            action: ActionKind::Check,
            amount: 0,
        }),
        ("call", []) => Ok(Command::Action {
            action: ActionKind::Call,
            amount: 0,
        }),
        ("history", []) => Ok(Command::History),
        ("help", []) | ("?", []) => Ok(Command::Help),
        ("logout", []) => Ok(Command::Logout),
        ("quit", []) | ("exit", []) => Ok(Command::Quit),
        ("raise", []) => Err(ParseError::MissingRaiseAmount),
        ("raise", [amount]) => match amount.parse::<Chips>() {
            Ok(amount) if amount > 0 => Ok(Command::Action {
                action: ActionKind::Raise,
                amount,
            }),
            _ => Err(ParseError::InvalidRaiseAmount(amount.to_string())),
        },
        ("gate", rest) => parse_gate(rest, false),
        ("preview", rest) => parse_gate(rest, true),
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

fn parse_gate(parts: &[&str], preview_only: bool) -> Result<Command, ParseError> {
    let Some((raw_gate, raw_indices)) = parts.split_first() else {
        return Err(ParseError::MissingGate);
    };
    let gate = match raw_gate.to_ascii_uppercase().as_str() {
        "X" => Gate::X,
        "Z" => Gate::Z,
        "CNOT" => Gate::Cnot,
        other => return Err(ParseError::UnknownGate(other.to_string())),
    };
    let card_indices = raw_indices
        .iter()
        .map(|raw| {
            raw.parse::<usize>()
                .map_err(|_| ParseError::InvalidCardIndex(raw.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if card_indices.len() != gate.arity() {
        return Err(ParseError::WrongGateArity {
            gate,
            expected: gate.arity(),
            got: card_indices.len(),
        });
    }
    Ok(Command::Gate {
        gate,
        card_indices,
        preview_only,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_word_actions() {
        assert_eq!(
            parse_command("fold"),
            Ok(Command::Action {
                action: ActionKind::Fold,
                amount: 0
            })
        );
        assert_eq!(
            parse_command("  CHECK  "),
            Ok(Command::Action {
                action: ActionKind::Check,
                amount: 0
            })
        );
        assert_eq!(
            parse_command("call"),
            Ok(Command::Action {
                action: ActionKind::Call,
                amount: 0
            })
        );
    }

    #[test]
    fn test_raise_with_amount() {
        assert_eq!(
            parse_command("raise 100"),
            Ok(Command::Action {
                action: ActionKind::Raise,
                amount: 100
            })
        );
    }

    #[test]
    fn test_raise_without_amount() {
        assert_eq!(parse_command("raise"), Err(ParseError::MissingRaiseAmount));
    }

    #[test]
    fn test_raise_with_bad_amount() {
        assert_eq!(
            parse_command("raise lots"),
            Err(ParseError::InvalidRaiseAmount("lots".to_string()))
        );
        assert_eq!(
            parse_command("raise 0"),
            Err(ParseError::InvalidRaiseAmount("0".to_string()))
        );
    }

    #[test]
    fn test_gate_commands() {
        assert_eq!(
            parse_command("gate X 0"),
            Ok(Command::Gate {
                gate: Gate::X,
                card_indices: vec![0],
                preview_only: false
            })
        );
        assert_eq!(
            parse_command("gate cnot 0 1"),
            Ok(Command::Gate {
                gate: Gate::Cnot,
                card_indices: vec![0, 1],
                preview_only: false
            })
        );
        assert_eq!(
            parse_command("preview z 1"),
            Ok(Command::Gate {
                gate: Gate::Z,
                card_indices: vec![1],
                preview_only: true
            })
        );
    }

    #[test]
    fn test_gate_arity_errors() {
        assert_eq!(
            parse_command("gate X 0 1"),
            Err(ParseError::WrongGateArity {
                gate: Gate::X,
                expected: 1,
                got: 2
            })
        );
        assert_eq!(
            parse_command("gate CNOT 0"),
            Err(ParseError::WrongGateArity {
                gate: Gate::Cnot,
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_gate_errors() {
        assert_eq!(parse_command("gate"), Err(ParseError::MissingGate));
        assert_eq!(
            parse_command("gate H 0"),
            Err(ParseError::UnknownGate("H".to_string()))
        );
        assert_eq!(
            parse_command("gate X one"),
            Err(ParseError::InvalidCardIndex("one".to_string()))
        );
    }

    #[test]
    fn test_misc_commands() {
        assert_eq!(parse_command("start"), Ok(Command::Start));
        assert_eq!(parse_command("history"), Ok(Command::History));
        assert_eq!(parse_command("help"), Ok(Command::Help));
        assert_eq!(parse_command("logout"), Ok(Command::Logout));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
    }

    #[test]
    fn test_unrecognized_command() {
        assert_eq!(
            parse_command("shuffle"),
            Err(ParseError::UnrecognizedCommand("shuffle".to_string()))
        );
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error = parse_command("gate H 0").unwrap_err();
        assert!(error.to_string().contains("X, Z, CNOT"));

        let error = parse_command("bogus").unwrap_err();
        assert!(error.to_string().contains("help"));
    }
}
