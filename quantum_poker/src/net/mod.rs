//! Wire-level types for the table push channel.
//!
//! The channel carries JSON text frames in both directions. Outgoing frames
//! are user intents; incoming frames are server events. The transport's
//! handshake and encryption are not this crate's concern.

/// The join-handshake error taxonomy.
pub mod errors;

/// Message types for client-server communication.
pub mod messages;
