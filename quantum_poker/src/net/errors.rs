//! Error taxonomy for the table join handshake.

use thiserror::Error;

/// A server-reported failure that affects the join handshake.
///
/// The server reports errors as free-form `detail` strings; the session
/// classifies them so that timing races are retried away silently while
/// genuine rejections end the table view.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum JoinError {
    /// The room has not been provisioned yet. The one-shot join retry
    /// exists exactly for this race; nothing surfaces to the viewer.
    #[error("lobby not found")]
    LobbyNotFound,
    /// The game started without this viewer, so joining can never succeed.
    /// Cancels the retry and ends the table view.
    #[error("game already started")]
    GameInProgress,
}

impl JoinError {
    /// Classify a raw `error` event detail string.
    ///
    /// Anything unrecognized is `None`: such errors are neither retried away
    /// nor fatal, and are surfaced to the viewer verbatim.
    pub fn classify(detail: &str) -> Option<Self> {
        let detail = detail.to_ascii_lowercase();
        if detail.contains("not found") {
            Some(Self::LobbyNotFound)
        } else if detail.contains("already started") || detail.contains("already in progress") {
            Some(Self::GameInProgress)
        } else {
            None
        }
    }

    /// Whether this error ends the current table view.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::GameInProgress)
    }
}
