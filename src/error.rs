use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

/// Errors raised by the game core.
///
/// Ignored tile input is not an error; see `SelectOutcome::Ignored`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Sequence length or tile count out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `play` was called while an earlier playback was still pending.
    #[error("playback already in progress")]
    PlaybackBusy,
}
