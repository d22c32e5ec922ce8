use super::game::RoundState;

/// Lifecycle and registry errors. These are always shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("{}", expected.wrong_state_message())]
    InvalidGameState { expected: RoundState },

    #[error("there's no round in progress! start one with `round start`")]
    NoActiveRound,

    #[error("there isn't a game active in this channel! start one with `game start`")]
    NoActiveGame,

    #[error("there's already a game being played in this channel!")]
    GameAlreadyActive,

    #[error("that word is too long! words can be at most {max} characters")]
    WordTooLong { max: usize },

    #[error("games can only be played in servers!")]
    NotInGuild,

    #[error("this game has run out of questions! end it with `game end` and start a new one")]
    QuestionPoolExhausted,
}

impl GameError {
    pub(crate) const fn invalid_state(expected: RoundState) -> Self {
        Self::InvalidGameState { expected }
    }
}

/// Failures of the scoring oracle. `end_round` absorbs these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("google trends is unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("google trends returned no data for these phrases")]
    NoData,
}

impl ScoringError {
    pub(crate) fn unavailable(reason: impl std::fmt::Display) -> Self {
        Self::ProviderUnavailable(reason.to_string())
    }
}

impl From<reqwest::Error> for ScoringError {
    fn from(value: reqwest::Error) -> Self {
        Self::unavailable(value)
    }
}

impl From<serde_json::Error> for ScoringError {
    fn from(value: serde_json::Error) -> Self {
        Self::unavailable(format_args!("malformed response: {value}"))
    }
}

impl From<tokio::time::error::Elapsed> for ScoringError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::unavailable("request timed out")
    }
}
