use thiserror::Error;

/// Settings that cannot be used to run a session.
///
/// These are reported when settings are applied, never mid-session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("at least one letter is required per round")]
    NoLetters,

    #[error("{requested} letters requested but only {available} distinct sizes exist")]
    TooManyLetters { requested: usize, available: usize },

    #[error("time limit must be a positive number of seconds")]
    NonPositiveTimeLimit,
}
