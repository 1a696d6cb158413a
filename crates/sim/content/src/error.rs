//! Scenario validation errors.

use sim_core::{BuildError, ErrorSeverity, SimError};

/// Problems found while validating a scenario, before any trial runs.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("scenario has no characters")]
    EmptyParty,

    #[error("scenario has {size} characters, at most {max} are allowed")]
    PartyTooLarge { size: usize, max: usize },

    #[error("no kit is registered for character '{key}'")]
    UnknownKit { key: String },

    #[error("character '{key}' appears more than once")]
    DuplicateCharacter { key: String },

    #[error("active character '{key}' is not in the party")]
    UnknownActive { key: String },

    #[error("action {step} refers to '{key}' which is not in the party")]
    UnknownActionCharacter { step: usize, key: String },

    #[error("action {step}: {reason}")]
    InvalidAction { step: usize, reason: String },

    #[error("target {index}: {reason}")]
    InvalidTarget { index: usize, reason: String },

    #[error("duration must be at least one frame")]
    ZeroDuration,

    #[error("iterations must be at least one")]
    ZeroIterations,

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl SimError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Build(e) => e.severity(),
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyParty => "EMPTY_PARTY",
            Self::PartyTooLarge { .. } => "PARTY_TOO_LARGE",
            Self::UnknownKit { .. } => "UNKNOWN_KIT",
            Self::DuplicateCharacter { .. } => "DUPLICATE_CHARACTER",
            Self::UnknownActive { .. } => "UNKNOWN_ACTIVE",
            Self::UnknownActionCharacter { .. } => "UNKNOWN_ACTION_CHARACTER",
            Self::InvalidAction { .. } => "INVALID_ACTION",
            Self::InvalidTarget { .. } => "INVALID_TARGET",
            Self::ZeroDuration => "ZERO_DURATION",
            Self::ZeroIterations => "ZERO_ITERATIONS",
            Self::Build(e) => e.error_code(),
        }
    }
}
