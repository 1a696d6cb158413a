//! Common error infrastructure for sim-core.
//!
//! The kernel distinguishes two kinds of failure:
//!
//! - **Construction failures** (malformed profiles, a party that does not fit,
//!   action steps naming characters that do not exist) are reported as
//!   [`BuildError`] before the frame loop starts, aborting the trial.
//! - **Runtime degradation** inside the frame loop is never an error. Unknown
//!   ICD groups do not suppress, cooldown reductions floor, zero-target
//!   attacks are no-ops. Those paths log and continue.

use crate::state::CharIndex;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: The trial cannot be constructed at all
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input, should not retry without changes.
    ///
    /// Examples: action step names a missing character, zero-length trial
    Validation,

    /// Unexpected state inconsistency.
    ///
    /// Examples: kit count does not match the party
    Internal,

    /// Unrecoverable construction failure.
    ///
    /// Examples: empty party
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all simulation errors.
///
/// Provides a uniform interface for error classification across the kernel,
/// the content loaders and the batch runtime.
pub trait SimError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors detected while assembling a [`Simulation`](crate::Simulation) or a
/// [`Trial`](crate::Trial).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("party is empty")]
    EmptyParty,

    #[error("party has {size} characters, at most {max} are allowed")]
    PartyTooLarge { size: usize, max: usize },

    #[error("character '{key}' appears more than once in the party")]
    DuplicateCharacter { key: String },

    #[error("character '{key}' has invalid level {level}")]
    InvalidLevel { key: String, level: u32 },

    #[error("character '{key}' has non-positive energy capacity")]
    InvalidEnergy { key: String },

    #[error("no kit is available for character '{key}'")]
    MissingKit { key: String },

    #[error("party has {characters} characters but {kits} kits were supplied")]
    KitCountMismatch { characters: usize, kits: usize },

    #[error("action step {step} refers to character {index} which is not in the party")]
    UnknownCharacter { step: usize, index: CharIndex },

    #[error("active character {index} is outside a party of {size}")]
    ActiveOutOfRange { index: CharIndex, size: usize },

    #[error("trial duration must be at least one frame")]
    ZeroDuration,
}

impl SimError for BuildError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EmptyParty => ErrorSeverity::Fatal,
            Self::KitCountMismatch { .. } | Self::MissingKit { .. } => ErrorSeverity::Internal,
            Self::PartyTooLarge { .. }
            | Self::DuplicateCharacter { .. }
            | Self::InvalidLevel { .. }
            | Self::InvalidEnergy { .. }
            | Self::UnknownCharacter { .. }
            | Self::ActiveOutOfRange { .. }
            | Self::ZeroDuration => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyParty => "EMPTY_PARTY",
            Self::PartyTooLarge { .. } => "PARTY_TOO_LARGE",
            Self::DuplicateCharacter { .. } => "DUPLICATE_CHARACTER",
            Self::InvalidLevel { .. } => "INVALID_LEVEL",
            Self::InvalidEnergy { .. } => "INVALID_ENERGY",
            Self::MissingKit { .. } => "MISSING_KIT",
            Self::KitCountMismatch { .. } => "KIT_COUNT_MISMATCH",
            Self::UnknownCharacter { .. } => "UNKNOWN_CHARACTER",
            Self::ActiveOutOfRange { .. } => "ACTIVE_OUT_OF_RANGE",
            Self::ZeroDuration => "ZERO_DURATION",
        }
    }
}
