//! Common error infrastructure for battle-core.
//!
//! Domain-specific errors (`DecodeError`, `OracleError`, `BattleError`,
//! `LogCodecError`) live beside the code that raises them. This module only
//! provides the shared classification they all implement.
//!
//! # Design Principles
//!
//! - **Type Safety**: each stage has its own error type with specific variants
//! - **Rich Context**: errors name the offending skill, effect row, or id
//! - **Severity Classification**: errors are categorized for recovery strategies

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the unit of work is skipped, the surrounding work continues
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: a logic invariant was violated (programmer error)
/// - **Fatal**: the battle or compilation cannot proceed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The failing unit is dropped and processing continues.
    ///
    /// Examples: one malformed effect row inside an otherwise valid skill.
    Recoverable,

    /// Invalid input, should not retry without changes.
    ///
    /// Examples: corrupted log bytes, duplicate actor indices in a roster.
    Validation,

    /// Unexpected state inconsistency.
    ///
    /// Examples: an effect kind appended under an incompatible declaration.
    Internal,

    /// Unrecoverable for the current battle or compilation.
    ///
    /// Examples: a referenced skill id missing from master data.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all battle-core errors.
///
/// # Implementation Guidelines
///
/// - All error types should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait BattleCoreError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for error categorization, metrics, and testing.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
