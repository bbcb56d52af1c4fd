use crate::error::{BattleCoreError, ErrorSeverity};

use super::kind::{ActionKind, EffectKind};

/// Failure to encode or decode a persisted battle log.
///
/// Decoding never defaults: a version mismatch or any structural corruption is
/// always reported.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LogCodecError {
    #[error("unsupported log version {found} (expected {expected})")]
    UnsupportedVersion { found: u8, expected: u8 },

    #[error("malformed log data: {detail}")]
    MalformedData { detail: String },

    #[error("{field} holds {len} items, layout allows at most {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

impl LogCodecError {
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedData {
            detail: detail.into(),
        }
    }
}

impl BattleCoreError for LogCodecError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnsupportedVersion { .. } | Self::MalformedData { .. } => {
                ErrorSeverity::Validation
            }
            Self::FieldTooLong { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedVersion { .. } => "LOG_UNSUPPORTED_VERSION",
            Self::MalformedData { .. } => "LOG_MALFORMED_DATA",
            Self::FieldTooLong { .. } => "LOG_FIELD_TOO_LONG",
        }
    }
}

/// A logic-level breach of the log's append contract.
///
/// Programmer error: asserted in development builds, reported as a
/// diagnostic and otherwise tolerated in release builds. The offending effect
/// is still recorded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LogInvariantViolation {
    #[error("turn {turn}: {effect} is not a legal effect of {action}")]
    IllegalEffect {
        turn: u16,
        action: ActionKind,
        effect: EffectKind,
    },

    #[error("turn {turn}: {effect} appended with no open entry")]
    EffectWithoutEntry { turn: u16, effect: EffectKind },

    #[error("turn {turn}: {action} declared while another entry was still open")]
    EntryLeftOpen { turn: u16, action: ActionKind },

    #[error("turn {turn}: declaration {action} carries more than one marker")]
    ExtraMarker { turn: u16, action: ActionKind },
}

impl BattleCoreError for LogInvariantViolation {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::IllegalEffect { .. } => "LOG_ILLEGAL_EFFECT",
            Self::EffectWithoutEntry { .. } => "LOG_EFFECT_WITHOUT_ENTRY",
            Self::EntryLeftOpen { .. } => "LOG_ENTRY_LEFT_OPEN",
            Self::ExtraMarker { .. } => "LOG_EXTRA_MARKER",
        }
    }
}
