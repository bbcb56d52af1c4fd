use crate::error::{BattleCoreError, ErrorSeverity};
use crate::types::SkillId;

use super::keys::{ArrayKey, ParamKey, ValueKey};
use super::kind::EffectType;

/// Why a single effect row failed to decode.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DecodeFailure {
    #[error("missing parameter `{0}`")]
    MissingParameter(ParamKey),

    #[error("missing value `{0}`")]
    MissingValue(ValueKey),

    #[error("missing array `{0}`")]
    MissingArray(ArrayKey),

    #[error("parameter `{key}` out of domain: {raw}")]
    ParameterOutOfDomain { key: ParamKey, raw: i64 },

    #[error("value `{key}` out of domain: {raw}")]
    ValueOutOfDomain { key: ValueKey, raw: f64 },

    #[error("array `{key}` element {index} out of domain: {raw}")]
    ArrayElementOutOfDomain {
        key: ArrayKey,
        index: usize,
        raw: i64,
    },
}

/// A row that could not be decoded, with enough context to find it in master data.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{skill} effect #{effect_index} ({effect_type}): {reason}")]
pub struct DecodeError {
    pub skill: SkillId,
    pub effect_index: u16,
    pub effect_type: EffectType,
    #[source]
    pub reason: DecodeFailure,
}

impl BattleCoreError for DecodeError {
    fn severity(&self) -> ErrorSeverity {
        // The skill compiles to a no-op for this row; the rest of the compile proceeds.
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self.reason {
            DecodeFailure::MissingParameter(_) => "DECODE_MISSING_PARAMETER",
            DecodeFailure::MissingValue(_) => "DECODE_MISSING_VALUE",
            DecodeFailure::MissingArray(_) => "DECODE_MISSING_ARRAY",
            DecodeFailure::ParameterOutOfDomain { .. } => "DECODE_PARAMETER_OUT_OF_DOMAIN",
            DecodeFailure::ValueOutOfDomain { .. } => "DECODE_VALUE_OUT_OF_DOMAIN",
            DecodeFailure::ArrayElementOutOfDomain { .. } => "DECODE_ARRAY_OUT_OF_DOMAIN",
        }
    }
}
