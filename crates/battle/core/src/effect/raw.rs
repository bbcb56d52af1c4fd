use std::collections::BTreeMap;

use super::keys::{ArrayKey, ParamKey, ValueKey};
use super::kind::EffectType;

/// One undecoded effect row as it comes out of master data.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawEffect {
    pub effect_type: EffectType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub parameters: BTreeMap<ParamKey, i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub values: BTreeMap<ValueKey, f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub arrays: BTreeMap<ArrayKey, Vec<i64>>,
}

impl RawEffect {
    pub fn new(effect_type: EffectType) -> Self {
        Self {
            effect_type,
            parameters: BTreeMap::new(),
            values: BTreeMap::new(),
            arrays: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: ParamKey, value: i64) -> Self {
        self.parameters.insert(key, value);
        self
    }

    pub fn with_value(mut self, key: ValueKey, value: f64) -> Self {
        self.values.insert(key, value);
        self
    }

    pub fn with_array(mut self, key: ArrayKey, value: Vec<i64>) -> Self {
        self.arrays.insert(key, value);
        self
    }
}
