use crate::effect::Modifier;

/// Running product of every percent and multiplier aimed at one target.
///
/// Percent `p` contributes `1 + p/100`, multiplier `m` contributes `m`, and
/// all contributions multiply: `∏(1 + p_i/100) × ∏(m_j)`. Starts at `1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ModifierProduct(f64);

impl ModifierProduct {
    pub const IDENTITY: Self = Self(1.0);

    pub fn apply(&mut self, modifier: Modifier) {
        self.0 *= modifier.factor();
    }

    pub fn scale(&mut self, factor: f64) {
        self.0 *= factor;
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    pub fn is_identity(self) -> bool {
        self.0 == 1.0
    }
}

impl Default for ModifierProduct {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl FromIterator<Modifier> for ModifierProduct {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        let mut product = Self::IDENTITY;
        for modifier in iter {
            product.apply(modifier);
        }
        product
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_and_multiplier_compose_multiplicatively() {
        let product: ModifierProduct = [Modifier::Percent(10.0), Modifier::Multiplier(1.5)]
            .into_iter()
            .collect();
        assert!((product.value() - 1.65).abs() < 1e-12);
    }

    #[test]
    fn order_does_not_matter() {
        let a: ModifierProduct = [
            Modifier::Percent(-20.0),
            Modifier::Multiplier(2.0),
            Modifier::Percent(5.0),
        ]
        .into_iter()
        .collect();
        let b: ModifierProduct = [
            Modifier::Percent(5.0),
            Modifier::Percent(-20.0),
            Modifier::Multiplier(2.0),
        ]
        .into_iter()
        .collect();
        assert!((a.value() - b.value()).abs() < 1e-12);
    }

    #[test]
    fn empty_product_is_identity() {
        assert!(ModifierProduct::default().is_identity());
    }
}
