use serde::{Deserialize, Serialize};

use crate::zone::N_ZONES;

/// Per-zone misclassification weights. Heavier weights bias the forest
/// towards flagging risk rather than missing it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassWeights {
    pub green: f64,
    pub yellow: f64,
    pub red: f64,
}

impl Default for ClassWeights {
    fn default() -> Self {
        Self { green: 1.0, yellow: 2.0, red: 3.0 }
    }
}

impl ClassWeights {
    /// Weights indexed by `Zone::index`.
    pub fn as_array(&self) -> [f64; N_ZONES] {
        [self.green, self.yellow, self.red]
    }
}

/// Training hyper-parameters. Defaults are the reference configuration
/// (300 trees, unlimited depth, split/leaf minimums 4/2, seed 42).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainParams {
    pub seed: u64,
    /// Fraction of each class held out for evaluation, in (0, 1).
    pub test_fraction: f64,
    pub n_estimators: usize,
    /// `None` grows trees until the leaf constraints stop them.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub class_weights: ClassWeights,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            n_estimators: 300,
            max_depth: None,
            min_samples_split: 4,
            min_samples_leaf: 2,
            class_weights: ClassWeights::default(),
        }
    }
}

impl TrainParams {
    /// Parse parameters from JSON. Missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Describe the first invalid setting, if any.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(format!("test_fraction must lie in (0, 1), got {}", self.test_fraction));
        }
        if self.n_estimators == 0 {
            return Err("n_estimators must be at least 1".into());
        }
        if self.min_samples_split < 2 {
            return Err(format!("min_samples_split must be at least 2, got {}", self.min_samples_split));
        }
        if self.min_samples_leaf < 1 {
            return Err("min_samples_leaf must be at least 1".into());
        }
        let w = self.class_weights.as_array();
        if w.iter().any(|&x| !(x.is_finite() && x > 0.0)) {
            return Err(format!("class weights must be positive and finite, got {w:?}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_configuration() {
        let p = TrainParams::default();
        assert_eq!(p.n_estimators, 300);
        assert_eq!(p.min_samples_split, 4);
        assert_eq!(p.min_samples_leaf, 2);
        assert_eq!(p.class_weights.as_array(), [1.0, 2.0, 3.0]);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let p = TrainParams::from_json(r#"{ "n_estimators": 25, "seed": 7 }"#).unwrap();
        assert_eq!(p.n_estimators, 25);
        assert_eq!(p.seed, 7);
        assert_eq!(p.min_samples_leaf, 2);
    }

    #[test]
    fn rejects_bad_fraction() {
        let p = TrainParams { test_fraction: 1.0, ..Default::default() };
        assert!(p.validate().is_err());
    }
}
