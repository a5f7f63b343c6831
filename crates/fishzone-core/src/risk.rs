//! Additive juvenile risk scoring.
//!
//! Six boolean indicators are derived per record; the score is their count
//! (0-6) and the probability is the score divided by six. Disease presence is
//! tracked separately and never enters the score.

use serde::{Deserialize, Serialize};

use crate::dataset::DerivedRecord;

// ── Thresholds ───────────────────────────────────────────────────────────────

/// Depths strictly below this (metres) count as shallow.
pub const SHALLOW_DEPTH_M: f64 = 30.0;
/// Chlorophyll strictly above this (mg/m³) counts as high.
pub const HIGH_CHLOROPHYLL_MG_M3: f64 = 2.0;
/// Seasons associated with spawning and recruitment.
pub const MONSOON_SEASONS: [&str; 3] = ["Monsoon", "Post-Monsoon", "Post Monsoon"];
/// Gear types with high juvenile bycatch.
pub const NON_SELECTIVE_GEARS: [&str; 2] = ["Trawl", "Purse Seine"];
/// Upper bound of the additive score.
pub const MAX_RISK_SCORE: u8 = 6;

/// The six additive risk indicators, in score order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskIndicators {
    pub juvenile_dominance: bool,
    pub is_shallow: bool,
    pub high_chlorophyll: bool,
    pub is_monsoon_season: bool,
    pub is_brackish: bool,
    pub non_selective_gear: bool,
}

/// Raw inputs the indicators are computed from. Missing numeric values make
/// the corresponding comparison false.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorInputs<'a> {
    pub juvenile_max_cm: Option<f64>,
    pub min_legal_size_cm: Option<f64>,
    pub depth_m: Option<f64>,
    pub chlorophyll_mg_m3: Option<f64>,
    pub season: Option<&'a str>,
    pub water_type: Option<&'a str>,
    pub gear_type: Option<&'a str>,
}

impl RiskIndicators {
    pub fn evaluate(inputs: &IndicatorInputs<'_>) -> Self {
        let juvenile_dominance = match (inputs.juvenile_max_cm, inputs.min_legal_size_cm) {
            (Some(max), Some(legal)) => max < legal,
            _ => false,
        };
        Self {
            juvenile_dominance,
            is_shallow: inputs.depth_m.is_some_and(|d| d < SHALLOW_DEPTH_M),
            high_chlorophyll: inputs.chlorophyll_mg_m3.is_some_and(|c| c > HIGH_CHLOROPHYLL_MG_M3),
            is_monsoon_season: inputs.season.is_some_and(|s| MONSOON_SEASONS.contains(&s)),
            is_brackish: inputs.water_type.is_some_and(|w| w.to_lowercase() == "brackish"),
            non_selective_gear: inputs.gear_type.is_some_and(|g| NON_SELECTIVE_GEARS.contains(&g)),
        }
    }

    /// Indicators as an array in score order.
    pub fn as_array(&self) -> [bool; 6] {
        [
            self.juvenile_dominance,
            self.is_shallow,
            self.high_chlorophyll,
            self.is_monsoon_season,
            self.is_brackish,
            self.non_selective_gear,
        ]
    }

    pub fn count(&self) -> u8 {
        self.as_array().iter().filter(|&&b| b).count() as u8
    }
}

/// Additive risk score in `0..=6`.
pub fn risk_score(record: &DerivedRecord) -> u8 {
    record.indicators.count().min(MAX_RISK_SCORE)
}

/// Risk score mapped onto `[0, 1]`.
pub fn risk_probability(record: &DerivedRecord) -> f64 {
    (risk_score(record) as f64 / MAX_RISK_SCORE as f64).clamp(0.0, 1.0)
}
