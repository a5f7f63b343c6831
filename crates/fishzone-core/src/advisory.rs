//! Rule engine turning a derived record, its predicted zone and the model
//! confidence into a structured fishing advisory.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::DerivedRecord;
use crate::risk::risk_probability;
use crate::zone::Zone;

/// Yellow records above this juvenile probability get the stricter text.
const YELLOW_HIGH_RISK_PROB: f64 = 0.6;
/// Green records above this juvenile probability get the cautionary text.
const GREEN_NOTICEABLE_RISK_PROB: f64 = 0.5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdvisoryError {
    #[error("record is missing {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub species: String,
    pub latitude: f64,
    pub longitude: f64,
    pub zone: Zone,
    pub risk_factors: Vec<String>,
    pub fishing_advisory: String,
    pub recommended_gear: String,
    pub economic_note: String,
    /// Display label supplied by the caller; never used for filtering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub river_name: Option<String>,
}

/// Economic value tier in INR per kg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EconomicBand {
    VeryHigh,
    High,
    Moderate,
    Low,
}

impl EconomicBand {
    /// Band a value; missing values are `Low`.
    pub fn from_value(value: Option<f64>) -> Self {
        match value {
            Some(v) if v >= 700.0 => Self::VeryHigh,
            Some(v) if v >= 500.0 => Self::High,
            Some(v) if v >= 300.0 => Self::Moderate,
            _ => Self::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::VeryHigh => "very high",
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
        }
    }

    /// Sentence-start form: `Very high`, `High`, ...
    pub fn capitalized(self) -> &'static str {
        match self {
            Self::VeryHigh => "Very high",
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for EconomicBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk factor sentences in indicator order, with the Green fallback line
/// when nothing is flagged.
pub fn risk_factors(record: &DerivedRecord, zone: Zone) -> Vec<String> {
    const INDICATOR_TEXT: [&str; 6] = [
        "High proportion of juveniles below legal size.",
        "Shallow waters (<30 m) increase juvenile aggregation.",
        "High chlorophyll (>2 mg/m³) indicates productive nursery-like waters.",
        "Monsoon/post-monsoon season associated with spawning and recruitment.",
        "Brackish waters are typical juvenile nursery habitats.",
        "Non-selective gear (trawl/purse seine) increases juvenile bycatch.",
    ];

    let mut reasons: Vec<String> = record
        .indicators
        .as_array()
        .iter()
        .zip(INDICATOR_TEXT)
        .filter(|(flag, _)| **flag)
        .map(|(_, text)| text.to_string())
        .collect();

    if record.disease_risk {
        let disease = record.seasonal_disease.as_deref().unwrap_or_default();
        reasons.push(format!("Seasonal disease reported: {disease}."));
    }

    if reasons.is_empty() && zone == Zone::Green {
        reasons.push("Low observed juvenile risk and no major disease indicators.".to_string());
    }
    reasons
}

pub fn recommended_gear(zone: Zone) -> &'static str {
    match zone {
        Zone::Red => "Use highly selective gears such as hook-and-line or species/size-selective gillnets; avoid trawls and purse seines.",
        Zone::Yellow => "Prefer selective gears (hook-and-line, selective gillnets); restrict trawls/purse seines or operate with larger mesh sizes.",
        Zone::Green => "Standard gear allowed with compliance to mesh-size regulations and bycatch reduction devices.",
    }
}

pub fn advisory_text(zone: Zone, juvenile_prob: f64) -> &'static str {
    match zone {
        Zone::Red => {
            "High-risk juvenile nursery zone. Strongly advise temporary fishing closure or \
             very limited, strictly monitored operations to protect juvenile stocks."
        }
        Zone::Yellow if juvenile_prob > YELLOW_HIGH_RISK_PROB => {
            "Moderate-to-high juvenile presence. Allow only regulated, low-intensity fishing \
             with strict gear controls and size-based release of undersized catch."
        }
        Zone::Yellow => {
            "Transitional risk zone. Permit controlled fishing with mandatory size monitoring \
             and seasonal effort caps."
        }
        Zone::Green if juvenile_prob > GREEN_NOTICEABLE_RISK_PROB => {
            "Generally suitable for fishing but with noticeable juvenile presence; enforce \
             minimum legal sizes and encourage release of undersized individuals."
        }
        Zone::Green => {
            "Low juvenile and disease risk. Suitable for fishing within sustainable catch limits \
             and existing regulations."
        }
    }
}

pub fn economic_note(economic_value: Option<f64>, zone: Zone) -> String {
    let band = EconomicBand::from_value(economic_value);
    match zone {
        Zone::Red => format!(
            "Species has {band} economic value, but protection of juvenile stock in this \
             high-risk zone is prioritized over short-term revenue."
        ),
        Zone::Yellow => format!(
            "{} value species in a caution zone; adopt conservative effort \
             and value-added processing rather than volume-based harvest.",
            band.capitalized()
        ),
        Zone::Green => format!(
            "{} value species in a permitted zone; optimize value through \
             quality handling and market timing while keeping catches within sustainable limits.",
            band.capitalized()
        ),
    }
}

/// Assemble the advisory for one record. The confidence line is always the
/// last risk factor.
pub fn build_advisory(record: &DerivedRecord, zone: Zone, confidence: f64) -> Result<Advisory, AdvisoryError> {
    let species = record
        .scientific_name
        .clone()
        .ok_or(AdvisoryError::MissingField("scientific_name"))?;
    let latitude = record.latitude.ok_or(AdvisoryError::MissingField("latitude"))?;
    let longitude = record.longitude.ok_or(AdvisoryError::MissingField("longitude"))?;

    let mut factors = risk_factors(record, zone);
    factors.push(format!("Model confidence for {zone} zone: {confidence:.2}"));

    Ok(Advisory {
        species,
        latitude,
        longitude,
        zone,
        risk_factors: factors,
        fishing_advisory: advisory_text(zone, risk_probability(record)).to_string(),
        recommended_gear: recommended_gear(zone).to_string(),
        economic_note: economic_note(record.economic_value_inr_per_kg, zone),
        river_name: None,
    })
}
