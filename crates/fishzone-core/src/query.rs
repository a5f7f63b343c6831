//! State-scoped queries over the annotated table: per-record advisories,
//! heat-map points and the state/river listings used to populate filters.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::advisory::{build_advisory, Advisory};
use crate::classifier::ZoneClassifier;
use crate::dataset::{Dataset, DerivedRecord};
use crate::risk::risk_probability;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown heat-map weight `{0}`")]
    UnknownWeight(String),
}

/// Column used as the value of a heat-map point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeatmapWeight {
    #[default]
    #[serde(rename = "juvenile_risk_prob")]
    JuvenileRiskProb,
    #[serde(rename = "juvenile_risk_score")]
    JuvenileRiskScore,
    #[serde(rename = "chlorophyll_mg_m3")]
    Chlorophyll,
    #[serde(rename = "depth_m")]
    Depth,
    #[serde(rename = "sea_surface_temp_C")]
    SeaSurfaceTemp,
    #[serde(rename = "economic_priority_score")]
    EconomicPriority,
    #[serde(rename = "economic_value_in_INR_per_kg")]
    EconomicValue,
}

impl HeatmapWeight {
    pub const ALL: [HeatmapWeight; 7] = [
        Self::JuvenileRiskProb,
        Self::JuvenileRiskScore,
        Self::Chlorophyll,
        Self::Depth,
        Self::SeaSurfaceTemp,
        Self::EconomicPriority,
        Self::EconomicValue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::JuvenileRiskProb => "juvenile_risk_prob",
            Self::JuvenileRiskScore => "juvenile_risk_score",
            Self::Chlorophyll => "chlorophyll_mg_m3",
            Self::Depth => "depth_m",
            Self::SeaSurfaceTemp => "sea_surface_temp_C",
            Self::EconomicPriority => "economic_priority_score",
            Self::EconomicValue => "economic_value_in_INR_per_kg",
        }
    }

    /// Value of this weight for one record, if present.
    pub fn value(self, record: &DerivedRecord) -> Option<f64> {
        let value = match self {
            Self::JuvenileRiskProb => Some(risk_probability(record)),
            Self::JuvenileRiskScore => Some(record.risk_score as f64),
            Self::Chlorophyll => record.chlorophyll_mg_m3,
            Self::Depth => record.depth_m,
            Self::SeaSurfaceTemp => record.sea_surface_temp_c,
            Self::EconomicPriority => record.economic_priority,
            Self::EconomicValue => record.economic_value_inr_per_kg,
        };
        value.filter(|v| v.is_finite())
    }
}

impl fmt::Display for HeatmapWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeatmapWeight {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|w| w.as_str() == name)
            .ok_or_else(|| QueryError::UnknownWeight(name.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
}

fn matches_state<'a>(table: &'a Dataset, state: &'a str) -> impl Iterator<Item = &'a DerivedRecord> + 'a {
    let wanted = state.to_lowercase();
    table.records().iter().filter(move |r| r.state.to_lowercase() == wanted)
}

/// One advisory per record of `state` (case-insensitive), in table order.
///
/// `river_label` is attached to each advisory unchanged and never filters.
/// Records that cannot be turned into an advisory are logged and skipped.
pub fn advisories_for_state<M: ZoneClassifier + ?Sized>(
    model: &M,
    table: &Dataset,
    state: &str,
    river_label: Option<&str>,
) -> Vec<Advisory> {
    let river_label = river_label.filter(|r| !r.is_empty());
    matches_state(table, state)
        .filter_map(|record| {
            let (zone, confidence) = model.predict(&record.feature_row());
            match build_advisory(record, zone, confidence) {
                Ok(mut advisory) => {
                    advisory.river_name = river_label.map(str::to_string);
                    Some(advisory)
                }
                Err(e) => {
                    warn!(
                        state,
                        species = record.scientific_name.as_deref().unwrap_or("?"),
                        "skipping record: {e}"
                    );
                    None
                }
            }
        })
        .collect()
}

/// One point per record of `state` carrying coordinates and a value for
/// `weight`; other records are skipped.
pub fn heatmap_points(
    table: &Dataset,
    state: &str,
    river_label: Option<&str>,
    weight: HeatmapWeight,
) -> Vec<HeatmapPoint> {
    if let Some(river) = river_label {
        debug!(river, "river label does not filter heat-map points");
    }
    matches_state(table, state)
        .filter_map(|r| {
            Some(HeatmapPoint {
                lat: r.latitude?,
                lon: r.longitude?,
                value: weight.value(r)?,
            })
        })
        .collect()
}

/// Sorted, de-duplicated states present in the table.
pub fn available_states(table: &Dataset) -> Vec<String> {
    table
        .records()
        .iter()
        .map(|r| r.state.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted, de-duplicated river names, optionally limited to one state.
/// Empty when the source had no `river_name` column.
pub fn available_rivers(table: &Dataset, state: Option<&str>) -> Vec<String> {
    if !table.has_river_column() {
        return Vec::new();
    }
    let rivers: BTreeSet<String> = match state {
        Some(s) => matches_state(table, s).filter_map(|r| r.river_name.clone()).collect(),
        None => table.records().iter().filter_map(|r| r.river_name.clone()).collect(),
    };
    rivers.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FeatureRow;
    use crate::zone::{Zone, N_ZONES};

    /// Always predicts Yellow with probability 0.7.
    struct Constant;

    impl ZoneClassifier for Constant {
        fn predict_proba(&self, _: &FeatureRow) -> [f64; N_ZONES] {
            [0.2, 0.7, 0.1]
        }
    }

    const CSV: &str = "\
scientific_name,latitude,longitude,state,water_type,season,gear_type,sea_surface_temp_C,chlorophyll_mg_m3,depth_m,min_legal_size_cm,juvenile_range_cm,economic_value_in_INR_per_kg,seasonal_disease,zone_label,river_name
Lates calcarifer,9.9,76.2,Kerala,Brackish,Monsoon,Trawl,28,3.0,10,30,10-20,650,,Red,Periyar
Rastrelliger kanagurta,10.1,75.9,kerala,Marine,Summer,Gillnet,29,,45,20,8-14,180,,Yellow,
Sardinella longiceps,15.4,73.8,Goa,Marine,Summer,Purse Seine,28,1.2,35,10,5-9,120,,Green,Mandovi
,10.5,75.7,Kerala,Marine,Winter,Hook and Line,27,0.9,60,25,12-18,900,,Green,Periyar
Etroplus suratensis,,76.0,Kerala,Brackish,Monsoon,Gillnet,28,2.4,4,12,4-8,300,,Red,Vembanad";

    fn table() -> Dataset {
        Dataset::from_reader(CSV.as_bytes()).unwrap()
    }

    #[test]
    fn state_match_is_case_insensitive_and_skips_bad_rows() {
        let t = table();
        let advs = advisories_for_state(&Constant, &t, "KERALA", Some("Periyar"));
        // Two Kerala rows lack species or latitude.
        assert_eq!(advs.len(), 2);
        assert_eq!(advs[0].species, "Lates calcarifer");
        assert_eq!(advs[1].species, "Rastrelliger kanagurta");
        for a in &advs {
            assert_eq!(a.zone, Zone::Yellow);
            assert_eq!(a.river_name.as_deref(), Some("Periyar"));
            assert_eq!(a.risk_factors.last().unwrap(), "Model confidence for Yellow zone: 0.70");
        }
    }

    #[test]
    fn state_is_compared_without_trimming() {
        let t = table();
        assert!(advisories_for_state(&Constant, &t, " Goa ", None).is_empty());
        assert!(heatmap_points(&t, "Goa ", None, HeatmapWeight::Depth).is_empty());
        assert_eq!(heatmap_points(&t, "gOA", None, HeatmapWeight::Depth).len(), 1);
    }

    #[test]
    fn river_label_never_filters() {
        let t = table();
        let with = advisories_for_state(&Constant, &t, "Goa", Some("Not A River"));
        let without = advisories_for_state(&Constant, &t, "Goa", None);
        assert_eq!(with.len(), 1);
        assert_eq!(without.len(), 1);
        assert!(without[0].river_name.is_none());
    }

    #[test]
    fn absent_state_yields_empty_list() {
        assert!(advisories_for_state(&Constant, &table(), "Odisha", None).is_empty());
        assert!(heatmap_points(&table(), "Odisha", None, HeatmapWeight::default()).is_empty());
    }

    #[test]
    fn heatmap_skips_rows_without_value() {
        let t = table();
        let risk = heatmap_points(&t, "kerala", None, HeatmapWeight::JuvenileRiskProb);
        // The row without latitude is dropped.
        assert_eq!(risk.len(), 3);
        assert!((risk[0].value - 1.0).abs() < 1e-12);
        assert_eq!((risk[0].lat, risk[0].lon), (9.9, 76.2));

        let value = heatmap_points(&t, "Kerala", Some("Periyar"), HeatmapWeight::EconomicValue);
        assert_eq!(value.iter().map(|p| p.value).collect::<Vec<_>>(), vec![650.0, 180.0, 900.0]);
    }

    #[test]
    fn weight_names_parse() {
        assert_eq!("depth_m".parse::<HeatmapWeight>(), Ok(HeatmapWeight::Depth));
        assert_eq!(
            "sea_surface_temp_C".parse::<HeatmapWeight>(),
            Ok(HeatmapWeight::SeaSurfaceTemp)
        );
        assert_eq!(
            "salinity".parse::<HeatmapWeight>(),
            Err(QueryError::UnknownWeight("salinity".into()))
        );
        for w in HeatmapWeight::ALL {
            assert_eq!(w.to_string().parse::<HeatmapWeight>(), Ok(w));
        }
    }

    #[test]
    fn listings_are_sorted_and_unique() {
        let t = table();
        assert_eq!(available_states(&t), vec!["Goa", "Kerala", "kerala"]);
        assert_eq!(available_rivers(&t, None), vec!["Mandovi", "Periyar", "Vembanad"]);
        assert_eq!(available_rivers(&t, Some("kerala")), vec!["Periyar", "Vembanad"]);
    }

    #[test]
    fn no_river_column_means_no_rivers() {
        let no_river = CSV
            .lines()
            .map(|l| l.rsplit_once(',').map_or(l, |(head, _)| head))
            .collect::<Vec<_>>()
            .join("\n");
        let t = Dataset::from_reader(no_river.as_bytes()).unwrap();
        assert!(!t.has_river_column());
        assert!(available_rivers(&t, None).is_empty());
    }
}
