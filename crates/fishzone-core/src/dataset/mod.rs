//! Feature derivation from the fisheries CSV snapshot.
//!
//! Raw rows are read once, turned into `DerivedRecord`s (parsed juvenile
//! range, risk indicators, additive score, economic priority), imputed per
//! water-type group and kept as the single annotated table used for both
//! training and serving.

pub mod impute;
pub mod range;
pub mod schema;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::risk::{IndicatorInputs, RiskIndicators};
use crate::zone::Zone;
use impute::{fill_group_median, max_rank_fraction};
use range::parse_juvenile_range;
use schema::{N_BOOLEAN, N_CATEGORICAL, N_NUMERIC, MISSING_TOKENS, UNKNOWN};

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("required column '{0}' is missing from the dataset")]
    MissingColumn(String),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: zone_label {} is not one of Green, Yellow, Red", .value.as_deref().map_or("<missing>".to_string(), |v| format!("'{v}'")))]
    InvalidZone { line: usize, value: Option<String> },
}

// ── Records ──────────────────────────────────────────────────────────────────

/// One CSV row with missing cells as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub scientific_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub state: Option<String>,
    pub water_type: Option<String>,
    pub season: Option<String>,
    pub gear_type: Option<String>,
    pub sea_surface_temp_c: Option<f64>,
    pub chlorophyll_mg_m3: Option<f64>,
    pub depth_m: Option<f64>,
    pub min_legal_size_cm: Option<f64>,
    pub juvenile_range_cm: Option<String>,
    pub economic_value_inr_per_kg: Option<f64>,
    pub seasonal_disease: Option<String>,
    pub river_name: Option<String>,
    pub zone_label: Zone,
}

/// Raw record plus engineered attributes, after load-time imputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    pub scientific_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub state: String,
    pub water_type: String,
    pub season: String,
    pub gear_type: String,
    pub sea_surface_temp_c: Option<f64>,
    pub chlorophyll_mg_m3: Option<f64>,
    pub depth_m: Option<f64>,
    pub min_legal_size_cm: Option<f64>,
    pub juvenile_range_cm: Option<String>,
    pub juvenile_min_cm: Option<f64>,
    pub juvenile_max_cm: Option<f64>,
    pub economic_value_inr_per_kg: Option<f64>,
    pub seasonal_disease: Option<String>,
    pub river_name: Option<String>,
    pub zone_label: Zone,
    pub indicators: RiskIndicators,
    pub disease_risk: bool,
    /// Count of true indicators, 0-6.
    pub risk_score: u8,
    /// Max-rank of economic value over all rows / row count.
    pub economic_priority: Option<f64>,
}

/// Model input for one record in the fixed feature layout of `schema`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub numeric: [Option<f64>; N_NUMERIC],
    pub categorical: [String; N_CATEGORICAL],
    pub boolean: [bool; N_BOOLEAN],
}

impl DerivedRecord {
    pub fn feature_row(&self) -> FeatureRow {
        FeatureRow {
            numeric: [
                self.sea_surface_temp_c,
                self.chlorophyll_mg_m3,
                self.depth_m,
                self.min_legal_size_cm,
                self.juvenile_min_cm,
                self.juvenile_max_cm,
                Some(self.risk_score as f64),
                self.economic_priority,
            ],
            categorical: [
                self.state.clone(),
                self.water_type.clone(),
                self.season.clone(),
                self.gear_type.clone(),
            ],
            boolean: [
                self.indicators.juvenile_dominance,
                self.disease_risk,
                self.indicators.is_shallow,
                self.indicators.high_chlorophyll,
                self.indicators.is_monsoon_season,
                self.indicators.is_brackish,
                self.indicators.non_selective_gear,
            ],
        }
    }
}

// ── Derivation ───────────────────────────────────────────────────────────────

/// Derive the engineered attributes of a single row. Pure: the same inputs
/// always give the same record. Imputation is a table-level step applied
/// afterwards by `derive_table`.
pub fn derive_record(raw: &RawRecord, economic_priority: Option<f64>) -> DerivedRecord {
    let (juvenile_min_cm, juvenile_max_cm) = parse_juvenile_range(raw.juvenile_range_cm.as_deref());

    let indicators = RiskIndicators::evaluate(&IndicatorInputs {
        juvenile_max_cm,
        min_legal_size_cm: raw.min_legal_size_cm,
        depth_m: raw.depth_m,
        chlorophyll_mg_m3: raw.chlorophyll_mg_m3,
        season: raw.season.as_deref(),
        water_type: raw.water_type.as_deref(),
        gear_type: raw.gear_type.as_deref(),
    });

    let or_unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| UNKNOWN.to_string());

    DerivedRecord {
        scientific_name: raw.scientific_name.clone(),
        latitude: raw.latitude,
        longitude: raw.longitude,
        state: or_unknown(&raw.state),
        water_type: or_unknown(&raw.water_type),
        season: or_unknown(&raw.season),
        gear_type: or_unknown(&raw.gear_type),
        sea_surface_temp_c: raw.sea_surface_temp_c,
        chlorophyll_mg_m3: raw.chlorophyll_mg_m3,
        depth_m: raw.depth_m,
        min_legal_size_cm: raw.min_legal_size_cm,
        juvenile_range_cm: raw.juvenile_range_cm.clone(),
        juvenile_min_cm,
        juvenile_max_cm,
        economic_value_inr_per_kg: raw.economic_value_inr_per_kg,
        seasonal_disease: raw.seasonal_disease.clone(),
        river_name: raw.river_name.clone(),
        zone_label: raw.zone_label,
        indicators,
        disease_risk: raw.seasonal_disease.is_some(),
        risk_score: indicators.count(),
        economic_priority,
    }
}

/// Numeric features subject to group-median imputation. The risk score is
/// never missing and is left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImputedColumn {
    SeaSurfaceTemp,
    Chlorophyll,
    Depth,
    MinLegalSize,
    JuvenileMin,
    JuvenileMax,
    EconomicPriority,
}

impl ImputedColumn {
    const ALL: [ImputedColumn; 7] = [
        ImputedColumn::SeaSurfaceTemp,
        ImputedColumn::Chlorophyll,
        ImputedColumn::Depth,
        ImputedColumn::MinLegalSize,
        ImputedColumn::JuvenileMin,
        ImputedColumn::JuvenileMax,
        ImputedColumn::EconomicPriority,
    ];

    fn slot(self, r: &mut DerivedRecord) -> &mut Option<f64> {
        match self {
            ImputedColumn::SeaSurfaceTemp => &mut r.sea_surface_temp_c,
            ImputedColumn::Chlorophyll => &mut r.chlorophyll_mg_m3,
            ImputedColumn::Depth => &mut r.depth_m,
            ImputedColumn::MinLegalSize => &mut r.min_legal_size_cm,
            ImputedColumn::JuvenileMin => &mut r.juvenile_min_cm,
            ImputedColumn::JuvenileMax => &mut r.juvenile_max_cm,
            ImputedColumn::EconomicPriority => &mut r.economic_priority,
        }
    }
}

/// Derive every row, then impute missing numeric features with the median of
/// the same water-type group.
pub fn derive_table(raws: &[RawRecord]) -> Vec<DerivedRecord> {
    let values: Vec<Option<f64>> = raws.iter().map(|r| r.economic_value_inr_per_kg).collect();
    let priorities = max_rank_fraction(&values);

    let mut records: Vec<DerivedRecord> = raws
        .iter()
        .zip(priorities)
        .map(|(raw, priority)| derive_record(raw, priority))
        .collect();

    // Grouping uses the raw water type: rows that were missing it belong to
    // no group, even though they now carry the "Unknown" token.
    let groups: Vec<Option<&str>> = raws.iter().map(|r| r.water_type.as_deref()).collect();

    for column in ImputedColumn::ALL {
        let mut values: Vec<Option<f64>> = records.iter_mut().map(|r| *column.slot(r)).collect();
        if values.iter().all(Option::is_some) {
            continue;
        }
        fill_group_median(&mut values, &groups);
        for (record, value) in records.iter_mut().zip(values) {
            *column.slot(record) = value;
        }
    }

    records
}

// ── CSV reading ──────────────────────────────────────────────────────────────

/// Header positions, resolved once per file.
struct ColumnIndex {
    scientific_name: usize,
    latitude: usize,
    longitude: usize,
    state: usize,
    water_type: usize,
    season: usize,
    gear_type: usize,
    sea_surface_temp: Option<usize>,
    chlorophyll: usize,
    depth: usize,
    min_legal_size: usize,
    juvenile_range: usize,
    economic_value: usize,
    seasonal_disease: Option<usize>,
    river_name: Option<usize>,
    zone_label: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, DatasetError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        if let Some(missing) = schema::REQUIRED_COLUMNS.iter().find(|&&c| find(c).is_none()) {
            return Err(DatasetError::MissingColumn(missing.to_string()));
        }
        let req = |name: &str| find(name).ok_or_else(|| DatasetError::MissingColumn(name.to_string()));

        Ok(Self {
            scientific_name: req(schema::SCIENTIFIC_NAME)?,
            latitude: req(schema::LATITUDE)?,
            longitude: req(schema::LONGITUDE)?,
            state: req(schema::STATE)?,
            water_type: req(schema::WATER_TYPE)?,
            season: req(schema::SEASON)?,
            gear_type: req(schema::GEAR_TYPE)?,
            sea_surface_temp: find(schema::SEA_SURFACE_TEMP),
            chlorophyll: req(schema::CHLOROPHYLL)?,
            depth: req(schema::DEPTH)?,
            min_legal_size: req(schema::MIN_LEGAL_SIZE)?,
            juvenile_range: req(schema::JUVENILE_RANGE)?,
            economic_value: req(schema::ECONOMIC_VALUE)?,
            seasonal_disease: find(schema::SEASONAL_DISEASE),
            river_name: find(schema::RIVER_NAME),
            zone_label: req(schema::ZONE_LABEL)?,
        })
    }
}

fn text(record: &csv::StringRecord, idx: usize) -> Option<String> {
    let cell = record.get(idx)?;
    if MISSING_TOKENS.contains(&cell.trim()) {
        None
    } else {
        Some(cell.to_string())
    }
}

fn number(record: &csv::StringRecord, idx: usize) -> Option<f64> {
    text(record, idx)?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn read_raw_records<R: io::Read>(reader: R) -> Result<(Vec<RawRecord>, bool), DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = ColumnIndex::from_headers(csv_reader.headers()?)?;

    let mut rows = Vec::new();
    for (i, result) in csv_reader.records().enumerate() {
        let record = result?;
        // Header is line 1.
        let line = i + 2;

        let label = text(&record, columns.zone_label);
        let zone_label = match label.as_deref().map(str::parse::<Zone>) {
            Some(Ok(z)) => z,
            _ => return Err(DatasetError::InvalidZone { line, value: label }),
        };

        let opt_text = |idx: Option<usize>| idx.and_then(|i| text(&record, i));
        let opt_number = |idx: Option<usize>| idx.and_then(|i| number(&record, i));

        rows.push(RawRecord {
            scientific_name: text(&record, columns.scientific_name),
            latitude: number(&record, columns.latitude),
            longitude: number(&record, columns.longitude),
            state: text(&record, columns.state),
            water_type: text(&record, columns.water_type),
            season: text(&record, columns.season),
            gear_type: text(&record, columns.gear_type),
            sea_surface_temp_c: opt_number(columns.sea_surface_temp),
            chlorophyll_mg_m3: number(&record, columns.chlorophyll),
            depth_m: number(&record, columns.depth),
            min_legal_size_cm: number(&record, columns.min_legal_size),
            juvenile_range_cm: text(&record, columns.juvenile_range),
            economic_value_inr_per_kg: number(&record, columns.economic_value),
            seasonal_disease: opt_text(columns.seasonal_disease),
            river_name: opt_text(columns.river_name),
            zone_label,
        });
    }
    Ok((rows, columns.river_name.is_some()))
}

// ── Dataset ──────────────────────────────────────────────────────────────────

/// The annotated table: every row with derived and imputed attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<DerivedRecord>,
    has_river_column: bool,
}

impl Dataset {
    /// Read and derive a dataset from any CSV source.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, DatasetError> {
        let (raws, has_river_column) = read_raw_records(reader)?;
        Ok(Self::from_raw(&raws, has_river_column))
    }

    pub fn from_raw(raws: &[RawRecord], has_river_column: bool) -> Self {
        Self {
            records: derive_table(raws),
            has_river_column,
        }
    }

    pub fn records(&self) -> &[DerivedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when the source CSV carried a `river_name` column.
    pub fn has_river_column(&self) -> bool {
        self.has_river_column
    }

    /// Feature matrix in table order.
    pub fn feature_rows(&self) -> Vec<FeatureRow> {
        self.records.iter().map(DerivedRecord::feature_row).collect()
    }

    /// Target vector in table order.
    pub fn labels(&self) -> Vec<Zone> {
        self.records.iter().map(|r| r.zone_label).collect()
    }
}

/// Load the fisheries CSV at `path`.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, DatasetError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DatasetError::NotFound(path.to_path_buf()));
    }
    let file = fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Dataset::from_reader(io::BufReader::new(file))
}
