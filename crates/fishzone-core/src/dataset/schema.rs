//! CSV column names and the fixed feature layout bound to the classifier.

pub const SCIENTIFIC_NAME: &str = "scientific_name";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const STATE: &str = "state";
pub const WATER_TYPE: &str = "water_type";
pub const SEASON: &str = "season";
pub const GEAR_TYPE: &str = "gear_type";
pub const SEA_SURFACE_TEMP: &str = "sea_surface_temp_C";
pub const CHLOROPHYLL: &str = "chlorophyll_mg_m3";
pub const DEPTH: &str = "depth_m";
pub const MIN_LEGAL_SIZE: &str = "min_legal_size_cm";
pub const JUVENILE_RANGE: &str = "juvenile_range_cm";
pub const ECONOMIC_VALUE: &str = "economic_value_in_INR_per_kg";
pub const SEASONAL_DISEASE: &str = "seasonal_disease";
pub const ZONE_LABEL: &str = "zone_label";
pub const RIVER_NAME: &str = "river_name";

/// Columns whose absence aborts loading.
pub const REQUIRED_COLUMNS: [&str; 13] = [
    SCIENTIFIC_NAME,
    LATITUDE,
    LONGITUDE,
    STATE,
    WATER_TYPE,
    SEASON,
    GEAR_TYPE,
    CHLOROPHYLL,
    DEPTH,
    MIN_LEGAL_SIZE,
    JUVENILE_RANGE,
    ECONOMIC_VALUE,
    ZONE_LABEL,
];

/// Cell contents treated as missing, matching common CSV NA markers.
pub const MISSING_TOKENS: [&str; 12] =
    ["", "NA", "N/A", "n/a", "NaN", "nan", "-nan", "null", "NULL", "None", "<NA>", "#N/A"];

/// Categorical fill token.
pub const UNKNOWN: &str = "Unknown";

// ── Feature layout ───────────────────────────────────────────────────────────

pub const N_NUMERIC: usize = 8;
pub const N_CATEGORICAL: usize = 4;
pub const N_BOOLEAN: usize = 7;

pub const NUMERIC_FEATURES: [&str; N_NUMERIC] = [
    SEA_SURFACE_TEMP,
    CHLOROPHYLL,
    DEPTH,
    MIN_LEGAL_SIZE,
    "juvenile_min_cm",
    "juvenile_max_cm",
    "juvenile_risk_score",
    "economic_priority_score",
];

pub const CATEGORICAL_FEATURES: [&str; N_CATEGORICAL] = [STATE, WATER_TYPE, SEASON, GEAR_TYPE];

pub const BOOLEAN_FEATURES: [&str; N_BOOLEAN] = [
    "juvenile_dominance",
    "disease_risk",
    "is_shallow",
    "high_chl",
    "is_monsoonish",
    "is_brackish",
    "non_selective_gear",
];
