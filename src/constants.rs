/// Shared names and formats used across the pipeline stages

// Source run when the CLI gets no arguments
pub const DEFAULT_SOURCE: &str = "sample_sales";

pub const DEFAULT_CONFIG_PATH: &str = "./config/config.yaml";

/// Fill value for missing categorical cells
pub const UNKNOWN_FILL: &str = "Unknown";

/// Column appended by the transformer to every row
pub const PROCESSED_AT_COLUMN: &str = "processed_at";

// chrono format strings for file names
pub const DAY_STAMP_FORMAT: &str = "%Y%m%d";
pub const RUN_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// How timestamps are rendered in delimited text output
pub const TIMESTAMP_TEXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Cell spellings read back as missing values
pub const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_null_marker(cell: &str) -> bool {
    NULL_MARKERS.contains(&cell)
}

/// `{source}_{YYYYMMDD}.csv`
pub fn raw_file_name(source_name: &str, day_stamp: &str) -> String {
    format!("{source_name}_{day_stamp}.csv")
}

/// `{source}_processed_{YYYYMMDD_HHMMSS}`
pub fn processed_file_stem(source_name: &str, run_stamp: &str) -> String {
    format!("{source_name}_processed_{run_stamp}")
}

/// `pipeline_{YYYYMMDD}.log`
pub fn log_file_name(day_stamp: &str) -> String {
    format!("pipeline_{day_stamp}.log")
}
