//! Batch ETL: fetch a CSV source over HTTP, clean it, write Parquet and CSV.

pub mod config;
pub mod constants;
pub mod csv_io;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod load;
pub mod logging;
pub mod parquet_out;
pub mod pipeline;
pub mod transform;
pub mod validate;

// Re-export commonly used types
pub use config::Config;
pub use dataset::{classify, Column, ColumnKind, Dataset, Value};
pub use error::{EtlError, Result};
pub use pipeline::Pipeline;
