//! Hubmine Export - incremental and batch persistence of mined records.
//!
//! Every record is written to a pair of files derived from one basename:
//!
//! - `<base>_raw.json` - a pretty-printed JSON array that stays valid after
//!   each append
//! - `<base>_ml_features.csv` - one fixed-column feature row per record
//!
//! # Example
//!
//! ```rust,no_run
//! use hubmine_core::EntityRecord;
//! use hubmine_export::ExportSink;
//!
//! # async fn example(record: EntityRecord) -> Result<(), hubmine_export::SinkError> {
//! let sink = ExportSink::for_basename("contributors");
//! sink.append_record(record).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod batch;
pub mod csv_log;
pub mod error;
pub mod features;
pub mod json_log;
pub mod sink;

// Re-export commonly used types
pub use batch::{convert_json_to_csv, export_dataset};
pub use csv_log::CsvFeatureLog;
pub use error::{Result, SinkError};
pub use features::{FeatureRow, COLUMNS};
pub use json_log::JsonArrayLog;
pub use sink::{ExportSink, SinkPaths};
