//! Cobot telemetry preprocessing.
//!
//! Turns a controller log (string-encoded joint vectors, mixed timestamp
//! formats, boolean flags written as text) into a clean numeric table, and
//! derives the bounded preview and schema summary an analysis layer needs.
//!
//! ```no_run
//! use std::path::Path;
//! use cobot_telemetry::{pipeline, PipelineConfig};
//!
//! let out = pipeline::run(Path::new("robot_log.csv"), &PipelineConfig::default())?;
//! println!("{}\n\n{}", out.analysis.preview, out.analysis.schema);
//! # Ok::<(), cobot_telemetry::Error>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;

pub use config::PipelineConfig;
pub use data::model::{Cell, Column, DType, Table, TIMESTAMP_COLUMN};
pub use error::{Error, Result};
pub use pipeline::{preprocess, PipelineOutput};
pub use report::AnalysisInput;
