//! The preprocessing pipeline: load → expand → coerce → normalize → report.

use std::path::Path;

use log::info;

use crate::config::PipelineConfig;
use crate::data::coerce::coerce_types;
use crate::data::expand::expand_vector_columns;
use crate::data::loader::{load_file_with_report, TimestampReport};
use crate::data::model::Table;
use crate::data::normalize::normalize;
use crate::error::Result;
use crate::report::AnalysisInput;

/// Clean table plus the text artifacts derived from it.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: Table,
    pub analysis: AnalysisInput,
    /// How the loader repaired the time column.
    pub timestamps: TimestampReport,
}

/// Expand vector columns, coerce text columns, then min-max scale.
pub fn preprocess(table: &Table, config: &PipelineConfig) -> Table {
    let expanded = expand_vector_columns(
        table,
        &config.vector_candidates,
        config.expected_len,
        config.drop_original,
    );
    let coerced = coerce_types(&expanded);
    normalize(&coerced, &config.exclude_from_normalization)
}

/// Load a log file and run the full pipeline on it.
pub fn run(path: &Path, config: &PipelineConfig) -> Result<PipelineOutput> {
    let (raw, timestamps) = load_file_with_report(path, config.delimiter_byte()?)?;
    let table = preprocess(&raw, config);
    info!(
        "preprocessed {} rows, {} -> {} columns",
        table.height(),
        raw.width(),
        table.width()
    );
    let analysis = AnalysisInput::from_table(&table, config.preview_rows);
    Ok(PipelineOutput {
        table,
        analysis,
        timestamps,
    })
}
