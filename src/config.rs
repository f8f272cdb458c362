//! Pipeline configuration.
//!
//! Everything the stages need is passed in explicitly; nothing is read from
//! the environment.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::model::TIMESTAMP_COLUMN;
use crate::error::{Error, Result};

/// Vector-valued columns written by the robot controller.
pub const DEFAULT_VECTOR_CANDIDATES: &[&str] = &[
    "q", "qdot", "qddot", "qdes", "qdotdes", "qddotdes",
    "p", "pdot", "pddot", "pdes", "pdotdes", "pddotdes",
    "tau", "tau_act", "tau_ext",
    "status_codes", "temperatures", "voltages", "currents",
    "servo_actives", "brake_actives",
];

/// One entry per joint of a 6-axis arm.
pub const DEFAULT_VECTOR_LEN: usize = 6;

pub const DEFAULT_PREVIEW_ROWS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Columns considered for vector expansion, in output order.
    pub vector_candidates: Vec<String>,
    /// Required list length when picking the expansion width.
    /// `None` takes the first list of any length.
    pub expected_len: Option<usize>,
    /// Remove expanded source columns.
    pub drop_original: bool,
    /// Columns never min-max scaled.
    pub exclude_from_normalization: Vec<String>,
    /// Row budget of the text preview.
    pub preview_rows: usize,
    /// Field delimiter of delimited input. Must be ASCII.
    pub delimiter: char,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            vector_candidates: DEFAULT_VECTOR_CANDIDATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            expected_len: Some(DEFAULT_VECTOR_LEN),
            drop_original: false,
            exclude_from_normalization: vec![TIMESTAMP_COLUMN.to_string()],
            preview_rows: DEFAULT_PREVIEW_ROWS,
            delimiter: ',',
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))?;
        config.delimiter_byte()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| Error::config(format!("delimiter {:?} is not ASCII", self.delimiter)))
    }

    pub fn with_vector_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vector_candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_expected_len(mut self, expected_len: Option<usize>) -> Self {
        self.expected_len = expected_len;
        self
    }

    pub fn with_drop_original(mut self, drop_original: bool) -> Self {
        self.drop_original = drop_original;
        self
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_joint_columns() {
        let config = PipelineConfig::default();
        assert_eq!(config.vector_candidates.len(), 21);
        assert_eq!(config.expected_len, Some(6));
        assert!(!config.drop_original);
        assert_eq!(config.exclude_from_normalization, vec!["timestamp".to_string()]);
        assert_eq!(config.delimiter_byte().unwrap(), b',');
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            PipelineConfig::from_json_str(r#"{"drop_original": true, "expected_len": null}"#)
                .unwrap();
        assert!(config.drop_original);
        assert_eq!(config.expected_len, None);
        assert_eq!(config.preview_rows, DEFAULT_PREVIEW_ROWS);
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        assert!(matches!(
            PipelineConfig::from_json_str("{ nope"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"delimiter": "é"}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn builder_setters() {
        let config = PipelineConfig::default()
            .with_vector_candidates(["q"])
            .with_expected_len(Some(7))
            .with_preview_rows(4)
            .with_delimiter(';');
        assert_eq!(config.vector_candidates, vec!["q".to_string()]);
        assert_eq!(config.expected_len, Some(7));
        assert_eq!(config.preview_rows, 4);
        assert_eq!(config.delimiter_byte().unwrap(), b';');
    }
}
