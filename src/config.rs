//! Generator configuration.

use std::path::PathBuf;

use serde::Serialize;

/// What to do with a candidate type name the source file never declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownTypePolicy {
    /// Log a warning and drop the name from the candidate list.
    #[default]
    Warn,
    /// Abort the run.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Config {
    /// Go file declaring the request/response types.
    pub input_file: PathBuf,
    /// Generated test file.
    pub output_file: PathBuf,
    /// Test case documents: literal paths or glob patterns.
    pub test_cases: Vec<String>,
    pub request_types: Vec<String>,
    pub response_types: Vec<String>,
    /// Template file; the built-in template when `None`.
    pub template: Option<PathBuf>,
    /// jq filter applied to each test case document before decoding.
    pub jq_expr: Option<String>,
    pub unknown_types: UnknownTypePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("input file is required")]
    MissingInput,
    #[error("output file is required")]
    MissingOutput,
    #[error("test cases file is required")]
    MissingTestCases,
}

impl Config {
    /// Reports the first missing required path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingInput);
        }
        if self.output_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingOutput);
        }
        if self.test_cases.iter().all(|p| p.trim().is_empty()) {
            return Err(ConfigError::MissingTestCases);
        }
        Ok(())
    }
}

/// Split a comma-separated type list, trimming entries and dropping empty ones.
pub fn parse_type_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
