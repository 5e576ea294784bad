//! Per-file outcomes and the aggregated batch result.

use crate::file_manager::FileManager;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Result of converting one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    Success {
        source: PathBuf,
        output: PathBuf,
        input_bytes: u64,
        output_bytes: u64,
    },
    Failure {
        source: PathBuf,
        file_name: String,
        error: String,
    },
}

impl ConversionOutcome {
    pub fn failure(source: &Path, error: impl ToString) -> Self {
        Self::Failure {
            source: source.to_path_buf(),
            file_name: source
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn source(&self) -> &Path {
        match self {
            Self::Success { source, .. } | Self::Failure { source, .. } => source,
        }
    }

    /// Empty on success, the captured error text otherwise
    pub fn message(&self) -> String {
        match self {
            Self::Success { .. } => String::new(),
            Self::Failure {
                file_name, error, ..
            } => format!("Could not process {}: {}.", file_name, error),
        }
    }

    /// One human readable report line
    pub fn report_line(&self) -> String {
        match self {
            Self::Success {
                source,
                output,
                input_bytes,
                output_bytes,
            } => format!(
                "[OK] {} -> {} ({} -> {})",
                source.file_name().unwrap_or_default().to_string_lossy(),
                output.display(),
                FileManager::format_size(*input_bytes),
                FileManager::format_size(*output_bytes),
            ),
            Self::Failure { .. } => format!("[ERROR] {}", self.message()),
        }
    }
}

/// Outcomes of one batch, in discovery order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub outcomes: Vec<ConversionOutcome>,
    pub duration: Duration,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Outcome of the source whose file name is `name`
    #[cfg(test)]
    pub(crate) fn outcome_for(&self, name: &str) -> Option<&ConversionOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.source().file_name().map_or(false, |n| n == name))
    }
}
