//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche di conversione.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Tracking statistiche (file convertiti, errori, byte in ingresso/uscita)
//! - Riepilogo finale del batch
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [========================================] 150/150 (100%) [OK] photo.jpg
//! ```
//!
//! ## Esempio:
//! ```rust,ignore
//! let progress = ProgressManager::new(total_files);
//! progress.update("[OK] file.jpg");
//! progress.finish(&ConversionStats::from_result(&result).format_summary());
//! ```

use crate::converter::outcome::{BatchResult, ConversionOutcome};
use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for a batch
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Progress manager that draws nothing (JSON mode, tests)
    pub fn hidden(total_files: u64) -> Self {
        Self {
            bar: ProgressBar::with_draw_target(Some(total_files), ProgressDrawTarget::hidden()),
        }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Remove the bar without leaving a final line
    pub fn abandon(&self) {
        self.bar.finish_and_clear();
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> u64 {
        self.bar.position()
    }
}

/// Statistics of a completed batch
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConversionStats {
    pub files_processed: usize,
    pub files_converted: usize,
    pub errors: usize,
    pub total_input_size: u64,
    pub total_output_size: u64,
    pub duration_seconds: f64,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_result(result: &BatchResult) -> Self {
        let mut stats = Self::new();
        for outcome in &result.outcomes {
            stats.add(outcome);
        }
        stats.duration_seconds = result.duration.as_secs_f64();
        stats
    }

    pub fn add(&mut self, outcome: &ConversionOutcome) {
        self.files_processed += 1;
        match outcome {
            ConversionOutcome::Success {
                input_bytes,
                output_bytes,
                ..
            } => {
                self.files_converted += 1;
                self.total_input_size += input_bytes;
                self.total_output_size += output_bytes;
            }
            ConversionOutcome::Failure { .. } => self.errors += 1,
        }
    }

    /// Size reduction of the converted files, negative when they grew
    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_input_size > 0 {
            (1.0 - self.total_output_size as f64 / self.total_input_size as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Converted: {} | Errors: {} | {} -> {} ({:.2}%) in {:.2}s",
            self.files_processed,
            self.files_converted,
            self.errors,
            FileManager::format_size(self.total_input_size),
            FileManager::format_size(self.total_output_size),
            self.overall_reduction_percent(),
            self.duration_seconds,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_stats_from_result() {
        let result = BatchResult {
            outcomes: vec![
                ConversionOutcome::Success {
                    source: PathBuf::from("a.jpg"),
                    output: PathBuf::from("a.webp"),
                    input_bytes: 1000,
                    output_bytes: 250,
                },
                ConversionOutcome::failure(Path::new("d.jpg"), "boom"),
            ],
            duration: Duration::from_secs(2),
        };

        let stats = ConversionStats::from_result(&result);
        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.files_converted, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.overall_reduction_percent(), 75.0);
        assert!(stats.format_summary().starts_with("Processed: 2 files | Converted: 1 | Errors: 1"));
    }

    #[test]
    fn test_empty_stats() {
        let stats = ConversionStats::from_result(&BatchResult::default());
        assert_eq!(stats.files_processed, 0);
        assert_eq!(stats.overall_reduction_percent(), 0.0);
    }

    #[test]
    fn test_hidden_progress_counts() {
        let progress = ProgressManager::hidden(3);
        assert_eq!(progress.bar.length(), Some(3));
        progress.update("[OK] a.jpg");
        progress.update("[ERROR] d.jpg");
        assert_eq!(progress.position(), 2);
        progress.finish("done");
    }
}
