//! # Progress Tracking Module
//!
//! Tracker thread-safe condiviso tra i task di conversione.
//! Gestisce sia output JSON che progress bar tradizionale.

use crate::{
    converter::outcome::ConversionOutcome, json_output::JsonMessage, progress::ProgressManager,
};

/// Progress shared by every task of a batch
#[derive(Clone)]
pub struct ProgressTracker {
    pub total_files: usize,
    json_output: bool,
    progress_manager: ProgressManager,
}

impl ProgressTracker {
    /// Crea un nuovo tracker
    pub fn new(total_files: usize, json_output: bool) -> Self {
        let progress_manager = if json_output {
            ProgressManager::hidden(total_files as u64)
        } else {
            ProgressManager::new(total_files as u64)
        };
        Self::with_manager(total_files, json_output, progress_manager)
    }

    pub fn with_manager(total_files: usize, json_output: bool, progress_manager: ProgressManager) -> Self {
        Self {
            total_files,
            json_output,
            progress_manager,
        }
    }

    /// Record a finished file and surface it on the bar or as a JSON event
    pub fn handle_completion(&self, index: usize, outcome: &ConversionOutcome) {
        if self.json_output {
            JsonMessage::file_complete(index, self.total_files, outcome).emit();
        }

        let name = outcome
            .source()
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let message = if outcome.is_success() {
            format!("[OK] {}", name)
        } else {
            format!("[ERROR] {}", name)
        };
        self.progress_manager.update(&message);
    }

    /// Finalizza progress bar
    pub fn finish(&self, summary: &str) {
        self.progress_manager.finish(summary);
    }

    /// Clear the bar of an aborted batch
    pub fn abandon(&self) {
        self.progress_manager.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_clones_share_the_bar() {
        let tracker = ProgressTracker::with_manager(3, false, ProgressManager::hidden(3));
        let clone = tracker.clone();

        tracker.handle_completion(
            0,
            &ConversionOutcome::Success {
                source: PathBuf::from("a.jpg"),
                output: PathBuf::from("a.webp"),
                input_bytes: 10,
                output_bytes: 5,
            },
        );
        clone.handle_completion(1, &ConversionOutcome::failure(Path::new("d.jpg"), "bad"));

        assert_eq!(tracker.progress_manager.position(), 2);
    }
}
