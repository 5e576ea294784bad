//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON (`--json`) per uso programmatico.
//!
//! ## Responsabilità:
//! - Emette una riga JSON per evento su stdout
//! - Riutilizza `ConversionOutcome` e `ConversionStats` per i contenuti
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio del batch
//! - `file_complete`: Fine elaborazione di un file (successo o errore)
//! - `complete`: Fine del batch con statistiche finali
//! - `error`: Errore fatale, il batch è stato interrotto

use crate::config::Config;
use crate::converter::outcome::ConversionOutcome;
use crate::format::TargetFormat;
use crate::progress::ConversionStats;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio del batch
    #[serde(rename = "start")]
    Start {
        input_dir: PathBuf,
        output_dir: PathBuf,
        format: TargetFormat,
        quality: u8,
        workers: usize,
        total_files: usize,
    },

    /// Fine elaborazione di un file specifico
    #[serde(rename = "file_complete")]
    FileComplete {
        index: usize,
        total: usize,
        #[serde(flatten)]
        outcome: ConversionOutcome,
        message: String,
    },

    /// Batch completato
    #[serde(rename = "complete")]
    Complete {
        files_processed: usize,
        files_converted: usize,
        errors: usize,
        total_input_size: u64,
        total_output_size: u64,
        duration_seconds: f64,
        messages: Vec<String>,
    },

    /// Errore fatale
    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    /// Crea un messaggio di inizio
    pub fn start(config: &Config, total_files: usize) -> Self {
        Self::Start {
            input_dir: config.input_dir.clone(),
            output_dir: config.output_dir.clone(),
            format: config.format,
            quality: config.quality,
            workers: config.workers,
            total_files,
        }
    }

    /// Crea un messaggio di completamento file
    pub fn file_complete(index: usize, total: usize, outcome: &ConversionOutcome) -> Self {
        Self::FileComplete {
            index,
            total,
            message: outcome.message(),
            outcome: outcome.clone(),
        }
    }

    /// Crea un messaggio di completamento generale
    pub fn complete(stats: &ConversionStats, messages: Vec<String>) -> Self {
        Self::Complete {
            files_processed: stats.files_processed,
            files_converted: stats.files_converted,
            errors: stats.errors,
            total_input_size: stats.total_input_size,
            total_output_size: stats.total_output_size,
            duration_seconds: stats.duration_seconds,
            messages,
        }
    }

    /// Crea un messaggio di errore
    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_file_complete_shape() {
        let outcome = ConversionOutcome::failure(Path::new("in/d.jpg"), "bad data");
        let value = serde_json::to_value(JsonMessage::file_complete(2, 3, &outcome)).unwrap();

        assert_eq!(value["type"], "file_complete");
        assert_eq!(value["status"], "failure");
        assert_eq!(value["file_name"], "d.jpg");
        assert_eq!(value["message"], "Could not process d.jpg: bad data.");
        assert_eq!(value["index"], 2);
    }

    #[test]
    fn test_start_and_error_shape() {
        let config = Config {
            format: TargetFormat::Jxl,
            workers: 2,
            ..Default::default()
        };
        let value = serde_json::to_value(JsonMessage::start(&config, 5)).unwrap();
        assert_eq!(value["type"], "start");
        assert_eq!(value["format"], "jxl");
        assert_eq!(value["quality"], 90);
        assert_eq!(value["total_files"], 5);

        let value = serde_json::to_value(JsonMessage::error("fatal".into(), None)).unwrap();
        assert_eq!(value["type"], "error");
        assert!(value["details"].is_null());
    }
}
