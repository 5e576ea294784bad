//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione di un batch di conversione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri della conversione
//! - Fornisce validazione dei parametri di input
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `input_dir`: Directory con le immagini sorgente (JPEG/PNG)
//! - `output_dir`: Directory dove scrivere i file convertiti
//! - `format`: Formato di destinazione (WebP o JPEG-XL)
//! - `quality`: Qualità di encoding, fissa a 90
//! - `workers`: Numero massimo di conversioni parallele (default: numero di CPU)
//! - `task_timeout_secs`: Timeout opzionale per singolo file
//! - `collision_policy`: Cosa fare con file che hanno lo stesso stem
//! - `json_output`: Output JSON per uso programmatico
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     input_dir: "photos".into(),
//!     output_dir: "converted".into(),
//!     format: TargetFormat::Jxl,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::converter::path_resolver::CollisionPolicy;
use crate::format::TargetFormat;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Re-encode quality applied to every conversion
pub const DEFAULT_QUALITY: u8 = 90;

/// Configuration for a batch conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanned (non-recursively) for source images
    pub input_dir: PathBuf,
    /// Directory receiving the converted images
    pub output_dir: PathBuf,
    /// Target format for the whole batch
    pub format: TargetFormat,
    /// Encoder quality (1-100)
    pub quality: u8,
    /// Maximum number of conversions running at once
    pub workers: usize,
    /// Per-file timeout; an expired timeout fails only that file
    pub task_timeout_secs: Option<u64>,
    /// How same-stem sources are mapped to output paths
    pub collision_policy: CollisionPolicy,
    /// Output report and progress as JSON lines
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("converted"),
            format: TargetFormat::Webp,
            quality: DEFAULT_QUALITY,
            workers: default_workers(),
            task_timeout_secs: None,
            collision_policy: CollisionPolicy::default(),
            json_output: false,
        }
    }
}

/// Number of CPUs available to the process, at least 1
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(anyhow::anyhow!("Quality must be between 1 and 100"));
        }

        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        if self.task_timeout_secs == Some(0) {
            return Err(anyhow::anyhow!("Task timeout must be greater than 0 seconds"));
        }

        Ok(())
    }

    /// Per-file timeout as a `Duration`
    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout_secs.map(Duration::from_secs)
    }
}
