//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `ConvertError` per gli errori fatali che interrompono il batch
//! - Definisce `ScanError` per i fallimenti della scansione della directory
//! - Definisce `CodecError` per i fallimenti locali di un singolo file
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Scan`: la directory di input non può essere letta (fatale)
//! - `OutputPrep`: la directory di output non può essere preparata (fatale)
//! - `CodecUnavailable`: encoder esterno mancante (fatale)
//! - `Orchestration`: un task è andato in panic (fatale)
//! - `Cancelled`: segnale di shutdown durante l'attesa (fatale)
//! - `CodecError`: errore di decode/encode/scrittura di un file (locale, mai propagato)
//!
//! ## Esempio:
//! ```rust,ignore
//! if !tool_exists {
//!     return Err(ConvertError::CodecUnavailable { tool: "cjxl".into(), hint: hint.into() });
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;

/// Fatal errors that abort the whole batch
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("Scan failure: {0}")]
    Scan(#[from] ScanError),

    #[error("Cannot prepare output directory {}: {reason}", path.display())]
    OutputPrep { path: PathBuf, reason: String },

    #[error("Encoder '{tool}' is not available. {hint}")]
    CodecUnavailable { tool: String, hint: String },

    #[error("Orchestration failure: {0}")]
    Orchestration(String),

    #[error("Batch cancelled with {pending} conversions not collected")]
    Cancelled { pending: usize },
}

/// Reasons the input directory could not be listed
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("input directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("permission denied while listing {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("input path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error raised while opening or iterating `path`
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::DirectoryNotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}

/// Per-file failures raised by a codec; always converted into a failed outcome
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("cannot decode source image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("unsupported source image: {0}")]
    Unsupported(String),

    #[error("{tool} exited with {status}: {stderr}")]
    EncoderFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("encoder '{0}' not found")]
    ToolMissing(String),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot write output file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_scan_error_classification() {
        let path = PathBuf::from("/missing");

        let err = ScanError::from_io(path.clone(), Error::from(ErrorKind::NotFound));
        assert!(matches!(err, ScanError::DirectoryNotFound(_)));

        let err = ScanError::from_io(path.clone(), Error::from(ErrorKind::PermissionDenied));
        assert!(matches!(err, ScanError::PermissionDenied(_)));

        let err = ScanError::from_io(path, Error::from(ErrorKind::Other));
        assert!(matches!(err, ScanError::Io { .. }));
    }

    #[test]
    fn test_fatal_error_messages() {
        let err = ConvertError::from(ScanError::DirectoryNotFound(PathBuf::from("/photos")));
        assert_eq!(err.to_string(), "Scan failure: input directory not found: /photos");

        let err = ConvertError::Cancelled { pending: 3 };
        assert!(err.to_string().contains("3 conversions"));
    }
}
