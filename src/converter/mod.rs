//! # Converter Module
//!
//! Separa le responsabilità del batch in sottomoduli:
//! - `batch_converter`: Orchestratore principale
//! - `conversion_task`: Worker per singoli file
//! - `outcome`: Risultato per file e risultato del batch
//! - `path_resolver`: Calcolo dei path di output e collisioni
//! - `progress_tracker`: Gestione progress unificata

pub mod batch_converter;
pub mod conversion_task;
pub mod outcome;
pub mod path_resolver;
pub mod progress_tracker;

pub use batch_converter::{BatchConverter, BatchState};
pub use conversion_task::ConversionTask;
pub use outcome::{BatchResult, ConversionOutcome};
pub use path_resolver::{CollisionPolicy, PathResolver};
pub use progress_tracker::ProgressTracker;
