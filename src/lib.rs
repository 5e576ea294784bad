//! # Batch Image Converter Library
//!
//! Modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per scansione, codec e orchestrazione
//! - `format`: Formati di destinazione (WebP, JXL)
//! - `file_manager`: Discovery delle immagini sorgente e output directory
//! - `codec`: Interfaccia codec e implementazione con encoder esterni
//! - `tool_resolver`: Ricerca di `cwebp`/`cjxl`
//! - `converter`: Orchestratore del batch e task per singolo file
//! - `progress`: Progress bar e statistiche
//! - `json_output`: Eventi JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use batch_image_converter::{BatchConverter, Config, ExternalToolCodec, TargetFormat};
//! use std::sync::Arc;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config {
//!     format: TargetFormat::Webp,
//!     ..Default::default()
//! };
//! let mut converter = BatchConverter::new(config, Arc::new(ExternalToolCodec::new()))?;
//! let result = converter.run(std::future::pending()).await?;
//! println!("{} converted", result.succeeded());
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod converter;
pub mod error;
pub mod file_manager;
pub mod format;
pub mod json_output;
pub mod progress;
pub mod tool_resolver;

pub use codec::{Codec, EncodeRequest, ExternalToolCodec};
pub use config::Config;
pub use converter::{BatchConverter, BatchResult, CollisionPolicy, ConversionOutcome};
pub use error::{CodecError, ConvertError, ScanError};
pub use file_manager::{FileManager, SourceFile};
pub use format::TargetFormat;
