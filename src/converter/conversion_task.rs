//! # Conversion Task
//!
//! Worker per la conversione di un singolo file.
//! Ogni errore viene catturato e trasformato in un `ConversionOutcome::Failure`:
//! un task non interrompe mai il batch.

use crate::{
    codec::{Codec, EncodeRequest},
    config::Config,
    converter::{
        outcome::ConversionOutcome,
        path_resolver::{ConversionPlan, PlannedOutput},
    },
    error::CodecError,
    file_manager::FileManager,
    format::TargetFormat,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Converts one planned source file through a codec
#[derive(Clone)]
pub struct ConversionTask {
    codec: Arc<dyn Codec>,
    format: TargetFormat,
    quality: u8,
    timeout: Option<Duration>,
}

impl ConversionTask {
    pub fn new(codec: Arc<dyn Codec>, config: &Config) -> Self {
        Self {
            codec,
            format: config.format,
            quality: config.quality,
            timeout: config.task_timeout(),
        }
    }

    /// Processa un singolo file
    pub async fn run(&self, plan: ConversionPlan) -> ConversionOutcome {
        let source = plan.source.path().to_path_buf();

        let destination = match plan.output {
            PlannedOutput::Write(path) => path,
            PlannedOutput::Conflict { path, with } => {
                let detail = format!(
                    "output {} is also targeted by {}",
                    path.display(),
                    with.join(", ")
                );
                error!("Skipping {}: {}", plan.source.file_name(), detail);
                return ConversionOutcome::failure(&source, detail);
            }
        };

        let request = EncodeRequest {
            source,
            destination,
            format: self.format,
            quality: self.quality,
        };

        match self.encode(&request).await {
            Ok(()) => {
                let input_bytes = FileManager::file_size(&request.source).await;
                let output_bytes = FileManager::file_size(&request.destination).await;
                debug!(
                    "[OK] {} -> {} ({} bytes -> {} bytes)",
                    request.source.display(),
                    request.destination.display(),
                    input_bytes,
                    output_bytes
                );
                ConversionOutcome::Success {
                    source: request.source,
                    output: request.destination,
                    input_bytes,
                    output_bytes,
                }
            }
            Err(e) => {
                error!(
                    "[ERROR] {} with {} codec: {}",
                    request.source.display(),
                    self.codec.name(),
                    e
                );
                ConversionOutcome::failure(&request.source, e)
            }
        }
    }

    async fn encode(&self, request: &EncodeRequest) -> Result<(), CodecError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.codec.encode(request))
                .await
                .unwrap_or_else(|_| Err(CodecError::TimedOut(limit))),
            None => self.codec.encode(request).await,
        }
    }
}
