//! # Batch Converter Main Orchestrator
//!
//! Orchestratore principale: scansiona la directory di input, lancia un task
//! di conversione per ogni immagine e raccoglie esattamente un risultato per file.
//!
//! ## Stati del batch:
//! `Scanning → Dispatching → AwaitingCompletion → Reporting → Done`,
//! con `Aborted` raggiungibile da qualsiasi stato in caso di errore fatale.
//!
//! ## Concorrenza:
//! - Tutti i task vengono lanciati prima di qualsiasi attesa
//! - Un semaforo limita le conversioni contemporanee a `workers`
//! - Il fallimento di un file è un valore, non cancella gli altri task
//! - Panic di un task o segnale di shutdown: flag di cancellazione alzato,
//!   i task non ancora partiti escono senza toccare il codec, quelli in corso
//!   finiscono, e l'orchestratore attende comunque tutti prima di ritornare

use crate::{
    codec::Codec,
    config::Config,
    converter::{
        conversion_task::ConversionTask,
        outcome::{BatchResult, ConversionOutcome},
        path_resolver::PathResolver,
        progress_tracker::ProgressTracker,
    },
    error::ConvertError,
    file_manager::{FileManager, SourceFile},
    json_output::JsonMessage,
    progress::ConversionStats,
};
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Lifecycle of one batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Scanning,
    Dispatching,
    AwaitingCompletion,
    Reporting,
    Done,
    Aborted,
}

/// How a spawned task ended
enum TaskExit {
    Finished(ConversionOutcome),
    /// Cancellation observed before the codec was invoked
    Cancelled,
}

/// Orchestratore principale
pub struct BatchConverter {
    config: Config,
    codec: Arc<dyn Codec>,
    state: BatchState,
}

impl BatchConverter {
    /// Crea nuova istanza del converter
    pub fn new(config: Config, codec: Arc<dyn Codec>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            codec,
            state: BatchState::Idle,
        })
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    fn transition(&mut self, next: BatchState) {
        debug!("Batch state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn abort(&mut self, err: ConvertError) -> ConvertError {
        self.transition(BatchState::Aborted);
        err
    }

    /// Esegue l'intero batch e stampa il report.
    ///
    /// `shutdown` resolving while conversions are in flight aborts the batch
    /// with `ConvertError::Cancelled`.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<BatchResult, ConvertError>
    where
        F: Future<Output = ()>,
    {
        self.transition(BatchState::Scanning);
        let files = match FileManager::find_source_images(&self.config.input_dir) {
            Ok(files) => files,
            Err(e) => return Err(self.abort(e.into())),
        };

        info!(
            "Found {} images in {}",
            files.len(),
            self.config.input_dir.display()
        );

        let result = self.convert_files(files, shutdown).await?;
        self.print_report(&result);
        self.transition(BatchState::Done);
        Ok(result)
    }

    /// Convert already discovered files; returns one outcome per file, in input order
    pub async fn convert_files<F>(
        &mut self,
        files: Vec<SourceFile>,
        shutdown: F,
    ) -> Result<BatchResult, ConvertError>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();

        // Output directory pronta prima di lanciare qualsiasi task
        if let Err(e) = FileManager::prepare_output_dir(&self.config.output_dir).await {
            return Err(self.abort(e));
        }
        if !files.is_empty() {
            if let Err(e) = self.codec.check_available(self.config.format) {
                return Err(self.abort(e));
            }
        }

        let total = files.len();
        if self.config.json_output {
            JsonMessage::start(&self.config, total).emit();
        }
        info!(
            "Converting {} files to {} with {} codec (workers: {}, quality: {})",
            total,
            self.config.format,
            self.codec.name(),
            self.config.workers,
            self.config.quality
        );

        let plans = PathResolver::plan(
            files,
            &self.config.output_dir,
            self.config.format,
            self.config.collision_policy,
        );

        self.transition(BatchState::Dispatching);
        let progress = ProgressTracker::new(total, self.config.json_output);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let task = ConversionTask::new(self.codec.clone(), &self.config);
        let mut tasks = JoinSet::new();

        for (index, plan) in plans.into_iter().enumerate() {
            let task = task.clone();
            let semaphore = semaphore.clone();
            let mut cancel_rx = cancel_rx.clone();
            let progress = progress.clone();

            tasks.spawn(async move {
                let cancelled = async {
                    let _ = cancel_rx.wait_for(|cancelled| *cancelled).await;
                };
                let permit = tokio::select! {
                    permit = semaphore.acquire_owned() => permit,
                    _ = cancelled => return (index, TaskExit::Cancelled),
                };
                let Ok(_permit) = permit else {
                    return (index, TaskExit::Cancelled);
                };
                // Unico punto di cancellazione: mai durante la scrittura
                if *cancel_rx.borrow() {
                    return (index, TaskExit::Cancelled);
                }

                let outcome = task.run(plan).await;
                progress.handle_completion(index, &outcome);
                (index, TaskExit::Finished(outcome))
            });
        }

        self.transition(BatchState::AwaitingCompletion);
        let mut slots: Vec<Option<ConversionOutcome>> = vec![None; total];
        let mut fatal: Option<ConvertError> = None;
        let mut shutdown_seen = false;
        tokio::pin!(shutdown);

        // Aspetta tutti i task, anche dopo un errore fatale
        while !tasks.is_empty() {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(Ok((index, TaskExit::Finished(outcome)))) => slots[index] = Some(outcome),
                    Some(Ok((index, TaskExit::Cancelled))) => {
                        debug!("Task {} cancelled before start", index);
                    }
                    Some(Err(join_error)) => {
                        error!("Conversion task failed unexpectedly: {}", join_error);
                        cancel_tx.send_replace(true);
                        fatal.get_or_insert(ConvertError::Orchestration(join_error.to_string()));
                    }
                    None => break,
                },
                _ = &mut shutdown, if !shutdown_seen => {
                    shutdown_seen = true;
                    warn!("Shutdown requested, waiting for {} in-flight conversions", tasks.len());
                    cancel_tx.send_replace(true);
                    fatal.get_or_insert(ConvertError::Cancelled { pending: tasks.len() });
                }
            }
        }

        if let Some(err) = fatal {
            progress.abandon();
            return Err(self.abort(err));
        }

        self.transition(BatchState::Reporting);
        let mut outcomes = Vec::with_capacity(total);
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(outcome) => outcomes.push(outcome),
                None => {
                    progress.abandon();
                    return Err(self.abort(ConvertError::Orchestration(format!(
                        "no outcome collected for file #{}",
                        index
                    ))));
                }
            }
        }

        let result = BatchResult {
            outcomes,
            duration: start_time.elapsed(),
        };
        progress.finish(&ConversionStats::from_result(&result).format_summary());
        Ok(result)
    }

    /// Stampa una riga per file e il riepilogo finale
    pub fn print_report(&self, result: &BatchResult) {
        let stats = ConversionStats::from_result(result);

        if self.config.json_output {
            let messages = result.outcomes.iter().map(|o| o.message()).collect();
            JsonMessage::complete(&stats, messages).emit();
            return;
        }

        for outcome in &result.outcomes {
            println!("{}", outcome.report_line());
        }
        println!("{}", stats.format_summary());

        if result.failed() > 0 {
            warn!(
                "{} of {} files could not be converted",
                result.failed(),
                result.len()
            );
        } else {
            info!("All {} files converted", result.len());
        }
    }
}
