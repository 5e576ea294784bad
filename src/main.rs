//! # Batch Image Converter - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Creazione della configurazione e avvio del converter
//! - Conversione del risultato in exit code (0 = batch completato, 1 = errore fatale)
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (input, output, formato, workers, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose, `RUST_LOG` ha la precedenza)
//! 3. Crea un oggetto Config e lo valida
//! 4. Istanzia BatchConverter con il codec basato su `cwebp`/`cjxl` e avvia il batch
//! 5. Ctrl-C durante le conversioni interrompe il batch
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-converter -i ./photos -o ./converted -f jxl --workers 8 --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use batch_image_converter::{
    config::{default_workers, DEFAULT_QUALITY},
    json_output::JsonMessage,
    BatchConverter, CollisionPolicy, Config, ExternalToolCodec, TargetFormat,
};

#[derive(Parser)]
#[command(name = "image-converter")]
#[command(about = "Batch convert JPEG/PNG images to WebP or JPEG XL")]
struct Args {
    /// Directory containing the source images
    #[arg(short, long)]
    input_dir: PathBuf,

    /// Directory receiving the converted images (created if missing)
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Target format
    #[arg(short, long, value_enum)]
    format: TargetFormat,

    /// Number of parallel conversions (default: number of CPUs)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Per-file timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// What to do when two sources share a stem (e.g. a.jpg and a.png)
    #[arg(long, value_enum, default_value_t = CollisionPolicy::Fail)]
    on_collision: CollisionPolicy,

    /// Output JSON lines for programmatic use
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = Config {
        input_dir: args.input_dir,
        output_dir: args.output_dir,
        format: args.format,
        quality: DEFAULT_QUALITY,
        workers: args.workers.unwrap_or_else(default_workers),
        task_timeout_secs: args.timeout_secs,
        collision_policy: args.on_collision,
        json_output: args.json,
    };

    let mut converter = BatchConverter::new(config, Arc::new(ExternalToolCodec::new()))?;
    let result = converter
        .run(async {
            if tokio::signal::ctrl_c().await.is_err() {
                // Senza handler il batch non è interrompibile
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!(
        "Batch finished: {} converted, {} failed in {:.1}s",
        result.succeeded(),
        result.failed(),
        result.duration.as_secs_f64()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let json = args.json;

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {:#}", e);
            if json {
                JsonMessage::error(e.to_string(), Some(format!("{:#}", e))).emit();
            }
            ExitCode::FAILURE
        }
    }
}
