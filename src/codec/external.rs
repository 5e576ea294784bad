//! # External Tool Codec
//!
//! Converts images by spawning the reference encoders:
//!
//! | Target | Tool    | Arguments                                        |
//! |--------|---------|--------------------------------------------------|
//! | WebP   | `cwebp` | `-quiet -q <quality> -m 4 -mt <src> -o <dst>`    |
//! | JXL    | `cjxl`  | `<src> <dst> -q <quality> [--lossless_jpeg=0]`   |
//!
//! The encoder writes into a hidden temporary file next to the destination,
//! which is renamed over the destination only after a successful exit. A
//! killed encoder (timeout, shutdown) therefore never leaves a truncated output.

use super::probe::probe_source;
use super::{Codec, EncodeRequest};
use crate::error::{CodecError, ConvertError};
use crate::format::TargetFormat;
use crate::tool_resolver::ToolPathResolver;
use futures::future::BoxFuture;
use futures::FutureExt;
use image::ImageFormat;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Maximum stderr length kept in a failure message
const STDERR_LIMIT: usize = 400;

/// Mode of published outputs; temp files are created 0600
#[cfg(unix)]
const OUTPUT_FILE_MODE: u32 = 0o644;

/// Codec backed by `cwebp` and `cjxl`
pub struct ExternalToolCodec {
    resolver: ToolPathResolver,
}

impl ExternalToolCodec {
    pub fn new() -> Self {
        Self::with_resolver(ToolPathResolver::new())
    }

    pub fn with_resolver(resolver: ToolPathResolver) -> Self {
        Self { resolver }
    }

    /// Command line for the encoder of `format`
    pub fn encoder_args(
        format: TargetFormat,
        quality: u8,
        source_format: ImageFormat,
        source: &Path,
        destination: &Path,
    ) -> Vec<OsString> {
        let quality = quality.to_string();
        match format {
            TargetFormat::Webp => vec![
                "-quiet".into(),
                "-q".into(),
                quality.into(),
                "-m".into(),
                "4".into(),
                "-mt".into(),
                source.into(),
                "-o".into(),
                destination.into(),
            ],
            TargetFormat::Jxl => {
                let mut args: Vec<OsString> = vec![
                    source.into(),
                    destination.into(),
                    "-q".into(),
                    quality.into(),
                ];
                // cjxl transcodes JPEG losslessly by default, ignoring quality
                if source_format == ImageFormat::Jpeg {
                    args.push("--lossless_jpeg=0".into());
                }
                args
            }
        }
    }

    async fn run_encoder(&self, request: &EncodeRequest) -> Result<(), CodecError> {
        let source = request.source.clone();
        let info = tokio::task::spawn_blocking(move || probe_source(&source))
            .await
            .map_err(|e| CodecError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??;

        debug!(
            "Probed {}: {:?} {}x{}",
            request.source.display(),
            info.format,
            info.width,
            info.height
        );

        let tool = request.format.encoder_tool();
        let tool_path = self
            .resolver
            .resolve_tool(tool)
            .ok_or_else(|| CodecError::ToolMissing(tool.to_string()))?;

        let parent = request.destination.parent().unwrap_or(Path::new("."));
        let temp = tempfile::Builder::new()
            .prefix(".converting-")
            .suffix(&format!(".{}", request.format.extension()))
            .tempfile_in(parent)?;

        let args = Self::encoder_args(
            request.format,
            request.quality,
            info.format,
            &request.source,
            temp.path(),
        );
        debug!("Running {:?} {:?}", tool_path, args);

        let start_time = std::time::Instant::now();
        let output = Command::new(&tool_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(CodecError::EncoderFailed {
                tool: tool.to_string(),
                status: output.status.to_string(),
                stderr: Self::summarize_stderr(&output.stderr),
            });
        }

        Self::set_output_permissions(temp.path()).await?;
        temp.persist(&request.destination)?;
        debug!(
            "{} encoded {} in {:?}",
            tool,
            request.destination.display(),
            start_time.elapsed()
        );
        Ok(())
    }

    #[cfg(unix)]
    async fn set_output_permissions(path: &Path) -> std::io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(OUTPUT_FILE_MODE)).await
    }

    #[cfg(not(unix))]
    async fn set_output_permissions(_path: &Path) -> std::io::Result<()> {
        Ok(())
    }

    fn summarize_stderr(stderr: &[u8]) -> String {
        let text = String::from_utf8_lossy(stderr);
        let text = text.trim();
        if text.is_empty() {
            return "no diagnostic output".to_string();
        }
        if text.len() <= STDERR_LIMIT {
            return text.to_string();
        }
        let mut cut = text.len() - STDERR_LIMIT;
        while !text.is_char_boundary(cut) {
            cut += 1;
        }
        format!("...{}", &text[cut..])
    }
}

impl Default for ExternalToolCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for ExternalToolCodec {
    fn name(&self) -> &str {
        "external-tools"
    }

    fn check_available(&self, format: TargetFormat) -> Result<(), ConvertError> {
        let tool = format.encoder_tool();
        if self.resolver.is_tool_available(tool) {
            Ok(())
        } else {
            Err(ConvertError::CodecUnavailable {
                tool: tool.to_string(),
                hint: ToolPathResolver::install_instructions(tool),
            })
        }
    }

    fn encode<'a>(&'a self, request: &'a EncodeRequest) -> BoxFuture<'a, Result<(), CodecError>> {
        self.run_encoder(request).boxed()
    }
}
