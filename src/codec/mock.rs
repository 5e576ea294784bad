//! Test doubles: an in-process codec and JPEG/PNG fixture writers.

use super::probe::probe_source;
use super::{Codec, EncodeRequest};
use crate::error::CodecError;
use futures::future::BoxFuture;
use futures::FutureExt;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

fn sample_image() -> RgbImage {
    RgbImage::from_fn(16, 8, |x, y| Rgb([(x * 16) as u8, (y * 32) as u8, 128]))
}

pub(crate) fn write_sample_jpeg(path: &Path) {
    sample_image()
        .save_with_format(path, ImageFormat::Jpeg)
        .unwrap();
}

pub(crate) fn write_sample_png(path: &Path) {
    sample_image()
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

/// Keeps only the first bytes of a valid JPEG, so the header still parses
pub(crate) fn write_truncated_jpeg(path: &Path) {
    write_sample_jpeg(path);
    let bytes = std::fs::read(path).unwrap();
    std::fs::write(path, &bytes[..bytes.len() / 3]).unwrap();
}

/// Codec decoding with the `image` crate and writing a marker file
#[derive(Default)]
pub(crate) struct MockCodec {
    pub delay: Option<Duration>,
    /// File name whose conversion panics
    pub panic_on: Option<String>,
    /// File name whose conversion never completes
    pub hang_on: Option<String>,
    pub calls: Mutex<Vec<PathBuf>>,
    pub running: AtomicUsize,
    pub peak_running: AtomicUsize,
}

impl MockCodec {
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }

    async fn convert(&self, request: &EncodeRequest) -> Result<(), CodecError> {
        let name = request
            .source
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panic_on.as_deref() == Some(name.as_str()) {
            panic!("mock codec exploded on {}", name);
        }
        if self.hang_on.as_deref() == Some(name.as_str()) {
            std::future::pending::<()>().await;
        }

        probe_source(&request.source)?;
        image::open(&request.source)?;

        let parent = request.destination.parent().unwrap_or(Path::new("."));
        let mut temp = tempfile::NamedTempFile::new_in(parent)?;
        write!(temp, "{}:{}:{}", request.format.extension(), request.quality, name)?;
        temp.persist(&request.destination)?;
        Ok(())
    }
}

impl Codec for MockCodec {
    fn name(&self) -> &str {
        "mock"
    }

    fn encode<'a>(&'a self, request: &'a EncodeRequest) -> BoxFuture<'a, Result<(), CodecError>> {
        async move {
            self.calls.lock().unwrap().push(request.source.clone());
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_running.fetch_max(now, Ordering::SeqCst);

            let result = self.convert(request).await;

            self.running.fetch_sub(1, Ordering::SeqCst);
            result
        }
        .boxed()
    }
}
