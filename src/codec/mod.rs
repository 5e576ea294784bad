//! # Codec Adapter
//!
//! Boundary between the batch harness and the image encoder. The harness only
//! knows `encode(source, destination, format, quality)`: it never looks at
//! pixel data.
//!
//! - `ExternalToolCodec`: production codec driving `cwebp` / `cjxl`
//! - `probe`: header sniffing used to reject undecodable sources early

pub mod external;
pub mod probe;

#[cfg(test)]
pub(crate) mod mock;

pub use external::ExternalToolCodec;

use crate::error::{CodecError, ConvertError};
use crate::format::TargetFormat;
use futures::future::BoxFuture;
use std::path::PathBuf;

/// One conversion handed to a codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub format: TargetFormat,
    pub quality: u8,
}

/// An encoder able to convert a source image into a target format.
///
/// Implementations must either leave `destination` untouched or replace it
/// with a complete file: a failed or dropped `encode` never leaves a partial
/// output behind.
pub trait Codec: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fail fast when the codec cannot produce `format` at all
    fn check_available(&self, _format: TargetFormat) -> Result<(), ConvertError> {
        Ok(())
    }

    /// Decode `request.source` and write it re-encoded to `request.destination`
    fn encode<'a>(&'a self, request: &'a EncodeRequest) -> BoxFuture<'a, Result<(), CodecError>>;
}
