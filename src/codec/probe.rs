//! Header probing with the `image` crate.
//!
//! Only the header is read; the actual decode happens in the encoder.

use crate::error::CodecError;
use image::ImageFormat;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Basic facts about a source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Sniff the real format of `path` from its content and read its dimensions.
///
/// The extension is not trusted: a `.jpg` holding PNG data is accepted, a
/// `.jpg` holding garbage is rejected.
pub fn probe_source(path: &Path) -> Result<SourceInfo, CodecError> {
    // Reader::open would seed the format from the extension
    let file = BufReader::new(File::open(path)?);
    let reader = image::io::Reader::new(file).with_guessed_format()?;

    let format = match reader.format() {
        Some(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => format,
        Some(other) => {
            return Err(CodecError::Unsupported(format!(
                "{:?} data is not a JPEG or PNG image",
                other
            )))
        }
        None => {
            return Err(CodecError::Unsupported(
                "unrecognized image data".to_string(),
            ))
        }
    };

    let (width, height) = reader.into_dimensions()?;
    if width == 0 || height == 0 {
        return Err(CodecError::Unsupported(format!(
            "empty image ({}x{})",
            width, height
        )));
    }

    Ok(SourceInfo {
        format,
        width,
        height,
    })
}
