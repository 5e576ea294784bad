//! Target formats supported by the converter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Format every source image of a batch is converted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// WebP (lossy, via cwebp)
    Webp,
    /// JPEG-XL (via cjxl)
    Jxl,
}

impl TargetFormat {
    /// File extension of the converted output, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Jxl => "jxl",
        }
    }

    /// Name of the external encoder producing this format
    pub fn encoder_tool(&self) -> &'static str {
        match self {
            Self::Webp => "cwebp",
            Self::Jxl => "cjxl",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Webp => write!(f, "WEBP"),
            Self::Jxl => write!(f, "JXL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_and_tool() {
        assert_eq!(TargetFormat::Webp.extension(), "webp");
        assert_eq!(TargetFormat::Jxl.extension(), "jxl");
        assert_eq!(TargetFormat::Webp.encoder_tool(), "cwebp");
        assert_eq!(TargetFormat::Jxl.encoder_tool(), "cjxl");
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&TargetFormat::Jxl).unwrap(), "\"jxl\"");
        let parsed: TargetFormat = serde_json::from_str("\"webp\"").unwrap();
        assert_eq!(parsed, TargetFormat::Webp);
    }
}
