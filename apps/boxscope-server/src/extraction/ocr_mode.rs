//! OCR mode

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// When OCR runs during text extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrMode {
    /// Embedded text layer only
    #[default]
    Off,
    /// Embedded text layer, OCR when it has nothing to offer
    Auto,
    /// Whole-page OCR regardless of embedded text
    Full,
}

impl OcrMode {
    pub const ALL: [OcrMode; 3] = [OcrMode::Off, OcrMode::Auto, OcrMode::Full];

    pub fn as_str(&self) -> &'static str {
        match self {
            OcrMode::Off => "off",
            OcrMode::Auto => "auto",
            OcrMode::Full => "full",
        }
    }
}

impl fmt::Display for OcrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised for any mode outside `off`, `auto`, `full`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid OCR mode: {0}")]
pub struct InvalidOcrMode(pub String);

impl FromStr for OcrMode {
    type Err = InvalidOcrMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(OcrMode::Off),
            "auto" => Ok(OcrMode::Auto),
            "full" => Ok(OcrMode::Full),
            other => Err(InvalidOcrMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_modes() {
        for mode in OcrMode::ALL {
            assert_eq!(mode.as_str().parse::<OcrMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "partial".parse::<OcrMode>().unwrap_err();
        assert_eq!(err, InvalidOcrMode("partial".to_string()));
        assert!("OFF".parse::<OcrMode>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&OcrMode::Full).unwrap(), "\"full\"");
        let mode: OcrMode = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(mode, OcrMode::Auto);
    }
}
