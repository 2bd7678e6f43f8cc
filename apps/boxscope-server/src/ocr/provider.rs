//! OCR Providers
//!
//! Defines the provider trait and the tesseract implementation.

use std::path::PathBuf;
use std::process::Command;

use super::tsv::parse_tsv;
use super::types::{OcrBox, OcrError};

/// OCR provider trait
///
/// Providers are called from blocking worker threads, so the interface is
/// synchronous.
pub trait OcrProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &'static str;

    /// Check if the provider can run
    fn is_available(&self) -> bool;

    /// Recognize a PNG image, returning boxes in the image's pixels
    fn recognize(&self, png: &[u8], language: Option<&str>) -> Result<Vec<OcrBox>, OcrError>;
}

/// Tesseract OCR provider, driven through its command-line interface
pub struct TesseractProvider {
    /// Path to the tesseract executable
    executable: PathBuf,
    /// Default language
    default_language: String,
}

impl TesseractProvider {
    pub fn new(executable: impl Into<PathBuf>, default_language: &str) -> Self {
        Self {
            executable: executable.into(),
            default_language: default_language.to_string(),
        }
    }

    /// Validate language code to prevent argument injection
    fn validate_language(lang: &str) -> Result<(), OcrError> {
        // eng, eng+deu, chi_sim
        if lang.is_empty() || lang.len() > 32 {
            return Err(OcrError::InvalidLanguage(lang.to_string()));
        }
        if !lang
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '_')
        {
            return Err(OcrError::InvalidLanguage(lang.to_string()));
        }
        Ok(())
    }
}

impl OcrProvider for TesseractProvider {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        Command::new(&self.executable)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn recognize(&self, png: &[u8], language: Option<&str>) -> Result<Vec<OcrBox>, OcrError> {
        let lang = language.unwrap_or(&self.default_language);
        Self::validate_language(lang)?;

        let scratch = tempfile::tempdir()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to create temp dir: {}", e)))?;
        let input_path = scratch.path().join("page.png");
        let output_base = scratch.path().join("page");

        std::fs::write(&input_path, png)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to write temp file: {}", e)))?;

        let output = Command::new(&self.executable)
            .arg(&input_path)
            .arg(&output_base)
            .arg("-l")
            .arg(lang)
            .arg("--psm")
            .arg("3")
            .arg("tsv")
            .output()
            .map_err(|e| {
                OcrError::ProviderNotAvailable(format!("Failed to run tesseract: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingError(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        let tsv = std::fs::read_to_string(output_base.with_extension("tsv"))
            .map_err(|e| OcrError::ProcessingError(format!("Failed to read output: {}", e)))?;

        parse_tsv(&tsv)
    }
}

/// Mock provider for testing
#[cfg(test)]
pub struct MockProvider {
    pub boxes: Vec<OcrBox>,
    pub available: bool,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockProvider {
    pub fn new(boxes: Vec<OcrBox>) -> Self {
        Self {
            boxes,
            available: true,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
impl OcrProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn recognize(&self, _png: &[u8], _language: Option<&str>) -> Result<Vec<OcrBox>, OcrError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self.boxes.clone())
    }
}
