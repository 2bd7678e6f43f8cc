//! Session-wide extraction settings

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::error::{AppError, Result};
use crate::extraction::{ExtractionFlags, OcrMode};

use super::cache::CacheKey;

/// Active settings; one value per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtractionSettings {
    pub flags: ExtractionFlags,
    pub ocr_mode: OcrMode,
    pub dpi: u32,
}

impl ExtractionSettings {
    pub fn new(dpi: u32) -> Self {
        Self {
            flags: ExtractionFlags::default(),
            ocr_mode: OcrMode::default(),
            dpi,
        }
    }

    /// The part of the settings geometry depends on
    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            flags: self.flags.bits(),
            ocr_mode: self.ocr_mode,
        }
    }
}

/// Partial settings change
///
/// `flags` is the full toggle map: toggles left out are switched off.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub dpi: Option<u32>,
    pub ocr_mode: Option<String>,
    pub flags: Option<HashMap<String, bool>>,
}

/// A validated [`SettingsUpdate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ValidatedUpdate {
    pub dpi: Option<u32>,
    pub ocr_mode: Option<OcrMode>,
    pub flags: Option<ExtractionFlags>,
}

impl SettingsUpdate {
    /// Check every field before anything is applied
    pub(crate) fn validate(&self, render: &RenderConfig) -> Result<ValidatedUpdate> {
        if let Some(dpi) = self.dpi {
            if !render.accepts(dpi) {
                return Err(AppError::BadRequest(format!(
                    "DPI {} outside {}..={}",
                    dpi, render.min_dpi, render.max_dpi
                )));
            }
        }

        let ocr_mode = self
            .ocr_mode
            .as_deref()
            .map(str::parse::<OcrMode>)
            .transpose()?;

        Ok(ValidatedUpdate {
            dpi: self.dpi,
            ocr_mode,
            flags: self.flags.as_ref().map(ExtractionFlags::from_toggles),
        })
    }
}

/// Settings as reported to clients
#[derive(Debug, Clone, Serialize)]
pub struct SettingsView {
    pub dpi: u32,
    pub min_dpi: u32,
    pub max_dpi: u32,
    pub ocr_mode: OcrMode,
    pub flags: ExtractionFlags,
    /// Resolved engine bitmask
    pub flag_bits: u32,
}

impl SettingsView {
    pub fn new(settings: &ExtractionSettings, render: &RenderConfig) -> Self {
        Self {
            dpi: settings.dpi,
            min_dpi: render.min_dpi,
            max_dpi: render.max_dpi,
            ocr_mode: settings.ocr_mode,
            flags: settings.flags,
            flag_bits: settings.flags.bits(),
        }
    }
}
