//! Configuration management for the Boxscope server

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub render: RenderConfig,
    pub upload: UploadConfig,
    pub sessions: SessionConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Page raster resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RenderConfig {
    pub default_dpi: u32,
    pub min_dpi: u32,
    pub max_dpi: u32,
}

impl RenderConfig {
    pub fn accepts(&self, dpi: u32) -> bool {
        (self.min_dpi..=self.max_dpi).contains(&dpi)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Request body limit for uploads
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Idle time after which a session is dropped
    pub ttl_secs: u64,
    pub cleanup_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub tesseract_path: PathBuf,
    pub language: String,
    /// Raster resolution handed to the OCR engine
    pub dpi: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            render: RenderConfig::default(),
            upload: UploadConfig {
                max_bytes: 256 * 1024 * 1024,
            },
            sessions: SessionConfig {
                ttl_secs: 3600,
                cleanup_interval_secs: 300,
            },
            ocr: OcrConfig {
                tesseract_path: PathBuf::from("tesseract"),
                language: "eng".to_string(),
                dpi: 300,
            },
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_dpi: 450,
            min_dpi: 72,
            max_dpi: 600,
        }
    }
}

/// Parse a variable, falling back to `default` when unset or malformed
fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Malformed configuration value, using default");
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let mut render = RenderConfig {
            default_dpi: parse_var("RENDER_DEFAULT_DPI", defaults.render.default_dpi),
            min_dpi: parse_var("RENDER_MIN_DPI", defaults.render.min_dpi).max(1),
            max_dpi: parse_var("RENDER_MAX_DPI", defaults.render.max_dpi),
        };
        if render.max_dpi < render.min_dpi {
            tracing::warn!(
                min = render.min_dpi,
                max = render.max_dpi,
                "RENDER_MAX_DPI below RENDER_MIN_DPI, using defaults"
            );
            render = defaults.render;
        }
        render.default_dpi = render.default_dpi.clamp(render.min_dpi, render.max_dpi);

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port),
            },
            render,
            upload: UploadConfig {
                max_bytes: parse_var("UPLOAD_MAX_BYTES", defaults.upload.max_bytes),
            },
            sessions: SessionConfig {
                ttl_secs: parse_var("SESSION_TTL_SECS", defaults.sessions.ttl_secs),
                cleanup_interval_secs: parse_var(
                    "SESSION_CLEANUP_SECS",
                    defaults.sessions.cleanup_interval_secs,
                )
                .max(1),
            },
            ocr: OcrConfig {
                tesseract_path: env::var("OCR_TESSERACT_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.ocr.tesseract_path),
                language: env::var("OCR_LANGUAGE").unwrap_or(defaults.ocr.language),
                dpi: parse_var("OCR_DPI", defaults.ocr.dpi).max(1),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.render.default_dpi, 450);
        assert_eq!(config.ocr.dpi, 300);
        assert_eq!(config.upload.max_bytes, 268_435_456);
    }

    #[test]
    fn test_render_bounds() {
        let render = RenderConfig::default();
        assert!(render.accepts(72));
        assert!(render.accepts(600));
        assert!(!render.accepts(71));
        assert!(!render.accepts(601));
    }

    #[test]
    fn test_parse_var_falls_back() {
        assert_eq!(parse_var("BOXSCOPE_TEST_UNSET_VARIABLE", 42u32), 42);
    }
}
