//! Text extraction settings and results
//!
//! - `flags`: named extraction toggles and their engine bits
//! - `ocr_mode`: when OCR is invoked
//! - `Level` / `PageGeometry`: the four granularities of extracted boxes

mod flags;
mod ocr_mode;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

pub use flags::{resolve_flags, ExtractionFlags, FLAG_TABLE};
pub use ocr_mode::{InvalidOcrMode, OcrMode};

/// Structural granularity of extracted text, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Blocks,
    Lines,
    Spans,
    Words,
}

impl Level {
    /// All levels in navigation order
    pub const ALL: [Level; 4] = [Level::Blocks, Level::Lines, Level::Spans, Level::Words];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Blocks => "blocks",
            Level::Lines => "lines",
            Level::Spans => "spans",
            Level::Words => "words",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Level::Blocks => 0,
            Level::Lines => 1,
            Level::Spans => 2,
            Level::Words => 3,
        }
    }

    /// Next finer level, if any
    pub fn next(&self) -> Option<Level> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Next coarser level, if any
    pub fn prev(&self) -> Option<Level> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// Overlay color as RGB fractions
    pub fn color(&self) -> (f32, f32, f32) {
        match self {
            Level::Blocks => (1.0, 0.0, 0.0),
            Level::Lines => (0.0, 0.0, 1.0),
            Level::Spans => (0.0, 1.0, 0.0),
            Level::Words => (1.0, 0.5, 0.0),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blocks" => Ok(Level::Blocks),
            "lines" => Ok(Level::Lines),
            "spans" => Ok(Level::Spans),
            "words" => Ok(Level::Words),
            other => Err(format!("Unknown level: {}", other)),
        }
    }
}

/// Boxes extracted from one page at all four levels, in point-space
///
/// Order within each level is the engine's reading order and is kept as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub blocks: Vec<Rect>,
    pub lines: Vec<Rect>,
    pub spans: Vec<Rect>,
    pub words: Vec<Rect>,
}

impl PageGeometry {
    pub fn level(&self, level: Level) -> &[Rect] {
        match level {
            Level::Blocks => &self.blocks,
            Level::Lines => &self.lines,
            Level::Spans => &self.spans,
            Level::Words => &self.words,
        }
    }

    /// True when no level produced any box
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
            && self.lines.is_empty()
            && self.spans.is_empty()
            && self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_navigation_bounds() {
        assert_eq!(Level::Blocks.prev(), None);
        assert_eq!(Level::Blocks.next(), Some(Level::Lines));
        assert_eq!(Level::Spans.next(), Some(Level::Words));
        assert_eq!(Level::Words.next(), None);
        assert_eq!(Level::Words.prev(), Some(Level::Spans));
    }

    #[test]
    fn test_level_parse() {
        for level in Level::ALL {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
        }
        assert!("glyphs".parse::<Level>().is_err());
    }

    #[test]
    fn test_geometry_level_access() {
        let geometry = PageGeometry {
            words: vec![Rect::new(0.0, 0.0, 1.0, 1.0)],
            ..Default::default()
        };
        assert!(geometry.level(Level::Blocks).is_empty());
        assert_eq!(geometry.level(Level::Words).len(), 1);
        assert!(!geometry.is_empty());
        assert!(PageGeometry::default().is_empty());
    }
}
