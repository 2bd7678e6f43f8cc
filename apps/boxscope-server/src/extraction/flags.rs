//! Extraction flags
//!
//! Named text-extraction toggles and their MuPDF stext bits. Resolving a
//! set of toggles always writes every known bit, set or cleared, so the
//! result never depends on what was resolved before.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Keep ligatures (ffi, fl) as one glyph
pub const PRESERVE_LIGATURES: u32 = 1;
/// Keep original whitespace
pub const PRESERVE_WHITESPACE: u32 = 2;
/// Emit image blocks
pub const PRESERVE_IMAGES: u32 = 4;
/// Do not infer missing spaces
pub const INHIBIT_SPACES: u32 = 8;
/// Join hyphenated words across lines
pub const DEHYPHENATE: u32 = 16;
/// One span per line
pub const PRESERVE_SPANS: u32 = 32;
/// Drop characters outside the mediabox
pub const MEDIABOX_CLIP: u32 = 64;
/// Raw codes for glyphs without unicode
pub const USE_CID_FOR_UNKNOWN_UNICODE: u32 = 128;
/// Glyph-outline bounding boxes
pub const ACCURATE_BBOXES: u32 = 512;
/// Ignore ActualText replacements
pub const IGNORE_ACTUALTEXT: u32 = 2048;
/// Segment the page into regions
pub const SEGMENT: u32 = 4096;

/// Name to bit table for every recognized toggle
pub const FLAG_TABLE: [(&str, u32); 11] = [
    ("preserve_ligatures", PRESERVE_LIGATURES),
    ("preserve_whitespace", PRESERVE_WHITESPACE),
    ("preserve_images", PRESERVE_IMAGES),
    ("inhibit_spaces", INHIBIT_SPACES),
    ("dehyphenate", DEHYPHENATE),
    ("preserve_spans", PRESERVE_SPANS),
    ("mediabox_clip", MEDIABOX_CLIP),
    ("use_cid_for_unknown_unicode", USE_CID_FOR_UNKNOWN_UNICODE),
    ("accurate_bboxes", ACCURATE_BBOXES),
    ("ignore_actualtext", IGNORE_ACTUALTEXT),
    ("segment", SEGMENT),
];

/// Strip the optional `text_` prefix used by MuPDF's own constant names
fn canonical_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    match lower.strip_prefix("text_") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// Value of one toggle across every alias spelling present in the mapping
///
/// The exact table name wins. Otherwise the toggle is on only when every
/// alias present says so, which keeps the result independent of map order.
fn toggle_value(toggles: &HashMap<String, bool>, name: &str) -> bool {
    if let Some(on) = toggles.get(name) {
        return *on;
    }

    let mut aliases = toggles
        .iter()
        .filter(|(key, _)| canonical_name(key) == name)
        .map(|(_, on)| *on)
        .peekable();
    aliases.peek().is_some() && aliases.all(|on| on)
}

/// Resolve a toggle mapping into a flags bitmask
///
/// Unknown names are ignored and missing names count as `false`.
pub fn resolve_flags(toggles: &HashMap<String, bool>) -> u32 {
    let mut flags = 0u32;
    for (name, bit) in FLAG_TABLE {
        if toggle_value(toggles, name) {
            flags |= bit;
        } else {
            flags &= !bit;
        }
    }
    flags
}

/// Extraction toggles, one field per recognized option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFlags {
    pub preserve_ligatures: bool,
    pub preserve_whitespace: bool,
    pub preserve_images: bool,
    pub inhibit_spaces: bool,
    pub dehyphenate: bool,
    pub preserve_spans: bool,
    pub mediabox_clip: bool,
    pub use_cid_for_unknown_unicode: bool,
    pub accurate_bboxes: bool,
    pub ignore_actualtext: bool,
    pub segment: bool,
}

impl Default for ExtractionFlags {
    fn default() -> Self {
        Self {
            preserve_ligatures: true,
            preserve_whitespace: true,
            preserve_images: true,
            inhibit_spaces: false,
            dehyphenate: false,
            preserve_spans: false,
            mediabox_clip: true,
            use_cid_for_unknown_unicode: true,
            accurate_bboxes: false,
            ignore_actualtext: false,
            segment: false,
        }
    }
}

impl ExtractionFlags {
    /// Build from a toggle mapping; missing toggles are off
    pub fn from_toggles(toggles: &HashMap<String, bool>) -> Self {
        Self::from_bits(resolve_flags(toggles))
    }

    /// Decode a bitmask; bits outside the table are dropped
    pub fn from_bits(bits: u32) -> Self {
        let on = |bit: u32| bits & bit != 0;
        Self {
            preserve_ligatures: on(PRESERVE_LIGATURES),
            preserve_whitespace: on(PRESERVE_WHITESPACE),
            preserve_images: on(PRESERVE_IMAGES),
            inhibit_spaces: on(INHIBIT_SPACES),
            dehyphenate: on(DEHYPHENATE),
            preserve_spans: on(PRESERVE_SPANS),
            mediabox_clip: on(MEDIABOX_CLIP),
            use_cid_for_unknown_unicode: on(USE_CID_FOR_UNKNOWN_UNICODE),
            accurate_bboxes: on(ACCURATE_BBOXES),
            ignore_actualtext: on(IGNORE_ACTUALTEXT),
            segment: on(SEGMENT),
        }
    }

    /// The toggles as a name to value mapping
    pub fn to_toggles(&self) -> HashMap<String, bool> {
        let values = [
            self.preserve_ligatures,
            self.preserve_whitespace,
            self.preserve_images,
            self.inhibit_spaces,
            self.dehyphenate,
            self.preserve_spans,
            self.mediabox_clip,
            self.use_cid_for_unknown_unicode,
            self.accurate_bboxes,
            self.ignore_actualtext,
            self.segment,
        ];
        FLAG_TABLE
            .iter()
            .zip(values)
            .map(|((name, _), on)| (name.to_string(), on))
            .collect()
    }

    /// Resolve to the engine bitmask
    pub fn bits(&self) -> u32 {
        resolve_flags(&self.to_toggles())
    }
}
