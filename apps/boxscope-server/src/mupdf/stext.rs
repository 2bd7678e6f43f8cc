//! Structured text walk
//!
//! Turns a MuPDF structured text page into boxes at four levels:
//!
//! - blocks: text blocks, plus image blocks when the engine emits them,
//!   sorted by bottom edge then left edge
//! - lines: per block, in engine order
//! - spans: runs of glyphs in a line sharing font size and baseline
//! - words: whitespace-delimited glyph runs per line, in engine order
//!
//! The bindings expose no font handle per glyph, so span boundaries follow
//! size and baseline changes only.

use mupdf::text_page::TextBlockType;
use mupdf::{Page, Quad, TextPageFlags};

use crate::engine::EngineError;
use crate::extraction::PageGeometry;
use crate::geometry::Rect;

/// Baseline shift, as a fraction of font size, that starts a new span
const BASELINE_TOLERANCE: f32 = 0.2;

/// Boxes for one block before the block sort
struct BlockBoxes {
    bbox: Rect,
    lines: Vec<Rect>,
    spans: Vec<Rect>,
}

/// A glyph reduced to what the walk needs
#[derive(Debug, Clone, Copy)]
pub(crate) struct Glyph {
    pub c: Option<char>,
    pub rect: Rect,
    pub size: f32,
    pub baseline: f32,
}

/// Extract page geometry with the given stext flag bits
pub fn extract_page_geometry(page: &Page, flags: u32) -> Result<PageGeometry, EngineError> {
    let options = TextPageFlags::from_bits_truncate(flags as _);
    let text_page = page
        .to_text_page(options)
        .map_err(|e| EngineError::TextPage(e.to_string()))?;

    let mut blocks = Vec::new();
    let mut words = Vec::new();

    for block in text_page.blocks() {
        let bbox = Rect::from(block.bounds());
        let kind = block.r#type();

        if kind == TextBlockType::Image {
            blocks.push(BlockBoxes {
                bbox,
                lines: Vec::new(),
                spans: Vec::new(),
            });
            continue;
        }
        if kind != TextBlockType::Text {
            continue;
        }

        let mut lines = Vec::new();
        let mut spans = Vec::new();
        for line in block.lines() {
            lines.push(Rect::from(line.bounds()));

            let glyphs: Vec<Glyph> = line
                .chars()
                .map(|ch| Glyph {
                    c: ch.char(),
                    rect: quad_rect(&ch.quad()),
                    size: ch.size(),
                    baseline: ch.origin().y,
                })
                .collect();

            spans.extend(group_spans(&glyphs));
            words.extend(group_words(&glyphs));
        }

        blocks.push(BlockBoxes { bbox, lines, spans });
    }

    sort_blocks(&mut blocks);

    let mut geometry = PageGeometry {
        words,
        ..Default::default()
    };
    for block in blocks {
        geometry.blocks.push(block.bbox);
        geometry.lines.extend(block.lines);
        geometry.spans.extend(block.spans);
    }
    Ok(geometry)
}

/// Bounding rectangle of a glyph quad
pub(crate) fn quad_rect(q: &Quad) -> Rect {
    let xs = [q.ul.x, q.ur.x, q.ll.x, q.lr.x];
    let ys = [q.ul.y, q.ur.y, q.ll.y, q.lr.y];
    Rect {
        x0: xs.iter().copied().fold(f32::INFINITY, f32::min),
        y0: ys.iter().copied().fold(f32::INFINITY, f32::min),
        x1: xs.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        y1: ys.iter().copied().fold(f32::NEG_INFINITY, f32::max),
    }
}

/// Top-to-bottom, then left-to-right, keeping engine order on ties
fn sort_blocks(blocks: &mut [BlockBoxes]) {
    blocks.sort_by(|a, b| {
        a.bbox
            .y1
            .total_cmp(&b.bbox.y1)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });
}

/// Split a line's glyphs into spans of equal size and baseline
pub(crate) fn group_spans(glyphs: &[Glyph]) -> Vec<Rect> {
    let mut spans = Vec::new();
    let mut current: Option<(Rect, f32, f32)> = None;

    for g in glyphs {
        current = match current {
            Some((rect, size, baseline))
                if (g.size - size).abs() < 0.01
                    && (g.baseline - baseline).abs() <= size * BASELINE_TOLERANCE =>
            {
                Some((rect.union(&g.rect), size, baseline))
            }
            Some((rect, _, _)) => {
                spans.push(rect);
                Some((g.rect, g.size, g.baseline))
            }
            None => Some((g.rect, g.size, g.baseline)),
        };
    }

    if let Some((rect, _, _)) = current {
        spans.push(rect);
    }
    spans
}

/// Split a line's glyphs into whitespace-delimited words
pub(crate) fn group_words(glyphs: &[Glyph]) -> Vec<Rect> {
    let mut words = Vec::new();
    let mut current: Option<Rect> = None;

    for g in glyphs {
        if g.c.is_some_and(char::is_whitespace) {
            if let Some(rect) = current.take() {
                words.push(rect);
            }
            continue;
        }
        current = Some(match current {
            Some(rect) => rect.union(&g.rect),
            None => g.rect,
        });
    }

    if let Some(rect) = current {
        words.push(rect);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(c: char, x: f32, size: f32, baseline: f32) -> Glyph {
        Glyph {
            c: Some(c),
            rect: Rect::new(x, baseline - size, x + size * 0.5, baseline),
            size,
            baseline,
        }
    }

    fn line(text: &str, size: f32, baseline: f32) -> Vec<Glyph> {
        text.chars()
            .enumerate()
            .map(|(i, c)| glyph(c, i as f32 * 6.0, size, baseline))
            .collect()
    }

    #[test]
    fn test_words_split_on_whitespace() {
        let glyphs = line("ab  cd e", 12.0, 100.0);
        let words = group_words(&glyphs);
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].x0, 0.0);
        assert_eq!(words[1].x0, 24.0);
        assert_eq!(words[2].x0, 42.0);
    }

    #[test]
    fn test_words_of_blank_line() {
        assert!(group_words(&line("   ", 12.0, 100.0)).is_empty());
        assert!(group_words(&[]).is_empty());
    }

    #[test]
    fn test_unknown_glyphs_are_word_characters() {
        let mut glyphs = line("a b", 12.0, 100.0);
        glyphs[2].c = None;
        assert_eq!(group_words(&glyphs).len(), 2);
    }

    #[test]
    fn test_single_span_for_uniform_line() {
        let spans = group_spans(&line("hello world", 12.0, 100.0));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].x0, 0.0);
    }

    #[test]
    fn test_span_breaks_on_size_and_baseline() {
        let mut glyphs = line("abc", 12.0, 100.0);
        glyphs.push(glyph('2', 18.0, 7.0, 95.0)); // superscript
        glyphs.push(glyph('d', 24.0, 12.0, 100.0));
        let spans = group_spans(&glyphs);
        assert_eq!(spans.len(), 3);
    }

    #[test]
    fn test_sort_blocks_reading_order() {
        let block = |x0: f32, y1: f32| BlockBoxes {
            bbox: Rect::new(x0, y1 - 10.0, x0 + 50.0, y1),
            lines: Vec::new(),
            spans: Vec::new(),
        };
        let mut blocks = vec![block(300.0, 100.0), block(10.0, 200.0), block(10.0, 100.0)];
        sort_blocks(&mut blocks);
        let order: Vec<(f32, f32)> = blocks.iter().map(|b| (b.bbox.x0, b.bbox.y1)).collect();
        assert_eq!(order, vec![(10.0, 100.0), (300.0, 100.0), (10.0, 200.0)]);
    }
}
