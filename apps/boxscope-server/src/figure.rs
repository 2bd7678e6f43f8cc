//! Figure assembly
//!
//! Builds a plotly-compatible figure: the page raster as a layout image,
//! one filled rectangle per box, and a y-axis running top-down.
//!
//! The figure's coordinate frame is point-space. The raster is stretched
//! over `width_px * 72 / dpi` by `height_px * 72 / dpi` points, so the boxes
//! (already in points) line up with it without being scaled.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;

use crate::engine::PageImage;
use crate::extraction::Level;
use crate::geometry::{pixels_to_points_size, Rect};

/// Fill alpha of overlay rectangles
const FILL_ALPHA: f32 = 0.35;
/// Overall shape opacity
const SHAPE_OPACITY: f32 = 0.6;

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    /// No traces; everything is in the layout
    pub data: Vec<serde_json::Value>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub margin: Margin,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub images: Vec<LayoutImage>,
    pub shapes: Vec<Shape>,
    pub dragmode: &'static str,
    pub showlegend: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub range: [f32; 2],
    pub visible: bool,
    pub showgrid: bool,
    pub zeroline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaleanchor: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutImage {
    /// PNG as a data URI
    pub source: String,
    pub xref: &'static str,
    pub yref: &'static str,
    pub x: f32,
    pub y: f32,
    pub sizex: f32,
    pub sizey: f32,
    pub xanchor: &'static str,
    pub yanchor: &'static str,
    pub sizing: &'static str,
    pub layer: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub xref: &'static str,
    pub yref: &'static str,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub line: ShapeLine,
    pub fillcolor: String,
    pub opacity: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShapeLine {
    pub color: &'static str,
    pub width: f32,
}

/// CSS `rgba()` for a level's overlay fill
pub fn level_fill(level: Level) -> String {
    let (r, g, b) = level.color();
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;
    format!(
        "rgba({},{},{},{})",
        channel(r),
        channel(g),
        channel(b),
        FILL_ALPHA
    )
}

/// Assemble the figure for one page
pub fn build_figure(image: &PageImage, rects: &[Rect], dpi: u32, level: Level) -> Figure {
    let (width, height) = pixels_to_points_size(image.width_px, image.height_px, dpi);
    let fillcolor = level_fill(level);

    let shapes = rects
        .iter()
        .map(|r| Shape {
            kind: "rect",
            xref: "x",
            yref: "y",
            x0: r.x0,
            y0: r.y0,
            x1: r.x1,
            y1: r.y1,
            line: ShapeLine {
                color: "rgba(0,0,0,0)",
                width: 0.0,
            },
            fillcolor: fillcolor.clone(),
            opacity: SHAPE_OPACITY,
        })
        .collect();

    let source = format!("data:image/png;base64,{}", BASE64.encode(image.png.as_slice()));

    Figure {
        data: Vec::new(),
        layout: Layout {
            width,
            height,
            margin: Margin { l: 0, r: 0, t: 0, b: 0 },
            xaxis: Axis {
                range: [0.0, width],
                visible: false,
                showgrid: false,
                zeroline: false,
                scaleanchor: None,
            },
            yaxis: Axis {
                // inverted: y grows downward like the raster
                range: [height, 0.0],
                visible: false,
                showgrid: false,
                zeroline: false,
                scaleanchor: Some("x"),
            },
            images: vec![LayoutImage {
                source,
                xref: "x",
                yref: "y",
                x: 0.0,
                y: 0.0,
                sizex: width,
                sizey: height,
                xanchor: "left",
                yanchor: "top",
                sizing: "stretch",
                layer: "below",
            }],
            shapes,
            dragmode: "zoom",
            showlegend: false,
        },
    }
}
