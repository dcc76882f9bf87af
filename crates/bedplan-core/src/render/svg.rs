//! SVG layout of the occupancy grid.
//!
//! The image has three columns: bed numbers on the left, the block grid in
//! the middle (one rectangle per run, not per cell), and merged bed notes
//! on the right. Every bed is one `cell_size` tall row.

use super::text::{TextMeasure, build_conflict_label_lines, build_crop_label_lines, fit_text, wrap_text};
use crate::config::{BedGeometry, VisualsConfig};
use crate::grid::{CellStatus, Grid, Run, dash_array};

const TEXT_FILL: &str = "#111111";
const FRAME_FILL: &str = "#FFFFFF";
const STROKE: &str = "#333333";
const LINE_HEIGHT: f64 = 1.2;
const NOTES_MAX_LINES: usize = 2;

/// Pixel geometry of the rendered image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgLayout {
    pub cell_size: u32,
    pub row_label_width: u32,
    pub grid_width: u32,
    pub notes_width: u32,
    pub width: u32,
    pub height: u32,
}

impl SvgLayout {
    pub fn new(bed_count: u32, blocks_per_bed: usize, visuals: &VisualsConfig) -> Self {
        let cell_size = visuals.cell_size;
        let row_label_width = visuals.row_label_width();
        let grid_width = blocks_per_bed as u32 * cell_size;
        let notes_width = (f64::from(grid_width) * visuals.notes_width_ratio).max(0.0).floor() as u32;
        Self {
            cell_size,
            row_label_width,
            grid_width,
            notes_width,
            width: row_label_width + grid_width + notes_width,
            height: bed_count * cell_size,
        }
    }

    fn row_y(&self, bed_id: u32) -> u32 {
        (bed_id - 1) * self.cell_size
    }

    fn notes_x(&self) -> u32 {
        self.row_label_width + self.grid_width
    }
}

/// Escape text for use in SVG content and attribute values.
pub fn svg_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

struct TextStyle<'a> {
    font_size: u32,
    font_family: &'a str,
}

/// Vertically centered multi-line text at `(x, y)`.
fn push_text(out: &mut String, x: f64, y: f64, lines: &[String], style: &TextStyle<'_>) {
    if lines.is_empty() {
        return;
    }
    let font_size = f64::from(style.font_size);
    let line_height = font_size * LINE_HEIGHT;
    let total_height = line_height * lines.len() as f64;
    let start_y = y - total_height / 2.0 + font_size;
    out.push_str(&format!(
        r#"<text x="{x}" y="{start_y}" text-anchor="middle" font-size="{}" font-family="{}" fill="{TEXT_FILL}">"#,
        style.font_size,
        svg_escape(style.font_family),
    ));
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        out.push_str(&format!(
            r#"<tspan x="{x}" dy="{dy}">{}</tspan>"#,
            svg_escape(line)
        ));
    }
    out.push_str("</text>");
}

fn push_frame(out: &mut String, x: u32, y: u32, width: u32, height: u32) {
    out.push_str(&format!(
        r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{FRAME_FILL}" stroke="{STROKE}" stroke-width="1" />"#
    ));
}

/// Render the grid as a standalone SVG document.
pub fn render_svg(
    grid: &Grid,
    geometry: &BedGeometry,
    visuals: &VisualsConfig,
    measure: &dyn TextMeasure,
) -> String {
    let layout = SvgLayout::new(grid.bed_count, grid.blocks_per_bed, visuals);
    let reserved = TextStyle {
        font_size: visuals.reserved_font_size,
        font_family: &visuals.font_family,
    };

    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = layout.width,
        h = layout.height,
    ));

    for bed_id in 1..=grid.bed_count {
        let y = layout.row_y(bed_id);
        push_frame(&mut out, 0, y, layout.row_label_width, layout.cell_size);
        push_text(
            &mut out,
            f64::from(layout.row_label_width) / 2.0,
            f64::from(y) + f64::from(layout.cell_size) / 2.0,
            &[bed_id.to_string()],
            &reserved,
        );
    }

    for bed_id in 1..=grid.bed_count {
        let y = layout.row_y(bed_id);
        let x = layout.notes_x();
        push_frame(&mut out, x, y, layout.notes_width, layout.cell_size);
        if let Some(notes) = grid.bed_notes(bed_id) {
            let max_chars =
                measure.line_capacity(reserved.font_size, f64::from(layout.notes_width));
            let lines = wrap_text(notes, max_chars, NOTES_MAX_LINES);
            push_text(
                &mut out,
                f64::from(x) + f64::from(layout.notes_width) / 2.0,
                f64::from(y) + f64::from(layout.cell_size) / 2.0,
                &lines,
                &reserved,
            );
        }
    }

    for run in &grid.runs {
        push_run(&mut out, grid, run, &layout, geometry, visuals, measure);
    }

    out.push_str("</svg>");
    out
}

fn push_run(
    out: &mut String,
    grid: &Grid,
    run: &Run,
    layout: &SvgLayout,
    geometry: &BedGeometry,
    visuals: &VisualsConfig,
    measure: &dyn TextMeasure,
) {
    let cell = grid.run_cell(run);
    let x = layout.row_label_width + run.start_block as u32 * layout.cell_size;
    let y = layout.row_y(run.bed_id);
    let width = run.len() as u32 * layout.cell_size;
    let height = layout.cell_size;

    let dash = dash_array(&cell.border_style)
        .map(|d| format!(r#" stroke-dasharray="{d}""#))
        .unwrap_or_default();
    out.push_str(&format!(
        r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}" fill-opacity="{}" stroke="{STROKE}" stroke-width="1"{dash} />"#,
        svg_escape(&cell.color),
        cell.alpha,
    ));

    let center_x = f64::from(x) + f64::from(width) / 2.0;
    let center_y = f64::from(y) + f64::from(height) / 2.0;
    let width_px = f64::from(width);
    let (lines, font_size) = match cell.status {
        CellStatus::Crop => (
            build_crop_label_lines(
                &cell.crop,
                &cell.variety,
                width_px,
                visuals.label_font_size,
                measure,
            ),
            visuals.label_font_size,
        ),
        CellStatus::Conflict => (
            build_conflict_label_lines(
                &cell.conflict_list(),
                width_px,
                visuals.conflict_font_size,
                visuals.conflict_max_lines,
                measure,
            ),
            visuals.conflict_font_size,
        ),
        CellStatus::Flower | CellStatus::Beneficial => {
            let label = geometry.reserved_label(cell.status.as_str());
            let max_chars = measure.line_capacity(visuals.reserved_font_size, width_px);
            (vec![fit_text(label, max_chars)], visuals.reserved_font_size)
        }
        CellStatus::Empty => return,
    };
    push_text(
        out,
        center_x,
        center_y,
        &lines,
        &TextStyle {
            font_size,
            font_family: &visuals.font_family,
        },
    );
}
