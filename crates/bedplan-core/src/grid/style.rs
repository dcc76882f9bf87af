//! Per-cell presentation: fill color, opacity, and border style.

use std::collections::BTreeMap;

use super::cell::CellStatus;
use crate::config::VisualsConfig;

/// Built-in fill per status, before visuals overrides.
pub const DEFAULT_STATUS_COLORS: [(CellStatus, &str); 5] = [
    (CellStatus::Empty, "#F2F2F2"),
    (CellStatus::Flower, "#E6A8D7"),
    (CellStatus::Beneficial, "#B3D9FF"),
    (CellStatus::Crop, "#CCCCCC"),
    (CellStatus::Conflict, "#E63946"),
];

pub const SOLID: &str = "solid";

fn default_color(status: CellStatus) -> &'static str {
    DEFAULT_STATUS_COLORS
        .iter()
        .find(|(s, _)| *s == status)
        .map_or("#F2F2F2", |(_, color)| *color)
}

/// Presentation attributes for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellStyle {
    pub color: String,
    pub alpha: f64,
    pub border_style: String,
}

/// Resolves cell styles from the visuals config.
///
/// Crop cells are colored by plant family and take opacity and border from
/// their water requirement. Every other status uses the status palette and
/// is drawn opaque with a solid border.
#[derive(Debug, Clone)]
pub struct Palette<'a> {
    status_colors: BTreeMap<&'a str, &'a str>,
    family_colors: &'a BTreeMap<String, String>,
    water_alpha: &'a BTreeMap<String, f64>,
    water_borders: &'a BTreeMap<String, String>,
}

impl<'a> Palette<'a> {
    pub fn new(visuals: &'a VisualsConfig) -> Self {
        let mut status_colors: BTreeMap<&str, &str> = DEFAULT_STATUS_COLORS
            .iter()
            .map(|(status, color)| (status.as_str(), *color))
            .collect();
        for (status, color) in &visuals.status_colors {
            status_colors.insert(status.as_str(), color.as_str());
        }
        Self {
            status_colors,
            family_colors: &visuals.family_colors,
            water_alpha: &visuals.water_alpha,
            water_borders: &visuals.water_borders,
        }
    }

    pub fn style(&self, status: CellStatus, family: &str, water: &str) -> CellStyle {
        if status == CellStatus::Crop {
            return CellStyle {
                color: self
                    .family_colors
                    .get(family)
                    .map_or(default_color(CellStatus::Crop), String::as_str)
                    .to_owned(),
                alpha: self.water_alpha.get(water).copied().unwrap_or(1.0),
                border_style: self
                    .water_borders
                    .get(water)
                    .map_or(SOLID, String::as_str)
                    .to_owned(),
            };
        }
        CellStyle {
            color: self
                .status_colors
                .get(status.as_str())
                .copied()
                .unwrap_or(default_color(CellStatus::Empty))
                .to_owned(),
            alpha: 1.0,
            border_style: SOLID.to_owned(),
        }
    }
}

/// SVG dash pattern for a border style; `None` draws a solid line.
pub fn dash_array(border_style: &str) -> Option<&'static str> {
    match border_style {
        "dashed" => Some("4,2"),
        "dotted" => Some("1,2"),
        _ => None,
    }
}
