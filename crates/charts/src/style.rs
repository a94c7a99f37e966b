// Copyright 2025 Benchcharts Contributors
// SPDX-License-Identifier: Apache-2.0

//! Visual style shared by every chart template.
//!
//! A [`ChartStyle`] is built once and handed to the templates and the
//! drawing sink. Nothing here is process-global.

use plotters::prelude::{RGBColor, ViridisRGB};

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl From<RGBColor> for Rgb {
    fn from(RGBColor(r, g, b): RGBColor) -> Self {
        Rgb(r, g, b)
    }
}

/// Named colors used by the templates.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// Bars for keyword search.
    pub simple: Rgb,
    /// Bars for regex search.
    pub regex: Rgb,
    /// Error bar strokes.
    pub error_bar: Rgb,
    /// Reference lines such as the recommendation mean.
    pub reference: Rgb,
    /// Bar outlines and text.
    pub edge: Rgb,
    /// Horizontal grid lines.
    pub grid: Rgb,
    /// Background of callout annotations.
    pub callout: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            simple: Rgb(0x2e, 0xcc, 0x71),
            regex: Rgb(0x34, 0x98, 0xdb),
            error_bar: Rgb(0xe7, 0x4c, 0x3c),
            reference: Rgb(0xff, 0x00, 0x00),
            edge: Rgb(0, 0, 0),
            grid: Rgb(0xb0, 0xb0, 0xb0),
            callout: Rgb(0xff, 0xff, 0x00),
        }
    }
}

impl Palette {
    /// Color at position `t` in `[0, 1]` along the viridis histogram
    /// gradient. Out of range positions are clamped.
    pub fn gradient_at(&self, t: f64) -> Rgb {
        ViridisRGB::get_color(t.clamp(0.0, 1.0)).into()
    }
}

/// Style configuration for every chart.
///
/// Sizes are in pixels of the vector surface; one inch of the reference
/// layout maps to [`ChartStyle::PIXELS_PER_INCH`] pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    /// Font family for all text.
    pub font_family: String,
    /// Panel titles.
    pub title_size: f64,
    /// Axis descriptions.
    pub axis_label_size: f64,
    /// Tick labels.
    pub tick_size: f64,
    /// Value labels above bars.
    pub value_label_size: f64,
    /// Callout and legend text.
    pub annotation_size: f64,
    /// Outer margin of each panel.
    pub margin: u32,
    /// Colors.
    pub palette: Palette,
    /// Raster output scale relative to the vector surface.
    pub raster_scale: f32,
}

impl ChartStyle {
    /// Pixels per inch of the vector surface.
    pub const PIXELS_PER_INCH: u32 = 100;

    /// Convert a size in inches to surface pixels.
    pub fn inches(&self, width: f64, height: f64) -> (u32, u32) {
        let ppi = Self::PIXELS_PER_INCH as f64;
        ((width * ppi).round() as u32, (height * ppi).round() as u32)
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            title_size: 20.0,
            axis_label_size: 17.0,
            tick_size: 14.0,
            value_label_size: 13.0,
            annotation_size: 16.0,
            margin: 15,
            palette: Palette::default(),
            raster_scale: 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        let palette = Palette::default();
        assert_eq!(palette.gradient_at(0.0), Rgb(68, 1, 84));
        assert_eq!(palette.gradient_at(1.0), Rgb(254, 232, 37));
    }

    #[test]
    fn test_gradient_clamps_out_of_range() {
        let palette = Palette::default();
        assert_eq!(palette.gradient_at(-3.0), palette.gradient_at(0.0));
        assert_eq!(palette.gradient_at(7.5), palette.gradient_at(1.0));
    }

    #[test]
    fn test_gradient_brightens_along_the_scale() {
        let palette = Palette::default();
        let Rgb(_, dark, _) = palette.gradient_at(0.25);
        let Rgb(_, light, _) = palette.gradient_at(0.75);
        assert!(light > dark);
    }

    #[test]
    fn test_inches_to_pixels() {
        assert_eq!(ChartStyle::default().inches(10.0, 6.0), (1000, 600));
    }
}
