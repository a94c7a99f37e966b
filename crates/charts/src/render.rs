// Copyright 2025 Benchcharts Contributors
// SPDX-License-Identifier: Apache-2.0

//! Drawing figures to disk.
//!
//! [`FigureSink`] is the seam between the templates and the plotting
//! library. [`PlottersSink`] draws every figure once onto a plotters SVG
//! surface, then derives both artifacts from that SVG:
//!
//! - the vector artifact through `svg2pdf`,
//! - the raster artifact through `resvg`, at [`ChartStyle::raster_scale`].
//!
//! The drawing surface is created and dropped inside a single
//! [`FigureSink::save`] call. System fonts are loaded once per sink, and
//! the generic `sans-serif` family is bound to an installed face so that
//! every label survives the conversion.

use crate::error::RenderError;
use crate::figure::{BarSeries, Figure, HistogramSeries, Panel, PanelContent};
use crate::style::{ChartStyle, Rgb};
use crate::templates::ArtifactPaths;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Half of a bar's width, in category units.
const BAR_HALF_WIDTH: f64 = 0.35;

/// Error bar cap width in pixels.
const ERROR_CAP_WIDTH: u32 = 12;

type Surface<'a> = DrawingArea<SVGBackend<'a>, Shift>;

type DrawResult<T> = Result<T, DrawingAreaErrorKind<std::io::Error>>;

/// Installed families tried, in order, for the generic `sans-serif` name.
const SANS_SERIF_CANDIDATES: [&str; 6] = [
    "DejaVu Sans",
    "Liberation Sans",
    "Arial",
    "Helvetica",
    "Noto Sans",
    "FreeSans",
];

// resvg and svg2pdf pin different fontdb releases, so each gets its own
// database.
type RasterFonts = resvg::usvg::fontdb::Database;
type VectorFonts = svg2pdf::usvg::fontdb::Database;

/// Figure sink backed by plotters, svg2pdf and resvg.
#[derive(Clone)]
pub struct PlottersSink {
    style: ChartStyle,
    family: Option<String>,
    raster_fonts: Arc<RasterFonts>,
    vector_fonts: Arc<VectorFonts>,
}

impl PlottersSink {
    /// Create a sink drawing with `style`, loading the system fonts.
    pub fn new(style: ChartStyle) -> Self {
        let mut raster_fonts = RasterFonts::new();
        raster_fonts.load_system_fonts();
        let mut vector_fonts = VectorFonts::new();
        vector_fonts.load_system_fonts();

        let family = sans_serif_face(&raster_fonts);
        match &family {
            Some(family) => {
                debug!(family = %family, faces = raster_fonts.len(), "Fonts loaded");
                raster_fonts.set_sans_serif_family(family.as_str());
                vector_fonts.set_sans_serif_family(family.as_str());
            }
            None => warn!("No usable system font found, chart text will be missing"),
        }

        Self {
            style,
            family,
            raster_fonts: Arc::new(raster_fonts),
            vector_fonts: Arc::new(vector_fonts),
        }
    }

    /// Installed face standing in for `sans-serif`, if any.
    pub fn font_family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    /// Draw `figure` into an SVG document.
    pub fn render_svg(&self, figure: &Figure) -> Result<String, RenderError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (figure.width, figure.height))
                .into_drawing_area();
            draw_figure(&root, figure, &self.style)
                .map_err(|e| RenderError::Draw(e.to_string()))?;
        }
        Ok(svg)
    }

    /// Convert an SVG document to PDF.
    pub fn svg_to_pdf(&self, svg: &str) -> Result<Vec<u8>, RenderError> {
        let encode_err = |reason: String| RenderError::Encode {
            format: "pdf",
            reason,
        };

        let mut options = svg2pdf::usvg::Options {
            fontdb: Arc::clone(&self.vector_fonts),
            ..Default::default()
        };
        if let Some(family) = &self.family {
            options.font_family = family.clone();
        }
        let tree = svg2pdf::usvg::Tree::from_str(svg, &options)
            .map_err(|e| encode_err(e.to_string()))?;

        svg2pdf::to_pdf(
            &tree,
            svg2pdf::ConversionOptions::default(),
            svg2pdf::PageOptions::default(),
        )
        .map_err(|e| encode_err(format!("{e:?}")))
    }

    /// Rasterize an SVG document to PNG at the style's raster scale.
    pub fn svg_to_png(&self, svg: &str) -> Result<Vec<u8>, RenderError> {
        let encode_err = |reason: String| RenderError::Encode {
            format: "png",
            reason,
        };

        let mut options = resvg::usvg::Options {
            fontdb: Arc::clone(&self.raster_fonts),
            ..Default::default()
        };
        if let Some(family) = &self.family {
            options.font_family = family.clone();
        }
        let tree = resvg::usvg::Tree::from_str(svg, &options)
            .map_err(|e| encode_err(e.to_string()))?;

        let scale = self.style.raster_scale;
        let size = tree.size();
        let width = (size.width() * scale).ceil() as u32;
        let height = (size.height() * scale).ceil() as u32;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| encode_err(format!("cannot allocate a {width}x{height} raster")))?;

        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );
        pixmap.encode_png().map_err(|e| encode_err(e.to_string()))
    }
}

impl Default for PlottersSink {
    fn default() -> Self {
        Self::new(ChartStyle::default())
    }
}

impl fmt::Debug for PlottersSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlottersSink")
            .field("style", &self.style)
            .field("family", &self.family)
            .field("faces", &self.raster_fonts.len())
            .finish()
    }
}

/// Draws a [`Figure`] to its vector and raster artifacts.
pub trait FigureSink {
    /// Writes `figure` to the paths in `artifacts`.
    fn save(&mut self, figure: &Figure, artifacts: &ArtifactPaths) -> Result<(), RenderError>;
}

impl<S: FigureSink + ?Sized> FigureSink for &mut S {
    fn save(&mut self, figure: &Figure, artifacts: &ArtifactPaths) -> Result<(), RenderError> {
        (**self).save(figure, artifacts)
    }
}

impl FigureSink for PlottersSink {
    fn save(&mut self, figure: &Figure, artifacts: &ArtifactPaths) -> Result<(), RenderError> {
        let svg = self.render_svg(figure)?;

        let pdf = self.svg_to_pdf(&svg)?;
        write_artifact(&artifacts.vector, &pdf)?;

        let png = self.svg_to_png(&svg)?;
        write_artifact(&artifacts.raster, &png)?;

        debug!(
            vector = %artifacts.vector.display(),
            raster = %artifacts.raster.display(),
            pdf_bytes = pdf.len(),
            png_bytes = png.len(),
            "Figure saved"
        );
        Ok(())
    }
}

/// Pick an installed family for `sans-serif`: a known sans face first, then
/// any face whose name says sans, then whatever is installed.
fn sans_serif_face(db: &RasterFonts) -> Option<String> {
    let has_family = |name: &str| {
        db.faces()
            .any(|face| face.families.iter().any(|(family, _)| family == name))
    };
    let first_family = |pred: &dyn Fn(&str) -> bool| {
        db.faces()
            .flat_map(|face| face.families.iter())
            .map(|(family, _)| family.as_str())
            .find(|family| pred(family))
            .map(str::to_string)
    };

    SANS_SERIF_CANDIDATES
        .into_iter()
        .find(|name| has_family(name))
        .map(str::to_string)
        .or_else(|| first_family(&|family| family.contains("Sans")))
        .or_else(|| first_family(&|_| true))
}

fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    fs::write(path, bytes).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn color(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

fn draw_figure(root: &Surface<'_>, figure: &Figure, style: &ChartStyle) -> DrawResult<()> {
    root.fill(&WHITE)?;

    let areas = root.split_evenly((1, figure.panels.len().max(1)));
    for (area, panel) in areas.iter().zip(&figure.panels) {
        match &panel.content {
            PanelContent::Bars(series) => draw_bars(root, area, panel, series, style)?,
            PanelContent::Histogram(histogram) => draw_histogram(area, panel, histogram, style)?,
        }
    }

    root.present()
}

fn draw_bars(
    root: &Surface<'_>,
    area: &Surface<'_>,
    panel: &Panel,
    series: &BarSeries,
    style: &ChartStyle,
) -> DrawResult<()> {
    let family = style.font_family.as_str();
    let palette = &style.palette;
    let slots = series.bars.len().max(1);

    let mut chart = ChartBuilder::on(area)
        .caption(
            &panel.title,
            (family, style.title_size).into_font().style(FontStyle::Bold),
        )
        .margin(style.margin)
        .x_label_area_size(if series.rotate_categories { 130u32 } else { 55u32 })
        .y_label_area_size(75u32)
        .build_cartesian_2d(-0.5f64..(slots as f64 - 0.5), 0f64..series.y_max())?;

    // Bars sit on integer positions; only those ticks get a category name.
    let category_at = |x: &f64| {
        let index = x.round();
        if (x - index).abs() > 1e-6 || index < 0.0 {
            return String::new();
        }
        series
            .bars
            .get(index as usize)
            .map(|bar| bar.category.clone())
            .unwrap_or_default()
    };

    let mut tick_font = (family, style.tick_size).into_font();
    if series.rotate_categories {
        tick_font = tick_font.transform(FontTransform::Rotate90);
    }

    chart
        .configure_mesh()
        .disable_x_mesh()
        .bold_line_style(color(palette.grid).mix(0.4).stroke_width(1))
        .light_line_style(color(palette.grid).mix(0.1).stroke_width(1))
        .x_labels(slots)
        .x_label_formatter(&category_at)
        .x_label_style(tick_font)
        .y_label_style((family, style.tick_size).into_font())
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .axis_desc_style((family, style.axis_label_size).into_font().style(FontStyle::Bold))
        .draw()?;

    chart.draw_series(series.bars.iter().enumerate().map(|(i, bar)| {
        let x = i as f64;
        Rectangle::new(
            [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, bar.value)],
            color(bar.fill).filled(),
        )
    }))?;
    chart.draw_series(series.bars.iter().enumerate().map(|(i, bar)| {
        let x = i as f64;
        Rectangle::new(
            [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, bar.value)],
            color(palette.edge).stroke_width(1),
        )
    }))?;

    chart.draw_series(series.bars.iter().enumerate().filter_map(|(i, bar)| {
        bar.error.map(|error| {
            ErrorBar::new_vertical(
                i as f64,
                bar.value - error,
                bar.value,
                bar.value + error,
                color(palette.error_bar).stroke_width(2),
                ERROR_CAP_WIDTH,
            )
        })
    }))?;

    let value_style = TextStyle::from(
        (family, style.value_label_size)
            .into_font()
            .style(FontStyle::Bold),
    )
    .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(series.bars.iter().enumerate().map(|(i, bar)| {
        Text::new(bar.label.clone(), (i as f64, bar.label_y), value_style.clone())
    }))?;

    for callout in &panel.callouts {
        let text_style = TextStyle::from((family, style.annotation_size).into_font())
            .pos(Pos::new(HPos::Center, VPos::Center));
        let (cx, cy) = chart.backend_coord(&(callout.x, callout.y));
        let (w, h) = root.estimate_text_size(&callout.text, &text_style)?;
        let (half_w, half_h) = (w as i32 / 2 + 10, h as i32 / 2 + 6);

        root.draw(&Rectangle::new(
            [(cx - half_w, cy - half_h), (cx + half_w, cy + half_h)],
            color(palette.callout).mix(0.7).filled(),
        ))?;
        root.draw(&Text::new(callout.text.as_str(), (cx, cy), text_style))?;
    }

    Ok(())
}

fn draw_histogram(
    area: &Surface<'_>,
    panel: &Panel,
    histogram: &HistogramSeries,
    style: &ChartStyle,
) -> DrawResult<()> {
    let family = style.font_family.as_str();
    let palette = &style.palette;
    let (lo, hi) = histogram.x_range();
    let y_max = (histogram.max_count() as f64 * 1.1).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(
            &panel.title,
            (family, style.title_size).into_font().style(FontStyle::Bold),
        )
        .margin(style.margin)
        .x_label_area_size(55u32)
        .y_label_area_size(75u32)
        .build_cartesian_2d(lo..hi, 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .bold_line_style(color(palette.grid).mix(0.4).stroke_width(1))
        .light_line_style(color(palette.grid).mix(0.1).stroke_width(1))
        .x_label_formatter(&|x: &f64| format!("{x:.2}"))
        .y_label_formatter(&|y: &f64| format!("{y:.0}"))
        .x_label_style((family, style.tick_size).into_font())
        .y_label_style((family, style.tick_size).into_font())
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .axis_desc_style((family, style.axis_label_size).into_font().style(FontStyle::Bold))
        .draw()?;

    chart.draw_series(histogram.bins.iter().map(|bin| {
        Rectangle::new(
            [(bin.start, 0.0), (bin.end, bin.count as f64)],
            color(bin.fill).mix(0.85).filled(),
        )
    }))?;
    chart.draw_series(histogram.bins.iter().filter(|bin| bin.count > 0).map(|bin| {
        Rectangle::new(
            [(bin.start, 0.0), (bin.end, bin.count as f64)],
            color(palette.edge).stroke_width(1),
        )
    }))?;

    if let Some(reference) = &histogram.reference {
        let line = color(reference.color);
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(reference.x, 0.0), (reference.x, y_max)],
                line.stroke_width(3),
            )))?
            .label(reference.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 24, y)], line.stroke_width(3))
            });

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font((family, style.annotation_size).into_font())
            .background_style(WHITE.mix(0.8).filled())
            .border_style(color(palette.edge).stroke_width(1))
            .draw()?;
    }

    Ok(())
}
