// Copyright 2025 Benchcharts Contributors
// SPDX-License-Identifier: Apache-2.0

//! Declarative description of a chart.
//!
//! Templates build a [`Figure`] from the results record; a
//! [`FigureSink`](crate::render::FigureSink) turns it into files. Keeping the
//! two apart means every label, bar height and bin count can be checked
//! without a drawing backend.

use crate::style::{Palette, Rgb};

/// A complete chart: one or more panels laid out side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Panels, left to right.
    pub panels: Vec<Panel>,
}

/// One set of axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    /// Title drawn above the axes.
    pub title: String,
    /// Horizontal axis description.
    pub x_label: String,
    /// Vertical axis description.
    pub y_label: String,
    /// What is plotted.
    pub content: PanelContent,
    /// Free text placed in data coordinates.
    pub callouts: Vec<Callout>,
}

/// The plotted data of a panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    /// Categorical bars.
    Bars(BarSeries),
    /// Frequency histogram.
    Histogram(HistogramSeries),
}

/// Bars placed at integer positions `0..n`, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// The bars.
    pub bars: Vec<Bar>,
    /// Whether category names are drawn rotated.
    pub rotate_categories: bool,
}

/// A single bar with its optional error bar and value label.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Category name on the horizontal axis.
    pub category: String,
    /// Bar height.
    pub value: f64,
    /// Half-height of the symmetric error bar.
    pub error: Option<f64>,
    /// Text drawn above the bar.
    pub label: String,
    /// Baseline of the label, in data units.
    pub label_y: f64,
    /// Fill color.
    pub fill: Rgb,
}

/// Histogram bins with an optional vertical reference line.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSeries {
    /// Contiguous bins in ascending order.
    pub bins: Vec<Bin>,
    /// Marker such as the overall mean.
    pub reference: Option<ReferenceLine>,
}

/// One histogram bin covering `[start, end)`, the last one closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    /// Lower edge.
    pub start: f64,
    /// Upper edge.
    pub end: f64,
    /// Number of samples that fell in the bin.
    pub count: usize,
    /// Fill color.
    pub fill: Rgb,
}

/// A labeled vertical line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    /// Horizontal position in data units.
    pub x: f64,
    /// Legend text.
    pub label: String,
    /// Stroke color.
    pub color: Rgb,
}

/// Free text anchored at its center.
#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    /// Text.
    pub text: String,
    /// Horizontal position in data units.
    pub x: f64,
    /// Vertical position in data units.
    pub y: f64,
}

impl BarSeries {
    /// Upper bound of the value axis: the highest label plus headroom.
    pub fn y_max(&self) -> f64 {
        let top = self
            .bars
            .iter()
            .map(|b| b.label_y.max(b.value + b.error.unwrap_or(0.0)))
            .fold(0.0, f64::max);
        if top > 0.0 {
            top * 1.15
        } else {
            1.0
        }
    }
}

impl HistogramSeries {
    /// Bin `samples` into `bin_count` equal-width bins shaded along the
    /// palette gradient. Returns `None` for empty input or zero bins.
    ///
    /// Bins span `[min, max]`; a degenerate range is widened by half a unit
    /// on each side.
    pub fn from_samples(samples: &[f64], bin_count: usize, palette: &Palette) -> Option<Self> {
        let (&first, rest) = samples.split_first()?;
        if bin_count == 0 {
            return None;
        }

        let (mut lo, mut hi) = rest
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let width = (hi - lo) / bin_count as f64;

        let mut counts = vec![0usize; bin_count];
        for &sample in samples {
            let index = (((sample - lo) / width) as usize).min(bin_count - 1);
            counts[index] += 1;
        }

        let last = (bin_count - 1).max(1) as f64;
        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| Bin {
                start: lo + width * i as f64,
                end: if i + 1 == bin_count {
                    hi
                } else {
                    lo + width * (i + 1) as f64
                },
                count,
                fill: palette.gradient_at(i as f64 / last),
            })
            .collect();

        Some(Self {
            bins,
            reference: None,
        })
    }

    /// Largest bin count.
    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }

    /// Horizontal extent covered by the bins.
    pub fn x_range(&self) -> (f64, f64) {
        match (self.bins.first(), self.bins.last()) {
            (Some(first), Some(last)) => (first.start, last.end),
            _ => (0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_every_sample() {
        let samples: Vec<f64> = (0..100).map(|i| i as f64 * 0.37).collect();
        let hist = HistogramSeries::from_samples(&samples, 30, &Palette::default()).unwrap();
        assert_eq!(hist.bins.len(), 30);
        assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 100);
    }

    #[test]
    fn test_histogram_last_bin_is_closed() {
        let hist =
            HistogramSeries::from_samples(&[0.0, 1.0, 2.0, 3.0], 3, &Palette::default()).unwrap();
        let counts: Vec<usize> = hist.bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 2]);
        assert_eq!(hist.x_range(), (0.0, 3.0));
    }

    #[test]
    fn test_histogram_degenerate_range_is_widened() {
        let hist = HistogramSeries::from_samples(&[2.0, 2.0], 4, &Palette::default()).unwrap();
        assert_eq!(hist.x_range(), (1.5, 2.5));
        assert_eq!(hist.max_count(), 2);
    }

    #[test]
    fn test_histogram_rejects_empty_input() {
        assert!(HistogramSeries::from_samples(&[], 30, &Palette::default()).is_none());
    }

    #[test]
    fn test_histogram_shading_spans_gradient() {
        let palette = Palette::default();
        let hist = HistogramSeries::from_samples(&[0.0, 10.0], 30, &palette).unwrap();
        assert_eq!(hist.bins[0].fill, palette.gradient_at(0.0));
        assert_eq!(hist.bins[29].fill, palette.gradient_at(1.0));
    }

    #[test]
    fn test_bar_axis_leaves_room_for_labels() {
        let series = BarSeries {
            bars: vec![Bar {
                category: "q".to_string(),
                value: 10.0,
                error: Some(2.0),
                label: "10.0±2.0".to_string(),
                label_y: 13.0,
                fill: Rgb(0, 0, 0),
            }],
            rotate_categories: false,
        };
        assert!(series.y_max() > 13.0);
    }

    #[test]
    fn test_empty_bar_axis_has_unit_range() {
        let series = BarSeries {
            bars: Vec::new(),
            rotate_categories: false,
        };
        assert_eq!(series.y_max(), 1.0);
    }
}
