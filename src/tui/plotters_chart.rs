//! Plotters-powered weekly comparison chart widget for Ratatui.
//!
//! Each keyword gets a pair of bars: recent-week average next to the
//! previous-week average. Plotters output is drawn into the Ratatui buffer
//! through `plotters-ratatui-backend`.

use plotters::prelude::*;
// Brings `.filled()` back; the `Color` name below is ratatui's.
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// One keyword's pair of averages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarPair {
    pub recent: f64,
    pub previous: f64,
}

/// A render-only chart description; bars and bounds are computed by the caller.
pub struct WeeklyBarChart<'a> {
    /// Bars in table order; the x tick `n` labels `bars[n - 1]`.
    pub bars: &'a [BarPair],
    /// Upper y bound (posts).
    pub y_max: f64,
    pub y_label: &'a str,
}

impl<'a> Widget for WeeklyBarChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        if self.bars.is_empty() || !self.y_max.is_finite() || self.y_max <= 0.0 {
            return;
        }

        let x1 = self.bars.len() as f64;
        let y1 = self.y_max;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(0.0..x1, 0.0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(self.bars.len().min(12))
                .y_labels(5)
                .x_label_formatter(&|v| format!("{}", v.floor() as usize + 1))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            chart.draw_series(bar_rectangles(self.bars))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Previous-week bars (gray, left half of each slot) followed by recent-week
/// bars (cyan, right half). Slot `i` spans `i..i + 1` on the x axis.
pub fn bar_rectangles(bars: &[BarPair]) -> Vec<Rectangle<(f64, f64)>> {
    let recent_color = RGBColor(0, 255, 255); // cyan
    let previous_color = RGBColor(128, 128, 128); // gray

    let previous = bars.iter().enumerate().map(|(i, bar)| {
        let x = i as f64;
        Rectangle::new([(x + 0.15, 0.0), (x + 0.5, bar.previous)], previous_color.filled())
    });
    let recent = bars.iter().enumerate().map(|(i, bar)| {
        let x = i as f64;
        Rectangle::new([(x + 0.5, 0.0), (x + 0.85, bar.recent)], recent_color.filled())
    });
    previous.chain(recent).collect()
}

/// Upper y bound with a little headroom; 1.0 when every bar is zero.
pub fn bars_y_max(bars: &[BarPair]) -> f64 {
    let max = bars
        .iter()
        .flat_map(|b| [b.recent, b.previous])
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    if max <= 0.0 { 1.0 } else { max * 1.1 }
}

#[cfg(test)]
mod tests {
    use plotters::element::PointCollection;

    use super::*;

    fn assert_corners(rect: &Rectangle<(f64, f64)>, expected: [(f64, f64); 2]) {
        let got: Vec<(f64, f64)> = rect.point_iter().iter().copied().collect();
        assert_eq!(got.len(), 2);
        for (g, e) in got.iter().zip(expected) {
            assert!((g.0 - e.0).abs() < 1e-9 && (g.1 - e.1).abs() < 1e-9, "{got:?} != {expected:?}");
        }
    }

    #[test]
    fn bars_pair_up_per_slot() {
        let bars = [
            BarPair { recent: 6.0, previous: 3.0 },
            BarPair { recent: 1.0, previous: 2.0 },
        ];
        let rects = bar_rectangles(&bars);
        assert_eq!(rects.len(), 4);
        assert_corners(&rects[0], [(0.15, 0.0), (0.5, 3.0)]);
        assert_corners(&rects[1], [(1.15, 0.0), (1.5, 2.0)]);
        assert_corners(&rects[2], [(0.5, 0.0), (0.85, 6.0)]);
        assert_corners(&rects[3], [(1.5, 0.0), (1.85, 1.0)]);
    }

    #[test]
    fn y_max_adds_headroom() {
        let bars = [
            BarPair { recent: 10.0, previous: 4.0 },
            BarPair { recent: 2.0, previous: 20.0 },
        ];
        assert!((bars_y_max(&bars) - 22.0).abs() < 1e-9);
        assert_eq!(bars_y_max(&[BarPair { recent: 0.0, previous: 0.0 }]), 1.0);
        assert_eq!(bars_y_max(&[]), 1.0);
    }
}
