use std::collections::BTreeSet;

use eframe::egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Ui, Vec2};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::color::{self, ColorMap};
use crate::data::analysis::{CorrelationMatrix, HistogramBin};
use crate::data::model::CellValue;

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Bar chart of labelled values, one colour per label.
///
/// Horizontal charts list the first entry at the top.
pub fn labelled_bars(
    ui: &mut Ui,
    id: &str,
    entries: &[(CellValue, f64)],
    value_axis: &str,
    horizontal: bool,
) {
    let labels: Vec<String> = entries.iter().map(|(l, _)| l.to_string()).collect();
    let unique: BTreeSet<CellValue> = entries.iter().map(|(l, _)| l.clone()).collect();
    let colors = ColorMap::new(id, &unique);

    let n = entries.len();
    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let pos = if horizontal { (n - 1 - i) as f64 } else { i as f64 };
            Bar::new(pos, *value)
                .name(label.to_string())
                .fill(colors.color_for(label))
        })
        .collect();

    let mut chart = BarChart::new(bars).width(0.7);
    if horizontal {
        chart = chart.horizontal();
    }

    let category = move |mark: GridMark, _range: &std::ops::RangeInclusive<f64>| -> String {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        let idx = idx as usize;
        let idx = if horizontal { n.checked_sub(1 + idx) } else { Some(idx) };
        idx.and_then(|i| labels.get(i)).cloned().unwrap_or_default()
    };

    let mut plot = Plot::new(id.to_string())
        .height(360.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false);
    plot = if horizontal {
        plot.y_axis_formatter(category).x_axis_label(value_axis.to_string())
    } else {
        plot.x_axis_formatter(category).y_axis_label(value_axis.to_string())
    };
    plot.show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

/// Histogram of one feature.
pub fn histogram(ui: &mut Ui, id: &str, feature: &str, bins: &[HistogramBin]) {
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                .width(b.end - b.start)
                .name(format!("{:.1}–{:.1}", b.start, b.end))
        })
        .collect();
    let chart = BarChart::new(bars).color(Color32::from_rgb(76, 114, 176));

    Plot::new(id.to_string())
        .height(180.0)
        .x_axis_label(feature.to_string())
        .y_axis_label("Frequency")
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

// ---------------------------------------------------------------------------
// Radar chart (feature profile)
// ---------------------------------------------------------------------------

/// Closed polygon of percentage features on evenly spaced spokes.
pub fn radar(ui: &mut Ui, id: &str, title: &str, profile: &[(String, f64)]) {
    if profile.is_empty() {
        ui.label("No audio features for this song.");
        return;
    }

    let n = profile.len();
    let point = |i: usize, r: f64| -> [f64; 2] {
        let angle = std::f64::consts::FRAC_PI_2 - i as f64 * std::f64::consts::TAU / n as f64;
        [r * angle.cos(), r * angle.sin()]
    };

    let mut outline: Vec<[f64; 2]> = profile
        .iter()
        .enumerate()
        .map(|(i, (_, v))| point(i, *v))
        .collect();
    outline.push(outline[0]);

    let accent = color::generate_palette(1)[0];
    Plot::new(id.to_string())
        .data_aspect(1.0)
        .height(420.0)
        .show_axes(false)
        .show_grid(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for ring in [25.0, 50.0, 75.0, 100.0] {
                let circle: PlotPoints = (0..=n).map(|i| point(i % n, ring)).collect();
                plot_ui.line(Line::new(circle).color(Color32::DARK_GRAY).width(0.5));
            }
            for (i, (feature, v)) in profile.iter().enumerate() {
                let spoke: PlotPoints = vec![[0.0, 0.0], point(i, 100.0)].into();
                plot_ui.line(Line::new(spoke).color(Color32::DARK_GRAY).width(0.5));
                plot_ui.points(
                    Points::new(vec![point(i, *v)])
                        .radius(3.0)
                        .color(accent)
                        .name(format!("{feature}: {v:.0}%")),
                );
            }
            plot_ui.line(
                Line::new(PlotPoints::from(outline))
                    .color(accent)
                    .width(2.0)
                    .name(title.to_string()),
            );
            for (i, (feature, _)) in profile.iter().enumerate() {
                let [x, y] = point(i, 112.0);
                plot_ui.text(egui_plot::Text::new([x, y].into(), feature.as_str()));
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Annotated heatmap of a correlation matrix.
pub fn heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let n = matrix.labels.len();
    if n == 0 {
        return;
    }
    let label_width = 130.0;
    let cell = ((ui.available_width() - label_width) / n as f32).clamp(36.0, 90.0);
    let size = Vec2::new(label_width + cell * n as f32, label_width + cell * n as f32);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;
    let font = FontId::proportional(11.0);

    for (row, values) in matrix.values.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            let min = Pos2::new(
                origin.x + label_width + col as f32 * cell,
                origin.y + row as f32 * cell,
            );
            let rect = Rect::from_min_size(min, Vec2::splat(cell - 1.0));
            painter.rect_filled(rect, 0.0, color::diverging(*value));
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                format!("{value:.2}"),
                font.clone(),
                Color32::WHITE,
            );
        }
    }

    for (i, label) in matrix.labels.iter().enumerate() {
        let y = origin.y + i as f32 * cell + cell / 2.0;
        painter.text(
            Pos2::new(origin.x + label_width - 6.0, y),
            Align2::RIGHT_CENTER,
            label,
            font.clone(),
            ui.visuals().text_color(),
        );
        let x = origin.x + label_width + i as f32 * cell + cell / 2.0;
        let short = label.trim_end_matches("_%");
        painter.text(
            Pos2::new(x, origin.y + n as f32 * cell + 6.0),
            Align2::CENTER_TOP,
            short,
            font.clone(),
            ui.visuals().text_color(),
        );
    }
}
