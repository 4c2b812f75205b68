use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot, PlotPoints, Points};

use crate::color::RegionColors;
use crate::data::aggregate::{MonthlySpend, RepeatCategoryCount, StatusCount};
use crate::data::region::{Region, region_label};

const CHART_HEIGHT: f32 = 240.0;

// ---------------------------------------------------------------------------
// Category axes
// ---------------------------------------------------------------------------

/// Label for a grid mark on a categorical axis; only integer marks that hit
/// a category get text.
fn category_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

fn bar_chart(ui: &mut Ui, id: &str, labels: Vec<String>, heights: Vec<f64>, color: Color32) {
    let bars: Vec<Bar> = labels
        .iter()
        .zip(&heights)
        .enumerate()
        .map(|(i, (label, h))| Bar::new(i as f64, *h).name(label).width(0.6))
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&labels, mark.value)
        })
        .y_axis_label("Jumlah")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color));
        });
}

// ---------------------------------------------------------------------------
// Status and repeat-order bar charts
// ---------------------------------------------------------------------------

/// Orders per status, most frequent first.
pub fn status_chart(ui: &mut Ui, counts: &[StatusCount]) {
    if counts.is_empty() {
        super::placeholder(ui);
        return;
    }
    let labels = counts.iter().map(|c| c.status.to_string()).collect();
    let heights = counts.iter().map(|c| c.count as f64).collect();
    bar_chart(ui, "status_chart", labels, heights, Color32::from_rgb(100, 149, 237));
}

/// Customers per repeat-order bucket, in bucket order.
pub fn repeat_chart(ui: &mut Ui, counts: &[RepeatCategoryCount]) {
    if counts.is_empty() {
        super::placeholder(ui);
        return;
    }
    let labels = counts.iter().map(|c| c.category.to_string()).collect();
    let heights = counts.iter().map(|c| c.count as f64).collect();
    bar_chart(ui, "repeat_chart", labels, heights, Color32::from_rgb(255, 160, 122));
}

// ---------------------------------------------------------------------------
// Monthly spend scatter
// ---------------------------------------------------------------------------

/// Months since year 0, used as the scatter x coordinate.
fn month_index(month: NaiveDate) -> f64 {
    (month.year() as f64) * 12.0 + month.month0() as f64
}

fn month_label(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 {
        return String::new();
    }
    let idx = rounded as i64;
    format!("{}-{:02}", idx.div_euclid(12), idx.rem_euclid(12) + 1)
}

/// Spend per customer per month, one colour per region.
pub fn monthly_scatter(ui: &mut Ui, rows: &[MonthlySpend], colors: Option<&RegionColors>) {
    if rows.is_empty() {
        super::placeholder(ui);
        return;
    }

    // rows are sorted by month first, so group per region here.
    let mut series: std::collections::BTreeMap<Region, Vec<[f64; 2]>> = Default::default();
    for r in rows {
        series
            .entry(r.region)
            .or_default()
            .push([month_index(r.month), r.total_spend]);
    }

    Plot::new("monthly_scatter")
        .height(CHART_HEIGHT * 1.5)
        .legend(Legend::default())
        .x_axis_label("Bulan Order")
        .y_axis_label("Total Belanja per Customer")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| month_label(mark.value))
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for (region, points) in series {
                let color = colors
                    .map(|c| c.color_for(region))
                    .unwrap_or(Color32::LIGHT_BLUE)
                    .gamma_multiply(0.7);
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(region_label(region))
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}
