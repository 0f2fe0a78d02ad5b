//! Inline SVG charts for the dashboard page.
//!
//! Both charts share one canvas size and a linear value axis that always includes
//! zero, so a negative revenue (possible with flat discounts larger than the price)
//! draws below the baseline instead of off the canvas.

use salesdash_core::{format_date, CategoryRevenue, DailyRevenue};
use time::Date;

use crate::render::format_brl;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 84.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 72.0;
const Y_TICKS: usize = 5;
/// Upper bound on x-axis date labels before they start overlapping.
const MAX_DATE_LABELS: usize = 10;

const PALETTE: [&str; 8] = [
    "#4c78a8", "#f58518", "#54a24b", "#e45756", "#72b7b2", "#eeca3b", "#b279a2", "#9d755d",
];

const LINE_COLOR: &str = "#4c78a8";

/// Escape text for SVG element content and attribute values.
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn plot_width() -> f64 {
    WIDTH - MARGIN_LEFT - MARGIN_RIGHT
}

fn plot_bottom() -> f64 {
    HEIGHT - MARGIN_BOTTOM
}

/// Linear map from revenue values onto the vertical pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ValueScale {
    low: f64,
    high: f64,
}

impl ValueScale {
    fn spanning(values: impl IntoIterator<Item = f64>) -> Self {
        let (mut low, mut high) = (0.0_f64, 0.0_f64);
        for value in values.into_iter().filter(|value| value.is_finite()) {
            low = low.min(value);
            high = high.max(value);
        }
        if high - low < f64::EPSILON {
            high = low + 1.0;
        }
        Self { low, high }
    }

    fn y(&self, value: f64) -> f64 {
        let value = if value.is_finite() { value } else { 0.0 };
        let plot_height = plot_bottom() - MARGIN_TOP;
        MARGIN_TOP + plot_height * (self.high - value) / (self.high - self.low)
    }

    fn ticks(&self) -> impl Iterator<Item = f64> + '_ {
        (0..=Y_TICKS)
            .map(move |step| self.low + (self.high - self.low) * step as f64 / Y_TICKS as f64)
    }
}

fn open_svg(title: &str, y_label: &str) -> String {
    let title = escape_xml(title);
    let y_label = escape_xml(y_label);
    let label_y = (MARGIN_TOP + plot_bottom()) / 2.0;
    format!(
        r#"<svg class="chart" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="{title}"><text class="chart-title" x="{x}" y="24" text-anchor="middle">{title}</text><text class="axis-label" transform="translate(16 {label_y:.1}) rotate(-90)" text-anchor="middle">{y_label}</text>"#,
        x = WIDTH / 2.0,
    )
}

fn empty_chart(title: &str) -> String {
    let mut svg = open_svg(title, "");
    svg.push_str(&format!(
        r#"<text class="empty" x="{x}" y="{y}" text-anchor="middle">No data</text></svg>"#,
        x = WIDTH / 2.0,
        y = HEIGHT / 2.0,
    ));
    svg
}

fn push_value_axis(svg: &mut String, scale: &ValueScale) {
    for tick in scale.ticks() {
        let y = scale.y(tick);
        svg.push_str(&format!(
            r#"<line class="grid" x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{x2}" y2="{y:.1}"/><text class="tick" x="{tx}" y="{ty:.1}" text-anchor="end">{tick:.0}</text>"#,
            x2 = WIDTH - MARGIN_RIGHT,
            tx = MARGIN_LEFT - 8.0,
            ty = y + 4.0,
        ));
    }
    let baseline = scale.y(0.0);
    svg.push_str(&format!(
        r#"<line class="axis" x1="{MARGIN_LEFT}" y1="{baseline:.1}" x2="{x2}" y2="{baseline:.1}"/>"#,
        x2 = WIDTH - MARGIN_RIGHT,
    ));
}

/// Bar chart of revenue per category, one color per bar.
pub fn revenue_by_category_chart(rows: &[CategoryRevenue]) -> String {
    const TITLE: &str = "Revenue by category";
    if rows.is_empty() {
        return empty_chart(TITLE);
    }

    let scale = ValueScale::spanning(rows.iter().map(|row| row.revenue));
    let mut svg = open_svg(TITLE, "Revenue (R$)");
    push_value_axis(&mut svg, &scale);

    let slot = plot_width() / rows.len() as f64;
    let bar_width = slot * 0.7;
    let baseline = scale.y(0.0);
    for (index, row) in rows.iter().enumerate() {
        let x = MARGIN_LEFT + slot * index as f64 + (slot - bar_width) / 2.0;
        let top = scale.y(row.revenue);
        let (y, height) = if top <= baseline {
            (top, baseline - top)
        } else {
            (baseline, top - baseline)
        };
        let color = PALETTE[index % PALETTE.len()];
        let category = escape_xml(&row.category);
        svg.push_str(&format!(
            r#"<rect class="bar" x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{height:.1}" fill="{color}"><title>{category}: {value}</title></rect><text class="tick" x="{cx:.1}" y="{ly:.1}" text-anchor="middle">{category}</text>"#,
            value = format_brl(row.revenue),
            cx = x + bar_width / 2.0,
            ly = plot_bottom() + 18.0,
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Line chart of revenue per day with a marker on every point.
pub fn daily_revenue_chart(rows: &[DailyRevenue]) -> String {
    const TITLE: &str = "Revenue over time";
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return empty_chart(TITLE);
    };

    let scale = ValueScale::spanning(rows.iter().map(|row| row.revenue));
    let mut svg = open_svg(TITLE, "Revenue (R$)");
    push_value_axis(&mut svg, &scale);

    let start = first.date.to_julian_day();
    let span = (last.date.to_julian_day() - start).max(1) as f64;
    let single = rows.len() == 1;
    let x_of = |date: Date| {
        if single {
            MARGIN_LEFT + plot_width() / 2.0
        } else {
            MARGIN_LEFT + plot_width() * f64::from(date.to_julian_day() - start) / span
        }
    };

    let points: Vec<String> = rows
        .iter()
        .map(|row| format!("{:.1},{:.1}", x_of(row.date), scale.y(row.revenue)))
        .collect();
    svg.push_str(&format!(
        r#"<polyline class="line" fill="none" stroke="{LINE_COLOR}" stroke-width="2" points="{}"/>"#,
        points.join(" ")
    ));

    let label_every = rows.len().div_ceil(MAX_DATE_LABELS).max(1);
    for (index, row) in rows.iter().enumerate() {
        let x = x_of(row.date);
        let y = scale.y(row.revenue);
        let date = format_date(row.date);
        svg.push_str(&format!(
            r#"<circle class="marker" cx="{x:.1}" cy="{y:.1}" r="4" fill="{LINE_COLOR}"><title>{date}: {value}</title></circle>"#,
            value = format_brl(row.revenue),
        ));
        if index % label_every == 0 {
            let ly = plot_bottom() + 16.0;
            svg.push_str(&format!(
                r#"<text class="tick" x="{x:.1}" y="{ly:.1}" text-anchor="end" transform="rotate(-35 {x:.1} {ly:.1})">{date}</text>"#
            ));
        }
    }

    svg.push_str("</svg>");
    svg
}
