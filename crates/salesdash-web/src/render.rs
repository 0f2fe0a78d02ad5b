//! Server-side HTML for the dashboard page.
//!
//! The page is a minijinja template with HTML auto-escaping; this module only
//! flattens a [`RenderOutput`] into the view the template walks.

use minijinja::Environment;
use salesdash_core::{
    format_date, format_sale_datetime, CleanDataset, ColumnNullCount, DashboardReport, Notice,
    NoticeLevel, RawDataset, RenderOutput, SALES_COLUMNS,
};
use serde::Serialize;

use crate::charts::{daily_revenue_chart, revenue_by_category_chart};

const PAGE_TITLE: &str = "Sales Analysis: SQL Practical Challenge";

/// Template name; the `.html` suffix switches on HTML auto-escaping.
const PAGE_TEMPLATE_NAME: &str = "dashboard.html";
const PAGE_TEMPLATE: &str = include_str!("../templates/dashboard.html");

/// Format an amount as Brazilian reais with comma thousands separators, e.g.
/// `R$ 17,255.00`. Non-finite amounts render as `R$ --`.
pub fn format_brl(value: f64) -> String {
    if !value.is_finite() {
        return String::from("R$ --");
    }
    let fixed = format!("{:.2}", value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("R$ {sign}{grouped}.{fraction}")
}

/// One table cell. `None` renders as the null marker.
#[derive(Debug, Serialize)]
struct Cell {
    value: Option<String>,
    numeric: bool,
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            numeric: false,
        }
    }

    fn number(value: impl ToString) -> Self {
        Self {
            value: Some(value.to_string()),
            numeric: true,
        }
    }

    fn optional_text(value: Option<&str>) -> Self {
        Self {
            value: value.map(str::to_string),
            numeric: false,
        }
    }

    fn optional_number(value: Option<i64>) -> Self {
        Self {
            value: value.map(|value| value.to_string()),
            numeric: true,
        }
    }

    fn optional_amount(value: Option<f64>) -> Self {
        Self {
            value: value.map(|value| format!("{value:.2}")),
            numeric: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct TableView {
    headers: Vec<&'static str>,
    rows: Vec<Vec<Cell>>,
}

impl TableView {
    fn raw(dataset: &RawDataset) -> Self {
        Self {
            headers: SALES_COLUMNS.to_vec(),
            rows: dataset
                .iter()
                .map(|row| {
                    vec![
                        Cell::number(row.sale_id),
                        Cell::optional_text(row.sold_on.as_deref()),
                        Cell::optional_text(row.product_name.as_deref()),
                        Cell::optional_text(row.category.as_deref()),
                        Cell::optional_number(row.quantity),
                        Cell::optional_amount(row.unit_price),
                        Cell::optional_amount(row.discount),
                        Cell::optional_amount(row.total),
                    ]
                })
                .collect(),
        }
    }

    fn cleaned(dataset: &CleanDataset) -> Self {
        Self {
            headers: SALES_COLUMNS.to_vec(),
            rows: dataset
                .iter()
                .map(|row| {
                    let sold_at = row.sold_at.map(format_sale_datetime);
                    vec![
                        Cell::number(row.sale_id),
                        Cell::optional_text(sold_at.as_deref()),
                        Cell::text(row.product_name.as_str()),
                        Cell::text(row.category.as_str()),
                        Cell::number(row.quantity),
                        Cell::optional_amount(Some(row.unit_price)),
                        Cell::optional_amount(Some(row.discount)),
                        Cell::optional_amount(Some(row.total)),
                    ]
                })
                .collect(),
        }
    }

    fn null_counts(counts: &[ColumnNullCount]) -> Self {
        Self {
            headers: vec!["column", "nulls"],
            rows: counts
                .iter()
                .map(|count| vec![Cell::text(count.column.as_str()), Cell::number(count.nulls)])
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct NoticeView<'a> {
    level: &'static str,
    message: &'a str,
}

impl<'a> From<&'a Notice> for NoticeView<'a> {
    fn from(notice: &'a Notice) -> Self {
        let level = match notice.level {
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        Self {
            level,
            message: &notice.message,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReportView<'a> {
    script: &'a str,
    discount_model: String,
    raw: TableView,
    raw_nulls: TableView,
    cleaned: TableView,
    clean_nulls: TableView,
    total_revenue: String,
    total_units: i64,
    top_products: TableView,
    top_days: TableView,
    /// Pre-rendered SVG, inserted unescaped.
    category_chart: String,
    daily_chart: String,
}

impl<'a> From<&'a DashboardReport> for ReportView<'a> {
    fn from(report: &'a DashboardReport) -> Self {
        let metrics = &report.metrics;
        Self {
            script: &report.script,
            discount_model: report.discount_model.to_string(),
            raw: TableView::raw(&report.raw),
            raw_nulls: TableView::null_counts(&report.raw_null_counts),
            cleaned: TableView::cleaned(&report.cleaned),
            clean_nulls: TableView::null_counts(&report.clean_null_counts),
            total_revenue: format_brl(metrics.total_revenue),
            total_units: metrics.total_units,
            top_products: TableView {
                headers: vec!["Product", "Quantity"],
                rows: metrics
                    .top_products
                    .iter()
                    .map(|row| {
                        vec![Cell::text(row.product_name.as_str()), Cell::number(row.quantity)]
                    })
                    .collect(),
            },
            top_days: TableView {
                headers: vec!["Date", "Revenue"],
                rows: metrics
                    .top_days
                    .iter()
                    .map(|row| {
                        vec![Cell::text(format_date(row.date)), Cell::number(format_brl(row.revenue))]
                    })
                    .collect(),
            },
            category_chart: revenue_by_category_chart(&metrics.revenue_by_category),
            daily_chart: daily_revenue_chart(&metrics.daily_revenue),
        }
    }
}

#[derive(Debug, Serialize)]
struct PageView<'a> {
    title: &'static str,
    notices: Vec<NoticeView<'a>>,
    report: Option<ReportView<'a>>,
}

fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(PAGE_TEMPLATE_NAME, PAGE_TEMPLATE)?;
    Ok(env)
}

/// Render one pipeline run as a complete HTML document.
///
/// A halted run shows its notices and nothing else.
///
/// # Errors
/// Returns the template error if the page cannot be rendered.
pub fn render_page(output: &RenderOutput) -> Result<String, minijinja::Error> {
    let view = PageView {
        title: PAGE_TITLE,
        notices: output.notices.iter().map(NoticeView::from).collect(),
        report: output.report.as_ref().map(ReportView::from),
    };
    let env = environment()?;
    let template = env.get_template(PAGE_TEMPLATE_NAME)?;
    template.render(&view)
}
