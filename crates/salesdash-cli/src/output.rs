use std::io::Write;

use salesdash_core::{format_date, DashboardReport, Notice, NoticeLevel, RenderOutput};
use salesdash_web::format_brl;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render<W: Write>(
    out: &mut W,
    output: &RenderOutput,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(output)?
            } else {
                serde_json::to_string(output)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => {
            write_notices(out, &output.notices)?;
            if let Some(report) = &output.report {
                render_table(out, report)?;
            }
        }
    }

    Ok(())
}

pub fn write_notices<W: Write>(out: &mut W, notices: &[Notice]) -> Result<(), CliError> {
    for notice in notices {
        let tag = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        writeln!(out, "[{tag}] {}", notice.message)?;
    }
    Ok(())
}

fn render_table<W: Write>(out: &mut W, report: &DashboardReport) -> Result<(), CliError> {
    let metrics = &report.metrics;

    writeln!(out)?;
    writeln!(out, "rows          : {}", report.cleaned.len())?;
    writeln!(out, "discount      : {}", report.discount_model)?;
    writeln!(out, "total revenue : {}", format_brl(metrics.total_revenue))?;
    writeln!(out, "units sold    : {}", metrics.total_units)?;

    writeln!(out, "\nrevenue by category:")?;
    write_rows(
        out,
        &["category", "revenue"],
        metrics
            .revenue_by_category
            .iter()
            .map(|row| vec![row.category.clone(), format_brl(row.revenue)]),
    )?;

    writeln!(out, "\nbest-selling products (top 5):")?;
    write_rows(
        out,
        &["product", "quantity"],
        metrics
            .top_products
            .iter()
            .map(|row| vec![row.product_name.clone(), row.quantity.to_string()]),
    )?;

    writeln!(out, "\nhighest revenue days (top 5):")?;
    write_rows(
        out,
        &["date", "revenue"],
        metrics
            .top_days
            .iter()
            .map(|row| vec![format_date(row.date), format_brl(row.revenue)]),
    )?;

    writeln!(out, "\ndaily revenue:")?;
    write_rows(
        out,
        &["date", "revenue"],
        metrics
            .daily_revenue
            .iter()
            .map(|row| vec![format_date(row.date), format_brl(row.revenue)]),
    )?;

    Ok(())
}

/// Left-aligned columns padded to the widest cell, indented by two spaces.
fn write_rows<W: Write>(
    out: &mut W,
    headers: &[&str],
    rows: impl IntoIterator<Item = Vec<String>>,
) -> Result<(), CliError> {
    let rows: Vec<Vec<String>> = rows.into_iter().collect();
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    writeln!(out, "{}", padded_line(headers, &widths))?;
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        writeln!(out, "{}", padded_line(&cells, &widths))?;
    }
    Ok(())
}

fn padded_line(cells: &[&str], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    format!("  {}", padded.join("  ").trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesdash_core::{analyze, DiscountModel, RawDataset, RawSale};

    fn output() -> RenderOutput {
        let raw = RawDataset::new(vec![
            RawSale {
                sale_id: 1,
                sold_on: Some(String::from("2025-10-01")),
                product_name: Some(String::from("Notebook")),
                category: Some(String::from("Informática")),
                quantity: Some(1),
                unit_price: Some(3500.0),
                discount: Some(100.0),
                total: None,
            },
            RawSale {
                sale_id: 2,
                sold_on: Some(String::from("2025-10-02")),
                product_name: Some(String::from("Mouse")),
                category: None,
                quantity: Some(3),
                unit_price: Some(80.0),
                discount: None,
                total: None,
            },
        ]);
        RenderOutput {
            notices: vec![Notice::success("Analysis completed successfully!")],
            report: Some(analyze(String::new(), raw, DiscountModel::Flat)),
        }
    }

    fn rendered(format: OutputFormat, pretty: bool) -> String {
        let mut buffer = Vec::new();
        render(&mut buffer, &output(), format, pretty).expect("render");
        String::from_utf8(buffer).expect("utf-8")
    }

    #[test]
    fn table_lists_headline_metrics_and_rankings() {
        let text = rendered(OutputFormat::Table, false);

        assert!(text.starts_with("[ok] Analysis completed successfully!"));
        assert!(text.contains("total revenue : R$ 3,640.00"));
        assert!(text.contains("units sold    : 4"));
        assert!(text.contains("  Informática  R$ 3,400.00"));
        assert!(text.contains("  Other        R$ 240.00"));
        assert!(text.contains("  2025-10-01  R$ 3,400.00"));
    }

    #[test]
    fn json_is_a_single_line_unless_pretty() {
        let compact = rendered(OutputFormat::Json, false);
        let pretty = rendered(OutputFormat::Json, true);

        assert_eq!(compact.lines().count(), 1);
        assert!(pretty.lines().count() > 1);
        let value: serde_json::Value = serde_json::from_str(&compact).expect("json");
        assert_eq!(value["report"]["metrics"]["total_units"], 4);
    }

    #[test]
    fn columns_align_to_widest_cell() {
        let mut buffer = Vec::new();
        write_rows(
            &mut buffer,
            &["a", "b"],
            vec![vec![String::from("long cell"), String::from("1")]],
        )
        .expect("write");

        let text = String::from_utf8(buffer).expect("utf-8");
        assert_eq!(text, "  a          b\n  long cell  1\n");
    }
}
