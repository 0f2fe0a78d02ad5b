//! Business metrics over the cleaned dataset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;
use tracing::debug;

use crate::dataset::CleanDataset;

/// Row limit of the ranked tables.
pub const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUnits {
    pub product_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRevenue {
    #[serde(with = "crate::dataset::serde_date")]
    pub date: Date,
    pub revenue: f64,
}

/// Aggregates shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesMetrics {
    pub total_revenue: f64,
    pub total_units: i64,
    /// Descending by revenue.
    pub revenue_by_category: Vec<CategoryRevenue>,
    /// Top [`TOP_N`] products, descending by units sold.
    pub top_products: Vec<ProductUnits>,
    /// Ascending by date; one entry per distinct sale date.
    pub daily_revenue: Vec<DailyRevenue>,
    /// Top [`TOP_N`] days, descending by revenue.
    pub top_days: Vec<DailyRevenue>,
}

/// Compute every dashboard aggregate. Empty input yields zeros and empty tables.
///
/// Groups are formed in key order and then stable-sorted, so ties keep key order.
pub fn compute_metrics(dataset: &CleanDataset) -> SalesMetrics {
    let total_revenue: f64 = dataset.iter().map(|row| row.total).sum();
    let total_units: i64 = dataset.iter().map(|row| row.quantity).sum();

    let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
    let mut by_product: BTreeMap<&str, i64> = BTreeMap::new();
    let mut by_day: BTreeMap<Date, f64> = BTreeMap::new();
    for row in dataset {
        *by_category.entry(row.category.as_str()).or_default() += row.total;
        *by_product.entry(row.product_name.as_str()).or_default() += row.quantity;
        if let Some(date) = row.sold_on() {
            *by_day.entry(date).or_default() += row.total;
        }
    }

    let mut revenue_by_category: Vec<CategoryRevenue> = by_category
        .into_iter()
        .map(|(category, revenue)| CategoryRevenue {
            category: category.to_string(),
            revenue,
        })
        .collect();
    revenue_by_category.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));

    let mut top_products: Vec<ProductUnits> = by_product
        .into_iter()
        .map(|(product_name, quantity)| ProductUnits {
            product_name: product_name.to_string(),
            quantity,
        })
        .collect();
    top_products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    top_products.truncate(TOP_N);

    let daily_revenue: Vec<DailyRevenue> = by_day
        .into_iter()
        .map(|(date, revenue)| DailyRevenue { date, revenue })
        .collect();

    let mut top_days = daily_revenue.clone();
    top_days.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    top_days.truncate(TOP_N);

    debug!(
        rows = dataset.len(),
        categories = revenue_by_category.len(),
        days = daily_revenue.len(),
        "metrics computed"
    );

    SalesMetrics {
        total_revenue,
        total_units,
        revenue_by_category,
        top_products,
        daily_revenue,
        top_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::CleanSale;
    use time::macros::{date, datetime};
    use time::PrimitiveDateTime;

    fn sale(
        sale_id: i64,
        sold_at: PrimitiveDateTime,
        product: &str,
        category: &str,
        quantity: i64,
        total: f64,
    ) -> CleanSale {
        CleanSale {
            sale_id,
            sold_at: Some(sold_at),
            product_name: product.to_string(),
            category: category.to_string(),
            quantity,
            unit_price: 0.0,
            discount: 0.0,
            total,
        }
    }

    #[test]
    fn empty_dataset_yields_zero_metrics() {
        let metrics = compute_metrics(&CleanDataset::default());
        assert_eq!(metrics, SalesMetrics::default());
    }

    #[test]
    fn totals_and_groups_are_summed() {
        let dataset = CleanDataset::new(vec![
            sale(1, datetime!(2025-10-01 09:00), "Mouse", "Acessórios", 3, 240.0),
            sale(2, datetime!(2025-10-01 17:30), "Notebook", "Informática", 1, 3400.0),
            sale(3, datetime!(2025-10-02 10:00), "Mouse", "Acessórios", 1, 70.0),
        ]);

        let metrics = compute_metrics(&dataset);

        assert_eq!(metrics.total_revenue, 3710.0);
        assert_eq!(metrics.total_units, 5);
        assert_eq!(
            metrics.revenue_by_category,
            vec![
                CategoryRevenue {
                    category: String::from("Informática"),
                    revenue: 3400.0
                },
                CategoryRevenue {
                    category: String::from("Acessórios"),
                    revenue: 310.0
                },
            ]
        );
        assert_eq!(
            metrics.top_products[0],
            ProductUnits {
                product_name: String::from("Mouse"),
                quantity: 4
            }
        );
        assert_eq!(
            metrics.daily_revenue,
            vec![
                DailyRevenue {
                    date: date!(2025-10-01),
                    revenue: 3640.0
                },
                DailyRevenue {
                    date: date!(2025-10-02),
                    revenue: 70.0
                },
            ]
        );
    }

    #[test]
    fn ranked_tables_are_capped_at_five() {
        let rows = (1..=8)
            .map(|day| {
                sale(
                    i64::from(day),
                    PrimitiveDateTime::new(
                        Date::from_calendar_date(2025, time::Month::October, day)
                            .expect("valid date"),
                        time::Time::MIDNIGHT,
                    ),
                    &format!("Product {day}"),
                    "Cat",
                    i64::from(day),
                    f64::from(day) * 10.0,
                )
            })
            .collect();

        let metrics = compute_metrics(&CleanDataset::new(rows));

        assert_eq!(metrics.top_products.len(), TOP_N);
        assert_eq!(metrics.top_products[0].product_name, "Product 8");
        assert_eq!(metrics.top_days.len(), TOP_N);
        assert_eq!(metrics.top_days[0].date, date!(2025-10-08));
        assert_eq!(metrics.daily_revenue.len(), 8);
    }

    #[test]
    fn ties_keep_key_order() {
        let dataset = CleanDataset::new(vec![
            sale(1, datetime!(2025-10-02 00:00), "B", "Cat", 2, 10.0),
            sale(2, datetime!(2025-10-01 00:00), "A", "Cat", 2, 10.0),
        ]);

        let metrics = compute_metrics(&dataset);

        let products: Vec<&str> = metrics
            .top_products
            .iter()
            .map(|row| row.product_name.as_str())
            .collect();
        assert_eq!(products, vec!["A", "B"]);
        assert_eq!(metrics.top_days[0].date, date!(2025-10-01));
    }

    #[test]
    fn undated_rows_count_toward_totals_but_not_days() {
        let mut undated = sale(2, datetime!(2025-10-01 00:00), "A", "Cat", 1, 5.0);
        undated.sold_at = None;
        let dataset = CleanDataset::new(vec![
            sale(1, datetime!(2025-10-01 00:00), "A", "Cat", 1, 10.0),
            undated,
        ]);

        let metrics = compute_metrics(&dataset);

        assert_eq!(metrics.total_revenue, 15.0);
        assert_eq!(metrics.daily_revenue.len(), 1);
        assert_eq!(metrics.daily_revenue[0].revenue, 10.0);
    }

    #[test]
    fn daily_dates_serialize_as_iso_dates() {
        let day = DailyRevenue {
            date: date!(2025-10-07),
            revenue: 1.5,
        };
        let json = serde_json::to_value(&day).expect("serialize");
        assert_eq!(json["date"], "2025-10-07");
    }
}
