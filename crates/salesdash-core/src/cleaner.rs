//! Null handling and total recomputation for the joined dataset.

use std::fmt::{Display, Formatter};

use salesdash_warehouse::{RawDataset, RawSale};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dataset::{parse_sale_datetime, CleanDataset, CleanSale};

/// Category assigned to rows without one.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Product name assigned to sales whose product is not in the catalog.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// How the discount column is applied when recomputing line totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountModel {
    /// Discount is a currency amount taken off each unit: `qty * (price - discount)`.
    #[default]
    Flat,
    /// Discount is a fraction of the unit price: `qty * price * (1 - discount)`.
    Percentage,
}

impl DiscountModel {
    pub fn line_total(self, quantity: i64, unit_price: f64, discount: f64) -> f64 {
        let quantity = quantity as f64;
        match self {
            Self::Flat => quantity * (unit_price - discount),
            Self::Percentage => quantity * unit_price * (1.0 - discount),
        }
    }
}

impl Display for DiscountModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => f.write_str("flat"),
            Self::Percentage => f.write_str("percentage"),
        }
    }
}

/// Clean one joined row.
pub fn clean_sale(row: &RawSale, model: DiscountModel) -> CleanSale {
    let quantity = row.quantity.unwrap_or(0);
    let discount = row.discount.unwrap_or(0.0);
    let unit_price = row.unit_price.unwrap_or(0.0);
    let category = row
        .category
        .clone()
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let product_name = row
        .product_name
        .clone()
        .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string());

    let sold_at = row.sold_on.as_deref().and_then(|text| {
        let parsed = parse_sale_datetime(text);
        if parsed.is_none() {
            warn!(sale_id = row.sale_id, date = text, "unparseable sale date");
        }
        parsed
    });

    CleanSale {
        sale_id: row.sale_id,
        sold_at,
        product_name,
        category,
        quantity,
        unit_price,
        discount,
        total: model.line_total(quantity, unit_price, discount),
    }
}

/// Clean every row, keeping row count and order.
pub fn clean(raw: &RawDataset, model: DiscountModel) -> CleanDataset {
    let rows: Vec<CleanSale> = raw.iter().map(|row| clean_sale(row, model)).collect();
    debug!(rows = rows.len(), %model, "dataset cleaned");
    CleanDataset::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn raw(sale_id: i64, quantity: i64, unit_price: Option<f64>, discount: Option<f64>) -> RawSale {
        RawSale {
            sale_id,
            sold_on: Some(String::from("2025-10-01")),
            product_name: Some(String::from("Teclado")),
            category: Some(String::from("Acessórios")),
            quantity: Some(quantity),
            unit_price,
            discount,
            total: None,
        }
    }

    #[test]
    fn null_discount_becomes_zero_and_total_is_recomputed() {
        let sale = clean_sale(&raw(1, 2, Some(10.0), None), DiscountModel::Flat);

        assert_eq!(sale.discount, 0.0);
        assert_eq!(sale.total, 20.0);
        assert_eq!(sale.sold_at, Some(datetime!(2025-10-01 00:00:00)));
    }

    #[test]
    fn unknown_product_gets_defaults_and_contributes_nothing() {
        let mut row = raw(8, 5, None, None);
        row.product_name = None;
        row.category = None;

        let sale = clean_sale(&row, DiscountModel::Flat);

        assert_eq!(sale.product_name, UNKNOWN_PRODUCT);
        assert_eq!(sale.category, DEFAULT_CATEGORY);
        assert_eq!(sale.unit_price, 0.0);
        assert_eq!(sale.total, 0.0);
    }

    #[test]
    fn missing_quantity_counts_as_zero_units() {
        let mut row = raw(5, 0, Some(80.0), Some(5.0));
        row.quantity = None;

        let sale = clean_sale(&row, DiscountModel::Flat);

        assert_eq!(sale.quantity, 0);
        assert_eq!(sale.total, 0.0);
        assert_eq!(sale.product_name, "Teclado");
    }

    #[test]
    fn flat_discount_is_subtracted_per_unit() {
        let sale = clean_sale(&raw(1, 3, Some(150.0), Some(15.0)), DiscountModel::Flat);
        assert_eq!(sale.total, 405.0);
    }

    #[test]
    fn percentage_discount_matches_join_formula() {
        let sale = clean_sale(&raw(1, 4, Some(100.0), Some(0.25)), DiscountModel::Percentage);
        assert_eq!(sale.total, 300.0);
    }

    #[test]
    fn unparseable_date_is_kept_as_missing() {
        let mut row = raw(1, 1, Some(10.0), Some(0.0));
        row.sold_on = Some(String::from("not a date"));

        assert_eq!(clean_sale(&row, DiscountModel::Flat).sold_at, None);
    }

    #[test]
    fn cleaning_preserves_order_and_length() {
        let dataset = RawDataset::new(vec![
            raw(3, 1, Some(1.0), None),
            raw(1, 1, None, None),
            raw(2, 1, Some(2.0), Some(0.5)),
        ]);

        let cleaned = clean(&dataset, DiscountModel::Flat);
        let ids: Vec<i64> = cleaned.iter().map(|row| row.sale_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn cleaning_is_a_fixed_point() {
        let mut orphan = raw(2, 5, None, None);
        orphan.product_name = None;
        orphan.category = None;
        let dataset = RawDataset::new(vec![raw(1, 2, Some(10.0), None), orphan]);

        for model in [DiscountModel::Flat, DiscountModel::Percentage] {
            let once = clean(&dataset, model);
            let twice = clean(&once.to_raw(), model);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn cleaned_dataset_reports_no_nulls() {
        let mut orphan = raw(2, 5, None, None);
        orphan.product_name = None;
        orphan.category = None;
        let cleaned = clean(&RawDataset::new(vec![orphan]), DiscountModel::Flat);

        assert!(cleaned.null_counts().iter().all(|count| count.nulls == 0));
    }
}
