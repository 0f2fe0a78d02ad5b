//! Invariants of the cleaner and metrics calculator
//!
//! Each property is checked against the bundled sample dataset and against
//! generated datasets with every mix of null product, price, discount, category
//! and quantity values.

use std::collections::BTreeSet;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use salesdash_core::{
    analyze, clean, compute_metrics, DiscountModel, RawDataset, RawSale, SalesStore,
    SALES_JOIN_QUERY, TOP_N,
};

const SAMPLE_SCRIPT: &str = include_str!("../fixtures/vendas.sql");

static CATEGORIES: [&str; 3] = ["Informática", "Acessórios", "Telefonia"];
static PRODUCTS: [&str; 7] = [
    "Notebook", "Mouse", "Teclado", "Smartphone", "Monitor", "Cabo", "Hub",
];

fn sample_dataset() -> RawDataset {
    let store = SalesStore::build(Some(SAMPLE_SCRIPT))
        .expect("sample script executes")
        .expect("store exists");
    store.load(SALES_JOIN_QUERY).expect("join loads")
}

/// Sale dates in October 2025, sometimes missing or unparseable.
fn sale_date() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        8 => (1_u8..=28).prop_map(|day| Some(format!("2025-10-{day:02}"))),
        1 => Just(None),
        1 => Just(Some(String::from("not a date"))),
    ]
}

/// One joined row; `sale_id` is assigned by [`raw_dataset`].
fn raw_sale() -> impl Strategy<Value = RawSale> {
    (
        sale_date(),
        prop::option::weighted(0.85, prop::sample::select(&PRODUCTS[..])),
        prop::option::weighted(0.8, prop::sample::select(&CATEGORIES[..])),
        prop::option::weighted(0.95, 1_i64..=10),
        prop::option::weighted(0.7, 0_u32..=500_000),
        prop::option::of(0_u32..=4_000),
    )
        .prop_map(
            |(sold_on, product, category, quantity, price_cents, discount_cents)| RawSale {
                sale_id: 0,
                sold_on,
                product_name: product.map(str::to_string),
                category: category.map(str::to_string),
                quantity,
                unit_price: price_cents.map(|cents| f64::from(cents) / 100.0),
                discount: discount_cents.map(|cents| f64::from(cents) / 100.0),
                total: None,
            },
        )
}

fn raw_dataset() -> impl Strategy<Value = RawDataset> {
    prop::collection::vec(raw_sale(), 0..40).prop_map(|mut rows| {
        for (index, row) in rows.iter_mut().enumerate() {
            row.sale_id = index as i64 + 1;
        }
        RawDataset::new(rows)
    })
}

fn discount_model() -> impl Strategy<Value = DiscountModel> {
    prop_oneof![Just(DiscountModel::Flat), Just(DiscountModel::Percentage)]
}

fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() <= 1e-6 * left.abs().max(right.abs()).max(1.0)
}

fn check_cleaning_fills_nulls(
    raw: &RawDataset,
    model: DiscountModel,
) -> Result<(), TestCaseError> {
    let cleaned = clean(raw, model);

    prop_assert_eq!(cleaned.len(), raw.len());
    for (before, after) in raw.iter().zip(cleaned.iter()) {
        prop_assert_eq!(before.sale_id, after.sale_id, "row order must be kept");
        prop_assert!(!after.product_name.is_empty());
        prop_assert!(!after.category.is_empty());
        prop_assert!(after.unit_price.is_finite());
        prop_assert!(after.discount.is_finite());
        prop_assert_eq!(after.quantity, before.quantity.unwrap_or(0));
    }
    let missing_dates = cleaned.iter().filter(|row| row.sold_at.is_none()).count();
    for count in cleaned.null_counts() {
        let expected = if count.column == "data_venda" { missing_dates } else { 0 };
        prop_assert_eq!(count.nulls, expected, "column {}", count.column);
    }
    Ok(())
}

fn check_revenue_sums_flat_lines(raw: &RawDataset) -> Result<(), TestCaseError> {
    let cleaned = clean(raw, DiscountModel::Flat);
    let expected: f64 = cleaned
        .iter()
        .map(|row| row.quantity as f64 * (row.unit_price - row.discount))
        .sum();

    prop_assert!(approx_eq(compute_metrics(&cleaned).total_revenue, expected));
    Ok(())
}

fn check_category_partition(
    raw: &RawDataset,
    model: DiscountModel,
) -> Result<(), TestCaseError> {
    let metrics = compute_metrics(&clean(raw, model));
    let partitioned: f64 = metrics
        .revenue_by_category
        .iter()
        .map(|row| row.revenue)
        .sum();

    prop_assert!(approx_eq(partitioned, metrics.total_revenue));
    prop_assert!(metrics
        .revenue_by_category
        .windows(2)
        .all(|pair| pair[0].revenue >= pair[1].revenue));
    Ok(())
}

fn check_rankings(raw: &RawDataset, model: DiscountModel) -> Result<(), TestCaseError> {
    let metrics = compute_metrics(&clean(raw, model));

    prop_assert!(metrics.top_products.len() <= TOP_N);
    prop_assert!(metrics.top_days.len() <= TOP_N);
    prop_assert!(metrics
        .top_products
        .windows(2)
        .all(|pair| pair[0].quantity >= pair[1].quantity));
    prop_assert!(metrics
        .top_days
        .windows(2)
        .all(|pair| pair[0].revenue >= pair[1].revenue));
    Ok(())
}

fn check_daily_series(raw: &RawDataset, model: DiscountModel) -> Result<(), TestCaseError> {
    let cleaned = clean(raw, model);
    let metrics = compute_metrics(&cleaned);

    let expected: Vec<_> = cleaned
        .iter()
        .filter_map(|row| row.sold_on())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let actual: Vec<_> = metrics.daily_revenue.iter().map(|row| row.date).collect();

    prop_assert_eq!(actual, expected);
    Ok(())
}

fn check_idempotent(raw: &RawDataset, model: DiscountModel) -> Result<(), TestCaseError> {
    let once = clean(raw, model);
    prop_assert_eq!(clean(&once.to_raw(), model), once);
    Ok(())
}

proptest! {
    #[test]
    fn cleaning_removes_every_null_in_defaulted_columns(
        raw in raw_dataset(),
        model in discount_model(),
    ) {
        check_cleaning_fills_nulls(&raw, model)?;
    }

    #[test]
    fn total_revenue_is_sum_of_flat_discounted_lines(raw in raw_dataset()) {
        check_revenue_sums_flat_lines(&raw)?;
    }

    #[test]
    fn category_revenue_partitions_total_revenue(
        raw in raw_dataset(),
        model in discount_model(),
    ) {
        check_category_partition(&raw, model)?;
    }

    #[test]
    fn ranked_tables_are_short_and_descending(raw in raw_dataset(), model in discount_model()) {
        check_rankings(&raw, model)?;
    }

    #[test]
    fn daily_series_covers_each_sale_date_once_in_order(raw in raw_dataset()) {
        check_daily_series(&raw, DiscountModel::Flat)?;
    }

    #[test]
    fn cleaning_a_cleaned_dataset_changes_nothing(
        raw in raw_dataset(),
        model in discount_model(),
    ) {
        check_idempotent(&raw, model)?;
    }
}

#[test]
fn sample_dataset_satisfies_every_invariant() {
    let raw = sample_dataset();

    for model in [DiscountModel::Flat, DiscountModel::Percentage] {
        check_cleaning_fills_nulls(&raw, model).expect("nulls filled");
        check_category_partition(&raw, model).expect("categories partition revenue");
        check_rankings(&raw, model).expect("rankings ordered");
        check_daily_series(&raw, model).expect("daily series complete");
        check_idempotent(&raw, model).expect("cleaning is idempotent");
    }
    check_revenue_sums_flat_lines(&raw).expect("revenue sums lines");
}

#[test]
fn empty_dataset_has_zero_metrics() {
    let metrics = compute_metrics(&clean(&RawDataset::default(), DiscountModel::Flat));

    assert_eq!(metrics.total_revenue, 0.0);
    assert_eq!(metrics.total_units, 0);
    assert!(metrics.revenue_by_category.is_empty());
    assert!(metrics.daily_revenue.is_empty());
}

#[test]
fn analyze_bundles_consistent_artifacts() {
    let raw = sample_dataset();
    let report = analyze(String::from(SAMPLE_SCRIPT), raw.clone(), DiscountModel::Flat);

    assert_eq!(report.raw, raw);
    assert_eq!(report.cleaned, clean(&raw, DiscountModel::Flat));
    assert_eq!(report.metrics, compute_metrics(&report.cleaned));
    assert_eq!(report.raw_null_counts, raw.null_counts());
}
