//! Cleaned dataset types and sale-date handling.

use salesdash_warehouse::{ColumnNullCount, RawDataset, RawSale, SALES_COLUMNS};
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

/// One sale after null handling and total recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanSale {
    pub sale_id: i64,
    /// Parsed sale timestamp; `None` when the stored text was missing or unparseable.
    #[serde(with = "serde_datetime")]
    pub sold_at: Option<PrimitiveDateTime>,
    pub product_name: String,
    pub category: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub discount: f64,
    pub total: f64,
}

impl CleanSale {
    /// Project back to the raw row shape, e.g. to feed the cleaner again.
    pub fn to_raw(&self) -> RawSale {
        RawSale {
            sale_id: self.sale_id,
            sold_on: self.sold_at.map(format_sale_datetime),
            product_name: Some(self.product_name.clone()),
            category: Some(self.category.clone()),
            quantity: Some(self.quantity),
            unit_price: Some(self.unit_price),
            discount: Some(self.discount),
            total: Some(self.total),
        }
    }

    /// Calendar date of the sale.
    pub fn sold_on(&self) -> Option<Date> {
        self.sold_at.map(PrimitiveDateTime::date)
    }
}

/// Cleaned rows, same order and count as the raw dataset they came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanDataset {
    pub rows: Vec<CleanSale>,
}

impl CleanDataset {
    pub fn new(rows: Vec<CleanSale>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CleanSale> {
        self.rows.iter()
    }

    pub fn to_raw(&self) -> RawDataset {
        RawDataset::new(self.rows.iter().map(CleanSale::to_raw).collect())
    }

    /// Null counts per column; only an unparseable date can remain null.
    pub fn null_counts(&self) -> Vec<ColumnNullCount> {
        let missing_dates = self.rows.iter().filter(|row| row.sold_at.is_none()).count();
        SALES_COLUMNS
            .iter()
            .map(|column| {
                let nulls = if *column == "data_venda" { missing_dates } else { 0 };
                ColumnNullCount::new(*column, nulls)
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a CleanDataset {
    type Item = &'a CleanSale;
    type IntoIter = std::slice::Iter<'a, CleanSale>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Parse a stored sale date.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS[.fraction]`, and the `T`-separated form.
/// A bare date maps to midnight.
pub fn parse_sale_datetime(text: &str) -> Option<PrimitiveDateTime> {
    let text = text.trim();
    if let Ok(date) = Date::parse(text, format_description!("[year]-[month]-[day]")) {
        return Some(PrimitiveDateTime::new(date, Time::MIDNIGHT));
    }

    let normalized = text.replacen('T', " ", 1);
    PrimitiveDateTime::parse(
        &normalized,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            &normalized,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        )
    })
    .ok()
}

/// Format a sale timestamp so that [`parse_sale_datetime`] reads it back unchanged.
pub fn format_sale_datetime(value: PrimitiveDateTime) -> String {
    let formatted = if value.nanosecond() == 0 {
        value.format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
    } else {
        value.format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"
        ))
    };
    // Formatting a PrimitiveDateTime with these descriptions has no failure mode.
    formatted.unwrap_or_default()
}

/// Format a calendar date as `YYYY-MM-DD`.
pub fn format_date(value: Date) -> String {
    value
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

pub(crate) mod serde_datetime {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::PrimitiveDateTime;

    pub fn serialize<S: Serializer>(
        value: &Option<PrimitiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&super::format_sale_datetime(*value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<PrimitiveDateTime>, D::Error> {
        let text: Option<String> = Option::deserialize(deserializer)?;
        match text {
            None => Ok(None),
            Some(text) => super::parse_sale_datetime(&text)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid sale date '{text}'"))),
        }
    }
}

pub(crate) mod serde_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::macros::format_description;
    use time::Date;

    pub fn serialize<S: Serializer>(value: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;
        Date::parse(&text, format_description!("[year]-[month]-[day]"))
            .map_err(serde::de::Error::custom)
    }
}
