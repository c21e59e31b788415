//! Order line record
//!
//! One row of a carrier/platform export, already normalized and currency-converted
//! upstream. A multi-product order shows up as several lines sharing the same `id`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use crate::domain::value_objects::{status, GroupKey, StatusClass};

const UNKNOWN_GROUP: &str = "unknown";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    #[serde(deserialize_with = "text_or_number")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub total_amount: f64,
    /// Supplier cost already multiplied by quantity.
    pub supplier_unit_cost: Option<f64>,
    /// Per-unit supplier price, used when the quantity-adjusted cost is missing.
    pub supplier_price: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub shipping_cost: f64,
    pub return_shipping_cost: Option<f64>,
    #[serde(deserialize_with = "opt_text_or_number")]
    pub product_id: Option<String>,
    pub product_group: Option<String>,
    pub product_name: Option<String>,
    pub quantity: Option<f64>,
    pub date: Option<NaiveDate>,
    pub city: Option<String>,
}

impl Order {
    pub fn new(id: impl Into<String>, status: impl Into<String>) -> Self {
        Self { id: id.into(), status: status.into(), ..Self::default() }
    }

    pub fn with_total(mut self, amount: f64) -> Self { self.total_amount = amount; self }
    pub fn with_cost(mut self, cost: f64) -> Self { self.supplier_unit_cost = Some(cost); self }
    pub fn with_supplier_price(mut self, price: f64) -> Self { self.supplier_price = Some(price); self }
    pub fn with_shipping(mut self, cost: f64) -> Self { self.shipping_cost = cost; self }
    pub fn with_return_shipping(mut self, cost: f64) -> Self { self.return_shipping_cost = Some(cost); self }
    pub fn with_group(mut self, group: impl Into<String>) -> Self { self.product_group = Some(group.into()); self }
    pub fn with_date(mut self, date: NaiveDate) -> Self { self.date = Some(date); self }
    pub fn with_city(mut self, city: impl Into<String>) -> Self { self.city = Some(city.into()); self }

    pub fn with_product(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.product_id = Some(id.into());
        self.product_name = Some(name.into());
        self
    }

    pub fn status_class(&self) -> StatusClass { status::classify(&self.status) }
    pub fn has_novelty(&self) -> bool { status::is_novelty(&self.status) }

    /// Empty ids are skipped by every id-keyed count and per-order sum.
    pub fn order_id(&self) -> Option<&str> {
        if self.id.is_empty() { None } else { Some(&self.id) }
    }

    pub fn total(&self) -> f64 { present(Some(self.total_amount)).unwrap_or(0.0) }
    pub fn forward_shipping(&self) -> f64 { present(Some(self.shipping_cost)).unwrap_or(0.0) }

    pub fn cost_of_goods(&self) -> f64 {
        present(self.supplier_unit_cost).or_else(|| present(self.supplier_price)).unwrap_or(0.0)
    }

    pub fn return_shipping(&self) -> f64 {
        present(self.return_shipping_cost).unwrap_or_else(|| self.forward_shipping())
    }

    /// Bucket for projection: the selected field, then product name, then "unknown".
    pub fn group_value(&self, key: GroupKey) -> &str {
        let selected = match key {
            GroupKey::ProductId => &self.product_id,
            GroupKey::ProductGroup => &self.product_group,
            GroupKey::ProductName => &self.product_name,
        };
        non_empty(selected).or_else(|| non_empty(&self.product_name)).unwrap_or(UNKNOWN_GROUP)
    }

    pub fn display_name(&self, key: GroupKey) -> &str {
        non_empty(&self.product_name).unwrap_or_else(|| self.group_value(key))
    }
}

/// Zero and NaN count as missing, matching how exports leave blank cells.
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber { Text(String), Int(i64), Float(f64) }

impl From<TextOrNumber> for String {
    fn from(v: TextOrNumber) -> Self {
        match v { TextOrNumber::Text(s) => s, TextOrNumber::Int(i) => i.to_string(), TextOrNumber::Float(f) => f.to_string() }
    }
}

fn text_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<TextOrNumber>::deserialize(d)?.map(String::from).unwrap_or_default())
}

/// Blank export cells arrive as `null`.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn opt_text_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<TextOrNumber>::deserialize(d)?.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_fields_read_as_defaults() {
        let o: Order = serde_json::from_str(r#"{"id":"7","status":null,"totalAmount":null,"shippingCost":null}"#).unwrap();
        assert_eq!(o.id, "7");
        assert_eq!(o.status, "");
        assert_eq!(o.total(), 0.0);
        assert_eq!(o.forward_shipping(), 0.0);
        assert_eq!(o.status_class(), StatusClass::Transit);
    }

    #[test]
    fn test_cost_falls_back_to_supplier_price() {
        let o = Order::new("1", "ENTREGADO").with_supplier_price(9000.0);
        assert_eq!(o.cost_of_goods(), 9000.0);
        let o = o.with_cost(0.0);
        assert_eq!(o.cost_of_goods(), 9000.0);
        let o = o.with_cost(12000.0);
        assert_eq!(o.cost_of_goods(), 12000.0);
        assert_eq!(Order::new("2", "ENTREGADO").cost_of_goods(), 0.0);
    }

    #[test]
    fn test_return_shipping_falls_back_to_forward() {
        let o = Order::new("1", "DEVOLUCION").with_shipping(8000.0);
        assert_eq!(o.return_shipping(), 8000.0);
        assert_eq!(o.with_return_shipping(6000.0).return_shipping(), 6000.0);
    }

    #[test]
    fn test_group_value_fallbacks() {
        let o = Order::new("1", "ENTREGADO").with_product("P1", "Lamp");
        assert_eq!(o.group_value(GroupKey::ProductId), "P1");
        assert_eq!(o.group_value(GroupKey::ProductGroup), "Lamp");
        assert_eq!(o.display_name(GroupKey::ProductId), "Lamp");
        let bare = Order::new("2", "ENTREGADO");
        assert_eq!(bare.group_value(GroupKey::ProductId), "unknown");
        assert_eq!(bare.display_name(GroupKey::ProductId), "unknown");
    }

    #[test]
    fn test_deserialize_numeric_ids_and_missing_fields() {
        let o: Order = serde_json::from_str(
            r#"{"id": 1042, "status": "EN CAMINO", "totalAmount": 50000, "productId": 77, "date": "2025-02-01"}"#,
        ).unwrap();
        assert_eq!(o.id, "1042");
        assert_eq!(o.product_id.as_deref(), Some("77"));
        assert_eq!(o.shipping_cost, 0.0);
        assert_eq!(o.date, NaiveDate::from_ymd_opt(2025, 2, 1));
        assert_eq!(o.status_class(), StatusClass::Transit);
    }

    #[test]
    fn test_empty_id_has_no_order_id() {
        assert_eq!(Order::new("", "ENTREGADO").order_id(), None);
        assert_eq!(Order::new("9", "ENTREGADO").order_id(), Some("9"));
    }
}
