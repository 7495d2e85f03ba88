// src/inventory/loader.rs
use crate::error::LoadError;
use crate::types::{Inventory, Item, ProductId, UnknownProduct};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::{debug, warn};

/// What to do with a record that has no usable `price` or `quantity`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedEntryPolicy {
    #[default]
    Skip,
    Reject,
}

/// Interprets `text` as a JSON object of product records, e.g.
/// `{"soda": {"price": 1.50, "quantity": 6}}`.
///
/// Records are validated before their key, so a malformed record under an
/// unknown key falls under `policy` rather than `UnknownSelection`.
pub fn parse_inventory(text: &str, policy: MalformedEntryPolicy) -> Result<Inventory, LoadError> {
    let root: Value =
        serde_json::from_str(text).map_err(|e| LoadError::Format(e.to_string()))?;

    let entries = root.as_object().ok_or_else(|| {
        LoadError::Format(format!(
            "expected an object of product records, found {}",
            kind_of(&root)
        ))
    })?;

    let mut inventory = Inventory::new();

    for (key, value) in entries {
        let record = value.as_object().ok_or_else(|| {
            LoadError::Format(format!(
                "entry `{}` should be a record, found {}",
                key,
                kind_of(value)
            ))
        })?;

        let Some(item) = read_item(record) else {
            match policy {
                MalformedEntryPolicy::Skip => {
                    warn!("Skipping inventory entry `{}`: missing price or quantity", key);
                    continue;
                }
                MalformedEntryPolicy::Reject => {
                    return Err(LoadError::MalformedEntry { key: key.clone() });
                }
            }
        };

        let selection = ProductId::from_str(key)
            .map_err(|UnknownProduct(key)| LoadError::UnknownSelection(key))?;

        debug!("Loaded {}: {:?}", selection, item);
        inventory.insert(selection, item);
    }

    Ok(inventory)
}

fn read_item(record: &Map<String, Value>) -> Option<Item> {
    let price = record.get("price").and_then(to_decimal)?;
    if price < Decimal::ZERO {
        return None;
    }

    let quantity = record.get("quantity")?.as_u64()?;
    let quantity = u32::try_from(quantity).ok()?;

    Some(Item { price, quantity })
}

// Go through the textual form first so 1.50 stays exactly 1.50
fn to_decimal(value: &Value) -> Option<Decimal> {
    let Value::Number(number) = value else {
        return None;
    };
    Decimal::from_str(&number.to_string())
        .ok()
        .or_else(|| number.as_f64().and_then(Decimal::from_f64))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_records() {
        let text = r#"{
            "soda": {"price": 1.50, "quantity": 6},
            "gum": {"price": 0.5, "quantity": 0}
        }"#;
        let inventory = parse_inventory(text, MalformedEntryPolicy::Skip).unwrap();

        assert_eq!(inventory.len(), 2);
        assert_eq!(
            inventory[&ProductId::Soda],
            Item {
                price: Decimal::new(150, 2),
                quantity: 6
            }
        );
        assert_eq!(inventory[&ProductId::Gum].quantity, 0);
    }

    #[test]
    fn integer_prices_are_accepted() {
        let text = r#"{"sandwich": {"price": 3, "quantity": 1}}"#;
        let inventory = parse_inventory(text, MalformedEntryPolicy::Skip).unwrap();
        assert_eq!(inventory[&ProductId::Sandwich].price, Decimal::new(3, 0));
    }

    #[test]
    fn malformed_records_are_skipped_by_default() {
        let text = r#"{
            "soda": {"price": 1.50, "quantity": 6},
            "chips": {"price": "cheap", "quantity": 3},
            "cookie": {"price": 1.0},
            "water": {"price": 1.0, "quantity": 2.5},
            "wrap": {"price": -1.0, "quantity": 2},
            "gum": {"price": 0.5, "quantity": -1}
        }"#;
        let inventory = parse_inventory(text, MalformedEntryPolicy::default()).unwrap();

        assert_eq!(inventory.keys().copied().collect::<Vec<_>>(), vec![ProductId::Soda]);
    }

    #[test]
    fn reject_policy_fails_on_first_malformed_record() {
        let text = r#"{"cookie": {"price": 1.0}}"#;
        let err = parse_inventory(text, MalformedEntryPolicy::Reject).unwrap_err();
        assert!(matches!(err, LoadError::MalformedEntry { key } if key == "cookie"));
    }

    #[test]
    fn unknown_keys_fail_the_load() {
        let text = r#"{"hotDog": {"price": 2.0, "quantity": 1}}"#;
        let err = parse_inventory(text, MalformedEntryPolicy::Skip).unwrap_err();
        assert!(matches!(err, LoadError::UnknownSelection(key) if key == "hotDog"));
    }

    #[test]
    fn unknown_key_with_malformed_record_is_only_skipped() {
        let text = r#"{"hotDog": {"quantity": 1}}"#;
        let inventory = parse_inventory(text, MalformedEntryPolicy::Skip).unwrap();
        assert!(inventory.is_empty());
    }

    #[test]
    fn top_level_must_be_an_object() {
        let err = parse_inventory("[1, 2, 3]", MalformedEntryPolicy::Skip).unwrap_err();
        assert!(matches!(err, LoadError::Format(_)));
    }

    #[test]
    fn nested_values_must_be_records() {
        let err = parse_inventory(r#"{"soda": 1.5}"#, MalformedEntryPolicy::Skip).unwrap_err();
        assert!(matches!(err, LoadError::Format(_)));
    }

    #[test]
    fn non_json_text_is_a_format_error() {
        let err = parse_inventory("<plist></plist>", MalformedEntryPolicy::Skip).unwrap_err();
        assert!(matches!(err, LoadError::Format(_)));
    }
}
