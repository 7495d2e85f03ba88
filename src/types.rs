// src/types.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use uuid::Uuid;

/// Every product the machine knows how to sell. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductId {
    Soda,
    DietSoda,
    Chips,
    Cookie,
    Sandwich,
    Wrap,
    CandyBar,
    PopTart,
    Water,
    FruitJuice,
    SportsDrink,
    Gum,
}

impl ProductId {
    pub const ALL: [ProductId; 12] = [
        ProductId::Soda,
        ProductId::DietSoda,
        ProductId::Chips,
        ProductId::Cookie,
        ProductId::Sandwich,
        ProductId::Wrap,
        ProductId::CandyBar,
        ProductId::PopTart,
        ProductId::Water,
        ProductId::FruitJuice,
        ProductId::SportsDrink,
        ProductId::Gum,
    ];

    /// Key used in the inventory resource.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductId::Soda => "soda",
            ProductId::DietSoda => "dietSoda",
            ProductId::Chips => "chips",
            ProductId::Cookie => "cookie",
            ProductId::Sandwich => "sandwich",
            ProductId::Wrap => "wrap",
            ProductId::CandyBar => "candyBar",
            ProductId::PopTart => "popTart",
            ProductId::Water => "water",
            ProductId::FruitJuice => "fruitJuice",
            ProductId::SportsDrink => "sportsDrink",
            ProductId::Gum => "gum",
        }
    }

    /// Human readable label for the selection list.
    pub fn label(&self) -> &'static str {
        match self {
            ProductId::Soda => "Soda",
            ProductId::DietSoda => "Diet Soda",
            ProductId::Chips => "Chips",
            ProductId::Cookie => "Cookie",
            ProductId::Sandwich => "Sandwich",
            ProductId::Wrap => "Wrap",
            ProductId::CandyBar => "Candy Bar",
            ProductId::PopTart => "Pop Tart",
            ProductId::Water => "Water",
            ProductId::FruitJuice => "Fruit Juice",
            ProductId::SportsDrink => "Sports Drink",
            ProductId::Gum => "Gum",
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProduct(pub String);

impl FromStr for ProductId {
    type Err = UnknownProduct;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownProduct(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub price: Decimal,
    pub quantity: u32,
}

pub type Inventory = BTreeMap<ProductId, Item>;

/// Read-only copy of machine state for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineSnapshot {
    pub balance: Decimal,
    pub inventory: Inventory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub selection: ProductId,
    pub quantity: NonZeroU32,
    pub total: Decimal,
    pub balance_after: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    Vended(Receipt),
    Deposited(Decimal),
    Rejected(String),
    Snapshot(MachineSnapshot),
    Log(String),
}
