//! Types that represent the core data model, such as `InventoryItem` and the raw `Cell`.
mod amount;
mod cell;
mod columns;
mod mapping;

pub use amount::{Amount, AmountError};
pub use cell::{Cell, RawGrid};
pub use columns::{ColumnAliases, Field, ItemDefaults, DEFAULT_CATEGORY};
pub use mapping::{Header, Mapping};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// The name given to a row that has no recognizable item name. Such rows never become items.
pub const UNKNOWN_NAME: &str = "Unknown";

/// The identity of an item, assigned when it is ingested.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// One stock-keeping unit.
///
/// `observed_sales` starts at zero when the item is ingested and is only ever changed by
/// reconciliation against a sales report. Derived values such as the reorder quantity are
/// computed by `summary` and are never stored here.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InventoryItem {
    id: ItemId,
    name: String,
    category: String,
    quantity_on_hand: Decimal,
    observed_sales: u64,
    unit_price: Amount,
    unit_cost: Amount,
}

impl InventoryItem {
    /// Creates a freshly ingested item with a new id and no observed sales.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        quantity_on_hand: Decimal,
        unit_price: Amount,
        unit_cost: Amount,
    ) -> Self {
        Self {
            id: ItemId::generate(),
            name: name.into().trim().to_string(),
            category: category.into(),
            quantity_on_hand,
            observed_sales: 0,
            unit_price,
            unit_cost,
        }
    }

    /// Rebuilds an item from stored values.
    pub(crate) fn from_parts(
        id: ItemId,
        name: String,
        category: String,
        quantity_on_hand: Decimal,
        observed_sales: u64,
        unit_price: Amount,
        unit_cost: Amount,
    ) -> Self {
        Self {
            id,
            name,
            category,
            quantity_on_hand,
            observed_sales,
            unit_price,
            unit_cost,
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn quantity_on_hand(&self) -> Decimal {
        self.quantity_on_hand
    }

    pub fn observed_sales(&self) -> u64 {
        self.observed_sales
    }

    pub fn unit_price(&self) -> Amount {
        self.unit_price
    }

    pub fn unit_cost(&self) -> Amount {
        self.unit_cost
    }

    pub(crate) fn set_observed_sales(&mut self, observed_sales: u64) {
        self.observed_sales = observed_sales;
    }

    #[cfg(test)]
    pub(crate) fn with_observed_sales(mut self, observed_sales: u64) -> Self {
        self.observed_sales = observed_sales;
        self
    }
}
