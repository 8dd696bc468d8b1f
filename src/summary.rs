//! Derived figures and the read-only view handed to presentation.
//!
//! Nothing here is stored. Every value is recomputed from `quantity_on_hand`, `observed_sales`,
//! `unit_price` and `unit_cost` whenever it is asked for.

use crate::inventory::Inventory;
use crate::model::{Amount, InventoryItem, ItemId};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Units to reorder per unit sold, before subtracting what is on hand.
pub const REORDER_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Items with fewer units on hand than this are low on stock.
pub const LOW_STOCK_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// The tunables used by the derivations.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    reorder_multiplier: Decimal,
    low_stock_threshold: Decimal,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            reorder_multiplier: REORDER_MULTIPLIER,
            low_stock_threshold: LOW_STOCK_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn new(reorder_multiplier: Decimal, low_stock_threshold: Decimal) -> Self {
        Self {
            reorder_multiplier,
            low_stock_threshold,
        }
    }

    pub fn reorder_multiplier(&self) -> Decimal {
        self.reorder_multiplier
    }

    pub fn low_stock_threshold(&self) -> Decimal {
        self.low_stock_threshold
    }
}

/// The figures derived for a single item.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Derived {
    pub reorder_quantity: Decimal,
    pub is_low_stock: bool,
    pub total_cost_value: Amount,
    pub total_sales_value: Amount,
}

/// `max(0, round(observed_sales * multiplier - quantity_on_hand))`, halves rounded away from zero.
pub fn reorder_quantity(item: &InventoryItem, thresholds: &Thresholds) -> Decimal {
    let wanted = Decimal::from(item.observed_sales())
        .saturating_mul(thresholds.reorder_multiplier)
        .saturating_sub(item.quantity_on_hand());
    wanted
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .max(Decimal::ZERO)
}

pub fn derive(item: &InventoryItem, thresholds: &Thresholds) -> Derived {
    Derived {
        reorder_quantity: reorder_quantity(item, thresholds),
        is_low_stock: item.quantity_on_hand() < thresholds.low_stock_threshold,
        total_cost_value: item.unit_cost().times(item.quantity_on_hand()),
        total_sales_value: item.unit_price().times(item.quantity_on_hand()),
    }
}

/// Totals over a whole inventory.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Summary {
    pub item_count: usize,
    pub total_cost_value: Amount,
    pub total_sales_value: Amount,
    pub low_stock_count: usize,
}

pub fn summarize(items: &[InventoryItem], thresholds: &Thresholds) -> Summary {
    items
        .iter()
        .map(|item| derive(item, thresholds))
        .fold(Summary::default(), |acc, d| Summary {
            item_count: acc.item_count + 1,
            total_cost_value: acc.total_cost_value + d.total_cost_value,
            total_sales_value: acc.total_sales_value + d.total_sales_value,
            low_stock_count: acc.low_stock_count + usize::from(d.is_low_stock),
        })
}

/// One row of the inventory as presentation sees it: the stored fields next to the derived ones.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ItemView {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub quantity_on_hand: Decimal,
    pub observed_sales: u64,
    pub reorder_quantity: Decimal,
    pub needs_reorder: bool,
    pub is_low_stock: bool,
    pub unit_price: Amount,
    pub unit_cost: Amount,
    pub total_cost_value: Amount,
    pub total_sales_value: Amount,
}

impl ItemView {
    pub fn new(item: &InventoryItem, thresholds: &Thresholds) -> Self {
        let derived = derive(item, thresholds);
        Self {
            id: item.id().clone(),
            name: item.name().to_string(),
            category: item.category().to_string(),
            quantity_on_hand: item.quantity_on_hand(),
            observed_sales: item.observed_sales(),
            reorder_quantity: derived.reorder_quantity,
            needs_reorder: derived.reorder_quantity > Decimal::ZERO,
            is_low_stock: derived.is_low_stock,
            unit_price: item.unit_price(),
            unit_cost: item.unit_cost(),
            total_cost_value: derived.total_cost_value,
            total_sales_value: derived.total_sales_value,
        }
    }
}

/// A snapshot of the whole inventory for presentation.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct InventoryView {
    pub items: Vec<ItemView>,
    pub summary: Summary,
}

pub fn view(inventory: &Inventory, thresholds: &Thresholds) -> InventoryView {
    InventoryView {
        items: inventory
            .items()
            .iter()
            .map(|item| ItemView::new(item, thresholds))
            .collect(),
        summary: summarize(inventory.items(), thresholds),
    }
}
