//! Recovers per-item sales counts from the plain text of a sales report.
//!
//! Each item is looked up by its name followed by whitespace and a run of digits, e.g.
//! `Widget A   12`. Only the first such occurrence counts. This is proximity matching, not fuzzy
//! matching: when one item name is contained in another, both names search independently and may
//! pick up each other's numbers, so item names should be distinct.

use crate::inventory::Inventory;
use crate::model::UNKNOWN_NAME;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::{debug, trace, warn};

/// What a reconciliation pass did, for feedback to the user.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// How many items found a sales figure in the text.
    updated: usize,
}

impl ReconcileReport {
    pub fn updated(&self) -> usize {
        self.updated
    }
}

/// Sets `observed_sales` for every item whose name is followed by a number in `text`.
///
/// A match replaces the previous value; an item that is not found keeps whatever value it had.
/// Running this twice with the same text gives the same result as running it once. The order of
/// items and the set of items are never changed.
///
/// The inventory is expected to be non-empty. Rejecting an empty inventory is up to the caller,
/// see `runs::reconcile_document`.
pub fn reconcile(inventory: &mut Inventory, text: &str) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    for item in inventory.iter_mut() {
        let name = item.name().trim();
        if name.is_empty() || name == UNKNOWN_NAME {
            continue;
        }

        let pattern = match proximity_pattern(name) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!("Unable to build a search pattern for '{name}': {e}");
                continue;
            }
        };

        let Some(digits) = pattern.captures(text).and_then(|c| c.get(1)) else {
            trace!("No sales figure found for '{name}'");
            continue;
        };

        match digits.as_str().parse::<u64>() {
            Ok(sales) => {
                trace!("'{name}' sold {sales}");
                item.set_observed_sales(sales);
                report.updated += 1;
            }
            Err(e) => {
                warn!(
                    "Ignoring sales figure '{}' for '{name}': {e}",
                    digits.as_str()
                );
            }
        }
    }
    debug!(
        "Updated sales for {} of {} item(s)",
        report.updated,
        inventory.len()
    );
    report
}

/// The literal `name`, then whitespace, then a captured run of ascii digits; case-insensitive.
fn proximity_pattern(name: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(r"{}\s+([0-9]+)", regex::escape(name)))
        .case_insensitive(true)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, InventoryItem};
    use rust_decimal::Decimal;

    fn inventory(names: &[&str]) -> Inventory {
        Inventory::new(
            names
                .iter()
                .map(|&n| InventoryItem::new(n, "General", Decimal::ONE, Amount::ZERO, Amount::ZERO))
                .collect(),
        )
    }

    fn sales(inventory: &Inventory) -> Vec<u64> {
        inventory.items().iter().map(|i| i.observed_sales()).collect()
    }

    #[test]
    fn test_reconcile_two_items() {
        let mut inv = inventory(&["Widget A", "Widget B"]);
        let report = reconcile(&mut inv, "Widget A 12 more text Widget B 7");
        assert_eq!(sales(&inv), vec![12, 7]);
        assert_eq!(report.updated(), 2);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let text = "Widget A 12 more text Widget B 7";
        let mut once = inventory(&["Widget A", "Widget B"]);
        reconcile(&mut once, text);
        let mut twice = once.clone();
        reconcile(&mut twice, text);
        assert_eq!(sales(&once), sales(&twice));
    }

    #[test]
    fn test_case_insensitive_and_any_whitespace() {
        let mut inv = inventory(&["Widget A"]);
        reconcile(&mut inv, "WIDGET a\n\t 31 units");
        assert_eq!(sales(&inv), vec![31]);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut inv = inventory(&["Bolt"]);
        reconcile(&mut inv, "Bolt 3 ... Bolt 99");
        assert_eq!(sales(&inv), vec![3]);
    }

    #[test]
    fn test_name_needs_adjacent_number() {
        let mut inv = inventory(&["Bolt"]);
        let report = reconcile(&mut inv, "Bolt sold: 3");
        assert_eq!(sales(&inv), vec![0]);
        assert_eq!(report.updated(), 0);
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let mut inv = inventory(&["Size 12\" Pan", "A+B (large)"]);
        reconcile(&mut inv, "Size 12\" Pan 4 and A+B (large) 6 and AAB large 9");
        assert_eq!(sales(&inv), vec![4, 6]);
    }

    #[test]
    fn test_metacharacters_do_not_match_as_pattern() {
        let mut inv = inventory(&["Cap.5"]);
        reconcile(&mut inv, "Capx5 10");
        assert_eq!(sales(&inv), vec![0]);
    }

    #[test]
    fn test_unmatched_item_keeps_previous_value() {
        let mut inv = inventory(&["Widget A", "Widget B"]);
        reconcile(&mut inv, "Widget A 12 Widget B 7");
        let report = reconcile(&mut inv, "Widget A 5");
        assert_eq!(sales(&inv), vec![5, 7]);
        assert_eq!(report.updated(), 1);
    }

    #[test]
    fn test_match_replaces_rather_than_adds() {
        let mut inv = inventory(&["Widget A"]);
        reconcile(&mut inv, "Widget A 12");
        reconcile(&mut inv, "Widget A 2");
        assert_eq!(sales(&inv), vec![2]);
    }

    #[test]
    fn test_order_and_membership_preserved() {
        let mut inv = inventory(&["c", "a", "b"]);
        let before: Vec<_> = inv.items().iter().map(|i| i.id().clone()).collect();
        reconcile(&mut inv, "a 1 b 2 c 3 d 4");
        let after: Vec<_> = inv.items().iter().map(|i| i.id().clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_overflowing_number_is_ignored() {
        let mut inv = inventory(&["Bolt"]);
        reconcile(&mut inv, "Bolt 5");
        reconcile(&mut inv, "Bolt 99999999999999999999999999");
        assert_eq!(sales(&inv), vec![5]);
    }

    #[test]
    fn test_substring_names_match_independently() {
        // "Pen" inside "Pen Holder 4" is not followed by digits, so each name finds its own figure
        let mut inv = inventory(&["Pen", "Pen Holder"]);
        reconcile(&mut inv, "Pen Holder 4 Pen 9");
        assert_eq!(sales(&inv), vec![9, 4]);
    }

    #[test]
    fn test_duplicate_names_both_updated() {
        let mut inv = inventory(&["Bolt", "Bolt"]);
        let report = reconcile(&mut inv, "Bolt 4");
        assert_eq!(sales(&inv), vec![4, 4]);
        assert_eq!(report.updated(), 2);
    }

    #[test]
    fn test_unknown_sentinel_is_skipped() {
        let mut inv = inventory(&[UNKNOWN_NAME]);
        let report = reconcile(&mut inv, "Unknown 9");
        assert_eq!(sales(&inv), vec![0]);
        assert_eq!(report.updated(), 0);
    }

    #[test]
    fn test_empty_inventory_is_a_no_op() {
        let mut inv = Inventory::default();
        assert_eq!(reconcile(&mut inv, "anything 1").updated(), 0);
    }
}
