//! The alias table that maps source header labels onto canonical item fields.
//!
//! Supporting a new locale or synonym is a configuration change: add the label to the alias list
//! of the field it feeds. Within a list, earlier labels take priority.

use serde::{Deserialize, Serialize};

/// The canonical fields of an inventory item that are read from a stock sheet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Category,
    QuantityOnHand,
    UnitPrice,
    UnitCost,
}

serde_plain::derive_display_from_serialize!(Field);
serde_plain::derive_fromstr_from_deserialize!(Field);

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Category,
        Field::QuantityOnHand,
        Field::UnitPrice,
        Field::UnitCost,
    ];
}

/// For each canonical field, the ordered list of header labels accepted for it.
///
/// Example, as it appears in `config.json`:
/// ```json
/// {
///   "name": ["Item Name", "项目名称", "Name"],
///   "category": ["Category", "类别"],
///   "quantity_on_hand": ["Qty Available", "数量", "Qty"],
///   "unit_price": ["Sales Price", "销售价", "Price"],
///   "unit_cost": ["Cost Price", "成本价", "Cost"]
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    name: Vec<String>,
    category: Vec<String>,
    quantity_on_hand: Vec<String>,
    unit_price: Vec<String>,
    unit_cost: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            name: labels(&["Item Name", "项目名称", "Name"]),
            category: labels(&["Category", "类别"]),
            quantity_on_hand: labels(&["Qty Available", "数量", "Qty"]),
            unit_price: labels(&["Sales Price", "销售价", "Price"]),
            unit_cost: labels(&["Cost Price", "成本价", "Cost"]),
        }
    }
}

impl ColumnAliases {
    /// The accepted header labels for `field`, highest priority first.
    pub fn aliases(&self, field: Field) -> &[String] {
        match field {
            Field::Name => &self.name,
            Field::Category => &self.category,
            Field::QuantityOnHand => &self.quantity_on_hand,
            Field::UnitPrice => &self.unit_price,
            Field::UnitCost => &self.unit_cost,
        }
    }

    /// Replaces the alias list for `field`.
    pub fn with_aliases<S, I>(mut self, field: Field, aliases: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let list = aliases.into_iter().map(Into::into).collect();
        match field {
            Field::Name => self.name = list,
            Field::Category => self.category = list,
            Field::QuantityOnHand => self.quantity_on_hand = list,
            Field::UnitPrice => self.unit_price = list,
            Field::UnitCost => self.unit_cost = list,
        }
        self
    }
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The placeholder used for `category` when a row has none.
pub const DEFAULT_CATEGORY: &str = "General";

/// Values given to fields that a row does not provide.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ItemDefaults {
    default_category: String,
}

impl Default for ItemDefaults {
    fn default() -> Self {
        Self {
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl ItemDefaults {
    pub fn new(default_category: impl Into<String>) -> Self {
        Self {
            default_category: default_category.into(),
        }
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let json = r#"{"name": ["Product"]}"#;
        let aliases: ColumnAliases = serde_json::from_str(json).unwrap();
        assert_eq!(aliases.aliases(Field::Name), ["Product".to_string()]);
        assert_eq!(
            aliases.aliases(Field::UnitCost),
            ColumnAliases::default().aliases(Field::UnitCost)
        );
    }

    #[test]
    fn test_every_field_has_default_aliases() {
        let aliases = ColumnAliases::default();
        for field in Field::ALL {
            assert!(!aliases.aliases(field).is_empty(), "{field} has no aliases");
        }
    }

    #[test]
    fn test_field_names() {
        assert_eq!(Field::QuantityOnHand.to_string(), "quantity_on_hand");
        assert_eq!(Field::from_str("unit_price").unwrap(), Field::UnitPrice);
    }

    #[test]
    fn test_with_aliases() {
        let aliases = ColumnAliases::default().with_aliases(Field::Category, ["Dept", "Category"]);
        assert_eq!(aliases.aliases(Field::Category)[0], "Dept");
    }
}
