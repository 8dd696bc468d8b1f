use crate::commands::{plural, Out};
use crate::db::Store;
use crate::error::{ErrorType, IntoResult};
use crate::inventory::Inventory;
use crate::summary::{view, InventoryView};
use crate::{Config, Result};

/// Returns every stored item next to its derived figures, along with the inventory totals.
pub async fn show(config: Config) -> Result<Out<InventoryView>> {
    let items = config
        .db()
        .load_all()
        .await
        .pub_result(ErrorType::Database)?;
    let inventory = Inventory::new(items);
    let view = view(&inventory, &config.thresholds());

    let summary = &view.summary;
    let message = format!(
        "{} item{}, {} low on stock, cost value {}, sales value {}",
        summary.item_count,
        plural(summary.item_count),
        summary.low_stock_count,
        summary.total_cost_value,
        summary.total_sales_value
    );
    Ok(Out::new(message, view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;
    use crate::test::TestEnv;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_show_empty() {
        let env = TestEnv::new().await;
        let out = show(env.config()).await.unwrap();
        let view = out.structure().unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.summary.item_count, 0);
        assert_eq!(view.summary.total_cost_value, Amount::ZERO);
    }

    #[tokio::test]
    async fn test_show_derives_figures() {
        let env = TestEnv::new().await;
        env.ingest_stock().await;
        env.reconcile_text("Widget A 4\nWidget B 2").await;

        let out = show(env.config()).await.unwrap();
        let view = out.structure().unwrap();
        assert_eq!(view.items.len(), 3);

        // 4 on hand, 4 sold: round(4 * 1.5 - 4) = 2
        let widget_a = &view.items[0];
        assert_eq!(widget_a.reorder_quantity, Decimal::from(2));
        assert!(widget_a.needs_reorder);
        assert!(widget_a.is_low_stock);
        assert_eq!(widget_a.total_cost_value, Amount::from_str("24.00").unwrap());

        // 20 on hand, 2 sold
        let widget_b = &view.items[1];
        assert_eq!(widget_b.reorder_quantity, Decimal::ZERO);
        assert!(!widget_b.needs_reorder);
        assert!(!widget_b.is_low_stock);

        assert_eq!(view.summary.item_count, 3);
        assert_eq!(view.summary.low_stock_count, 1);
        assert!(out.message().starts_with("3 items, 1 low on stock"));
    }
}
