use crate::args::ReconcileArgs;
use crate::backup::{Backup, PRE_RECONCILE};
use crate::commands::{plural, Out};
use crate::db::Store;
use crate::decode::{DocumentKind, TextExtractor};
use crate::error::{ErrorType, IntoResult};
use crate::inventory::Inventory;
use crate::runs::reconcile_document;
use crate::{utils, Config, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// What a reconciliation run did.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileOutcome {
    /// How many items found a sales figure in the report.
    pub updated: usize,
    /// How many items the inventory holds.
    pub item_count: usize,
    /// Where the inventory was saved before the sales figures were applied.
    pub backup: PathBuf,
}

/// Reads the sales report at `args.file()` and records the sales figure of every item named in it.
///
/// Fails without changing anything if the stored inventory is empty or the report's text cannot
/// be extracted.
pub async fn reconcile(config: Config, args: ReconcileArgs) -> Result<Out<ReconcileOutcome>> {
    let kind = match args.format() {
        Some(kind) => kind,
        None => DocumentKind::from_path(args.file()).pub_result(ErrorType::Request)?,
    };
    let extractor = kind.text_extractor().pub_result(ErrorType::Request)?;
    let bytes = utils::read_bytes(args.file())
        .await
        .pub_result(ErrorType::Filesystem)?;
    debug!("Reconciling against '{}' as {kind}", args.file().display());

    reconcile_into(config.db(), &config.backup(), &bytes, extractor.as_ref()).await
}

pub(crate) async fn reconcile_into(
    store: &dyn Store,
    backup: &Backup,
    bytes: &[u8],
    extractor: &dyn TextExtractor,
) -> Result<Out<ReconcileOutcome>> {
    let previous = store.load_all().await.pub_result(ErrorType::Database)?;
    let mut inventory = Inventory::new(previous.clone());

    let report =
        reconcile_document(&mut inventory, bytes, extractor).pub_result(ErrorType::Reconcile)?;

    let backup = backup
        .save_json(PRE_RECONCILE, &previous)
        .await
        .pub_result(ErrorType::Filesystem)?;
    info!("Saved the inventory to '{}'", backup.display());

    store
        .replace_all(inventory.items())
        .await
        .pub_result(ErrorType::Database)?;

    let item_count = inventory.len();
    let updated = report.updated();
    Ok(Out::new(
        format!(
            "Found sales for {updated} of {item_count} item{}",
            plural(item_count)
        ),
        ReconcileOutcome {
            updated,
            item_count,
            backup,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::decode::PlainTextExtractor;
    use crate::runs::ReconcileError;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_reconcile_command() {
        let env = TestEnv::new().await;
        env.ingest_stock().await;
        let report = env
            .write_file("sales.txt", "Weekly sales\nWidget A 12 units\nwidget b   7\n")
            .await;

        let out = reconcile(env.config(), ReconcileArgs::new(&report, None))
            .await
            .unwrap();
        let outcome = out.structure().unwrap();
        assert_eq!(outcome.updated, 2);
        assert_eq!(outcome.item_count, 3);
        assert!(outcome.backup.is_file());

        let stored = env.config().db().load_all().await.unwrap();
        let sales: Vec<u64> = stored.iter().map(|i| i.observed_sales()).collect();
        assert_eq!(sales, vec![12, 7, 0]);
    }

    #[tokio::test]
    async fn test_reconcile_empty_inventory_fails() {
        let env = TestEnv::new().await;
        let report = env.write_file("sales.txt", "Widget A 12").await;

        let err = reconcile(env.config(), ReconcileArgs::new(&report, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorType::Reconcile);
        assert!(matches!(
            err.downcast_ref::<ReconcileError>(),
            Some(ReconcileError::EmptyInventory)
        ));
        assert!(env.config().db().load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_rejects_workbook() {
        let env = TestEnv::new().await;
        env.ingest_stock().await;
        let report = env.write_file("sales.xlsx", "Widget A 12").await;

        let err = reconcile(env.config(), ReconcileArgs::new(&report, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorType::Request);
    }

    #[tokio::test]
    async fn test_reconcile_into_memory_store() {
        let env = TestEnv::new().await;
        env.ingest_stock().await;
        let store = MemoryStore::new(env.config().db().load_all().await.unwrap());

        let out = reconcile_into(
            &store,
            &env.config().backup(),
            "Gasket 3".as_bytes(),
            &PlainTextExtractor,
        )
        .await
        .unwrap();
        assert_eq!(out.structure().unwrap().updated, 1);

        let items = store.load_all().await.unwrap();
        assert_eq!(items[2].observed_sales(), 3);
        // The database is not involved
        assert_eq!(env.config().db().load_all().await.unwrap()[2].observed_sales(), 0);
    }
}
