use crate::args::IngestArgs;
use crate::backup::{Backup, PRE_INGEST};
use crate::commands::{plural, Out};
use crate::db::Store;
use crate::decode::{DocumentKind, SpreadsheetDecoder};
use crate::error::{ErrorType, IntoResult};
use crate::inventory::Inventory;
use crate::model::{ColumnAliases, ItemDefaults};
use crate::runs::ingest_document;
use crate::{utils, Config, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// What an ingestion run left behind.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    /// The number of items in the inventory after the run.
    pub item_count: usize,
    /// Where the previous inventory was saved, if there was one.
    pub backup: Option<PathBuf>,
}

/// Reads the stock sheet at `args.file()` and replaces the stored inventory with the items found
/// in it.
///
/// The previous inventory, if any, is saved to the backups directory before it is replaced. If the
/// sheet cannot be ingested the stored inventory is left untouched.
pub async fn ingest(config: Config, args: IngestArgs) -> Result<Out<IngestOutcome>> {
    let kind = match args.format() {
        Some(kind) => kind,
        None => DocumentKind::from_path(args.file()).pub_result(ErrorType::Request)?,
    };
    let decoder = kind.spreadsheet_decoder().pub_result(ErrorType::Request)?;
    let bytes = utils::read_bytes(args.file())
        .await
        .pub_result(ErrorType::Filesystem)?;
    let header_offset = args.header_offset().unwrap_or(config.header_offset());
    debug!(
        "Ingesting '{}' as {kind} with header offset {header_offset}",
        args.file().display()
    );

    let defaults = config.item_defaults();
    let sheet = Sheet {
        bytes: &bytes,
        decoder: decoder.as_ref(),
        header_offset,
        columns: config.column_aliases(),
        defaults: &defaults,
    };
    ingest_into(config.db(), &config.backup(), sheet).await
}

/// A stock sheet together with everything needed to read it.
pub(crate) struct Sheet<'a> {
    pub(crate) bytes: &'a [u8],
    pub(crate) decoder: &'a dyn SpreadsheetDecoder,
    pub(crate) header_offset: usize,
    pub(crate) columns: &'a ColumnAliases,
    pub(crate) defaults: &'a ItemDefaults,
}

pub(crate) async fn ingest_into(
    store: &dyn Store,
    backup: &Backup,
    sheet: Sheet<'_>,
) -> Result<Out<IngestOutcome>> {
    let previous = store.load_all().await.pub_result(ErrorType::Database)?;
    let mut inventory = Inventory::new(previous.clone());

    let item_count = ingest_document(
        &mut inventory,
        sheet.bytes,
        sheet.decoder,
        sheet.header_offset,
        sheet.columns,
        sheet.defaults,
    )
    .pub_result(ErrorType::Ingest)?;

    let backup = if previous.is_empty() {
        None
    } else {
        let path = backup
            .save_json(PRE_INGEST, &previous)
            .await
            .pub_result(ErrorType::Filesystem)?;
        info!("Saved the previous inventory to '{}'", path.display());
        Some(path)
    };

    store
        .replace_all(inventory.items())
        .await
        .pub_result(ErrorType::Database)?;

    Ok(Out::new(
        format!("Ingested {item_count} item{}", plural(item_count)),
        IngestOutcome { item_count, backup },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::decode::CsvDecoder;
    use crate::ingest::IngestError;
    use crate::test::{TestEnv, STOCK_CSV};

    #[tokio::test]
    async fn test_ingest_command() {
        let env = TestEnv::new().await;
        let file = env.write_file("stock.csv", STOCK_CSV).await;

        let out = ingest(env.config(), IngestArgs::new(&file, None, None))
            .await
            .unwrap();
        let outcome = out.structure().unwrap();
        assert_eq!(outcome.item_count, 3);
        assert!(outcome.backup.is_none());

        let stored = env.config().db().load_all().await.unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0].name(), "Widget A");

        // A second run backs up the first inventory
        let out = ingest(env.config(), IngestArgs::new(&file, None, None))
            .await
            .unwrap();
        assert!(out.structure().unwrap().backup.as_ref().unwrap().is_file());
    }

    #[tokio::test]
    async fn test_ingest_with_header_offset() {
        let env = TestEnv::new().await;
        let contents = format!("Weekly stock take\nStore 12,,\n{STOCK_CSV}");
        let file = env.write_file("stock.csv", &contents).await;

        let out = ingest(env.config(), IngestArgs::new(&file, Some(2), None))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().item_count, 3);
    }

    #[tokio::test]
    async fn test_ingest_unknown_extension() {
        let env = TestEnv::new().await;
        let file = env.write_file("stock.dat", STOCK_CSV).await;

        let err = ingest(env.config(), IngestArgs::new(&file, None, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorType::Request);

        let out = ingest(
            env.config(),
            IngestArgs::new(&file, None, Some(DocumentKind::Csv)),
        )
        .await
        .unwrap();
        assert_eq!(out.structure().unwrap().item_count, 3);
    }

    #[tokio::test]
    async fn test_failed_ingest_keeps_stored_inventory() {
        let env = TestEnv::new().await;
        env.ingest_stock().await;
        let before = env.config().db().load_all().await.unwrap();

        let file = env.write_file("empty.csv", "").await;
        let err = ingest(env.config(), IngestArgs::new(&file, None, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorType::Ingest);
        assert!(matches!(
            err.downcast_ref::<IngestError>(),
            Some(IngestError::EmptyDocument { .. })
        ));
        assert_eq!(env.config().db().load_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_ingest_into_memory_store() {
        let env = TestEnv::new().await;
        let store = MemoryStore::default();
        let sheet = Sheet {
            bytes: b"Name,Qty\nBolt,9\nUnknown,1\n,4\n",
            decoder: &CsvDecoder::default(),
            header_offset: 0,
            columns: &ColumnAliases::default(),
            defaults: &ItemDefaults::new("Misc"),
        };

        let out = ingest_into(&store, &env.config().backup(), sheet)
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().item_count, 1);

        let items = store.load_all().await.unwrap();
        assert_eq!(items[0].name(), "Bolt");
        assert_eq!(items[0].category(), "Misc");
    }
}
