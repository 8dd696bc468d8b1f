//! Ingestion and reconciliation runs: a document collaborator followed by the engine, applied to
//! an inventory so that a failed run leaves it exactly as it was.

use crate::decode::{ExtractionError, SpreadsheetDecoder, TextExtractor};
use crate::ingest::{ingest, IngestError};
use crate::inventory::Inventory;
use crate::model::{ColumnAliases, ItemDefaults};
use crate::reconcile::{reconcile, ReconcileReport};
use tracing::{debug, warn};

/// The reasons a reconciliation run fails. A failed run applies no sales figures at all.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Sales can only be reconciled against an inventory that has been ingested first.
    #[error("The inventory is empty, ingest a stock sheet before reconciling sales")]
    EmptyInventory,

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Decodes a stock sheet and, if every step succeeds, replaces the contents of `inventory` with
/// the items found in it. Returns the number of items now in the inventory.
pub fn ingest_document(
    inventory: &mut Inventory,
    bytes: &[u8],
    decoder: &dyn SpreadsheetDecoder,
    header_offset: usize,
    columns: &ColumnAliases,
    defaults: &ItemDefaults,
) -> Result<usize, IngestError> {
    let grid = decoder.decode(bytes)?;
    let items = ingest(&grid, header_offset, columns, defaults)?;
    if items.is_empty() {
        warn!(
            "No row of the document has an item name, check the header offset ({header_offset}) \
            and the column aliases"
        );
    }
    inventory.replace_all(items);
    Ok(inventory.len())
}

/// Extracts the full text of a sales report and reconciles `inventory` against it.
///
/// The inventory must not be empty. Text extraction finishes before any item is looked at, so an
/// extraction failure leaves every item unchanged.
pub fn reconcile_document(
    inventory: &mut Inventory,
    bytes: &[u8],
    extractor: &dyn TextExtractor,
) -> Result<ReconcileReport, ReconcileError> {
    if inventory.is_empty() {
        return Err(ReconcileError::EmptyInventory);
    }
    let text = extractor.extract(bytes)?;
    debug!("Reconciling {} item(s) against {} chars", inventory.len(), text.len());
    Ok(reconcile(inventory, &text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{CsvDecoder, PlainTextExtractor};

    const STOCK: &str = "Item Name,Category,Qty Available,Sales Price,Cost Price\n\
        Widget A,Tools,4,10.00,6.00\n\
        Widget B,Tools,20,5.00,2.50\n";

    fn ingested() -> Inventory {
        let mut inventory = Inventory::default();
        ingest_document(
            &mut inventory,
            STOCK.as_bytes(),
            &CsvDecoder::default(),
            0,
            &ColumnAliases::default(),
            &ItemDefaults::default(),
        )
        .unwrap();
        inventory
    }

    #[test]
    fn test_ingest_replaces_inventory() {
        let mut inventory = ingested();
        let count = ingest_document(
            &mut inventory,
            b"Name\nGasket\n",
            &CsvDecoder::default(),
            0,
            &ColumnAliases::default(),
            &ItemDefaults::default(),
        )
        .unwrap();
        assert_eq!(count, 1);
        assert_eq!(inventory.items()[0].name(), "Gasket");
    }

    #[test]
    fn test_failed_ingest_keeps_inventory() {
        let mut inventory = ingested();
        let before = inventory.clone();
        let err = ingest_document(
            &mut inventory,
            b"Name\n",
            &CsvDecoder::default(),
            0,
            &ColumnAliases::default(),
            &ItemDefaults::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::EmptyDocument { .. }));
        assert_eq!(inventory, before);
    }

    #[test]
    fn test_reconcile_document() {
        let mut inventory = ingested();
        let report = reconcile_document(
            &mut inventory,
            b"Widget A 12 more text Widget B 7",
            &PlainTextExtractor,
        )
        .unwrap();
        assert_eq!(report.updated(), 2);
        assert_eq!(inventory.items()[0].observed_sales(), 12);
        assert_eq!(inventory.items()[1].observed_sales(), 7);
    }

    #[test]
    fn test_reconcile_empty_inventory_is_rejected() {
        let mut inventory = Inventory::default();
        let err = reconcile_document(&mut inventory, b"Widget A 12", &PlainTextExtractor)
            .unwrap_err();
        assert!(matches!(err, ReconcileError::EmptyInventory));
    }

    #[test]
    fn test_extraction_failure_changes_nothing() {
        let mut inventory = ingested();
        reconcile_document(&mut inventory, b"Widget A 12", &PlainTextExtractor).unwrap();
        let before = inventory.clone();
        let err = reconcile_document(&mut inventory, b"\xFF", &PlainTextExtractor).unwrap_err();
        assert!(matches!(err, ReconcileError::Extraction(_)));
        assert_eq!(inventory, before);
    }
}
