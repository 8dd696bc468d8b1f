//! These structs provide the CLI interface for the stock CLI.

use crate::decode::DocumentKind;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// stock: reconciles a stock sheet and a sales report into one inventory.
///
/// Ingest a stock sheet (Excel, OpenDocument, CSV or TSV) to set the items and quantities on hand,
/// then reconcile a sales report (PDF or plain text) to record how many of each item sold. The
/// show command prints every item with its reorder quantity and the inventory totals as JSON.
#[derive(Debug, Parser, Clone)]
#[command(name = "stock", version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, its configuration file and an empty database.
    ///
    /// This is the first command you should run. By default the data directory is $HOME/stock,
    /// pass --stock-home or set STOCK_HOME to put it somewhere else.
    Init,
    /// Replace the inventory with the items in a stock sheet.
    ///
    /// The header row is found by skipping --header-offset rows from the top of the first sheet.
    /// Rows without an item name are dropped. The previous inventory is saved to the backups
    /// directory first.
    Ingest(IngestArgs),
    /// Record sales figures found in a sales report.
    ///
    /// Each item is looked up by its name followed by a number, e.g. "Widget A 12". Items that are
    /// not mentioned keep their previous figure.
    Reconcile(ReconcileArgs),
    /// Print every item with its derived figures and the inventory totals as JSON.
    Show,
    /// Remove a single item from the inventory.
    Delete(DeleteArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where stock data and configuration is held. Defaults to ~/stock
    #[arg(long, env = "STOCK_HOME", default_value_t = default_stock_home())]
    stock_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, stock_home: PathBuf) -> Self {
        Self {
            log_level,
            stock_home: stock_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn stock_home(&self) -> &DisplayPath {
        &self.stock_home
    }
}

/// Args for the `stock ingest` command.
#[derive(Debug, Parser, Clone)]
pub struct IngestArgs {
    /// The stock sheet to ingest.
    file: PathBuf,

    /// The number of rows above the header row. Defaults to `header_offset` in config.json.
    #[arg(long)]
    header_offset: Option<usize>,

    /// The kind of document, when it cannot be told from the file extension.
    #[arg(long)]
    format: Option<DocumentKind>,
}

impl IngestArgs {
    pub fn new(
        file: impl Into<PathBuf>,
        header_offset: Option<usize>,
        format: Option<DocumentKind>,
    ) -> Self {
        Self {
            file: file.into(),
            header_offset,
            format,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn header_offset(&self) -> Option<usize> {
        self.header_offset
    }

    pub fn format(&self) -> Option<DocumentKind> {
        self.format
    }
}

/// Args for the `stock reconcile` command.
#[derive(Debug, Parser, Clone)]
pub struct ReconcileArgs {
    /// The sales report to read.
    file: PathBuf,

    /// The kind of document, when it cannot be told from the file extension.
    #[arg(long)]
    format: Option<DocumentKind>,
}

impl ReconcileArgs {
    pub fn new(file: impl Into<PathBuf>, format: Option<DocumentKind>) -> Self {
        Self {
            file: file.into(),
            format,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn format(&self) -> Option<DocumentKind> {
        self.format
    }
}

/// Args for the `stock delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the item, as printed by `stock show`.
    id: String,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

fn default_stock_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("stock"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --stock-home or STOCK_HOME instead of relying on the default \
                stock home directory.",
            );
            PathBuf::from("stock")
        }
    })
}

/// A `PathBuf` that can be used as a clap default value.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ingest() {
        let args = Args::try_parse_from([
            "stock",
            "--stock-home",
            "/tmp/stock",
            "--log-level",
            "debug",
            "ingest",
            "sheet.dat",
            "--header-offset",
            "4",
            "--format",
            "csv",
        ])
        .unwrap();
        assert_eq!(args.common().stock_home().path(), Path::new("/tmp/stock"));
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        match args.command() {
            Command::Ingest(ingest) => {
                assert_eq!(ingest.file(), Path::new("sheet.dat"));
                assert_eq!(ingest.header_offset(), Some(4));
                assert_eq!(ingest.format(), Some(DocumentKind::Csv));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_reconcile_defaults() {
        let args = Args::try_parse_from(["stock", "reconcile", "report.pdf"]).unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
        match args.command() {
            Command::Reconcile(reconcile) => {
                assert_eq!(reconcile.file(), Path::new("report.pdf"));
                assert_eq!(reconcile.format(), None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(Args::try_parse_from(["stock", "ingest", "a", "--format", "docx"]).is_err());
    }
}
