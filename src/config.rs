//! Configuration file handling for stock.
//!
//! The configuration file is stored at `$STOCK_HOME/config.json`. It holds the backup settings,
//! the header offset and column aliases used when ingesting stock sheets, and the thresholds used
//! for the derived reorder and low-stock figures.

use crate::backup::Backup;
use crate::db::Db;
use crate::error::{ErrorType, IntoResult};
use crate::model::{ColumnAliases, ItemDefaults, DEFAULT_CATEGORY};
use crate::summary::{Thresholds, LOW_STOCK_THRESHOLD, REORDER_MULTIPLIER};
use crate::{utils, Res, Result};
use anyhow::{bail, ensure, Context};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "stock";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const STOCK_SQLITE: &str = "stock.sqlite";

/// An opened stock home directory: the settings from `config.json`, the locations of everything
/// else in the directory and an open database.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the data directory, its `.backups` subdirectory, an initial `config.json` holding
    /// default settings and an empty SQLite database.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/stock`
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or if `dir` has already been initialized.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::create_inner(dir.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(maybe_relative: PathBuf) -> Res<Self> {
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the stock home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "The stock home at '{}' has already been initialized",
                root.display()
            )
        }
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let sqlite_path = root.join(STOCK_SQLITE);
        let db = Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    /// Opens a stock home directory created by `create`. The database schema is migrated if it
    /// was written by an older version.
    pub async fn load(stock_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(stock_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Stock home is missing, have you run 'stock init'?")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let backups = root.join(BACKUPS);
        if !backups.is_dir() {
            bail!("The backups directory is missing '{}'", backups.display())
        }

        let sqlite_path = root.join(STOCK_SQLITE);
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// The number of rows above the header row in stock sheets, used when `ingest` is not given
    /// one explicitly.
    pub fn header_offset(&self) -> usize {
        self.config_file.header_offset
    }

    pub fn column_aliases(&self) -> &ColumnAliases {
        &self.config_file.columns
    }

    pub fn item_defaults(&self) -> ItemDefaults {
        ItemDefaults::new(self.config_file.default_category.as_str())
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(
            self.config_file.reorder_multiplier,
            self.config_file.low_stock_threshold,
        )
    }

    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// The contents of `config.json`. Every setting except `app_name` may be left out. Decimal
/// settings are written as strings.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "stock",
///   "config_version": 1,
///   "backup_copies": 5,
///   "header_offset": 4,
///   "default_category": "General",
///   "reorder_multiplier": "1.5",
///   "low_stock_threshold": "5",
///   "columns": {
///     "name": ["Item Name", "项目名称", "Name"]
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
struct ConfigFile {
    /// Application name, should always be "stock"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of backup copies to keep for each kind of backup
    backup_copies: u32,

    /// Rows above the header row in stock sheets
    header_offset: usize,

    /// Category given to items whose row has none
    default_category: String,

    reorder_multiplier: Decimal,

    low_stock_threshold: Decimal,

    /// Header labels recognized for each item field, in order of preference
    columns: ColumnAliases,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
            header_offset: 0,
            default_category: DEFAULT_CATEGORY.to_string(),
            reorder_multiplier: REORDER_MULTIPLIER,
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            columns: ColumnAliases::default(),
        }
    }
}

impl ConfigFile {
    /// Reads and validates `path`. Fails if the file belongs to another app or was written by a
    /// newer version of this one.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.config_version <= CONFIG_VERSION,
            "The config file version {} is newer than this program supports ({})",
            config.config_version,
            CONFIG_VERSION
        );
        ensure!(config.backup_copies > 0, "backup_copies must be at least 1");
        ensure!(
            config.reorder_multiplier >= Decimal::ZERO,
            "reorder_multiplier cannot be negative, got {}",
            config.reorder_multiplier
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let json = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, json).await
    }
}
