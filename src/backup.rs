//! Snapshots of the stored inventory, taken before a run overwrites it.

use crate::{utils, Config, Res};
use anyhow::Context;
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix for the snapshot taken before a stock sheet replaces the inventory.
pub const PRE_INGEST: &str = "pre-ingest";

/// Prefix for the snapshot taken before sales figures are reconciled into the inventory.
pub const PRE_RECONCILE: &str = "pre-reconcile";

const EXTENSION: &str = "json";

/// Writes and rotates backup files in `$STOCK_HOME/.backups`.
///
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    pub fn new(config: &Config) -> Self {
        Self::from_parts(config.backups(), config.backup_copies())
    }

    fn from_parts(backups_dir: &Path, backup_copies: u32) -> Self {
        Self {
            backups_dir: backups_dir.to_path_buf(),
            backup_copies,
        }
    }

    /// Saves `data` as a pretty-printed JSON file named `{prefix}.YYYY-MM-DD-NNN.json`, where NNN
    /// counts up within the day, then deletes the oldest files with the same prefix until only
    /// `backup_copies` remain. The new file is always kept, even if `backup_copies` is zero.
    ///
    /// Returns the path to the created backup file.
    pub(crate) async fn save_json<T>(&self, prefix: &str, data: &T) -> Res<PathBuf>
    where
        T: Serialize + ?Sized,
    {
        let date = Local::now().format("%Y-%m-%d").to_string();
        let seq = self.next_sequence_number(prefix, &date).await?;
        let path = self
            .backups_dir
            .join(format!("{prefix}.{date}-{seq:03}.{EXTENSION}"));

        let json = serde_json::to_string_pretty(data)
            .with_context(|| format!("Failed to serialize the {prefix} backup"))?;
        utils::write(&path, json).await?;
        debug!("Wrote backup {}", path.display());

        self.rotate(prefix).await?;
        Ok(path)
    }

    async fn backup_names(&self, prefix: &str) -> Res<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_backup_file(&name, prefix) {
                names.push(name);
            }
        }
        Ok(names)
    }

    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Res<u32> {
        let max_seq = self
            .backup_names(prefix)
            .await?
            .iter()
            .filter_map(|name| parse_sequence_number(name, prefix, date))
            .max()
            .unwrap_or(0);
        Ok(max_seq + 1)
    }

    async fn rotate(&self, prefix: &str) -> Res<()> {
        let mut dated: Vec<((String, u32), String)> = self
            .backup_names(prefix)
            .await?
            .into_iter()
            .filter_map(|name| Some((parse_date_and_sequence(&name, prefix)?, name)))
            .collect();
        dated.sort();

        let keep = self.backup_copies.max(1) as usize;
        let to_delete = dated.len().saturating_sub(keep);
        for (_, name) in dated.into_iter().take(to_delete) {
            let path = self.backups_dir.join(&name);
            utils::remove(&path).await?;
            debug!("Rotated out backup {}", path.display());
        }
        Ok(())
    }
}

/// Parses NNN out of `{prefix}.{date}-NNN.json`.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    filename
        .strip_prefix(prefix)?
        .strip_prefix('.')?
        .strip_prefix(date)?
        .strip_prefix('-')?
        .strip_suffix(&format!(".{EXTENSION}"))?
        .parse()
        .ok()
}

/// Parses the date and NNN out of `{prefix}.{date}-NNN.json`, in the order backups were taken.
fn parse_date_and_sequence(filename: &str, prefix: &str) -> Option<(String, u32)> {
    let (date, seq) = filename
        .strip_prefix(prefix)?
        .strip_prefix('.')?
        .strip_suffix(&format!(".{EXTENSION}"))?
        .rsplit_once('-')?;
    Some((date.to_string(), seq.parse().ok()?))
}

fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(&format!(".{EXTENSION}"))
}
