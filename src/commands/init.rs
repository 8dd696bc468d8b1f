use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the data directory with an initial `config.json`, a `.backups` directory and an empty
/// database.
///
/// # Arguments
/// - `stock_home` - The directory that will be the root of data directory, e.g. `$HOME/stock`
///
/// # Errors
/// - Returns an error if any file operations fail or if the directory was already initialized.
pub async fn init(stock_home: &Path) -> Result<Out<()>> {
    let config = Config::create(stock_home).await?;
    Ok(format!(
        "Successfully created the stock directory at '{}'",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorType;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("stock");
        let out = init(&home).await.unwrap();
        assert!(out.message().contains("Successfully created"));
        assert!(home.join("config.json").is_file());

        let err = init(&home).await.unwrap_err();
        assert_eq!(err.kind(), ErrorType::Config);
    }
}
