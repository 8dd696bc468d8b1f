pub mod args;
mod backup;
pub mod commands;
mod config;
mod db;
pub mod decode;
mod error;
pub mod ingest;
pub mod inventory;
pub mod model;
pub mod reconcile;
pub mod runs;
pub mod summary;
mod utils;


pub use backup::Backup;
pub use config::Config;
pub use db::{MemoryStore, Store};
pub use error::{Error, ErrorType, Result};

pub(crate) use error::Res;
