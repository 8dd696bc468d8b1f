//! One handler per `stock` subcommand. Each loads what it needs from `Config`, does its work and
//! returns an `Out`.

mod delete;
mod ingest;
mod init;
mod reconcile;
mod show;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{info, warn};

pub use delete::delete;
pub use ingest::{ingest, IngestOutcome};
pub use init::init;
pub use reconcile::{reconcile, ReconcileOutcome};
pub use show::show;

#[cfg(test)]
pub(crate) use ingest::{ingest_into, Sheet};
#[cfg(test)]
pub(crate) use reconcile::reconcile_into;

/// What a command hands back to `main`: a line for the user and, for commands that produce data,
/// a serializable payload.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    message: String,
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(message: S) -> Self {
        Self {
            message: message.into(),
            structure: None,
        }
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    pub fn new(message: impl Into<String>, structure: T) -> Self {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Logs the message and writes the payload, if there is one, to stdout as pretty JSON so that
    /// it can be piped into other tools.
    pub fn print(&self) {
        info!("{}", self.message);
        let Some(structure) = &self.structure else {
            return;
        };
        match serde_json::to_string_pretty(structure) {
            Ok(json) => println!("{json}"),
            Err(e) => warn!("Unable to serialize the command output: {e}"),
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
