//! Error types shared across the crate.
//!
//! Internally, functions return `Res<T>` which is an `anyhow` result. At the public boundary, the
//! command handlers convert these into `Result<T>` which carries an `ErrorType` so that callers
//! can report a structured outcome rather than an opaque message.

use serde::Serialize;
use std::fmt::{Debug, Display, Formatter};

/// The internal result type.
pub(crate) type Res<T> = anyhow::Result<T>;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of a failure, used when reporting the outcome of a command.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The home directory or `config.json` could not be created or loaded.
    Config,
    /// The persistence store failed.
    Database,
    /// A stock sheet could not be ingested.
    Ingest,
    /// A sales report could not be reconciled.
    Reconcile,
    /// A file could not be read or written.
    Filesystem,
    /// The request itself was invalid, e.g. an unknown item id.
    Request,
}

serde_plain::derive_display_from_serialize!(ErrorType);

/// A failure reported at the public boundary.
pub struct Error {
    kind: ErrorType,
    source: anyhow::Error,
}

impl Error {
    pub fn new(kind: ErrorType, source: impl Into<anyhow::Error>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorType {
        self.kind
    }

    /// The full chain of context messages, outermost first.
    pub fn message(&self) -> String {
        format!("{:#}", self.source)
    }

    /// Returns the underlying error if it is of type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Display + Debug + Send + Sync + 'static,
    {
        self.source.downcast_ref::<E>()
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.kind, self.source)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:#}", self.kind, self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

/// Tags an internal result with an `ErrorType` and converts it to the public `Result`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, kind: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, kind: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(kind, e))
    }
}
