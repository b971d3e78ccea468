//! The remote session boundary.
//!
//! The builder never talks to the network itself. Everything it needs from the
//! remote side goes through `RemoteSession`: running compiled text, loading a
//! table schema, and uploading local data. Implementations own transport,
//! login and serialization of concurrent calls.

mod recording;

pub use recording::RecordingSession;

use tabula_core::schema::TableSchema;
use tabula_core::{Error, Result, TabularData, Value};

/// Result of running a statement remotely.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryResult {
    /// A table.
    Table(TabularData),
    /// A single value.
    Scalar(Value),
    /// A vector of values, e.g. from `exec` on one column.
    Vector(Vec<Value>),
    /// A keyed collection, e.g. regression statistics.
    Dictionary(Vec<(String, QueryResult)>),
    /// The statement produced nothing.
    Void,
}

impl QueryResult {
    /// Returns a short name of the result shape.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryResult::Table(_) => "table",
            QueryResult::Scalar(_) => "scalar",
            QueryResult::Vector(_) => "vector",
            QueryResult::Dictionary(_) => "dictionary",
            QueryResult::Void => "void",
        }
    }

    /// Unwraps a tabular result.
    pub fn into_table(self) -> Result<TabularData> {
        match self {
            QueryResult::Table(t) => Ok(t),
            other => Err(Error::unexpected_result("table", other.kind())),
        }
    }

    /// Unwraps a scalar result.
    pub fn into_scalar(self) -> Result<Value> {
        match self {
            QueryResult::Scalar(v) => Ok(v),
            other => Err(Error::unexpected_result("scalar", other.kind())),
        }
    }
}

/// A connection to the remote analytical engine.
///
/// Calls block until the remote side answers. Implementations must be safe
/// to share between threads; the builder makes no assumption that parallel
/// calls run concurrently.
pub trait RemoteSession: Send + Sync {
    /// Runs a statement. Rejections come back as `Error::Remote`.
    fn execute(&self, script: &str) -> Result<QueryResult>;

    /// Loads the column descriptors of a table-valued expression.
    fn load_schema(&self, table: &str) -> Result<TableSchema>;

    /// Uploads local data as a remote table variable named `name`.
    fn upload_table(&self, name: &str, data: &TabularData) -> Result<()>;
}
