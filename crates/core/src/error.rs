//! Error types for the tabula query builder.

use alloc::string::String;

/// Result type alias for tabula operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for query construction and dispatch.
///
/// `Usage` errors are detected on the client before anything is sent to the
/// remote side. `Remote` errors come back from the session unchanged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The builder was used in a way that can never produce a valid query.
    #[error("Usage error: {message}")]
    Usage { message: String },
    /// The remote side rejected a statement.
    #[error("Remote error: {message}")]
    Remote { message: String },
    /// Column not present in a loaded schema.
    #[error("Column {column} not found in table {table}")]
    ColumnNotFound { table: String, column: String },
    /// Local tabular data is malformed.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },
    /// The remote side answered with a result of the wrong shape.
    #[error("Unexpected result: expected {expected}, got {got}")]
    UnexpectedResult {
        expected: &'static str,
        got: &'static str,
    },
    /// Configuration could not be parsed.
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl Error {
    /// Creates a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Error::Usage {
            message: message.into(),
        }
    }

    /// Creates a remote error.
    pub fn remote(message: impl Into<String>) -> Self {
        Error::Remote {
            message: message.into(),
        }
    }

    /// Creates a column not found error.
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates an invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Error::InvalidData {
            message: message.into(),
        }
    }

    /// Creates an unexpected result error.
    pub fn unexpected_result(expected: &'static str, got: &'static str) -> Self {
        Error::UnexpectedResult { expected, got }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Returns true for errors raised on the client before any remote call.
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage { .. } | Error::ColumnNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_display() {
        let err = Error::usage("multiple context/group-by are not allowed");
        assert!(err.to_string().contains("Usage error"));

        let err = Error::column_not_found("trades", "price");
        assert_eq!(err.to_string(), "Column price not found in table trades");

        let err = Error::unexpected_result("table", "scalar");
        assert!(err.to_string().contains("expected table, got scalar"));
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::usage("x").is_usage());
        assert!(Error::column_not_found("t", "c").is_usage());
        assert!(!Error::remote("syntax error").is_usage());
    }
}
