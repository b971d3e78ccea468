//! Data type definitions for remote tables.
//!
//! This module defines the column types reported by the remote side when a
//! table schema is loaded, and the types inferred for locally built data.

/// Column types understood by the remote engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean type (true/false)
    Bool,
    /// 8-bit character
    Char,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// Calendar date
    Date,
    /// Calendar month
    Month,
    /// Time of day with millisecond precision
    Time,
    /// Date and time with second precision
    DateTime,
    /// Date and time with millisecond precision
    Timestamp,
    /// Date and time with nanosecond precision
    NanoTimestamp,
    /// 32-bit floating point number
    Float,
    /// 64-bit floating point number
    Double,
    /// Dictionary-encoded string
    Symbol,
    /// UTF-8 string
    String,
    /// Binary large object
    Blob,
    /// A type name this client does not know about.
    Unknown,
}

impl DataType {
    /// Parses a remote type name such as `INT` or `SYMBOL`.
    ///
    /// Matching is case-insensitive; unrecognised names map to `Unknown`.
    pub fn from_type_name(name: &str) -> Self {
        let name = name.trim();
        let known = [
            ("BOOL", DataType::Bool),
            ("CHAR", DataType::Char),
            ("SHORT", DataType::Short),
            ("INT", DataType::Int),
            ("LONG", DataType::Long),
            ("DATE", DataType::Date),
            ("MONTH", DataType::Month),
            ("TIME", DataType::Time),
            ("DATETIME", DataType::DateTime),
            ("TIMESTAMP", DataType::Timestamp),
            ("NANOTIMESTAMP", DataType::NanoTimestamp),
            ("FLOAT", DataType::Float),
            ("DOUBLE", DataType::Double),
            ("SYMBOL", DataType::Symbol),
            ("STRING", DataType::String),
            ("BLOB", DataType::Blob),
        ];
        known
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, dt)| *dt)
            .unwrap_or(DataType::Unknown)
    }

    /// Returns the canonical remote type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::Bool => "BOOL",
            DataType::Char => "CHAR",
            DataType::Short => "SHORT",
            DataType::Int => "INT",
            DataType::Long => "LONG",
            DataType::Date => "DATE",
            DataType::Month => "MONTH",
            DataType::Time => "TIME",
            DataType::DateTime => "DATETIME",
            DataType::Timestamp => "TIMESTAMP",
            DataType::NanoTimestamp => "NANOTIMESTAMP",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Symbol => "SYMBOL",
            DataType::String => "STRING",
            DataType::Blob => "BLOB",
            DataType::Unknown => "UNKNOWN",
        }
    }

    /// Returns whether values of this type are numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Char
                | DataType::Short
                | DataType::Int
                | DataType::Long
                | DataType::Float
                | DataType::Double
        )
    }

    /// Returns whether values of this type are rendered as quoted literals.
    pub fn is_textual(&self) -> bool {
        matches!(self, DataType::Symbol | DataType::String | DataType::Blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_type_name() {
        assert_eq!(DataType::from_type_name("INT"), DataType::Int);
        assert_eq!(DataType::from_type_name("symbol"), DataType::Symbol);
        assert_eq!(DataType::from_type_name(" Double "), DataType::Double);
        assert_eq!(DataType::from_type_name("DECIMAL128"), DataType::Unknown);
    }

    #[test]
    fn test_type_name_round_trip() {
        for dt in [DataType::Bool, DataType::Long, DataType::Timestamp, DataType::Blob] {
            assert_eq!(DataType::from_type_name(dt.type_name()), dt);
        }
    }

    #[test]
    fn test_classification() {
        assert!(DataType::Int.is_numeric());
        assert!(DataType::Double.is_numeric());
        assert!(!DataType::Symbol.is_numeric());
        assert!(DataType::Symbol.is_textual());
        assert!(DataType::String.is_textual());
        assert!(!DataType::Date.is_textual());
    }
}
