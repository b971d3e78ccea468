//! Column descriptors for remote table schemas.

use crate::types::DataType;
use alloc::string::String;

/// A column descriptor as reported by a schema query.
#[derive(Clone, Debug)]
pub struct Column {
    /// Column name.
    name: String,
    /// Data type of the column.
    data_type: DataType,
    /// Column position in the table (0-based).
    index: usize,
}

impl Column {
    /// Creates a new column descriptor.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            index: 0,
        }
    }

    /// Sets the column index.
    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Returns the column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the data type.
    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns the column index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Remote column names are case-insensitive.
    #[inline]
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.data_type == other.data_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_new() {
        let col = Column::new("sym", DataType::Symbol);
        assert_eq!(col.name(), "sym");
        assert_eq!(col.data_type(), DataType::Symbol);
        assert_eq!(col.index(), 0);
    }

    #[test]
    fn test_column_matches_case_insensitively() {
        let col = Column::new("Price", DataType::Double);
        assert!(col.matches("price"));
        assert!(col.matches("PRICE"));
        assert!(!col.matches("prices"));
    }
}
