//! Table schema definition.

use super::column::Column;
use crate::error::{Error, Result};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// The schema of a remote table-valued expression.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSchema {
    /// Name the schema was loaded for.
    name: String,
    /// Column descriptors in remote order.
    columns: Vec<Column>,
    /// Partitioning columns for distributed tables; empty otherwise.
    partition_columns: Vec<String>,
}

impl TableSchema {
    /// Creates a new schema with the given name and columns.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.with_index(i))
            .collect();

        Self {
            name: name.into(),
            columns,
            partition_columns: Vec::new(),
        }
    }

    /// Marks the table as partitioned on the given columns.
    pub fn with_partition_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partition_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    /// Returns the number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Gets a column by name, ignoring ASCII case.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.matches(name))
    }

    /// Returns true if a column with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Returns the partitioning columns.
    #[inline]
    pub fn partition_columns(&self) -> &[String] {
        &self.partition_columns
    }

    /// Returns whether the remote table is partitioned.
    #[inline]
    pub fn is_partitioned(&self) -> bool {
        !self.partition_columns.is_empty()
    }

    /// Returns a copy of this schema under another name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: self.columns.clone(),
            partition_columns: self.partition_columns.clone(),
        }
    }

    /// Returns a copy of this schema without the given columns.
    pub fn without_columns(&self, dropped: &[String]) -> Self {
        let columns = self
            .columns
            .iter()
            .filter(|c| !dropped.iter().any(|d| c.matches(d)))
            .cloned()
            .collect();
        let mut schema = Self::new(self.name.clone(), columns);
        schema.partition_columns = self.partition_columns.clone();
        schema
    }
}

/// Returns true if `name` can be used as a remote variable name.
pub fn is_identifier(name: &str) -> bool {
    validate_identifier(name).is_ok()
}

/// Validates a name follows the remote variable naming rules.
pub fn validate_identifier(name: &str) -> Result<()> {
    let Some(first) = name.chars().next() else {
        return Err(Error::usage("Name cannot be empty"));
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(Error::usage(format!(
            "Name must start with letter or underscore: {}",
            name
        )));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::usage(format!(
            "Name contains invalid characters: {}",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;
    use alloc::vec;

    fn trades() -> TableSchema {
        TableSchema::new(
            "trades",
            vec![
                Column::new("sym", DataType::Symbol),
                Column::new("price", DataType::Double),
                Column::new("qty", DataType::Int),
            ],
        )
    }

    #[test]
    fn test_schema_columns() {
        let schema = trades();
        assert_eq!(schema.name(), "trades");
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.column_names(), vec!["sym", "price", "qty"]);
        assert_eq!(schema.get_column("QTY").map(|c| c.index()), Some(2));
        assert!(!schema.contains("volume"));
    }

    #[test]
    fn test_partitioned() {
        let schema = trades();
        assert!(!schema.is_partitioned());
        let schema = schema.with_partition_columns(["sym"]);
        assert!(schema.is_partitioned());
        assert_eq!(schema.partition_columns(), &["sym".to_string()]);
    }

    #[test]
    fn test_without_columns_reindexes() {
        let schema = trades().without_columns(&["PRICE".into()]);
        assert_eq!(schema.column_names(), vec!["sym", "qty"]);
        assert_eq!(schema.get_column("qty").map(|c| c.index()), Some(1));
    }

    #[test]
    fn test_identifier_rules() {
        assert!(is_identifier("TMP_TBL_1a2b3c4d"));
        assert!(is_identifier("_t"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("ej(a,b,`k,`k)"));
    }
}
