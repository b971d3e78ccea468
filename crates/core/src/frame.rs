//! Column-major tabular data.
//!
//! `TabularData` is what gets uploaded to create a remote table from local
//! data, and what a tabular query result is converted into.

use crate::error::{Error, Result};
use crate::schema::{Column, TableSchema};
use crate::types::DataType;
use crate::value::Value;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashSet;

/// An ordered set of equally long named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TabularData {
    names: Vec<String>,
    columns: Vec<Vec<Value>>,
}

impl TabularData {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    ///
    /// Fails if a column with the same name (ignoring case) already exists or
    /// if the length differs from the existing columns.
    pub fn with_column<I, V>(mut self, name: impl Into<String>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_data("column name cannot be empty"));
        }
        if self.names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
            return Err(Error::invalid_data(format!("duplicate column: {}", name)));
        }
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if !self.columns.is_empty() && values.len() != self.num_rows() {
            return Err(Error::invalid_data(format!(
                "column {} has {} values, expected {}",
                name,
                values.len(),
                self.num_rows()
            )));
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(self)
    }

    /// Builds a table from `(name, values)` pairs.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let mut data = Self::new();
        let mut seen = HashSet::new();
        for (name, values) in columns {
            let name = name.into();
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(Error::invalid_data(format!("duplicate column: {}", name)));
            }
            data = data.with_column(name, values)?;
        }
        Ok(data)
    }

    /// Returns the column names in order.
    #[inline]
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Returns the number of columns.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.names.len()
    }

    /// Returns the number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    /// Returns true if the table has no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Gets a column by name, ignoring ASCII case.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|i| self.columns[i].as_slice())
    }

    /// Gets a single cell.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column).and_then(|c| c.get(row))
    }

    /// Infers a schema from the first non-null value of each column.
    ///
    /// Columns holding only nulls are typed `Unknown`.
    pub fn infer_schema(&self, name: &str) -> TableSchema {
        let columns = self
            .names
            .iter()
            .zip(&self.columns)
            .map(|(n, values)| {
                let data_type = values
                    .iter()
                    .find_map(Value::data_type)
                    .unwrap_or(DataType::Unknown);
                Column::new(n.to_string(), data_type)
            })
            .collect();
        TableSchema::new(name, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_build_and_access() {
        let data = TabularData::new()
            .with_column("x", [1i64, 2, 3])
            .unwrap()
            .with_column("y", [4i64, 5, 6])
            .unwrap();

        assert_eq!(data.num_columns(), 2);
        assert_eq!(data.num_rows(), 3);
        assert_eq!(data.column_names(), &["x".to_string(), "y".to_string()]);
        assert_eq!(data.value(1, "Y"), Some(&Value::Int64(5)));
        assert!(data.column("z").is_none());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = TabularData::new()
            .with_column("x", [1i64, 2, 3])
            .unwrap()
            .with_column("y", [4i64])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData { .. }));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = TabularData::from_columns(vec![
            ("a", vec![Value::Int32(1)]),
            ("A", vec![Value::Int32(2)]),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InvalidData { .. }));
    }

    #[test]
    fn test_infer_schema() {
        let data = TabularData::new()
            .with_column("sym", [Value::Null, Value::from("IBM")])
            .unwrap()
            .with_column("px", [1.5f64, 2.5])
            .unwrap()
            .with_column("note", [Value::Null, Value::Null])
            .unwrap();

        let schema = data.infer_schema("t");
        assert_eq!(schema.name(), "t");
        assert_eq!(schema.columns()[0].data_type(), DataType::String);
        assert_eq!(schema.columns()[1].data_type(), DataType::Double);
        assert_eq!(schema.columns()[2].data_type(), DataType::Unknown);
    }
}
