//! Column references and filter conditions.
//!
//! Filter conditions are opaque text fragments. The compiler only ever joins
//! them with `and`, so there is no predicate AST; combinators parenthesize
//! their operands and concatenate.

use std::fmt;
use tabula_core::Value;

/// A named handle on a column of a query expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnRef {
    table: String,
    name: String,
}

impl ColumnRef {
    pub(crate) fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }

    /// Returns the column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name of the expression this column belongs to.
    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Creates an equality condition: column == value
    pub fn eq(&self, value: impl Into<Value>) -> FilterCond {
        self.compare("==", value.into())
    }

    /// Creates a not-equal condition: column != value
    pub fn ne(&self, value: impl Into<Value>) -> FilterCond {
        self.compare("!=", value.into())
    }

    /// Creates a greater-than condition: column > value
    pub fn gt(&self, value: impl Into<Value>) -> FilterCond {
        self.compare(">", value.into())
    }

    /// Creates a greater-than-or-equal condition: column >= value
    pub fn ge(&self, value: impl Into<Value>) -> FilterCond {
        self.compare(">=", value.into())
    }

    /// Creates a less-than condition: column < value
    pub fn lt(&self, value: impl Into<Value>) -> FilterCond {
        self.compare("<", value.into())
    }

    /// Creates a less-than-or-equal condition: column <= value
    pub fn le(&self, value: impl Into<Value>) -> FilterCond {
        self.compare("<=", value.into())
    }

    /// Creates an inclusive range condition: column between low:high
    pub fn between(&self, low: impl Into<Value>, high: impl Into<Value>) -> FilterCond {
        FilterCond::new(format!(
            "{} between {}:{}",
            self.name,
            low.into().to_literal(),
            high.into().to_literal()
        ))
    }

    /// Creates a membership condition: column in [v1,v2,...]
    pub fn isin<I, V>(&self, values: I) -> FilterCond
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list = values
            .into_iter()
            .map(|v| v.into().to_literal())
            .collect::<Vec<_>>()
            .join(",");
        FilterCond::new(format!("{} in [{}]", self.name, list))
    }

    /// Creates a pattern condition: column like "pattern"
    pub fn like(&self, pattern: &str) -> FilterCond {
        FilterCond::new(format!("{} like {}", self.name, Value::from(pattern).to_literal()))
    }

    /// Creates a null test.
    pub fn is_null(&self) -> FilterCond {
        FilterCond::new(format!("isNull({})", self.name))
    }

    /// Creates a not-null test.
    pub fn not_null(&self) -> FilterCond {
        FilterCond::new(format!("isValid({})", self.name))
    }

    fn compare(&self, op: &str, value: Value) -> FilterCond {
        FilterCond::new(format!("{}{}{}", self.name, op, value.to_literal()))
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A boolean expression fragment usable in `where_`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterCond(String);

impl FilterCond {
    /// Wraps raw predicate text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the predicate text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Conjunction: `(a) and (b)`
    pub fn and(&self, other: &FilterCond) -> FilterCond {
        FilterCond(format!("({}) and ({})", self.0, other.0))
    }

    /// Disjunction: `(a) or (b)`
    pub fn or(&self, other: &FilterCond) -> FilterCond {
        FilterCond(format!("({}) or ({})", self.0, other.0))
    }

    /// Negation: `not(a)`
    pub fn not(&self) -> FilterCond {
        FilterCond(format!("not({})", self.0))
    }
}

impl fmt::Display for FilterCond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FilterCond {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for FilterCond {
    fn from(text: String) -> Self {
        Self(text)
    }
}
