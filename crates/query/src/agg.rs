//! Aggregate specifications and select-list expansion.

use tabula_core::{Error, Result};

/// Which aggregate functions to apply, and to what.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AggSpec {
    /// One function applied to every selected column.
    Single(String),
    /// Several functions applied to every selected column.
    List(Vec<String>),
    /// Explicit column-or-expression to functions mapping, in order.
    Map(Vec<(String, Vec<String>)>),
}

impl AggSpec {
    /// Builds a mapping spec from `(column, functions)` entries.
    pub fn map<I, C, F, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (C, F)>,
        C: Into<String>,
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AggSpec::Map(
            entries
                .into_iter()
                .map(|(c, fs)| (c.into(), fs.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }

    /// Expands the spec over `columns` (the current select list).
    ///
    /// Sequence forms iterate column-major: for each column, every function.
    /// Columns for which `skip` returns true are left out; mapping entries
    /// name their own columns and are filtered the same way.
    pub(crate) fn expand(&self, columns: &[String], skip: impl Fn(&str) -> bool) -> Vec<String> {
        match self {
            AggSpec::Single(func) => columns
                .iter()
                .filter(|c| !skip(c.as_str()))
                .map(|c| call(func, &[c]))
                .collect(),
            AggSpec::List(funcs) => columns
                .iter()
                .filter(|c| !skip(c.as_str()))
                .flat_map(|c| funcs.iter().map(move |f| call(f, &[c])))
                .collect(),
            AggSpec::Map(entries) => entries
                .iter()
                .filter(|(c, _)| !skip(c.as_str()))
                .flat_map(|(c, funcs)| funcs.iter().map(move |f| call(f, &[c])))
                .collect(),
        }
    }

    /// Function names for two-argument aggregation. Mappings are rejected.
    pub(crate) fn functions(&self) -> Result<Vec<String>> {
        match self {
            AggSpec::Single(f) => Ok(vec![f.clone()]),
            AggSpec::List(fs) => Ok(fs.clone()),
            AggSpec::Map(_) => Err(Error::usage(
                "agg2 takes a function name or a list of function names",
            )),
        }
    }
}

impl From<&str> for AggSpec {
    fn from(func: &str) -> Self {
        AggSpec::Single(func.to_string())
    }
}

impl From<String> for AggSpec {
    fn from(func: String) -> Self {
        AggSpec::Single(func)
    }
}

impl From<Vec<&str>> for AggSpec {
    fn from(funcs: Vec<&str>) -> Self {
        AggSpec::List(funcs.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for AggSpec {
    fn from(funcs: Vec<String>) -> Self {
        AggSpec::List(funcs)
    }
}

impl<const N: usize> From<[&str; N]> for AggSpec {
    fn from(funcs: [&str; N]) -> Self {
        AggSpec::List(funcs.iter().map(|f| f.to_string()).collect())
    }
}

impl From<Vec<(&str, &str)>> for AggSpec {
    fn from(entries: Vec<(&str, &str)>) -> Self {
        AggSpec::Map(
            entries
                .into_iter()
                .map(|(c, f)| (c.to_string(), vec![f.to_string()]))
                .collect(),
        )
    }
}

impl From<Vec<(&str, Vec<&str>)>> for AggSpec {
    fn from(entries: Vec<(&str, Vec<&str>)>) -> Self {
        AggSpec::map(entries)
    }
}

/// Argument pairs for two-argument aggregates such as `wavg(x,y)`.
///
/// Built from tuples, or from nested lists whose arity is only checked when
/// the pairs are used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnPairs(Vec<Vec<String>>);

impl ColumnPairs {
    /// Returns the pairs, failing if any element is not exactly two items.
    pub(crate) fn validate(&self) -> Result<Vec<(String, String)>> {
        if let Some(bad) = self.0.iter().find(|p| p.len() != 2) {
            return Err(Error::usage(format!(
                "agg2 only accepts (x,y) pairs, got {} item(s): [{}]",
                bad.len(),
                bad.join(",")
            )));
        }
        Ok(self
            .0
            .iter()
            .map(|p| (p[0].clone(), p[1].clone()))
            .collect())
    }
}

impl<A: Into<String>, B: Into<String>> From<(A, B)> for ColumnPairs {
    fn from((x, y): (A, B)) -> Self {
        ColumnPairs(vec![vec![x.into(), y.into()]])
    }
}

impl<A: Into<String>, B: Into<String>> From<Vec<(A, B)>> for ColumnPairs {
    fn from(pairs: Vec<(A, B)>) -> Self {
        ColumnPairs(
            pairs
                .into_iter()
                .map(|(x, y)| vec![x.into(), y.into()])
                .collect(),
        )
    }
}

impl<A: Into<String>, B: Into<String>, const N: usize> From<[(A, B); N]> for ColumnPairs {
    fn from(pairs: [(A, B); N]) -> Self {
        ColumnPairs(
            pairs
                .into_iter()
                .map(|(x, y)| vec![x.into(), y.into()])
                .collect(),
        )
    }
}

impl From<Vec<Vec<&str>>> for ColumnPairs {
    fn from(items: Vec<Vec<&str>>) -> Self {
        ColumnPairs(
            items
                .into_iter()
                .map(|p| p.into_iter().map(str::to_string).collect())
                .collect(),
        )
    }
}

/// Expands two-argument aggregates func-major: for each function, every pair.
pub(crate) fn expand_pairs(funcs: &[String], pairs: &[(String, String)]) -> Vec<String> {
    funcs
        .iter()
        .flat_map(|f| pairs.iter().map(move |(x, y)| call(f, &[x, y])))
        .collect()
}

fn call(func: &str, args: &[&String]) -> String {
    let args = args.iter().map(|a| a.as_str()).collect::<Vec<_>>().join(",");
    format!("{}({})", func, args)
}
