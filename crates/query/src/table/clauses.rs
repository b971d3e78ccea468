//! Clause state carried by a query expression.

use tabula_core::{Error, Result};

/// The projection of a query expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The wildcard `*`.
    All,
    /// An ordered list of columns or expressions.
    Columns(Vec<String>),
}

impl Selection {
    /// A lone `"*"` becomes the wildcard; anything else is kept in order.
    pub(crate) fn from_names(names: Vec<String>) -> Self {
        if names.len() == 1 && names[0].trim() == "*" {
            Selection::All
        } else {
            Selection::Columns(names)
        }
    }

    /// Renders the select list. An empty column list cannot be compiled.
    pub(crate) fn render(&self) -> Result<String> {
        match self {
            Selection::All => Ok("*".to_string()),
            Selection::Columns(cols) if cols.is_empty() => {
                Err(Error::usage("select list is empty"))
            }
            Selection::Columns(cols) => Ok(cols.join(",")),
        }
    }
}

/// Grouping discipline of a query expression.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Partition {
    #[default]
    None,
    /// `group by`: one output row per group.
    GroupBy(Vec<String>),
    /// `context by`: row-preserving partitioned evaluation.
    ContextBy(Vec<String>),
}

impl Partition {
    /// Returns the partition keys, empty for `None`.
    pub fn keys(&self) -> &[String] {
        match self {
            Partition::None => &[],
            Partition::GroupBy(keys) | Partition::ContextBy(keys) => keys,
        }
    }

    /// Returns the keys if this is a context-by partition.
    pub(crate) fn context_keys(&self) -> Option<&[String]> {
        match self {
            Partition::ContextBy(keys) => Some(keys),
            _ => None,
        }
    }
}

/// The operand names of a join-derived expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinSources {
    pub left: String,
    pub right: String,
}

/// Every pending clause of one query expression.
///
/// Cloning deep-copies all clause collections, so a derived expression never
/// shares storage with its parent.
#[derive(Clone, Debug)]
pub(crate) struct Clauses {
    pub select: Selection,
    pub filters: Vec<String>,
    pub sort: Vec<String>,
    pub top: Option<usize>,
    pub having: Option<String>,
    pub partition: Partition,
    pub join: Option<JoinSources>,
    pub merge_for_update: bool,
}

impl Clauses {
    pub fn new(select: Selection) -> Self {
        Self {
            select,
            filters: Vec::new(),
            sort: Vec::new(),
            top: None,
            having: None,
            partition: Partition::None,
            join: None,
            merge_for_update: false,
        }
    }
}
