//! Join construction.
//!
//! A join produces a new expression whose source is the join function call,
//! e.g. `ej(trades,quotes,`sym,`sym)`. Both operands must have known schemas
//! first; for plain key joins the joined schema is derived locally.

use crate::agg::AggSpec;
use crate::args::IntoNames;
use crate::table::{JoinSources, Selection, Table};
use std::str::FromStr;
use tabula_core::schema::{is_identifier, Column, TableSchema};
use tabula_core::{Error, Result};

/// Join flavor of `merge`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JoinHow {
    #[default]
    Inner,
    Left,
    /// Emitted as a left join with the operands swapped.
    Right,
    Outer,
}

impl JoinHow {
    fn function(self) -> &'static str {
        match self {
            JoinHow::Inner => "ej",
            JoinHow::Left | JoinHow::Right => "lj",
            JoinHow::Outer => "fj",
        }
    }
}

impl FromStr for JoinHow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "inner" => Ok(JoinHow::Inner),
            "left" => Ok(JoinHow::Left),
            "right" => Ok(JoinHow::Right),
            "outer" => Ok(JoinHow::Outer),
            other => Err(Error::usage(format!("unknown join type: {}", other))),
        }
    }
}

/// Join key specification.
///
/// `on` names keys shared by both sides and wins over the per-side lists.
/// When only one side is given, the other side uses the same names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JoinKeys {
    on: Option<Vec<String>>,
    left_on: Option<Vec<String>>,
    right_on: Option<Vec<String>>,
}

impl JoinKeys {
    /// No keys yet; resolving fails until some are set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys with the same names on both sides.
    pub fn on(keys: impl IntoNames) -> Self {
        Self {
            on: Some(keys.into_names()),
            ..Self::default()
        }
    }

    /// Keys named differently on each side, matched by position.
    pub fn sides(left: impl IntoNames, right: impl IntoNames) -> Self {
        Self::new().left_on(left).right_on(right)
    }

    pub fn left_on(mut self, keys: impl IntoNames) -> Self {
        self.left_on = Some(keys.into_names());
        self
    }

    pub fn right_on(mut self, keys: impl IntoNames) -> Self {
        self.right_on = Some(keys.into_names());
        self
    }

    fn swapped(&self) -> Self {
        Self {
            on: self.on.clone(),
            left_on: self.right_on.clone(),
            right_on: self.left_on.clone(),
        }
    }

    /// Resolves to `(left keys, right keys)` of equal, non-zero length.
    pub(crate) fn resolve(&self) -> Result<(Vec<String>, Vec<String>)> {
        let (left, right) = match (&self.on, &self.left_on, &self.right_on) {
            (Some(on), _, _) => (on.clone(), on.clone()),
            (None, None, None) => {
                return Err(Error::usage(
                    "at least one of on, left_on, right_on must be present",
                ))
            }
            (None, Some(l), Some(r)) if l.len() != r.len() => {
                return Err(Error::usage(format!(
                    "left_on has {} key(s) but right_on has {}",
                    l.len(),
                    r.len()
                )))
            }
            (None, Some(l), Some(r)) => (l.clone(), r.clone()),
            (None, Some(keys), None) | (None, None, Some(keys)) => (keys.clone(), keys.clone()),
        };
        if left.is_empty() {
            return Err(Error::usage("join keys cannot be empty"));
        }
        Ok((left, right))
    }
}

/// Options of `merge`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub how: JoinHow,
    pub keys: JoinKeys,
    /// Emit the sorted variant (`sej`, `slj`). Ignored for outer joins.
    pub sort: bool,
    /// Mark the result as the source of an update-through-join.
    pub merge_for_update: bool,
}

impl MergeOptions {
    pub fn new(keys: JoinKeys) -> Self {
        Self {
            keys,
            ..Self::default()
        }
    }

    /// Shorthand for keys shared by both sides.
    pub fn on(keys: impl IntoNames) -> Self {
        Self::new(JoinKeys::on(keys))
    }

    pub fn how(mut self, how: JoinHow) -> Self {
        self.how = how;
        self
    }

    pub fn sorted(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    pub fn for_update(mut self, enabled: bool) -> Self {
        self.merge_for_update = enabled;
        self
    }
}

/// A window join: for each left row, aggregates right rows whose last key
/// falls within `[key + lower, key + upper]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowJoin {
    keys: JoinKeys,
    lower: i64,
    upper: i64,
    aggs: AggSpec,
    prevailing: bool,
}

impl WindowJoin {
    pub fn new(keys: JoinKeys, lower: i64, upper: i64, aggs: impl Into<AggSpec>) -> Self {
        Self {
            keys,
            lower,
            upper,
            aggs: aggs.into(),
            prevailing: false,
        }
    }

    /// Use the prevailing window join (`pwj`).
    pub fn prevailing(mut self, prevailing: bool) -> Self {
        self.prevailing = prevailing;
        self
    }

    fn render_aggs(&self) -> Result<String> {
        let aggs = match &self.aggs {
            AggSpec::Single(f) if !f.trim().is_empty() => f.clone(),
            AggSpec::List(fs) if !fs.is_empty() => format!("[{}]", fs.join(",")),
            AggSpec::Map(_) => {
                return Err(Error::usage("window join aggregates must be expressions"))
            }
            _ => return Err(Error::usage("window join needs at least one aggregate")),
        };
        Ok(format!("<{}>", aggs))
    }
}

fn symbols(keys: &[String]) -> String {
    keys.iter().map(|k| format!("`{}", k)).collect()
}

/// Derives the schema of a key join: left columns, then right columns.
///
/// A right key column with the same name as its left key is merged into the
/// left one. Other right columns clashing with a left column are prefixed
/// with the right source name.
fn joined_schema(
    source: &str,
    left: &TableSchema,
    right: &TableSchema,
    right_name: &str,
    left_keys: &[String],
    right_keys: &[String],
) -> Option<TableSchema> {
    if !is_identifier(right_name) {
        return None;
    }
    let mut columns: Vec<Column> = left.columns().to_vec();
    for col in right.columns() {
        let merged = right_keys
            .iter()
            .zip(left_keys)
            .any(|(r, l)| col.matches(r) && r.eq_ignore_ascii_case(l));
        if merged {
            continue;
        }
        let name = if columns.iter().any(|c| c.matches(col.name())) {
            format!("{}_{}", right_name, col.name())
        } else {
            col.name().to_string()
        };
        columns.push(Column::new(name, col.data_type()));
    }
    Some(TableSchema::new(source, columns))
}

impl Table {
    /// Key join with `right`.
    ///
    /// A right join is emitted as a left join with the operands and key
    /// lists swapped.
    pub fn merge(&self, right: &Table, options: MergeOptions) -> Result<Table> {
        let (first, second, keys) = if options.how == JoinHow::Right {
            (right, self, options.keys.swapped())
        } else {
            (self, right, options.keys.clone())
        };
        let (left_on, right_on) = keys.resolve()?;
        let (first_schema, second_schema) = (first.schema()?, second.schema()?);

        let prefix = if options.sort && options.how != JoinHow::Outer {
            "s"
        } else {
            ""
        };
        let source = format!(
            "{}{}({},{},{},{})",
            prefix,
            options.how.function(),
            first.name(),
            second.name(),
            symbols(&left_on),
            symbols(&right_on)
        );
        let schema = joined_schema(
            &source,
            &first_schema,
            &second_schema,
            second.name(),
            &left_on,
            &right_on,
        );
        Ok(self.joined(right, source, Some(Selection::All), schema, options.merge_for_update))
    }

    /// As-of join: each left row matches the latest right row whose last key
    /// does not exceed its own.
    pub fn merge_asof(&self, right: &Table, keys: JoinKeys) -> Result<Table> {
        let (left_on, right_on) = keys.resolve()?;
        let (left_schema, right_schema) = (self.schema()?, right.schema()?);
        let source = format!(
            "aj({},{},{},{})",
            self.name(),
            right.name(),
            symbols(&left_on),
            symbols(&right_on)
        );
        let schema = joined_schema(
            &source,
            &left_schema,
            &right_schema,
            right.name(),
            &left_on,
            &right_on,
        );
        Ok(self.joined(right, source, Some(Selection::All), schema, false))
    }

    /// Window join; see `WindowJoin`. The joined schema is loaded lazily.
    pub fn merge_window(&self, right: &Table, window: &WindowJoin) -> Result<Table> {
        let (left_on, right_on) = window.keys.resolve()?;
        let aggs = window.render_aggs()?;
        self.schema()?;
        right.schema()?;
        let source = format!(
            "{}({},{},{}:{},{},{},{})",
            if window.prevailing { "pwj" } else { "wj" },
            self.name(),
            right.name(),
            window.lower,
            window.upper,
            aggs,
            symbols(&left_on),
            symbols(&right_on)
        );
        Ok(self.joined(right, source, Some(Selection::All), None, false))
    }

    /// Cartesian product. Keeps the current select list.
    pub fn merge_cross(&self, right: &Table) -> Result<Table> {
        let (left_schema, right_schema) = (self.schema()?, right.schema()?);
        let source = format!("cj({},{})", self.name(), right.name());
        let schema = joined_schema(&source, &left_schema, &right_schema, right.name(), &[], &[]);
        Ok(self.joined(right, source, None, schema, false))
    }

    fn joined(
        &self,
        right: &Table,
        source: String,
        select: Option<Selection>,
        schema: Option<TableSchema>,
        merge_for_update: bool,
    ) -> Table {
        let mut clauses = self.clauses().clone();
        if let Some(select) = select {
            clauses.select = select;
        }
        clauses.join = Some(JoinSources {
            left: self.name().to_string(),
            right: right.name().to_string(),
        });
        clauses.merge_for_update = merge_for_update;
        Table::with_clauses(self.context().clone(), source, clauses, schema, None)
    }
}
