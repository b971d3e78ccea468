//! Update and delete directives.
//!
//! A directive wraps the expression it was created from and compiles to one
//! mutation statement. Filters set on the wrapped expression come first,
//! followed by filters added on the directive itself.

use crate::args::{IntoNames, IntoPredicates};
use crate::compile::{compile_delete, compile_update, UpdateParts};
use crate::session::QueryResult;
use crate::table::Table;
use tabula_core::{Error, Result};

/// Why a directive is being compiled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlIntent {
    /// Showing the statement.
    ForDisplay,
    /// Dispatching the statement.
    ForExecution,
}

impl Table {
    /// Starts an `update` assigning `values[i]` to `columns[i]`.
    pub fn update(&self, columns: impl IntoNames, values: impl IntoNames) -> Result<UpdateDirective> {
        let columns = columns.into_names();
        let values = values.into_names();
        if columns.is_empty() {
            return Err(Error::usage("update needs at least one column"));
        }
        if columns.len() != values.len() {
            return Err(Error::usage(format!(
                "update got {} column(s) but {} value(s)",
                columns.len(),
                values.len()
            )));
        }
        Ok(UpdateDirective {
            merge_for_update: self.is_merge_for_update(),
            table: self.clone(),
            assignments: columns.into_iter().zip(values).collect(),
            filters: Vec::new(),
        })
    }

    /// Starts a `delete` of the rows matching this expression's filters.
    pub fn delete(&self) -> DeleteDirective {
        DeleteDirective {
            table: self.clone(),
            filters: Vec::new(),
        }
    }
}

/// A pending `update` statement.
#[derive(Clone, Debug)]
pub struct UpdateDirective {
    table: Table,
    assignments: Vec<(String, String)>,
    filters: Vec<String>,
    merge_for_update: bool,
}

impl UpdateDirective {
    /// Adds filter predicates after those of the wrapped expression.
    pub fn where_(mut self, predicates: impl IntoPredicates) -> Self {
        self.filters.extend(predicates.into_predicates());
        self
    }

    /// Whether the next compile updates through the join this expression
    /// came from.
    #[inline]
    pub fn is_merge_for_update(&self) -> bool {
        self.merge_for_update
    }

    /// Compiles the statement.
    ///
    /// An update through a join targets the join's left operand and reads
    /// from the join. The directive never changes while compiling, so both
    /// intents produce the same text on every call. `execute` hands back the
    /// wrapped expression with its merge-for-update flag cleared.
    pub fn resolve_effective_sql(&self, _intent: SqlIntent) -> Result<String> {
        self.statement()
    }

    /// The compiled select of the wrapped expression.
    pub fn source_sql(&self) -> Result<String> {
        self.table.compile()
    }

    /// Runs the update and returns the wrapped expression.
    pub fn execute(self) -> Result<Table> {
        self.to_result()?;
        Ok(self.table.with_merge_for_update(false))
    }

    /// Runs the update and returns the raw result.
    pub fn to_result(&self) -> Result<QueryResult> {
        let sql = self.resolve_effective_sql(SqlIntent::ForExecution)?;
        self.table.context().run(&sql)
    }

    fn statement(&self) -> Result<String> {
        let clauses = self.table.clauses();
        let filters: Vec<String> = clauses
            .filters
            .iter()
            .chain(&self.filters)
            .cloned()
            .collect();

        let (target, from) = if self.merge_for_update {
            let left = clauses
                .join
                .as_ref()
                .map(|j| j.left.as_str())
                .ok_or_else(|| Error::usage("update through join requires a left source table"))?;
            (left, Some(self.table.name()))
        } else {
            (self.table.name(), None)
        };

        // having only applies together with context by
        let context_by = clauses.partition.context_keys();
        Ok(compile_update(&UpdateParts {
            target,
            assignments: &self.assignments,
            from,
            filters: &filters,
            context_by,
            having: context_by.and(clauses.having.as_deref()),
        }))
    }
}

/// A pending `delete` statement.
#[derive(Clone, Debug)]
pub struct DeleteDirective {
    table: Table,
    filters: Vec<String>,
}

impl DeleteDirective {
    /// Adds filter predicates after those of the wrapped expression.
    pub fn where_(mut self, predicates: impl IntoPredicates) -> Self {
        self.filters.extend(predicates.into_predicates());
        self
    }

    /// Compiles the statement. Deletes carry no one-shot state, so both
    /// intents produce the same text.
    pub fn resolve_effective_sql(&self, _intent: SqlIntent) -> Result<String> {
        let filters: Vec<String> = self
            .table
            .filters()
            .iter()
            .chain(&self.filters)
            .cloned()
            .collect();
        Ok(compile_delete(self.table.name(), &filters))
    }

    pub fn source_sql(&self) -> Result<String> {
        self.table.compile()
    }

    /// Runs the delete and returns the wrapped expression.
    pub fn execute(self) -> Result<Table> {
        self.to_result()?;
        Ok(self.table)
    }

    pub fn to_result(&self) -> Result<QueryResult> {
        let sql = self.resolve_effective_sql(SqlIntent::ForExecution)?;
        self.table.context().run(&sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::QueryContext;
    use crate::session::RecordingSession;
    use std::sync::Arc;

    fn setup() -> (Arc<RecordingSession>, Table) {
        let session = Arc::new(RecordingSession::new());
        let t = QueryContext::new(session.clone()).table("t").unwrap();
        (session, t)
    }

    #[test]
    fn test_update_statement() {
        let (_, t) = setup();
        let u = t
            .where_("sym==\"IBM\"")
            .update(["price", "flag"], ["price*2", "1"])
            .unwrap()
            .where_("qty>0");
        assert_eq!(
            u.resolve_effective_sql(SqlIntent::ForDisplay).unwrap(),
            "update t set price=price*2,flag=1 where sym==\"IBM\" and qty>0"
        );
    }

    #[test]
    fn test_update_arity_checked() {
        let (_, t) = setup();
        assert!(t.update(["a", "b"], ["1"]).unwrap_err().is_usage());
        assert!(t.update(Vec::<String>::new(), Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_update_context_by() {
        let (_, t) = setup();
        let u = t
            .contextby("sym")
            .unwrap()
            .having("count(price)>1")
            .update("price", "cumsum(price)")
            .unwrap();
        assert_eq!(
            u.resolve_effective_sql(SqlIntent::ForDisplay).unwrap(),
            "update t set price=cumsum(price) context by sym having count(price)>1"
        );
    }

    #[test]
    fn test_group_by_having_not_carried_into_update() {
        let (_, t) = setup();
        let u = t
            .groupby("sym")
            .unwrap()
            .having("count(price)>1")
            .update("price", "0")
            .unwrap();
        assert_eq!(
            u.resolve_effective_sql(SqlIntent::ForDisplay).unwrap(),
            "update t set price=0"
        );
    }

    #[test]
    fn test_update_to_result_repeats_same_statement() {
        use tabula_core::schema::{Column, TableSchema};
        use tabula_core::DataType;

        let schema = |name: &str| {
            TableSchema::new(
                name,
                vec![Column::new("k", DataType::Symbol), Column::new("x", DataType::Double)],
            )
        };
        let session = Arc::new(
            RecordingSession::new()
                .with_table(schema("a"))
                .with_table(schema("b")),
        );
        let ctx = QueryContext::new(session.clone());
        let a = ctx.table("a").unwrap();
        let b = ctx.table("b").unwrap();
        let j = a
            .merge(
                &b,
                crate::join::MergeOptions::on("k")
                    .how(crate::join::JoinHow::Left)
                    .for_update(true),
            )
            .unwrap();
        let u = j.update("x", "y").unwrap();

        u.to_result().unwrap();
        u.to_result().unwrap();

        assert!(u.is_merge_for_update());
        assert_eq!(
            session.statements(),
            vec![
                "update a set x=y from lj(a,b,`k,`k)".to_string(),
                "update a set x=y from lj(a,b,`k,`k)".to_string(),
            ]
        );
    }

    #[test]
    fn test_merge_flag_without_join_fails() {
        let (_, t) = setup();
        let u = t.with_merge_for_update(true).update("a", "1").unwrap();
        let err = u.resolve_effective_sql(SqlIntent::ForDisplay).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_delete_statement() {
        let (session, t) = setup();
        let d = t.where_("x>1").delete().where_("y<2");
        assert_eq!(
            d.resolve_effective_sql(SqlIntent::ForDisplay).unwrap(),
            "delete from t where x>1 and y<2"
        );
        assert_eq!(d.source_sql().unwrap(), "select * from t where x>1");

        d.execute().unwrap();
        assert_eq!(session.last_statement().unwrap(), "delete from t where x>1 and y<2");
    }

    #[test]
    fn test_update_execute_dispatches_once() {
        let (session, t) = setup();
        t.update("a", "a+1").unwrap().execute().unwrap();
        assert_eq!(session.statements(), vec!["update t set a=a+1".to_string()]);
    }
}
