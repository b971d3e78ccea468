//! Pivot views.

use crate::compile::{compile_pivot, replace_first_keyword};
use crate::session::QueryResult;
use crate::table::Table;
use tabula_core::{Result, TabularData};

/// A `pivot by` over an expression: one row per `index` value, one column
/// per `column` value, cells computed from `value`.
#[derive(Clone, Debug)]
pub struct PivotView {
    table: Table,
    index: String,
    column: String,
    value: String,
    agg: Option<String>,
}

impl Table {
    /// Pivots `value` by `index` and `column`, optionally aggregating cells
    /// with the function `agg`.
    pub fn pivotby(
        &self,
        index: impl Into<String>,
        column: impl Into<String>,
        value: impl Into<String>,
        agg: Option<&str>,
    ) -> PivotView {
        PivotView {
            table: self.clone(),
            index: index.into(),
            column: column.into(),
            value: value.into(),
            agg: agg.map(str::to_string),
        }
    }
}

impl PivotView {
    fn value_expr(&self) -> String {
        match &self.agg {
            Some(f) => format!("{}({})", f, self.value),
            None => self.value.clone(),
        }
    }

    /// Compiles the pivot. Only the filters of the source expression apply.
    pub fn compile(&self) -> String {
        compile_pivot(
            &self.value_expr(),
            self.table.name(),
            self.table.filters(),
            &self.index,
            &self.column,
        )
    }

    pub fn execute(&self) -> Result<QueryResult> {
        self.table.context().run(&self.compile())
    }

    pub fn to_data_frame(&self) -> Result<TabularData> {
        self.execute()?.into_table()
    }

    /// Runs the pivot as `exec`, which yields a matrix.
    pub fn exec(&self) -> Result<QueryResult> {
        let sql = replace_first_keyword(&self.compile(), "select", "exec");
        self.table.context().run(&sql)
    }

    pub fn execute_as(&self, name: &str) -> Result<Table> {
        tabula_core::schema::validate_identifier(name)?;
        let ctx = self.table.context();
        ctx.run(&format!("{}=({})", name, self.compile()))?;
        ctx.table(name)
    }
}
