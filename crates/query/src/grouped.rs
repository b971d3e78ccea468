//! Partitioned views: `group by` aggregation and `context by` windows.

use crate::agg::{expand_pairs, AggSpec, ColumnPairs};
use crate::args::{IntoNames, IntoPredicates};
use crate::mutation::UpdateDirective;
use crate::session::QueryResult;
use crate::table::Table;
use hashbrown::HashSet;
use tabula_core::{Result, TabularData};

macro_rules! aggregate_shorthands {
    ($out:ty; $($name:ident => $func:literal),* $(,)?) => {
        $(
            #[doc = concat!("Applies `", $func, "` to every selected column.")]
            pub fn $name(&self) -> Result<$out> {
                self.agg($func)
            }
        )*
    };
}

macro_rules! pair_shorthands {
    ($out:ty; $($name:ident => $func:literal),* $(,)?) => {
        $(
            #[doc = concat!("Applies `", $func, "(x,y)` to each pair.")]
            pub fn $name(&self, pairs: impl Into<ColumnPairs>) -> Result<$out> {
                self.agg2($func, pairs)
            }
        )*
    };
}

/// Expands two-argument aggregates, validating the pairs before the
/// function list.
fn pair_expressions(funcs: AggSpec, pairs: ColumnPairs) -> Result<Vec<String>> {
    let pairs = pairs.validate()?;
    let funcs = funcs.functions()?;
    Ok(expand_pairs(&funcs, &pairs))
}

/// A `group by` in progress.
#[derive(Clone, Debug)]
pub struct GroupedView {
    table: Table,
}

impl GroupedView {
    pub(crate) fn new(table: Table) -> Self {
        Self { table }
    }

    #[inline]
    pub fn keys(&self) -> &[String] {
        self.table.partition().keys()
    }

    #[inline]
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn select(&self, columns: impl IntoNames) -> GroupedView {
        GroupedView::new(self.table.select(columns))
    }

    pub fn where_(&self, predicates: impl IntoPredicates) -> GroupedView {
        GroupedView::new(self.table.where_(predicates))
    }

    pub fn sort(&self, keys: impl IntoNames) -> GroupedView {
        GroupedView::new(self.table.sort(keys))
    }

    pub fn having(&self, condition: impl Into<String>) -> Table {
        self.table.having(condition)
    }

    /// Always fails: an expression takes at most one partition.
    pub fn contextby(&self, keys: impl IntoNames) -> Result<PartitionedView> {
        self.table.contextby(keys)
    }

    /// Replaces the select list with aggregates of the selected columns.
    pub fn agg(&self, spec: impl Into<AggSpec>) -> Result<Table> {
        let columns = self.table.resolved_select()?;
        let exprs = spec.into().expand(&columns, |_| false);
        Ok(self.table.select(exprs))
    }

    /// Replaces the select list with two-argument aggregates over `pairs`.
    pub fn agg2(&self, funcs: impl Into<AggSpec>, pairs: impl Into<ColumnPairs>) -> Result<Table> {
        let exprs = pair_expressions(funcs.into(), pairs.into())?;
        if exprs.is_empty() {
            return Ok(self.table.clone());
        }
        Ok(self.table.select(exprs))
    }

    aggregate_shorthands! { Table;
        sum => "sum",
        sum2 => "sum2",
        size => "size",
        count => "count",
        avg => "avg",
        max => "max",
        min => "min",
        first => "first",
        last => "last",
        std => "std",
        var => "var",
        prod => "prod",
    }

    pair_shorthands! { Table;
        wavg => "wavg",
        wsum => "wsum",
        covar => "covar",
        corr => "corr",
    }

    pub fn compile(&self) -> Result<String> {
        self.table.compile()
    }

    pub fn execute(&self) -> Result<QueryResult> {
        self.table.execute()
    }

    pub fn to_data_frame(&self) -> Result<TabularData> {
        self.table.to_data_frame()
    }

    pub fn execute_as(&self, name: &str) -> Result<Table> {
        self.table.execute_as(name)
    }

    pub fn ols(&self, y: &str, xs: impl IntoNames, intercept: bool) -> Result<QueryResult> {
        self.table.ols(y, xs, intercept)
    }
}

/// A `context by` in progress.
///
/// Aggregates here are row-preserving window computations, so the partition
/// keys stay in front of the select list.
#[derive(Clone, Debug)]
pub struct PartitionedView {
    table: Table,
}

impl PartitionedView {
    pub(crate) fn new(table: Table) -> Self {
        Self { table }
    }

    #[inline]
    pub fn keys(&self) -> &[String] {
        self.table.partition().keys()
    }

    #[inline]
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn select(&self, columns: impl IntoNames) -> PartitionedView {
        PartitionedView::new(self.table.select(columns))
    }

    pub fn where_(&self, predicates: impl IntoPredicates) -> PartitionedView {
        PartitionedView::new(self.table.where_(predicates))
    }

    pub fn sort(&self, keys: impl IntoNames) -> PartitionedView {
        PartitionedView::new(self.table.sort(keys))
    }

    pub fn top(&self, n: usize) -> Table {
        self.table.top(n)
    }

    pub fn having(&self, condition: impl Into<String>) -> Table {
        self.table.having(condition)
    }

    /// Always fails: an expression takes at most one partition.
    pub fn groupby(&self, keys: impl IntoNames) -> Result<GroupedView> {
        self.table.groupby(keys)
    }

    /// Starts an update evaluated per partition.
    pub fn update(&self, columns: impl IntoNames, values: impl IntoNames) -> Result<UpdateDirective> {
        self.table.update(columns, values)
    }

    /// Selects the keys followed by the aggregates of every non-key column.
    pub fn agg(&self, spec: impl Into<AggSpec>) -> Result<PartitionedView> {
        let keys = self.keys();
        let key_set: HashSet<String> = keys.iter().map(|k| k.to_ascii_lowercase()).collect();

        let mut seen = HashSet::new();
        let mut exprs: Vec<String> = keys
            .iter()
            .filter(|k| seen.insert(k.to_ascii_lowercase()))
            .cloned()
            .collect();

        let columns = self.table.resolved_select()?;
        exprs.extend(
            spec.into()
                .expand(&columns, |c| key_set.contains(&c.to_ascii_lowercase())),
        );
        Ok(PartitionedView::new(self.table.select(exprs)))
    }

    /// Appends two-argument aggregates to the current select list.
    pub fn agg2(
        &self,
        funcs: impl Into<AggSpec>,
        pairs: impl Into<ColumnPairs>,
    ) -> Result<PartitionedView> {
        let added = pair_expressions(funcs.into(), pairs.into())?;
        let mut exprs = self.table.resolved_select()?;
        exprs.extend(added);
        Ok(PartitionedView::new(self.table.select(exprs)))
    }

    aggregate_shorthands! { PartitionedView;
        sum => "sum",
        sum2 => "sum2",
        size => "size",
        count => "count",
        avg => "avg",
        max => "max",
        min => "min",
        first => "first",
        last => "last",
        std => "std",
        var => "var",
        prod => "prod",
        cumsum => "cumsum",
        cummax => "cummax",
        cumprod => "cumprod",
        cummin => "cummin",
    }

    pair_shorthands! { PartitionedView;
        wavg => "wavg",
        wsum => "wsum",
        covar => "covar",
        corr => "corr",
        each_pre => "eachPre",
    }

    pub fn compile(&self) -> Result<String> {
        self.table.compile()
    }

    pub fn execute(&self) -> Result<QueryResult> {
        self.table.execute()
    }

    pub fn to_data_frame(&self) -> Result<TabularData> {
        self.table.to_data_frame()
    }

    pub fn execute_as(&self, name: &str) -> Result<Table> {
        self.table.execute_as(name)
    }
}
