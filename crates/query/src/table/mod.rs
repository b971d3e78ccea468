//! Lazy query expressions over remote tables.
//!
//! A `Table` is an immutable bundle of pending clauses on top of a source name.
//! Every chain operation returns a new `Table` with the clause applied and
//! leaves the receiver untouched. Nothing runs remotely until a terminal
//! operation (`execute`, `to_data_frame`, `exec`, ...) is called; the only
//! exception is the lazy schema load triggered by column lookups.

mod clauses;

pub use clauses::{JoinSources, Partition, Selection};
pub(crate) use clauses::Clauses;

use crate::args::{IntoNames, IntoPredicates};
use crate::column::ColumnRef;
use crate::compile::{compile_select, find_ignore_case, replace_first_keyword};
use crate::context::QueryContext;
use crate::grouped::{GroupedView, PartitionedView};
use crate::names::TempName;
use crate::session::QueryResult;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tabula_core::schema::{validate_identifier, TableSchema};
use tabula_core::{Error, Result, TabularData};

/// Schema cache shared by every expression derived from one remote object.
struct SchemaSlot(Mutex<Option<Arc<TableSchema>>>);

impl SchemaSlot {
    fn with(schema: Option<TableSchema>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(schema.map(Arc::new))))
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<TableSchema>>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A lazy query expression.
#[derive(Clone)]
pub struct Table {
    ctx: QueryContext,
    name: String,
    schema: Arc<SchemaSlot>,
    temp: Option<TempName>,
    clauses: Clauses,
}

impl Table {
    pub(crate) fn from_parts(
        ctx: QueryContext,
        name: String,
        select: Selection,
        schema: Option<TableSchema>,
        temp: Option<TempName>,
    ) -> Self {
        Self::with_clauses(ctx, name, Clauses::new(select), schema, temp)
    }

    pub(crate) fn with_clauses(
        ctx: QueryContext,
        name: String,
        clauses: Clauses,
        schema: Option<TableSchema>,
        temp: Option<TempName>,
    ) -> Self {
        Self {
            ctx,
            name,
            schema: SchemaSlot::with(schema),
            temp,
            clauses,
        }
    }

    /// Copies this expression and applies `f` to the copy's clauses.
    pub(crate) fn derive(&self, f: impl FnOnce(&mut Clauses)) -> Table {
        let mut next = self.clone();
        f(&mut next.clauses);
        next
    }

    #[inline]
    pub(crate) fn clauses(&self) -> &Clauses {
        &self.clauses
    }

    /// Returns the context this expression was created from.
    #[inline]
    pub fn context(&self) -> &QueryContext {
        &self.ctx
    }

    /// Returns the source name this expression selects from.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the generated-name handle if this expression owns a remote
    /// temporary.
    #[inline]
    pub fn temp_name(&self) -> Option<&TempName> {
        self.temp.as_ref()
    }

    #[inline]
    pub fn selection(&self) -> &Selection {
        &self.clauses.select
    }

    #[inline]
    pub fn filters(&self) -> &[String] {
        &self.clauses.filters
    }

    #[inline]
    pub fn sort_keys(&self) -> &[String] {
        &self.clauses.sort
    }

    #[inline]
    pub fn limit(&self) -> Option<usize> {
        self.clauses.top
    }

    #[inline]
    pub fn having_condition(&self) -> Option<&str> {
        self.clauses.having.as_deref()
    }

    #[inline]
    pub fn partition(&self) -> &Partition {
        &self.clauses.partition
    }

    /// Returns the operands of the join that produced this expression.
    #[inline]
    pub fn join_sources(&self) -> Option<&JoinSources> {
        self.clauses.join.as_ref()
    }

    #[inline]
    pub fn is_merge_for_update(&self) -> bool {
        self.clauses.merge_for_update
    }

    // ========== Chain operations ==========

    /// Replaces the select list. A lone `"*"` selects everything.
    pub fn select(&self, columns: impl IntoNames) -> Table {
        let names = columns.into_names();
        self.derive(|c| c.select = Selection::from_names(names))
    }

    /// Appends filter predicates; all predicates are and-ed together.
    pub fn where_(&self, predicates: impl IntoPredicates) -> Table {
        let mut predicates = predicates.into_predicates();
        self.derive(|c| c.filters.append(&mut predicates))
    }

    /// Replaces the sort keys.
    pub fn sort(&self, keys: impl IntoNames) -> Table {
        let keys = keys.into_names();
        self.derive(|c| c.sort = keys)
    }

    /// Limits the result to the first `n` rows.
    pub fn top(&self, n: usize) -> Table {
        self.derive(|c| c.top = Some(n))
    }

    /// Sets the post-aggregation filter.
    pub fn having(&self, condition: impl Into<String>) -> Table {
        let condition = condition.into();
        self.derive(|c| c.having = Some(condition))
    }

    /// Marks this join-derived expression as the source of an
    /// update-through-join.
    pub fn with_merge_for_update(&self, enabled: bool) -> Table {
        self.derive(|c| c.merge_for_update = enabled)
    }

    /// Starts a `group by` on `keys`.
    pub fn groupby(&self, keys: impl IntoNames) -> Result<GroupedView> {
        let keys = keys.into_names();
        self.check_partition(&keys)?;
        Ok(GroupedView::new(
            self.derive(|c| c.partition = Partition::GroupBy(keys)),
        ))
    }

    /// Starts a `context by` on `keys`.
    pub fn contextby(&self, keys: impl IntoNames) -> Result<PartitionedView> {
        let keys = keys.into_names();
        self.check_partition(&keys)?;
        Ok(PartitionedView::new(
            self.derive(|c| c.partition = Partition::ContextBy(keys)),
        ))
    }

    fn check_partition(&self, keys: &[String]) -> Result<()> {
        if self.clauses.partition != Partition::None {
            return Err(Error::usage("multiple context/group-by are not allowed"));
        }
        if keys.is_empty() {
            return Err(Error::usage("partition keys cannot be empty"));
        }
        Ok(())
    }

    // ========== Schema ==========

    /// Returns the schema, loading it on first use.
    pub fn schema(&self) -> Result<Arc<TableSchema>> {
        let mut slot = self.schema.lock();
        if let Some(schema) = slot.as_ref() {
            return Ok(Arc::clone(schema));
        }
        let loaded = Arc::new(self.ctx.load_schema(&self.name)?);
        *slot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Returns true once the schema is known locally.
    pub fn is_schema_loaded(&self) -> bool {
        self.schema.lock().is_some()
    }

    /// Forgets the cached schema; the next lookup reloads it.
    pub fn invalidate_schema(&self) {
        *self.schema.lock() = None;
    }

    /// Returns the column names in remote order.
    pub fn columns(&self) -> Result<Vec<String>> {
        Ok(self.schema()?.column_names())
    }

    pub fn num_columns(&self) -> Result<usize> {
        Ok(self.schema()?.len())
    }

    /// Resolves a column by name, ignoring ASCII case.
    pub fn col(&self, name: &str) -> Result<ColumnRef> {
        let schema = self.schema()?;
        schema
            .get_column(name)
            .map(|c| ColumnRef::new(self.name.clone(), c.name()))
            .ok_or_else(|| Error::column_not_found(self.name.clone(), name))
    }

    /// The select list with the wildcard expanded to concrete columns.
    pub(crate) fn resolved_select(&self) -> Result<Vec<String>> {
        match &self.clauses.select {
            Selection::Columns(cols) => Ok(cols.clone()),
            Selection::All => self.columns(),
        }
    }

    // ========== Terminal operations ==========

    /// Compiles the pending clauses to statement text.
    pub fn compile(&self) -> Result<String> {
        compile_select(&self.name, &self.clauses)
    }

    /// Compiles and runs the expression.
    pub fn execute(&self) -> Result<QueryResult> {
        self.ctx.run(&self.compile()?)
    }

    /// Runs the expression and returns the resulting table.
    pub fn to_data_frame(&self) -> Result<TabularData> {
        self.execute()?.into_table()
    }

    /// The compiled text with its leading `select` replaced by `exec`.
    pub fn exec_sql(&self) -> Result<String> {
        Ok(replace_first_keyword(&self.compile()?, "select", "exec"))
    }

    /// Runs the expression as `exec`, which yields vectors or scalars.
    pub fn exec(&self) -> Result<QueryResult> {
        self.ctx.run(&self.exec_sql()?)
    }

    /// Runs `exec` over a replacement select list.
    pub fn exec_expr(&self, columns: impl IntoNames) -> Result<QueryResult> {
        self.select(columns).exec()
    }

    /// Counts the result rows remotely.
    ///
    /// The count replaces everything before the first `from`, so a `top`
    /// clause does not limit it. A partitioned expression yields one count row
    /// per group; in that case the number of groups is returned.
    pub fn rows(&self) -> Result<u64> {
        let sql = self.compile()?;
        let pos = find_ignore_case(&sql, " from ")
            .ok_or_else(|| Error::usage(format!("cannot count rows of: {}", sql)))?;
        let script = format!("select count(*) as ct {}", &sql[pos + 1..]);
        let count = match self.ctx.run(&script)? {
            QueryResult::Table(t) if t.num_rows() > 1 => t.num_rows() as i64,
            QueryResult::Table(t) => t
                .value(0, "ct")
                .and_then(|v| v.as_i64())
                .ok_or_else(|| Error::invalid_data("row count is missing"))?,
            QueryResult::Scalar(v) => v
                .as_i64()
                .ok_or_else(|| Error::invalid_data("row count is not an integer"))?,
            other => return Err(Error::unexpected_result("table", other.kind())),
        };
        Ok(count.max(0) as u64)
    }

    /// Materializes the result into a remote variable `name` and wraps it.
    pub fn execute_as(&self, name: &str) -> Result<Table> {
        validate_identifier(name)?;
        self.ctx.run(&format!("{}=({})", name, self.compile()?))?;
        self.ctx.table(name)
    }

    /// Appends the rows of `other` to this remote table in place.
    pub fn append(&self, other: &Table) -> Result<Table> {
        self.ctx
            .run(&format!("{}.append!({})", self.name, other.name))?;
        Ok(self.clone())
    }

    /// Binds the remote table to a new variable name.
    pub fn rename(&self, new_name: &str) -> Result<Table> {
        validate_identifier(new_name)?;
        self.ctx.run(&format!("{}={}", new_name, self.name))?;
        let schema = self
            .schema
            .lock()
            .as_ref()
            .map(|s| s.renamed(new_name));
        Ok(Table::with_clauses(
            self.ctx.clone(),
            new_name.to_string(),
            self.clauses.clone(),
            schema,
            None,
        ))
    }

    /// Drops columns from the remote table in place.
    pub fn drop_columns(&self, columns: impl IntoNames) -> Result<Table> {
        let dropped = columns.into_names();
        if dropped.is_empty() {
            return Err(Error::usage("no columns to drop"));
        }
        let list = dropped
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(",");
        self.ctx.run(&format!("{}.drop!([{}])", self.name, list))?;

        {
            let mut slot = self.schema.lock();
            if let Some(schema) = slot.as_ref() {
                *slot = Some(Arc::new(schema.without_columns(&dropped)));
            }
        }
        Ok(self.derive(|c| {
            if let Selection::Columns(cols) = &mut c.select {
                cols.retain(|col| !dropped.iter().any(|d| d.eq_ignore_ascii_case(col)));
            }
        }))
    }

    /// Ordinary least squares of `y` on `xs`.
    ///
    /// Partitioned tables are regressed through a distributed data source;
    /// everything else runs `ols` over the filtered expression.
    pub fn ols(&self, y: &str, xs: impl IntoNames, intercept: bool) -> Result<QueryResult> {
        let xs = xs.into_names();
        if y.trim().is_empty() || xs.is_empty() {
            return Err(Error::usage("ols needs a response column and at least one regressor"));
        }
        if self.schema()?.is_partitioned() {
            let quoted = xs
                .iter()
                .map(|x| format!("\"{}\"", x))
                .collect::<Vec<_>>()
                .join(",");
            let script = format!(
                "olsEx(sqlDS(<{}>),\"{}\",[{}],{},2)",
                self.compile()?,
                y,
                quoted,
                intercept
            );
            return self.ctx.run(&script);
        }
        let expr = format!("ols({},[{}],{},2)", y, xs.join(","), intercept);
        self.derive(|c| {
            c.select = Selection::Columns(vec![expr]);
            c.sort.clear();
            c.top = None;
        })
        .exec()
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("clauses", &self.clauses)
            .field("temp", &self.temp)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::RecordingSession;
    use tabula_core::schema::Column;
    use tabula_core::{DataType, Value};

    fn trades_schema() -> TableSchema {
        TableSchema::new(
            "trades",
            vec![
                Column::new("sym", DataType::Symbol),
                Column::new("price", DataType::Double),
                Column::new("qty", DataType::Int),
            ],
        )
    }

    fn setup() -> (Arc<RecordingSession>, Table) {
        let quotes = TableSchema::new(
            "quotes",
            vec![
                Column::new("sym", DataType::Symbol),
                Column::new("bid", DataType::Double),
            ],
        );
        let session = Arc::new(
            RecordingSession::new()
                .with_table(trades_schema())
                .with_table(quotes),
        );
        let ctx = QueryContext::new(session.clone());
        let t = ctx.table("trades").unwrap();
        (session, t)
    }

    #[test]
    fn test_chain_does_not_mutate_receiver() {
        let (_, t) = setup();
        let filtered = t.where_("price>10");
        let projected = filtered.select(["sym", "price"]);

        assert!(t.filters().is_empty());
        assert_eq!(filtered.selection(), &Selection::All);
        assert_eq!(projected.filters(), &["price>10".to_string()]);
        assert_eq!(t.compile().unwrap(), "select * from trades");
    }

    #[test]
    fn test_every_branching_op_leaves_receiver_text() {
        use crate::join::{JoinKeys, MergeOptions, WindowJoin};
        use crate::mutation::SqlIntent;

        let (_, base) = setup();
        let quotes = base.context().table("quotes").unwrap();
        let t = base.where_("price>10").select(["sym", "price"]).sort("sym");
        let before = t.compile().unwrap();
        let unchanged = |t: &Table| assert_eq!(t.compile().unwrap(), before);

        t.groupby("sym").unwrap().sum().unwrap().compile().unwrap();
        unchanged(&t);
        t.contextby("sym").unwrap().cumsum().unwrap().compile().unwrap();
        unchanged(&t);
        t.having("sum(qty)>1").compile().unwrap();
        unchanged(&t);
        t.merge(&quotes, MergeOptions::on("sym").for_update(true))
            .unwrap()
            .compile()
            .unwrap();
        unchanged(&t);
        t.merge_asof(&quotes, JoinKeys::on("sym")).unwrap().compile().unwrap();
        unchanged(&t);
        let window = WindowJoin::new(JoinKeys::on("sym"), -1, 0, "avg(bid)");
        t.merge_window(&quotes, &window).unwrap().compile().unwrap();
        unchanged(&t);
        t.merge_cross(&quotes).unwrap().compile().unwrap();
        unchanged(&t);
        t.update("price", "0")
            .unwrap()
            .where_("qty>0")
            .resolve_effective_sql(SqlIntent::ForExecution)
            .unwrap();
        unchanged(&t);
        t.delete().where_("qty>0").execute().unwrap();
        unchanged(&t);
        t.pivotby("sym", "qty", "price", Some("last")).compile();
        unchanged(&t);
        t.drop_columns("price").unwrap();
        unchanged(&t);
        assert!(!t.is_merge_for_update());
    }

    #[test]
    fn test_where_appends_select_replaces() {
        let (_, t) = setup();
        let q = t
            .where_("x>1")
            .where_(vec!["y<2", "z==3"])
            .select("a")
            .select(["b", "c"]);
        assert_eq!(q.compile().unwrap(), "select b,c from trades where x>1 and y<2 and z==3");
    }

    #[test]
    fn test_top_having_sort() {
        let (_, t) = setup();
        let q = t.top(5).sort(["qty"]).sort("price").having("sum(qty)>1");
        assert_eq!(
            q.compile().unwrap(),
            "select top 5 * from trades having sum(qty)>1 order by price"
        );
    }

    #[test]
    fn test_compile_does_not_touch_session() {
        let (session, t) = setup();
        t.where_("price>1").compile().unwrap();
        assert!(session.statements().is_empty());
        assert!(session.schema_loads().is_empty());
    }

    #[test]
    fn test_empty_select_is_usage_error() {
        let (_, t) = setup();
        let err = t.select(Vec::<String>::new()).compile().unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_mixed_partitions_rejected() {
        let (_, t) = setup();
        let grouped = t.groupby("sym").unwrap().into_table();
        assert!(grouped.contextby("sym").unwrap_err().is_usage());

        let ctx = t.contextby("sym").unwrap().into_table();
        assert!(ctx.groupby("sym").unwrap_err().is_usage());
    }

    #[test]
    fn test_col_loads_schema_once() {
        let (session, t) = setup();
        let price = t.col("PRICE").unwrap();
        let _ = t.select("sym").col("qty").unwrap();

        assert_eq!(price.name(), "price");
        assert_eq!(session.schema_loads(), vec!["trades".to_string()]);
    }

    #[test]
    fn test_col_unknown_column() {
        let (_, t) = setup();
        let err = t.col("volume").unwrap_err();
        assert_eq!(err, Error::column_not_found("trades", "volume"));
    }

    #[test]
    fn test_schema_does_not_rewrite_selection() {
        let (_, t) = setup();
        assert_eq!(t.columns().unwrap(), vec!["sym", "price", "qty"]);
        assert_eq!(t.num_columns().unwrap(), 3);
        assert_eq!(t.compile().unwrap(), "select * from trades");
    }

    #[test]
    fn test_invalidate_schema_reloads() {
        let (session, t) = setup();
        t.schema().unwrap();
        t.invalidate_schema();
        assert!(!t.is_schema_loaded());
        t.schema().unwrap();
        assert_eq!(session.schema_loads().len(), 2);
    }

    #[test]
    fn test_exec_replaces_first_select() {
        let (session, t) = setup();
        assert_eq!(
            t.select("price").top(3).exec_sql().unwrap(),
            "exec top 3 price from trades"
        );
        t.exec_expr("qty").unwrap();
        assert_eq!(session.last_statement().unwrap(), "exec qty from trades");
    }

    #[test]
    fn test_rows_counts_after_from() {
        let (session, t) = setup();
        let counts = TabularData::new().with_column("ct", [42i64]).unwrap();
        session.push_response(QueryResult::Table(counts));

        let n = t.top(5).select("sym").where_("qty>1").rows().unwrap();

        assert_eq!(n, 42);
        assert_eq!(
            session.last_statement().unwrap(),
            "select count(*) as ct from trades where qty>1"
        );
    }

    #[test]
    fn test_rows_per_group_returns_group_count() {
        let (session, t) = setup();
        let counts = TabularData::new().with_column("ct", [3i64, 4, 5]).unwrap();
        session.push_response(QueryResult::Table(counts));
        assert_eq!(t.groupby("sym").unwrap().into_table().rows().unwrap(), 3);
    }

    #[test]
    fn test_rows_scalar_response() {
        let (session, t) = setup();
        session.push_response(QueryResult::Scalar(Value::Int64(7)));
        assert_eq!(t.rows().unwrap(), 7);
    }

    #[test]
    fn test_execute_as_and_rename() {
        let (session, t) = setup();
        let saved = t.where_("qty>1").execute_as("big").unwrap();
        assert_eq!(saved.name(), "big");
        assert_eq!(
            session.last_statement().unwrap(),
            "big=(select * from trades where qty>1)"
        );

        t.schema().unwrap();
        let renamed = t.rename("trades2").unwrap();
        assert_eq!(session.last_statement().unwrap(), "trades2=trades");
        assert!(renamed.is_schema_loaded());
        assert_eq!(renamed.schema().unwrap().name(), "trades2");
        assert!(t.execute_as("not valid").is_err());
    }

    #[test]
    fn test_append() {
        let (session, t) = setup();
        let other = t.context().table("more").unwrap();
        t.append(&other).unwrap();
        assert_eq!(session.last_statement().unwrap(), "trades.append!(more)");
    }

    #[test]
    fn test_drop_columns_updates_select_and_schema() {
        let (session, t) = setup();
        t.schema().unwrap();
        let q = t.select(["sym", "price", "qty"]).drop_columns(["PRICE"]).unwrap();

        assert_eq!(session.last_statement().unwrap(), "trades.drop!([\"PRICE\"])");
        assert_eq!(q.compile().unwrap(), "select sym,qty from trades");
        assert_eq!(t.columns().unwrap(), vec!["sym", "qty"]);
    }

    #[test]
    fn test_ols_plain_table() {
        let (session, t) = setup();
        t.where_("qty>0").sort("sym").ols("price", ["qty"], true).unwrap();
        assert_eq!(
            session.last_statement().unwrap(),
            "exec ols(price,[qty],true,2) from trades where qty>0"
        );
    }

    #[test]
    fn test_ols_partitioned_table() {
        let session = Arc::new(
            RecordingSession::new().with_table(trades_schema().with_partition_columns(["sym"])),
        );
        let ctx = QueryContext::new(session.clone());
        let t = ctx.table("trades").unwrap();

        t.ols("price", ["qty", "sym"], false).unwrap();

        assert_eq!(
            session.last_statement().unwrap(),
            "olsEx(sqlDS(<select * from trades>),\"price\",[\"qty\",\"sym\"],false,2)"
        );
    }

    #[test]
    fn test_ols_requires_regressors() {
        let (_, t) = setup();
        assert!(t.ols("price", Vec::<String>::new(), true).unwrap_err().is_usage());
    }

    #[test]
    fn test_remote_rejection_propagates() {
        let (session, t) = setup();
        session.reject_containing("from trades");
        let err = t.execute().unwrap_err();
        assert!(matches!(err, Error::Remote { .. }));
    }
}
