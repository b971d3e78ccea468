//! Entry point binding a remote session to builder configuration.

use crate::config::Config;
use crate::names::TempName;
use crate::session::{QueryResult, RemoteSession};
use crate::table::{Selection, Table};
use std::fmt;
use std::sync::Arc;
use tabula_core::schema::{validate_identifier, TableSchema};
use tabula_core::{Error, Result, TabularData, Value};

/// Options for loading a persisted remote table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadOptions {
    /// Partitions to load; empty loads all of them.
    pub partitions: Vec<Value>,
    /// Load the table fully into memory.
    pub in_memory: bool,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the load to the given partitions.
    pub fn partitions<I, V>(mut self, partitions: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.partitions = partitions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether the table is loaded into memory.
    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    fn render_partitions(&self) -> String {
        if self.partitions.is_empty() {
            return String::new();
        }
        let items = self
            .partitions
            .iter()
            .map(Value::to_literal)
            .collect::<Vec<_>>()
            .join(",");
        format!("[{}]", items)
    }
}

struct Inner {
    session: Arc<dyn RemoteSession>,
    config: Config,
}

/// Creates query expressions against one remote session.
///
/// Cheap to clone; every expression created here keeps a handle to it.
#[derive(Clone)]
pub struct QueryContext {
    inner: Arc<Inner>,
}

impl QueryContext {
    /// Creates a context with the default configuration.
    pub fn new(session: Arc<dyn RemoteSession>) -> Self {
        Self::with_config(session, Config::default())
    }

    /// Creates a context with an explicit configuration.
    pub fn with_config(session: Arc<dyn RemoteSession>, config: Config) -> Self {
        Self {
            inner: Arc::new(Inner { session, config }),
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    #[inline]
    pub fn session(&self) -> &Arc<dyn RemoteSession> {
        &self.inner.session
    }

    /// Wraps an existing remote table or table-valued expression.
    ///
    /// The schema is not loaded until something needs it.
    pub fn table(&self, name: impl Into<String>) -> Result<Table> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::usage("table name cannot be empty"));
        }
        Ok(Table::from_parts(
            self.clone(),
            name,
            Selection::All,
            None,
            None,
        ))
    }

    /// Uploads local data under a generated name.
    pub fn upload(&self, data: &TabularData) -> Result<Table> {
        self.upload_named(TempName::table(self.config()), data)
    }

    /// Uploads local data under a caller-chosen name.
    pub fn upload_as(&self, alias: &str, data: &TabularData) -> Result<Table> {
        validate_identifier(alias)?;
        self.upload_named(TempName::named(alias), data)
    }

    fn upload_named(&self, handle: TempName, data: &TabularData) -> Result<Table> {
        if data.is_empty() {
            return Err(Error::invalid_data("cannot upload a table without columns"));
        }
        tracing::debug!(
            table = handle.name(),
            rows = data.num_rows(),
            columns = data.num_columns(),
            "uploading table"
        );
        self.session().upload_table(handle.name(), data)?;
        let schema = data.infer_schema(handle.name());
        let select = Selection::Columns(data.column_names().to_vec());
        Ok(Table::from_parts(
            self.clone(),
            handle.name().to_string(),
            select,
            Some(schema),
            Some(handle),
        ))
    }

    /// Loads a persisted table into a variable with a generated name.
    pub fn load_table(&self, db_path: &str, table: &str, options: &LoadOptions) -> Result<Table> {
        let handle = TempName::table(self.config());
        let script = format!(
            "{} = loadTable(\"{}\", \"{}\",{},{})",
            handle.name(),
            db_path,
            table,
            options.render_partitions(),
            options.in_memory
        );
        self.run(&script)?;
        self.adopt(handle)
    }

    /// Loads a delimited text file into a variable with a generated name.
    pub fn load_text(&self, path: &str, delimiter: char) -> Result<Table> {
        let handle = TempName::table(self.config());
        let script = format!("{}=loadText(\"{}\",\"{}\")", handle.name(), path, delimiter);
        self.run(&script)?;
        self.adopt(handle)
    }

    /// Drops the remote variable behind a generated name.
    pub fn release(&self, handle: &TempName) -> Result<()> {
        self.run(&format!("undef(\"{}\", VAR)", handle.name()))?;
        Ok(())
    }

    fn adopt(&self, handle: TempName) -> Result<Table> {
        Ok(Table::from_parts(
            self.clone(),
            handle.name().to_string(),
            Selection::All,
            None,
            Some(handle),
        ))
    }

    /// Dispatches one statement.
    pub(crate) fn run(&self, script: &str) -> Result<QueryResult> {
        if self.config().log_queries {
            tracing::info!(query = script, "dispatching statement");
        } else {
            tracing::debug!(query = script, "dispatching statement");
        }
        self.session().execute(script)
    }

    pub(crate) fn load_schema(&self, table: &str) -> Result<TableSchema> {
        tracing::trace!(table, "loading schema");
        self.session().load_schema(table)
    }
}

impl fmt::Debug for QueryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::RecordingSession;

    fn setup() -> (Arc<RecordingSession>, QueryContext) {
        let session = Arc::new(RecordingSession::new());
        let ctx = QueryContext::new(session.clone());
        (session, ctx)
    }

    #[test]
    fn test_table_requires_name() {
        let (_, ctx) = setup();
        assert!(ctx.table("  ").unwrap_err().is_usage());
        assert_eq!(ctx.table("trades").unwrap().name(), "trades");
    }

    #[test]
    fn test_upload_generates_name() {
        let (session, ctx) = setup();
        let data = TabularData::new().with_column("x", [1i64, 2, 3]).unwrap();

        let t = ctx.upload(&data).unwrap();

        assert!(t.name().starts_with("TMP_TBL_"));
        assert_eq!(t.temp_name().map(TempName::name), Some(t.name()));
        assert_eq!(session.uploads(), vec![t.name().to_string()]);
        assert!(t.is_schema_loaded());
    }

    #[test]
    fn test_upload_as_validates_alias() {
        let (_, ctx) = setup();
        let data = TabularData::new().with_column("x", [1i64]).unwrap();
        assert!(ctx.upload_as("bad name", &data).is_err());
        assert_eq!(ctx.upload_as("quotes", &data).unwrap().name(), "quotes");
    }

    #[test]
    fn test_upload_rejects_empty_data() {
        let (_, ctx) = setup();
        let err = ctx.upload(&TabularData::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidData { .. }));
    }

    #[test]
    fn test_load_table_script() {
        let (session, ctx) = setup();
        let options = LoadOptions::new().partitions(["AAPL", "IBM"]).in_memory(true);

        let t = ctx.load_table("dfs://trades", "quotes", &options).unwrap();

        assert_eq!(
            session.last_statement().unwrap(),
            format!(
                "{} = loadTable(\"dfs://trades\", \"quotes\",[\"AAPL\",\"IBM\"],true)",
                t.name()
            )
        );
    }

    #[test]
    fn test_load_table_without_partitions() {
        let (session, ctx) = setup();
        let t = ctx.load_table("/data/db", "t", &LoadOptions::new()).unwrap();
        assert_eq!(
            session.last_statement().unwrap(),
            format!("{} = loadTable(\"/data/db\", \"t\",,false)", t.name())
        );
    }

    #[test]
    fn test_load_text_and_release() {
        let (session, ctx) = setup();
        let t = ctx.load_text("/tmp/q.csv", ',').unwrap();
        let handle = t.temp_name().cloned().unwrap();

        ctx.release(&handle).unwrap();

        let statements = session.statements();
        assert_eq!(statements[0], format!("{}=loadText(\"/tmp/q.csv\",\",\")", t.name()));
        assert_eq!(statements[1], format!("undef(\"{}\", VAR)", t.name()));
    }
}
