//! An in-process session that records instead of executing.

use super::{QueryResult, RemoteSession};
use hashbrown::HashMap;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tabula_core::schema::TableSchema;
use tabula_core::{Error, Result, TabularData};

#[derive(Default)]
struct State {
    statements: Vec<String>,
    schema_loads: Vec<String>,
    uploads: Vec<String>,
    schemas: HashMap<String, TableSchema>,
    responses: VecDeque<QueryResult>,
    rejections: Vec<String>,
}

/// A `RemoteSession` that records every call.
///
/// Schema queries are answered from registered schemas, statements return
/// queued responses in order (or `QueryResult::Void` once the queue is
/// empty), and uploads register the inferred schema of the uploaded data.
/// Useful for dry runs that only need the compiled text.
#[derive(Default)]
pub struct RecordingSession {
    state: Mutex<State>,
}

impl RecordingSession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table schema, builder style.
    pub fn with_table(self, schema: TableSchema) -> Self {
        self.register_table(schema);
        self
    }

    /// Registers a table schema under its own name.
    pub fn register_table(&self, schema: TableSchema) {
        self.lock()
            .schemas
            .insert(schema.name().to_string(), schema);
    }

    /// Queues the result returned by the next `execute`.
    pub fn push_response(&self, result: QueryResult) {
        self.lock().responses.push_back(result);
    }

    /// Makes `execute` fail for statements containing `fragment`.
    pub fn reject_containing(&self, fragment: impl Into<String>) {
        self.lock().rejections.push(fragment.into());
    }

    /// Returns every executed statement in order.
    pub fn statements(&self) -> Vec<String> {
        self.lock().statements.clone()
    }

    /// Returns the most recently executed statement.
    pub fn last_statement(&self) -> Option<String> {
        self.lock().statements.last().cloned()
    }

    /// Returns the names passed to `load_schema` in order.
    pub fn schema_loads(&self) -> Vec<String> {
        self.lock().schema_loads.clone()
    }

    /// Returns the names passed to `upload_table` in order.
    pub fn uploads(&self) -> Vec<String> {
        self.lock().uploads.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RemoteSession for RecordingSession {
    fn execute(&self, script: &str) -> Result<QueryResult> {
        let mut state = self.lock();
        state.statements.push(script.to_string());
        if let Some(fragment) = state.rejections.iter().find(|f| script.contains(f.as_str())) {
            return Err(Error::remote(format!("statement rejected near '{}'", fragment)));
        }
        Ok(state.responses.pop_front().unwrap_or(QueryResult::Void))
    }

    fn load_schema(&self, table: &str) -> Result<TableSchema> {
        let mut state = self.lock();
        state.schema_loads.push(table.to_string());
        state
            .schemas
            .get(table)
            .cloned()
            .ok_or_else(|| Error::remote(format!("Can't recognize table {}", table)))
    }

    fn upload_table(&self, name: &str, data: &TabularData) -> Result<()> {
        let mut state = self.lock();
        state.uploads.push(name.to_string());
        state
            .schemas
            .insert(name.to_string(), data.infer_schema(name));
        Ok(())
    }
}
