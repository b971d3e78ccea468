//! Tabula Query - Lazy query builder and SQL compiler for remote tables.
//!
//! This crate builds query expressions against a remote analytical engine
//! and compiles them to statement text:
//!
//! - `QueryContext`: Entry point; wraps, uploads and loads remote tables
//! - `Table`: Immutable lazy query expression with chainable clauses
//! - `GroupedView` / `PartitionedView`: `group by` and `context by` aggregation
//! - `UpdateDirective` / `DeleteDirective`: Mutation statements
//! - `PivotView`: `pivot by` queries
//! - `RemoteSession`: The boundary to the engine; `RecordingSession` records
//!   statements instead of running them
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tabula_query::{QueryContext, RecordingSession};
//!
//! let ctx = QueryContext::new(Arc::new(RecordingSession::new()));
//! let q = ctx
//!     .table("trades")
//!     .unwrap()
//!     .where_("price>10")
//!     .select(["sym", "price"])
//!     .sort("sym");
//!
//! assert_eq!(
//!     q.compile().unwrap(),
//!     "select sym,price from trades where price>10 order by sym"
//! );
//! ```

mod agg;
mod args;
mod column;
mod compile;
mod config;
mod context;
mod grouped;
mod join;
mod mutation;
mod names;
mod pivot;
mod session;
mod table;

pub use agg::{AggSpec, ColumnPairs};
pub use args::{IntoNames, IntoPredicates};
pub use column::{ColumnRef, FilterCond};
pub use compile::{normalize_whitespace, replace_first_keyword};
pub use config::Config;
pub use context::{LoadOptions, QueryContext};
pub use grouped::{GroupedView, PartitionedView};
pub use join::{JoinHow, JoinKeys, MergeOptions, WindowJoin};
pub use mutation::{DeleteDirective, SqlIntent, UpdateDirective};
pub use names::TempName;
pub use pivot::PivotView;
pub use session::{QueryResult, RecordingSession, RemoteSession};
pub use table::{JoinSources, Partition, Selection, Table};

pub use tabula_core::{DataType, Error, Result, TabularData, Value};
