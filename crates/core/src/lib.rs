//! Tabula Core - Core types, schemas and errors for the tabula query builder.
//!
//! This crate provides the foundational types shared by the query-builder
//! layer and the remote session boundary:
//!
//! - `DataType`: Column types reported by the remote engine
//! - `Value`: Cell values and script literals
//! - `TabularData`: Column-major local tables, used for uploads and results
//! - `schema`: Column descriptors and table schemas
//! - `Error`: Error taxonomy for query construction and dispatch
//!
//! # Example
//!
//! ```rust
//! use tabula_core::{DataType, TabularData, Value};
//!
//! let data = TabularData::new()
//!     .with_column("sym", ["IBM", "MSFT"])
//!     .unwrap()
//!     .with_column("price", [101.5f64, 42.0])
//!     .unwrap();
//!
//! let schema = data.infer_schema("quotes");
//! assert_eq!(schema.get_column("price").unwrap().data_type(), DataType::Double);
//! assert_eq!(data.value(0, "sym"), Some(&Value::from("IBM")));
//! ```

#![no_std]

extern crate alloc;

mod error;
mod frame;
pub mod schema;
mod types;
mod value;

pub use error::{Error, Result};
pub use frame::TabularData;
pub use types::DataType;
pub use value::Value;
