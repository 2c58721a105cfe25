//! Live schema introspection: column catalog reads and type classification.

mod catalog;
mod types;

pub use catalog::{read_column_groups, read_schema, ColumnInfo, TableInfo};
pub use types::{classify, TypeGroup};
