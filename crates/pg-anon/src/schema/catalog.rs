//! Column catalog reads from `information_schema`.
//!
//! Catalog data is always read fresh at the point of use - planning and
//! execution are decoupled in time and the schema may change between
//! them, so nothing here is cached across runs.

use crate::error::Result;
use crate::schema::types::{classify, TypeGroup};
use std::collections::HashMap;
use tokio_postgres::GenericClient;

/// A column as reported by the live catalog.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub udt_name: String,
    pub is_nullable: bool,
}

/// A base table with its columns, in ordinal order.
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub schema: String,
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

impl TableInfo {
    /// Fully-qualified `schema.table` name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// List all base tables of a schema with their columns.
pub async fn read_schema<C>(client: &C, schema: &str) -> Result<Vec<TableInfo>>
where
    C: GenericClient + Sync,
{
    let table_rows = client
        .query(
            "SELECT table_schema, table_name
             FROM information_schema.tables
             WHERE table_type = 'BASE TABLE'
               AND table_schema = $1
             ORDER BY table_name",
            &[&schema],
        )
        .await?;

    let mut tables = Vec::with_capacity(table_rows.len());
    for row in table_rows {
        let table_schema: String = row.get(0);
        let table_name: String = row.get(1);

        let col_rows = client
            .query(
                "SELECT column_name, data_type, udt_name, is_nullable
                 FROM information_schema.columns
                 WHERE table_schema = $1 AND table_name = $2
                 ORDER BY ordinal_position",
                &[&table_schema, &table_name],
            )
            .await?;

        let columns = col_rows
            .iter()
            .map(|r| ColumnInfo {
                name: r.get(0),
                data_type: r.get(1),
                udt_name: r.get(2),
                is_nullable: r.get::<_, String>(3) == "YES",
            })
            .collect();

        tables.push(TableInfo {
            schema: table_schema,
            name: table_name,
            columns,
        });
    }

    Ok(tables)
}

/// Read the current type group of every column of one table.
///
/// Called once per table per execution, immediately before the table's
/// statement is compiled.
pub async fn read_column_groups<C>(
    client: &C,
    schema: &str,
    table: &str,
) -> Result<HashMap<String, TypeGroup>>
where
    C: GenericClient + Sync,
{
    let rows = client
        .query(
            "SELECT column_name, data_type, udt_name
             FROM information_schema.columns
             WHERE table_schema = $1 AND table_name = $2",
            &[&schema, &table],
        )
        .await?;

    let mut groups = HashMap::with_capacity(rows.len());
    for row in rows {
        let name: String = row.get(0);
        let data_type: String = row.get(1);
        let udt_name: String = row.get(2);
        groups.insert(name, classify(&data_type, &udt_name));
    }

    Ok(groups)
}
