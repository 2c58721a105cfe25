//! Starter policy generation from a live schema.
//!
//! Emits a policy where every table is enabled and every column carries
//! no override (so everything resolves to KEEP until a human edits the
//! file), together with a masked per-column sample preview to make the
//! review step practical.

use super::{ColumnRule, Policy, SampleSettings, Scope, Strategy, TableRule, POLICY_VERSION};
use crate::error::Result;
use crate::ident;
use crate::schema::{read_schema, TableInfo};
use chrono::Utc;
use std::collections::BTreeMap;
use tokio_postgres::GenericClient;
use tracing::info;

/// Per-table, per-column sample values, keyed by `schema.table`.
pub type SamplePreview = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Output of policy generation.
#[derive(Debug)]
pub struct GeneratedPolicy {
    pub policy: Policy,
    /// Fully-qualified names of every table found.
    pub tables: Vec<String>,
    pub samples: SamplePreview,
}

/// Default global strategy map seeded into generated policies.
///
/// These cover the column names that recur across typical application
/// schemas; the review step is expected to adjust them.
fn default_strategy_map() -> BTreeMap<Strategy, Vec<String>> {
    let mut map = BTreeMap::new();
    map.insert(
        Strategy::Keep,
        ["id", "created_at", "updated_at", "status", "type"]
            .map(String::from)
            .to_vec(),
    );
    map.insert(Strategy::EmailFake, vec!["email".to_string()]);
    map.insert(
        Strategy::HashSha256,
        ["phone", "mobile", "username"].map(String::from).to_vec(),
    );
    map.insert(Strategy::Redact, vec!["address".to_string()]);
    map.insert(
        Strategy::SetNull,
        ["raw_payload", "debug_info"].map(String::from).to_vec(),
    );
    map
}

/// Mask a sample value for safe inclusion in the generated preview:
/// short values become `***`, longer ones keep the first and last two
/// characters.
pub fn mask_sample(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 6 {
        return "***".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Generate a starter policy and sample preview for a schema.
pub async fn generate_policy<C>(
    client: &C,
    schema: &str,
    sample_limit: usize,
    unsafe_samples: bool,
) -> Result<GeneratedPolicy>
where
    C: GenericClient + Sync,
{
    let tables = read_schema(client, schema).await?;
    info!("Found {} tables in schema \"{}\"", tables.len(), schema);

    let table_names: Vec<String> = tables.iter().map(|t| t.full_name()).collect();

    let mut samples = SamplePreview::new();
    let mut rules = Vec::with_capacity(tables.len());

    for table in &tables {
        samples.insert(
            table.full_name(),
            sample_table(client, table, sample_limit, unsafe_samples).await?,
        );

        rules.push(TableRule {
            table: table.full_name(),
            enabled: true,
            columns: table
                .columns
                .iter()
                .map(|c| ColumnRule {
                    column: c.name.clone(),
                    strategy: None,
                    params: None,
                })
                .collect(),
        });
    }

    let policy = Policy {
        version: POLICY_VERSION,
        generated_at: Utc::now(),
        reviewed: false,
        scope: Scope {
            schema: schema.to_string(),
            denylist_tables: vec![],
        },
        samples: SampleSettings {
            limit: sample_limit,
            masked: !unsafe_samples,
        },
        column_strategy: default_strategy_map(),
        rules,
    };

    Ok(GeneratedPolicy {
        policy,
        tables: table_names,
        samples,
    })
}

/// Pull up to `limit` rows of a table, every column cast to text.
///
/// May be slow on huge tables; acceptable for a one-off generation run.
async fn sample_table<C>(
    client: &C,
    table: &TableInfo,
    limit: usize,
    unsafe_samples: bool,
) -> Result<BTreeMap<String, Vec<String>>>
where
    C: GenericClient + Sync,
{
    let mut preview: BTreeMap<String, Vec<String>> =
        table.columns.iter().map(|c| (c.name.clone(), vec![])).collect();

    if table.columns.is_empty() {
        return Ok(preview);
    }

    let select_list = table
        .columns
        .iter()
        .map(|c| ident::quote(&c.name).map(|q| format!("{}::text", q)))
        .collect::<Result<Vec<_>>>()?
        .join(", ");

    let sql = format!(
        "SELECT {} FROM {} LIMIT $1",
        select_list,
        ident::qualify(&table.schema, &table.name)?
    );

    let rows = client.query(sql.as_str(), &[&(limit as i64)]).await?;

    for row in rows {
        for (idx, column) in table.columns.iter().enumerate() {
            let value: Option<String> = row.get(idx);
            let Some(value) = value else { continue };

            let Some(values) = preview.get_mut(&column.name) else {
                continue;
            };
            if values.len() >= limit {
                continue;
            }
            values.push(if unsafe_samples {
                value
            } else {
                mask_sample(&value)
            });
        }
    }

    Ok(preview)
}
