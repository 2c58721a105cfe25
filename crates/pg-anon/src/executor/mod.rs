//! Execution engine: runs a plan against one connection, per table in
//! plan order, under the dry-run/apply transactional protocol.
//!
//! Tables are processed strictly sequentially on a single connection:
//! one transaction spans an entire dry run, and row-count accounting
//! plus the all-or-nothing guarantee depend on ordered, serial
//! execution. Nothing here retries; the only built-in fallback is the
//! type-safety downgrade in [`normalize`].

mod normalize;
mod safeguards;
mod statement;

pub use normalize::{normalize_columns, TypeSafetyWarning};
pub use safeguards::enforce_row_cap;
pub use statement::{build_update, MutatingStatement, FAKE_EMAIL_DOMAIN, REDACT_MASK};

use crate::error::{AnonError, Result};
use crate::planner::{Plan, PlannedTable};
use crate::schema::read_column_groups;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, GenericClient};
use tracing::{info, warn};

/// Run mode for a plan execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecMode {
    /// All statements run inside a transaction that is always rolled
    /// back; used to measure effect without persisting it.
    #[serde(rename = "dryrun")]
    DryRun,
    /// Statements persist; commit/rollback ownership stays with the
    /// caller.
    #[serde(rename = "apply")]
    Apply,
}

impl fmt::Display for ExecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecMode::DryRun => "dryrun",
            ExecMode::Apply => "apply",
        })
    }
}

/// Result of one plan execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub mode: ExecMode,

    /// Affected-row count per fully-qualified table name. Skipped
    /// tables are recorded as 0.
    pub updated_by_table: BTreeMap<String, u64>,

    /// Every type-safety downgrade that occurred during the run.
    pub warnings: Vec<TypeSafetyWarning>,
}

impl ExecutionReport {
    fn new(mode: ExecMode) -> Self {
        Self {
            mode,
            updated_by_table: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Sum of affected rows across all tables.
    pub fn total(&self) -> u64 {
        self.updated_by_table.values().sum()
    }

    /// Convert to a pretty JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Execute a plan in dry-run mode.
///
/// Opens a transaction, runs every table's statement, and
/// unconditionally rolls back - on success so that no mutation
/// persists, on failure with partial counts discarded.
pub async fn dry_run_plan(client: &mut Client, plan: &Plan) -> Result<ExecutionReport> {
    info!("Starting dry-run transaction");
    let tx = client.transaction().await?;

    match run_tables(&tx, plan, ExecMode::DryRun).await {
        Ok(report) => {
            tx.rollback().await?;
            info!("Dry run completed - transaction rolled back");
            Ok(report)
        }
        Err(e) => {
            // Propagate the original failure even if rollback also fails
            // (e.g. the connection is gone).
            if let Err(rb) = tx.rollback().await {
                warn!("Rollback after failed dry run also failed: {}", rb);
            }
            Err(e)
        }
    }
}

/// Execute a plan in apply mode.
///
/// The engine never commits: the caller owns the surrounding
/// transaction and must commit only after this returns without error.
/// On failure everything executed so far is undone by the caller's
/// rollback - all-or-nothing holds only in combination with that
/// contract.
pub async fn apply_plan<C>(client: &C, plan: &Plan) -> Result<ExecutionReport>
where
    C: GenericClient + Sync,
{
    run_tables(client, plan, ExecMode::Apply).await
}

/// Per-table loop shared by both modes: fetch live column groups,
/// normalize, compile, execute, accumulate.
async fn run_tables<C>(client: &C, plan: &Plan, mode: ExecMode) -> Result<ExecutionReport>
where
    C: GenericClient + Sync,
{
    let mut report = ExecutionReport::new(mode);

    for table in &plan.tables {
        let full = table.full_name();

        // Types are read fresh here, never reused from planning time.
        let groups = read_column_groups(client, &table.schema, &table.name).await?;
        let (columns, warnings) = normalize_columns(&full, &table.columns, &groups);

        for w in &warnings {
            warn!(
                "[type-safety] {}.{} is {}. Strategy \"{}\" not compatible. Downgrading to \"KEEP\".",
                w.table, w.column, w.group, w.strategy
            );
        }
        report.warnings.extend(warnings);

        let normalized = PlannedTable {
            schema: table.schema.clone(),
            name: table.name.clone(),
            columns,
        };

        let Some(stmt) = build_update(&normalized)? else {
            report.updated_by_table.insert(full.clone(), 0);
            info!("Skipping {} (no changes)", full);
            continue;
        };

        let params: Vec<&(dyn ToSql + Sync)> = stmt
            .params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect();

        let count = client
            .execute(stmt.sql.as_str(), &params)
            .await
            .map_err(|e| AnonError::execution(&full, e.to_string()))?;

        report.updated_by_table.insert(full.clone(), count);
        info!("[{}] {}: {} rows", mode, full, count);
    }

    Ok(report)
}
