//! # pg-anon
//!
//! Policy-driven, in-place anonymization engine for PostgreSQL.
//!
//! Given a declarative policy describing which columns to keep, null,
//! redact, hash, or pseudonymize, this library:
//!
//! - **Resolves** the policy into a concrete execution plan against the
//!   live schema
//! - **Normalizes** per-column strategies against live column types,
//!   downgrading unsafe assignments to no-ops
//! - **Compiles** each planned table into a single parameterized UPDATE
//! - **Executes** the plan with a verified dry-run mode that rolls back
//!   every mutation, or an apply mode whose transaction the caller owns
//!
//! ## Example
//!
//! ```rust,no_run
//! use pg_anon::{build_plan, dry_run_plan, enforce_row_cap, DbConfig, Policy};
//!
//! #[tokio::main]
//! async fn main() -> pg_anon::Result<()> {
//!     let policy = Policy::load("anonymizer.yaml")?;
//!     policy.preflight(pg_anon::ExecMode::DryRun)?;
//!
//!     let plan = build_plan(&policy)?;
//!     let mut client = pg_anon::db::connect(&DbConfig::from_env()?).await?;
//!
//!     let report = dry_run_plan(&mut client, &plan).await?;
//!     enforce_row_cap(report.total(), 1_000_000, false)?;
//!     println!("{} rows would be affected", report.total());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod executor;
pub mod ident;
pub mod planner;
pub mod schema;
pub mod suggest;

// Re-exports for convenient access
pub use config::{ColumnRule, Policy, Scope, Strategy, StrategyParams, TableRule};
pub use db::DbConfig;
pub use error::{AnonError, Result};
pub use executor::{
    apply_plan, dry_run_plan, enforce_row_cap, ExecMode, ExecutionReport, MutatingStatement,
    TypeSafetyWarning,
};
pub use planner::{build_plan, Plan, PlannedColumn, PlannedTable};
pub use schema::{classify, ColumnInfo, TableInfo, TypeGroup};
