//! Preflight policy validation.

use super::{Policy, POLICY_VERSION};
use crate::error::{AnonError, Result};
use crate::executor::ExecMode;
use std::collections::HashMap;

/// Validate a policy before any plan is built.
///
/// Fatal checks, in order: supported version, human review flag for
/// apply runs, at least one enabled table rule, a non-empty global
/// strategy map, no column name listed under more than one global
/// strategy group (resolution by map order would be an accident of the
/// map implementation, so a double listing is rejected outright), and
/// no negative truncate length (`LEFT` interprets a negative count as
/// "drop from the end", which is never what a policy author means).
pub fn preflight(policy: &Policy, mode: ExecMode) -> Result<()> {
    if policy.version != POLICY_VERSION {
        return Err(AnonError::Config(format!(
            "Unsupported policy version: {} (supported: {})",
            policy.version, POLICY_VERSION
        )));
    }

    if mode == ExecMode::Apply && !policy.reviewed {
        return Err(AnonError::Config(
            "Refusing to apply: policy.reviewed must be true".into(),
        ));
    }

    let enabled_tables = policy.rules.iter().filter(|r| r.enabled).count();
    if enabled_tables == 0 {
        return Err(AnonError::Config("No enabled tables in policy.rules".into()));
    }

    if policy.column_strategy.is_empty() {
        return Err(AnonError::Config(
            "column_strategy must be defined and non-empty in policy".into(),
        ));
    }

    let mut seen: HashMap<&str, super::Strategy> = HashMap::new();
    for (strategy, columns) in &policy.column_strategy {
        for column in columns {
            if let Some(previous) = seen.insert(column.as_str(), *strategy) {
                return Err(AnonError::Config(format!(
                    "Column \"{}\" is listed under both {} and {} in column_strategy; \
                     a column may belong to at most one global strategy group",
                    column, previous, strategy
                )));
            }
        }
    }

    for rule in &policy.rules {
        for column in &rule.columns {
            if let Some(n) = column.params.as_ref().and_then(|p| p.n) {
                if n < 0 {
                    return Err(AnonError::Config(format!(
                        "Truncate length must be non-negative: {}.{} has n = {}",
                        rule.table, column.column, n
                    )));
                }
            }
        }
    }

    Ok(())
}
