//! Strategy resolution: policy -> execution plan.
//!
//! The plan is an immutable snapshot, rebuilt from scratch for every
//! dry run and every apply - never reused across runs, since the live
//! schema may have changed in between.

use crate::config::{ColumnRule, Policy, Strategy, StrategyParams};
use crate::error::{AnonError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A column with its resolved strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedColumn {
    pub column: String,
    pub strategy: Strategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<StrategyParams>,
}

/// A table with its resolved column strategies, in rule order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedTable {
    pub schema: String,
    pub name: String,
    pub columns: Vec<PlannedColumn>,
}

impl PlannedTable {
    /// Fully-qualified `schema.table` name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// Resolved, schema-bound execution plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub created_at: DateTime<Utc>,
    pub tables: Vec<PlannedTable>,
}

/// Split a fully-qualified `schema.table` name.
pub(crate) fn split_table(full: &str) -> Result<(&str, &str)> {
    match full.split_once('.') {
        Some((schema, name)) if !schema.is_empty() && !name.is_empty() && !name.contains('.') => {
            Ok((schema, name))
        }
        _ => Err(AnonError::Config(format!(
            "Invalid table name \"{}\". Expected format: schema.table",
            full
        ))),
    }
}

/// Resolve the strategy for a single column.
///
/// Precedence, highest first:
/// 1. Table-level column entry with an explicit strategy (absence of
///    the strategy field means "no override", not KEEP)
/// 2. Global strategy map, by exact column-name membership
/// 3. Default: KEEP
///
/// Validation has already rejected columns listed under more than one
/// global group, so the map scan cannot be ambiguous.
fn resolve_strategy(
    column_name: &str,
    table_columns: &[ColumnRule],
    global: &BTreeMap<Strategy, Vec<String>>,
) -> (Strategy, Option<StrategyParams>) {
    for rule in table_columns {
        if rule.column == column_name {
            if let Some(strategy) = rule.strategy {
                return (strategy, rule.params.clone());
            }
        }
    }

    for (strategy, columns) in global {
        if columns.iter().any(|c| c == column_name) {
            return (*strategy, None);
        }
    }

    (Strategy::Keep, None)
}

/// Build an execution plan from a validated policy.
///
/// Table filtering precedes resolution: disabled rules are dropped, as
/// is any table whose fully-qualified or bare name appears in the
/// denylist. Pure transformation - deterministic for fixed inputs.
pub fn build_plan(policy: &Policy) -> Result<Plan> {
    let denylist: HashSet<&str> = policy
        .scope
        .denylist_tables
        .iter()
        .map(String::as_str)
        .collect();

    let mut tables = Vec::new();

    for rule in &policy.rules {
        if !rule.enabled {
            continue;
        }

        let (schema, name) = split_table(&rule.table)?;
        if denylist.contains(rule.table.as_str()) || denylist.contains(name) {
            continue;
        }

        let columns = rule
            .columns
            .iter()
            .map(|col| {
                let (strategy, params) =
                    resolve_strategy(&col.column, &rule.columns, &policy.column_strategy);
                PlannedColumn {
                    column: col.column.clone(),
                    strategy,
                    params,
                }
            })
            .collect();

        tables.push(PlannedTable {
            schema: schema.to_string(),
            name: name.to_string(),
            columns,
        });
    }

    Ok(Plan {
        created_at: Utc::now(),
        tables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SampleSettings, Scope, TableRule, POLICY_VERSION};

    fn policy_with(
        column_strategy: BTreeMap<Strategy, Vec<String>>,
        rules: Vec<TableRule>,
        denylist: Vec<String>,
    ) -> Policy {
        Policy {
            version: POLICY_VERSION,
            generated_at: Utc::now(),
            reviewed: true,
            scope: Scope {
                schema: "public".to_string(),
                denylist_tables: denylist,
            },
            samples: SampleSettings::default(),
            column_strategy,
            rules,
        }
    }

    fn column(name: &str) -> ColumnRule {
        ColumnRule {
            column: name.to_string(),
            strategy: None,
            params: None,
        }
    }

    fn column_with(name: &str, strategy: Strategy) -> ColumnRule {
        ColumnRule {
            column: name.to_string(),
            strategy: Some(strategy),
            params: None,
        }
    }

    fn global(entries: &[(Strategy, &[&str])]) -> BTreeMap<Strategy, Vec<String>> {
        entries
            .iter()
            .map(|(s, cols)| (*s, cols.iter().map(|c| c.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_table_override_beats_global_map() {
        let policy = policy_with(
            global(&[(Strategy::EmailFake, &["email"])]),
            vec![TableRule {
                table: "public.users".to_string(),
                enabled: true,
                columns: vec![column_with("email", Strategy::SetNull)],
            }],
            vec![],
        );

        let plan = build_plan(&policy).unwrap();
        assert_eq!(plan.tables[0].columns[0].strategy, Strategy::SetNull);
    }

    #[test]
    fn test_global_map_membership() {
        let policy = policy_with(
            global(&[(Strategy::EmailFake, &["email"])]),
            vec![TableRule {
                table: "public.users".to_string(),
                enabled: true,
                columns: vec![column("email")],
            }],
            vec![],
        );

        let plan = build_plan(&policy).unwrap();
        assert_eq!(plan.tables[0].columns[0].strategy, Strategy::EmailFake);
    }

    #[test]
    fn test_unmatched_column_defaults_to_keep() {
        let policy = policy_with(
            global(&[(Strategy::EmailFake, &["email"])]),
            vec![TableRule {
                table: "public.users".to_string(),
                enabled: true,
                columns: vec![column("nickname")],
            }],
            vec![],
        );

        let plan = build_plan(&policy).unwrap();
        assert_eq!(plan.tables[0].columns[0].strategy, Strategy::Keep);
    }

    #[test]
    fn test_absent_strategy_field_is_not_keep_override() {
        // A column entry without a strategy must still pick up the
        // global map, not shadow it with an implicit KEEP.
        let policy = policy_with(
            global(&[(Strategy::HashSha256, &["phone"])]),
            vec![TableRule {
                table: "public.users".to_string(),
                enabled: true,
                columns: vec![column("phone")],
            }],
            vec![],
        );

        let plan = build_plan(&policy).unwrap();
        assert_eq!(plan.tables[0].columns[0].strategy, Strategy::HashSha256);
    }

    #[test]
    fn test_disabled_table_excluded() {
        let policy = policy_with(
            global(&[(Strategy::EmailFake, &["email"])]),
            vec![TableRule {
                table: "public.users".to_string(),
                enabled: false,
                columns: vec![column("email")],
            }],
            vec![],
        );

        assert!(build_plan(&policy).unwrap().tables.is_empty());
    }

    #[test]
    fn test_denylist_beats_enabled_flag() {
        let policy = policy_with(
            global(&[(Strategy::EmailFake, &["email"])]),
            vec![TableRule {
                table: "public.secrets".to_string(),
                enabled: true,
                columns: vec![column("email")],
            }],
            vec!["public.secrets".to_string()],
        );

        assert!(build_plan(&policy).unwrap().tables.is_empty());
    }

    #[test]
    fn test_denylist_matches_bare_name() {
        let policy = policy_with(
            global(&[(Strategy::EmailFake, &["email"])]),
            vec![TableRule {
                table: "public.secrets".to_string(),
                enabled: true,
                columns: vec![column("email")],
            }],
            vec!["secrets".to_string()],
        );

        assert!(build_plan(&policy).unwrap().tables.is_empty());
    }

    #[test]
    fn test_malformed_table_name_fails() {
        for bad in ["users", ".users", "public.", "a.b.c"] {
            let policy = policy_with(
                global(&[(Strategy::EmailFake, &["email"])]),
                vec![TableRule {
                    table: bad.to_string(),
                    enabled: true,
                    columns: vec![],
                }],
                vec![],
            );
            assert!(build_plan(&policy).is_err(), "expected error for {:?}", bad);
        }
    }

    #[test]
    fn test_override_params_carried_into_plan() {
        let policy = policy_with(
            global(&[(Strategy::EmailFake, &["email"])]),
            vec![TableRule {
                table: "public.users".to_string(),
                enabled: true,
                columns: vec![ColumnRule {
                    column: "bio".to_string(),
                    strategy: Some(Strategy::Truncate),
                    params: Some(StrategyParams { n: Some(10) }),
                }],
            }],
            vec![],
        );

        let plan = build_plan(&policy).unwrap();
        let col = &plan.tables[0].columns[0];
        assert_eq!(col.strategy, Strategy::Truncate);
        assert_eq!(col.params.as_ref().unwrap().n, Some(10));
    }
}
