//! Type-safety normalization: downgrade strategies the live column
//! types cannot carry.
//!
//! This runs once per table per execution, against freshly read column
//! groups - an intervening schema change between planning and execution
//! must not be silently trusted. It is a pure mapping step: the caller
//! gets back the adjusted columns plus structured warning records, and
//! nothing here ever fails.

use crate::config::Strategy;
use crate::planner::PlannedColumn;
use crate::schema::TypeGroup;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One strategy downgrade event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSafetyWarning {
    /// Fully-qualified table name.
    pub table: String,
    pub column: String,
    /// The strategy the plan asked for.
    pub strategy: Strategy,
    /// The live type group that rejected it.
    pub group: TypeGroup,
}

/// Whether a strategy may be applied to a column of the given group.
///
/// KEEP and SET_NULL are safe for any group (a NOT NULL violation on
/// SET_NULL is a downstream execution error by design). REDACT,
/// EMAIL_FAKE, and TRUNCATE write text and require STRING. HASH_SHA256
/// also tolerates OTHER, where the text cast is the only representation
/// available.
fn compatible(strategy: Strategy, group: TypeGroup) -> bool {
    match strategy {
        Strategy::Keep | Strategy::SetNull => true,
        Strategy::Redact | Strategy::Truncate | Strategy::EmailFake => group == TypeGroup::String,
        Strategy::HashSha256 => matches!(group, TypeGroup::String | TypeGroup::Other),
    }
}

/// Downgrade every incompatible column strategy to KEEP.
///
/// Columns missing from `groups` (dropped since planning) are treated
/// as OTHER. Returns the adjusted columns and one warning per
/// downgrade.
pub fn normalize_columns(
    table_full: &str,
    columns: &[PlannedColumn],
    groups: &HashMap<String, TypeGroup>,
) -> (Vec<PlannedColumn>, Vec<TypeSafetyWarning>) {
    let mut warnings = Vec::new();

    let normalized = columns
        .iter()
        .map(|col| {
            let group = groups.get(&col.column).copied().unwrap_or(TypeGroup::Other);
            if compatible(col.strategy, group) {
                return col.clone();
            }

            warnings.push(TypeSafetyWarning {
                table: table_full.to_string(),
                column: col.column.clone(),
                strategy: col.strategy,
                group,
            });

            PlannedColumn {
                column: col.column.clone(),
                strategy: Strategy::Keep,
                params: None,
            }
        })
        .collect();

    (normalized, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, strategy: Strategy) -> PlannedColumn {
        PlannedColumn {
            column: name.to_string(),
            strategy,
            params: None,
        }
    }

    fn groups(entries: &[(&str, TypeGroup)]) -> HashMap<String, TypeGroup> {
        entries.iter().map(|(n, g)| (n.to_string(), *g)).collect()
    }

    #[test]
    fn test_keep_and_set_null_pass_for_every_group() {
        let all = [
            TypeGroup::String,
            TypeGroup::Number,
            TypeGroup::Boolean,
            TypeGroup::Date,
            TypeGroup::Json,
            TypeGroup::Uuid,
            TypeGroup::Other,
        ];
        for group in all {
            let (cols, warnings) = normalize_columns(
                "public.t",
                &[col("a", Strategy::Keep), col("b", Strategy::SetNull)],
                &groups(&[("a", group), ("b", group)]),
            );
            assert!(warnings.is_empty(), "unexpected warning for {}", group);
            assert_eq!(cols[0].strategy, Strategy::Keep);
            assert_eq!(cols[1].strategy, Strategy::SetNull);
        }
    }

    #[test]
    fn test_string_only_strategies_downgrade_off_string() {
        for strategy in [Strategy::Redact, Strategy::Truncate, Strategy::EmailFake] {
            let (cols, warnings) = normalize_columns(
                "public.t",
                &[col("id", strategy)],
                &groups(&[("id", TypeGroup::Number)]),
            );
            assert_eq!(cols[0].strategy, Strategy::Keep);
            assert_eq!(warnings.len(), 1);
            assert_eq!(warnings[0].strategy, strategy);
            assert_eq!(warnings[0].group, TypeGroup::Number);
            assert_eq!(warnings[0].table, "public.t");
        }
    }

    #[test]
    fn test_string_only_strategies_pass_on_string() {
        for strategy in [Strategy::Redact, Strategy::Truncate, Strategy::EmailFake] {
            let (cols, warnings) = normalize_columns(
                "public.t",
                &[col("name", strategy)],
                &groups(&[("name", TypeGroup::String)]),
            );
            assert!(warnings.is_empty());
            assert_eq!(cols[0].strategy, strategy);
        }
    }

    #[test]
    fn test_hash_allowed_for_string_and_other_only() {
        for (group, expected) in [
            (TypeGroup::String, Strategy::HashSha256),
            (TypeGroup::Other, Strategy::HashSha256),
            (TypeGroup::Number, Strategy::Keep),
            (TypeGroup::Json, Strategy::Keep),
            (TypeGroup::Uuid, Strategy::Keep),
            (TypeGroup::Date, Strategy::Keep),
            (TypeGroup::Boolean, Strategy::Keep),
        ] {
            let (cols, _) = normalize_columns(
                "public.t",
                &[col("v", Strategy::HashSha256)],
                &groups(&[("v", group)]),
            );
            assert_eq!(cols[0].strategy, expected, "group {}", group);
        }
    }

    #[test]
    fn test_column_missing_from_catalog_treated_as_other() {
        // Dropped since planning: REDACT must not survive.
        let (cols, warnings) =
            normalize_columns("public.t", &[col("ghost", Strategy::Redact)], &groups(&[]));
        assert_eq!(cols[0].strategy, Strategy::Keep);
        assert_eq!(warnings[0].group, TypeGroup::Other);
    }

    #[test]
    fn test_downgrade_drops_params() {
        let columns = vec![PlannedColumn {
            column: "id".to_string(),
            strategy: Strategy::Truncate,
            params: Some(crate::config::StrategyParams { n: Some(8) }),
        }];
        let (cols, _) =
            normalize_columns("public.t", &columns, &groups(&[("id", TypeGroup::Number)]));
        assert_eq!(cols[0].strategy, Strategy::Keep);
        assert!(cols[0].params.is_none());
    }

    #[test]
    fn test_input_columns_unchanged() {
        // Normalization produces a new column list, not an edit.
        let original = vec![col("id", Strategy::Redact)];
        let _ = normalize_columns("public.t", &original, &groups(&[("id", TypeGroup::Number)]));
        assert_eq!(original[0].strategy, Strategy::Redact);
    }
}
