//! Policy document type definitions.
//!
//! The policy is a strongly typed structure over a closed strategy
//! enumeration, validated once at the boundary (`validation::preflight`)
//! before it ever reaches the planner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Policy document version this engine supports.
pub const POLICY_VERSION: u32 = 1;

/// Named transform applied to a column's values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Leave the column untouched (no-op).
    Keep,
    /// Assign NULL. Safe for any type group; a NOT NULL constraint
    /// violation is a legitimate execution error, not caught earlier.
    SetNull,
    /// Replace with a fixed three-character mask.
    Redact,
    /// Replace with a deterministic one-way digest of the text value.
    HashSha256,
    /// Keep the first `n` characters of the text value.
    Truncate,
    /// Replace with a deterministic pseudo-address derived from the
    /// original value, so recurring source values stay internally
    /// consistent across a table.
    EmailFake,
}

impl Strategy {
    /// Canonical policy-file spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Keep => "KEEP",
            Strategy::SetNull => "SET_NULL",
            Strategy::Redact => "REDACT",
            Strategy::HashSha256 => "HASH_SHA256",
            Strategy::Truncate => "TRUNCATE",
            Strategy::EmailFake => "EMAIL_FAKE",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional per-column strategy parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Characters to keep for `TRUNCATE` (default 4).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<i32>,
}

/// Root policy document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Policy format version; must equal [`POLICY_VERSION`].
    pub version: u32,

    /// When the policy was generated.
    pub generated_at: DateTime<Utc>,

    /// Must be set to true by a human before an apply run is accepted.
    #[serde(default)]
    pub reviewed: bool,

    /// Which schema is in scope and which tables are excluded outright.
    pub scope: Scope,

    /// Sampling settings used at generation time.
    #[serde(default)]
    pub samples: SampleSettings,

    /// Global strategy map: strategy -> column names it applies to by
    /// default across all tables.
    pub column_strategy: BTreeMap<Strategy, Vec<String>>,

    /// One rule per table.
    pub rules: Vec<TableRule>,
}

/// Scope section of a policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    /// Schema the policy was generated against.
    pub schema: String,

    /// Tables excluded from planning entirely, regardless of their
    /// rule's enabled flag. Entries may be `schema.table` or bare names.
    #[serde(default)]
    pub denylist_tables: Vec<String>,
}

/// Sampling settings recorded in a generated policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSettings {
    /// Rows sampled per table at generation time.
    pub limit: usize,

    /// Whether sample values were masked before being written out.
    pub masked: bool,
}

impl Default for SampleSettings {
    fn default() -> Self {
        Self {
            limit: 3,
            masked: true,
        }
    }
}

/// Per-table rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRule {
    /// Fully-qualified `schema.table` name.
    pub table: String,

    /// Disabled rules are skipped during planning.
    pub enabled: bool,

    /// Column entries; absence of a strategy field means "no override",
    /// not an explicit KEEP.
    pub columns: Vec<ColumnRule>,
}

/// Per-column entry within a table rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRule {
    pub column: String,

    /// Explicit per-table strategy override, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,

    /// Parameters for the override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<StrategyParams>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_yaml_spelling() {
        let s: Strategy = serde_yaml::from_str("HASH_SHA256").unwrap();
        assert_eq!(s, Strategy::HashSha256);
        assert_eq!(serde_yaml::to_string(&Strategy::SetNull).unwrap().trim(), "SET_NULL");
    }

    #[test]
    fn test_unknown_strategy_rejected_at_parse() {
        // The enumeration is closed: unknown names never make it past
        // deserialization into the planner.
        let result: std::result::Result<Strategy, _> = serde_yaml::from_str("SCRAMBLE");
        assert!(result.is_err());
    }

    #[test]
    fn test_column_rule_without_strategy_is_no_override() {
        let rule: ColumnRule = serde_yaml::from_str("column: email").unwrap();
        assert_eq!(rule.column, "email");
        assert!(rule.strategy.is_none());
        assert!(rule.params.is_none());
    }
}
