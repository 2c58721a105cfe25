//! Heuristic strategy suggestions from column names.
//!
//! Advisory input only: the output is candidate material for a policy's
//! global strategy map and goes through the same resolution precedence
//! and type-safety normalization as any hand-written policy content.

use crate::config::Strategy;
use crate::schema::TableInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const EMAIL_KEYS: &[&str] = &["email", "e_mail", "mail"];
const PHONE_KEYS: &[&str] = &["phone", "mobile"];
const SECRET_KEYS: &[&str] = &["token", "secret", "password", "key"];
const NAME_KEYS: &[&str] = &["name"];

/// Estimated exposure risk of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Risk {
    Low,
    Medium,
    High,
}

/// Result of a heuristic scan over a schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestions {
    /// Risk level per (lowercased) column name.
    pub risk_by_column: BTreeMap<String, Risk>,

    /// Recommended global strategy map, ready to paste into a policy.
    pub recommendations: BTreeMap<Strategy, Vec<String>>,
}

fn matches_any(column: &str, keys: &[&str]) -> bool {
    keys.iter().any(|k| column.contains(k))
}

/// Scan column names and recommend a strategy per column.
///
/// Email-ish columns get `EMAIL_FAKE`, phone-ish get `HASH_SHA256`,
/// secret-ish get `SET_NULL`, name-ish get `REDACT`, everything else
/// `KEEP`. Purely lexical, no data access.
pub fn heuristic_scan(tables: &[TableInfo]) -> Suggestions {
    let mut risk_by_column = BTreeMap::new();
    let mut recommendations: BTreeMap<Strategy, Vec<String>> = BTreeMap::new();

    for table in tables {
        for column in &table.columns {
            let name = column.name.to_lowercase();
            if risk_by_column.contains_key(&name) {
                continue;
            }

            let (risk, strategy) = if matches_any(&name, EMAIL_KEYS) {
                (Risk::High, Strategy::EmailFake)
            } else if matches_any(&name, PHONE_KEYS) {
                (Risk::High, Strategy::HashSha256)
            } else if matches_any(&name, SECRET_KEYS) {
                (Risk::High, Strategy::SetNull)
            } else if matches_any(&name, NAME_KEYS) {
                (Risk::Medium, Strategy::Redact)
            } else {
                (Risk::Low, Strategy::Keep)
            };

            risk_by_column.insert(name.clone(), risk);
            recommendations.entry(strategy).or_default().push(name);
        }
    }

    Suggestions {
        risk_by_column,
        recommendations,
    }
}
