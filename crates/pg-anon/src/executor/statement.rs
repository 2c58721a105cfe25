//! Mutating statement compilation: planned table -> single UPDATE.

use crate::config::Strategy;
use crate::error::Result;
use crate::ident;
use crate::planner::PlannedTable;

/// Fixed mask literal written by `REDACT`.
pub const REDACT_MASK: &str = "***";

/// Domain suffix appended by `EMAIL_FAKE`.
pub const FAKE_EMAIL_DOMAIN: &str = "@example.com";

/// Characters kept by `TRUNCATE` when no `n` parameter is given.
const DEFAULT_TRUNCATE_LEN: i32 = 4;

/// One UPDATE statement with its bound parameters.
///
/// Only `TRUNCATE` lengths are bound; every identifier is quoted, and
/// every other value is a fixed literal or a server-side expression.
#[derive(Debug, Clone, PartialEq)]
pub struct MutatingStatement {
    pub sql: String,
    pub params: Vec<i32>,
}

/// SHA-256 hex digest of a column's text representation, computed
/// server-side. NULL hashes as the empty string so repeated runs on
/// unchanged data stay deterministic.
fn digest_expr(quoted_col: &str) -> String {
    format!(
        "encode(sha256(convert_to(COALESCE({}::text, ''), 'UTF8')), 'hex')",
        quoted_col
    )
}

/// Compile a table's normalized column decisions into one UPDATE.
///
/// Columns resolve in order; `KEEP` contributes no fragment. Returns
/// `None` when every column is a no-op, in which case the table must be
/// skipped and recorded as zero affected rows.
pub fn build_update(table: &PlannedTable) -> Result<Option<MutatingStatement>> {
    let mut sets: Vec<String> = Vec::new();
    let mut params: Vec<i32> = Vec::new();

    for planned in &table.columns {
        let col = ident::quote(&planned.column)?;

        match planned.strategy {
            Strategy::Keep => continue,

            Strategy::SetNull => sets.push(format!("{} = NULL", col)),

            Strategy::Redact => sets.push(format!("{} = '{}'", col, REDACT_MASK)),

            Strategy::HashSha256 => sets.push(format!("{} = {}", col, digest_expr(&col))),

            Strategy::Truncate => {
                let n = planned
                    .params
                    .as_ref()
                    .and_then(|p| p.n)
                    .unwrap_or(DEFAULT_TRUNCATE_LEN);
                params.push(n);
                sets.push(format!(
                    "{} = LEFT(COALESCE({}::text, ''), ${})",
                    col,
                    col,
                    params.len()
                ));
            }

            Strategy::EmailFake => sets.push(format!(
                "{} = ({} || '{}')",
                col,
                digest_expr(&col),
                FAKE_EMAIL_DOMAIN
            )),
        }
    }

    if sets.is_empty() {
        return Ok(None);
    }

    let sql = format!(
        "UPDATE {} SET {}",
        ident::qualify(&table.schema, &table.name)?,
        sets.join(", ")
    );

    Ok(Some(MutatingStatement { sql, params }))
}
