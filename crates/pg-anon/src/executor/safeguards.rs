//! Safeguard gate: advisory blast-radius check before an apply run.

use crate::error::{AnonError, Result};
use tracing::warn;

/// Block execution when the estimated affected-row total exceeds the
/// configured cap, unless the caller explicitly overrides.
///
/// The total comes from a prior dry run; this gate runs no statement
/// itself and is invoked by the caller before committing an apply.
pub fn enforce_row_cap(total_rows: u64, cap: u64, force: bool) -> Result<()> {
    if total_rows > cap {
        if force {
            warn!(
                "Safety cap overridden: {} rows exceeds cap of {} (--force)",
                total_rows, cap
            );
            return Ok(());
        }
        return Err(AnonError::CapExceeded {
            total: total_rows,
            cap,
        });
    }
    Ok(())
}
