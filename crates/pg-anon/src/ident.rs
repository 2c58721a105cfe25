//! Identifier validation and quoting for SQL injection prevention.
//!
//! SQL identifiers (schema, table, column names) cannot be passed as
//! parameters in prepared statements - only data values can be
//! parameterized. Every dynamic identifier in a mutating statement
//! therefore goes through validation and double-quote escaping here,
//! never through string interpolation of raw policy input.

use crate::error::{AnonError, Result};

/// Maximum identifier length. PostgreSQL truncates at 63 bytes; anything
/// longer in a policy is a mistake or an injection attempt.
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes (injection vector)
/// - Identifiers exceeding maximum length
///
/// # Errors
///
/// Returns `AnonError::Config` for invalid identifiers with a descriptive message.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AnonError::Config("Identifier cannot be empty".to_string()));
    }

    if name.contains('\0') {
        return Err(AnonError::Config(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(AnonError::Config(format!(
            "SECURITY: Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote a PostgreSQL identifier.
///
/// Escapes double quotes by doubling them and wraps in double quotes.
/// Validates the identifier before quoting.
pub fn quote(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Qualify a table name with its schema.
///
/// Returns `"schema"."table"` with proper quoting.
pub fn qualify(schema: &str, table: &str) -> Result<String> {
    Ok(format!("{}.{}", quote(schema)?, quote(table)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote("users").unwrap(), "\"users\"");
        assert_eq!(quote("email").unwrap(), "\"email\"");
    }

    #[test]
    fn test_quote_escapes_double_quotes() {
        assert_eq!(quote("odd\"name").unwrap(), "\"odd\"\"name\"");
    }

    #[test]
    fn test_qualify() {
        assert_eq!(qualify("public", "users").unwrap(), "\"public\".\"users\"");
    }

    #[test]
    fn test_rejects_empty() {
        assert!(quote("").is_err());
    }

    #[test]
    fn test_rejects_null_byte() {
        assert!(quote("evil\0name").is_err());
    }

    #[test]
    fn test_rejects_overlong() {
        let long = "x".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert!(quote(&long).is_err());
    }

    #[test]
    fn test_quote_neutralizes_injection() {
        let quoted = quote("users\"; DROP TABLE users; --").unwrap();
        assert_eq!(quoted, "\"users\"\"; DROP TABLE users; --\"");
    }
}
