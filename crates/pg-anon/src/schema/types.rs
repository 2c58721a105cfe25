//! Semantic type groups for PostgreSQL column types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic group a column type belongs to.
///
/// Strategies carry an implicit compatibility set over these groups;
/// see `executor::normalize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeGroup {
    String,
    Number,
    Boolean,
    Date,
    Json,
    Uuid,
    Other,
}

impl TypeGroup {
    /// Canonical uppercase name, as used in warnings and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeGroup::String => "STRING",
            TypeGroup::Number => "NUMBER",
            TypeGroup::Boolean => "BOOLEAN",
            TypeGroup::Date => "DATE",
            TypeGroup::Json => "JSON",
            TypeGroup::Uuid => "UUID",
            TypeGroup::Other => "OTHER",
        }
    }
}

impl fmt::Display for TypeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a raw column type into a semantic group.
///
/// `data_type` and `udt_name` come straight from
/// `information_schema.columns`. The udt name is preferred when present
/// (e.g. `int4`, `bool`, `uuid`) since `data_type` can be a vague
/// "USER-DEFINED". Total function: unknown types classify as `Other`.
pub fn classify(data_type: &str, udt_name: &str) -> TypeGroup {
    let dt = data_type.to_lowercase();
    let udt = udt_name.to_lowercase();

    let t = if udt.is_empty() { dt.as_str() } else { udt.as_str() };

    // String-ish types first: citext and friends would otherwise fall
    // through to Other.
    if dt.contains("character")
        || dt.contains("text")
        || t.contains("varchar")
        || t.contains("bpchar")
        || t.contains("char")
        || t == "citext"
    {
        return TypeGroup::String;
    }

    if t.contains("int")
        || t.contains("numeric")
        || t.contains("decimal")
        || t.contains("float")
        || t.contains("double")
        || t.contains("real")
    {
        return TypeGroup::Number;
    }

    if t == "bool" || dt == "boolean" {
        return TypeGroup::Boolean;
    }

    if dt.contains("timestamp") || dt.contains("date") || dt.contains("time") {
        return TypeGroup::Date;
    }

    if t == "json" || t == "jsonb" || dt == "json" || dt == "jsonb" {
        return TypeGroup::Json;
    }

    if t == "uuid" || dt == "uuid" {
        return TypeGroup::Uuid;
    }

    TypeGroup::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_types() {
        assert_eq!(classify("character varying", "varchar"), TypeGroup::String);
        assert_eq!(classify("text", "text"), TypeGroup::String);
        assert_eq!(classify("character", "bpchar"), TypeGroup::String);
        assert_eq!(classify("USER-DEFINED", "citext"), TypeGroup::String);
    }

    #[test]
    fn test_number_types() {
        assert_eq!(classify("integer", "int4"), TypeGroup::Number);
        assert_eq!(classify("bigint", "int8"), TypeGroup::Number);
        assert_eq!(classify("numeric", "numeric"), TypeGroup::Number);
        assert_eq!(classify("double precision", "float8"), TypeGroup::Number);
        assert_eq!(classify("real", "float4"), TypeGroup::Number);
    }

    #[test]
    fn test_boolean() {
        assert_eq!(classify("boolean", "bool"), TypeGroup::Boolean);
    }

    #[test]
    fn test_date_types() {
        assert_eq!(
            classify("timestamp without time zone", ""),
            TypeGroup::Date
        );
        assert_eq!(classify("timestamp with time zone", ""), TypeGroup::Date);
        assert_eq!(classify("date", ""), TypeGroup::Date);
        assert_eq!(classify("time without time zone", ""), TypeGroup::Date);
    }

    #[test]
    fn test_json_and_uuid() {
        assert_eq!(classify("json", "json"), TypeGroup::Json);
        assert_eq!(classify("jsonb", "jsonb"), TypeGroup::Json);
        assert_eq!(classify("uuid", "uuid"), TypeGroup::Uuid);
    }

    #[test]
    fn test_unknown_falls_through_to_other() {
        assert_eq!(classify("bytea", "bytea"), TypeGroup::Other);
        assert_eq!(classify("USER-DEFINED", "hstore"), TypeGroup::Other);
        assert_eq!(classify("", ""), TypeGroup::Other);
    }

    #[test]
    fn test_udt_preferred_over_data_type() {
        // data_type says USER-DEFINED, udt carries the real name
        assert_eq!(classify("USER-DEFINED", "int4"), TypeGroup::Number);
    }
}
