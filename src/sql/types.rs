//! SQL type normalization.

use crate::model::DataType;

/// Multi-word type names the type grammar keeps reading into.
const PHRASES: &[&str] = &[
    "character varying",
    "char varying",
    "national character varying",
    "bit varying",
    "double precision",
    "timestamp with time zone",
    "timestamp without time zone",
    "time with time zone",
    "time without time zone",
];

/// Whether `word` extends the type name spelled by `words` so far.
pub fn continues_phrase(words: &[String], word: &str) -> bool {
    let mut candidate = words.join(" ").to_lowercase();
    candidate.push(' ');
    candidate.push_str(&word.to_lowercase());
    PHRASES
        .iter()
        .any(|p| *p == candidate || p.starts_with(&format!("{candidate} ")))
}

/// Map a declared type to its canonical form.
///
/// `words` is the declared name as written (`["character", "varying"]`).
/// Recognized names become one canonical uppercase token. Anything else
/// keeps its declared spelling so user-defined types stay matchable.
pub fn normalize_type(words: &[String], params: Vec<u32>, is_array: bool) -> DataType {
    let lower = words.join(" ").to_lowercase();

    let base = match lower.as_str() {
        // Integer types
        "int" | "int4" | "integer" | "mediumint" => "INT",
        "bigint" | "int8" => "BIGINT",
        "smallint" | "int2" | "tinyint" => "SMALLINT",
        "serial" | "serial4" => "SERIAL",
        "bigserial" | "serial8" => "BIGSERIAL",
        "smallserial" | "serial2" => "SMALLSERIAL",

        // Floating point
        "real" | "float4" => "REAL",
        "double precision" | "double" | "float8" => "DOUBLE",
        "float" => match params.first() {
            Some(p) if *p <= 24 => "REAL",
            _ => "DOUBLE",
        },
        "decimal" | "numeric" | "dec" => "DECIMAL",
        "money" => "MONEY",

        // String types
        "varchar" | "character varying" | "char varying" | "national character varying"
        | "nvarchar" => "VARCHAR",
        "char" | "character" | "bpchar" | "nchar" => "CHAR",
        "text" | "citext" | "longtext" | "mediumtext" | "tinytext" => "TEXT",

        // Date/time
        "timestamp" | "timestamp without time zone" | "datetime" => "TIMESTAMP",
        "timestamptz" | "timestamp with time zone" => "TIMESTAMPTZ",
        "time" | "time without time zone" => "TIME",
        "timetz" | "time with time zone" => "TIMETZ",
        "date" => "DATE",
        "interval" => "INTERVAL",

        // Boolean
        "boolean" | "bool" => "BOOLEAN",

        // Binary and bit strings
        "bytea" | "blob" | "binary" | "varbinary" => "BYTEA",
        "bit" => "BIT",
        "bit varying" | "varbit" => "VARBIT",

        // Other built-ins
        "uuid" => "UUID",
        "json" => "JSON",
        "jsonb" => "JSONB",
        "xml" => "XML",
        "inet" => "INET",
        "cidr" => "CIDR",
        "macaddr" => "MACADDR",
        "tsvector" => "TSVECTOR",

        _ => {
            return DataType {
                base: words.join(" "),
                params,
                is_array,
            };
        }
    };

    // FLOAT(p) only selects precision; the parameter is not part of the type.
    let params = if lower == "float" { Vec::new() } else { params };

    DataType {
        base: base.to_string(),
        params,
        is_array,
    }
}
