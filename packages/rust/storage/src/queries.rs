//! SQL for the two index store generations.
//!
//! Both queries project the same three columns in the same order:
//! `name`, `type`, `path`. Every column is cast to BLOB so badly encoded
//! text reaches the reader as raw bytes.

use docmux_shared::SchemaVariant;

/// Flat table used by current docsets.
pub(crate) const MODERN_QUERY: &str = "SELECT CAST(name AS BLOB) AS name, CAST(type AS BLOB) AS type, \
     CAST(path AS BLOB) AS path FROM searchIndex";

/// Core Data style tables used by older docsets. The anchor is appended as a
/// `#fragment` only when it is non-empty.
pub(crate) const LEGACY_QUERY: &str = r#"
SELECT CAST(ztoken.ztokenname AS BLOB)                            AS name,
       CAST(ztokentype.ztypename AS BLOB)                         AS type,
       CAST(zfilepath.zpath || ifnull('#' || nullif(ztokenmetainformation.zanchor, ''), '') AS BLOB) AS path
FROM ztoken
JOIN ztokenmetainformation
    ON ztokenmetainformation.z_pk = ztoken.zmetainformation
JOIN zfilepath
    ON zfilepath.z_pk = ztokenmetainformation.zfile
JOIN ztokentype
    ON ztokentype.z_pk = ztoken.ztokentype
"#;

/// The query that reads a store of the given generation.
pub(crate) fn query_for(variant: SchemaVariant) -> &'static str {
    match variant {
        SchemaVariant::Modern => MODERN_QUERY,
        SchemaVariant::Legacy => LEGACY_QUERY,
    }
}
