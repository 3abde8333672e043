//! Docset fixtures backed by real index stores.

use std::path::Path;

use docmux_shared::Docset;

async fn write_store(docset: &Docset, sql: &str) {
    let store_path = docset.store_path();
    std::fs::create_dir_all(store_path.parent().unwrap()).unwrap();
    std::fs::create_dir_all(docset.documents_root()).unwrap();

    let db = libsql::Builder::new_local(&store_path)
        .build()
        .await
        .expect("create fixture store");
    let conn = db.connect().expect("connect fixture store");
    conn.execute_batch(sql).await.expect("populate fixture store");
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `<dir>/<name>.docset` whose store is built by arbitrary SQL.
pub(crate) async fn docset_from_sql(dir: &Path, name: &str, sql: &str) -> Docset {
    let docset = Docset::from_arg(dir.join(format!("{name}.docset"))).unwrap();
    write_store(&docset, sql).await;
    docset
}

/// `<dir>/<name>.docset` with a flat `searchIndex` table.
pub(crate) async fn modern_docset(dir: &Path, name: &str, rows: &[(&str, &str, &str)]) -> Docset {
    let docset = Docset::from_arg(dir.join(format!("{name}.docset"))).unwrap();

    let mut sql = String::from(
        "CREATE TABLE searchIndex(id INTEGER PRIMARY KEY, name TEXT, type TEXT, path TEXT);\n",
    );
    for (entry_name, kind, path) in rows {
        sql.push_str(&format!(
            "INSERT INTO searchIndex(name, type, path) VALUES ({}, {}, {});\n",
            quote(entry_name),
            quote(kind),
            quote(path)
        ));
    }

    write_store(&docset, &sql).await;
    docset
}

/// `<dir>/<name>.docset` with the four-table legacy layout. Each row is
/// `(name, kind, base_path, anchor)`.
pub(crate) async fn legacy_docset(
    dir: &Path,
    name: &str,
    rows: &[(&str, &str, &str, Option<&str>)],
) -> Docset {
    let docset = Docset::from_arg(dir.join(format!("{name}.docset"))).unwrap();

    let mut sql = String::from(
        "CREATE TABLE ztokentype (z_pk INTEGER PRIMARY KEY, ztypename TEXT);\n\
         CREATE TABLE zfilepath (z_pk INTEGER PRIMARY KEY, zpath TEXT);\n\
         CREATE TABLE ztokenmetainformation (z_pk INTEGER PRIMARY KEY, zfile INTEGER, zanchor TEXT);\n\
         CREATE TABLE ztoken (z_pk INTEGER PRIMARY KEY, ztokenname TEXT, ztokentype INTEGER, zmetainformation INTEGER);\n",
    );
    for (pk, (entry_name, kind, path, anchor)) in rows.iter().enumerate() {
        let pk = pk + 1;
        let anchor = anchor.map_or_else(|| "NULL".to_string(), quote);
        sql.push_str(&format!(
            "INSERT INTO ztokentype VALUES ({pk}, {});\n\
             INSERT INTO zfilepath VALUES ({pk}, {});\n\
             INSERT INTO ztokenmetainformation VALUES ({pk}, {pk}, {anchor});\n\
             INSERT INTO ztoken VALUES ({pk}, {}, {pk}, {pk});\n",
            quote(kind),
            quote(path),
            quote(entry_name),
        ));
    }

    write_store(&docset, &sql).await;
    docset
}
