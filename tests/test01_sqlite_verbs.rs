#![cfg(feature = "sqlite")]

use sql_bridge::prelude::*;
use tokio::runtime::Runtime;

fn open(dir: &tempfile::TempDir) -> Database {
    Database::new(BackendConfig::sqlite_builder(dir.path().join("verbs.db")).finish())
}

const DDL: &str = "CREATE TABLE IF NOT EXISTS t (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT)";

#[test]
fn insert_then_read_one() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let rt = Runtime::new()?;
    rt.block_on(async {
        let db = open(&dir);
        let ddl = db.execute(DDL, &[]).await?;
        assert_eq!(ddl, WriteResult::new(0, 0));

        let inserted = db
            .execute("INSERT INTO t (name) VALUES (?)", &["a".into()])
            .await?;
        assert_eq!(inserted, WriteResult::new(1, 1));

        let row = db
            .get("SELECT * FROM t WHERE id = ?", &[RowValues::Int(1)])
            .await?
            .expect("row 1 exists");
        assert_eq!(row.get("id"), Some(&RowValues::Int(1)));
        assert_eq!(row.get("name").and_then(RowValues::as_text), Some("a"));
        assert_eq!(row.to_json(), serde_json::json!({"id": 1, "name": "a"}));
        Ok::<(), DbError>(())
    })?;
    Ok(())
}

#[test]
fn rows_affected_counts_matches() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let rt = Runtime::new()?;
    rt.block_on(async {
        let db = open(&dir);
        db.execute(DDL, &[]).await?;
        for name in ["x", "x", "y"] {
            db.execute("INSERT INTO t (name) VALUES (?)", &[name.into()])
                .await?;
        }

        let updated = db
            .execute("UPDATE t SET name = ? WHERE name = ?", &["z".into(), "x".into()])
            .await?;
        assert_eq!(updated, WriteResult::new(0, 2));

        let none = db
            .execute("DELETE FROM t WHERE name = ?", &["missing".into()])
            .await?;
        assert_eq!(none, WriteResult::new(0, 0));

        // A read through execute must not report the previous write's count
        let read = db.run("SELECT * FROM t", &[]).await?;
        assert_eq!(read, WriteResult::new(0, 0));
        Ok::<(), DbError>(())
    })?;
    Ok(())
}

#[test]
fn insert_or_ignore_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let rt = Runtime::new()?;
    rt.block_on(async {
        let db = open(&dir);
        db.execute("CREATE TABLE tags (tag TEXT PRIMARY KEY, hits INTEGER)", &[])
            .await?;

        let sql = "INSERT OR IGNORE INTO tags (tag, hits) VALUES (?, ?)";
        let first = db.execute(sql, &["vip".into(), 1_i64.into()]).await?;
        // `inserted_id` is not checked: the table has no auto-generated key,
        // and SQLite reports its hidden rowid where MySQL reports 0
        assert_eq!(first.rows_affected, 1);

        let second = db.execute(sql, &["vip".into(), 2_i64.into()]).await?;
        assert_eq!(second, WriteResult::new(0, 0));

        let rs = db.query("SELECT hits FROM tags", &[]).await?;
        assert_eq!(rs.len(), 1);
        assert_eq!(rs.results[0].get("hits"), Some(&RowValues::Int(1)));
        Ok::<(), DbError>(())
    })?;
    Ok(())
}

#[test]
fn inserted_id_is_zero_without_a_new_rowid() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let rt = Runtime::new()?;
    rt.block_on(async {
        let db = open(&dir);
        db.execute(DDL, &[]).await?;
        db.execute("CREATE TABLE w (k TEXT PRIMARY KEY, v TEXT) WITHOUT ROWID", &[])
            .await?;
        db.execute("CREATE TABLE u (k TEXT UNIQUE, hits INTEGER)", &[])
            .await?;

        for name in ["a", "b", "c"] {
            db.execute("INSERT INTO t (name) VALUES (?)", &[name.into()])
                .await?;
        }

        // No rowid at all: the previous insert's id must not leak through
        let without_rowid = db
            .execute("INSERT INTO w (k, v) VALUES (?, ?)", &["key".into(), "val".into()])
            .await?;
        assert_eq!(without_rowid, WriteResult::new(0, 1));

        let upsert = "INSERT INTO u (k, hits) VALUES (?, 1) ON CONFLICT(k) DO UPDATE SET hits = hits + 1";
        let created = db.execute(upsert, &["vip".into()]).await?;
        assert_eq!(created.rows_affected, 1);
        assert_ne!(created.inserted_id, 0);

        let fourth = db
            .execute("INSERT INTO t (name) VALUES (?)", &["d".into()])
            .await?;
        assert_eq!(fourth, WriteResult::new(4, 1));

        // Upsert taking the update path reports a change but no new identity
        let updated = db.execute(upsert, &["vip".into()]).await?;
        assert_eq!(updated, WriteResult::new(0, 1));

        let row = db
            .get("SELECT hits FROM u WHERE k = ?", &["vip".into()])
            .await?
            .expect("upserted row");
        assert_eq!(row.get("hits"), Some(&RowValues::Int(2)));
        Ok::<(), DbError>(())
    })?;
    Ok(())
}

#[test]
fn read_many_and_read_one_shapes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let rt = Runtime::new()?;
    rt.block_on(async {
        let db = open(&dir);
        db.execute(DDL, &[]).await?;

        let empty = db.all("SELECT * FROM t", &[]).await?;
        assert!(empty.is_empty());
        assert!(db.get("SELECT * FROM t", &[]).await?.is_none());

        for name in ["b", "a", "c"] {
            db.execute("INSERT INTO t (name) VALUES (?)", &[name.into()])
                .await?;
        }

        let names: Vec<String> = db
            .query("SELECT name FROM t ORDER BY name", &[])
            .await?
            .into_iter()
            .filter_map(|row| row.get("name").and_then(RowValues::as_text).map(String::from))
            .collect();
        assert_eq!(names, ["a", "b", "c"]);

        // First row in statement order, not an arbitrary one
        let first = db
            .get("SELECT name FROM t ORDER BY id DESC", &[])
            .await?
            .expect("rows exist");
        assert_eq!(first.get("name").and_then(RowValues::as_text), Some("c"));
        Ok::<(), DbError>(())
    })?;
    Ok(())
}

#[test]
fn values_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let rt = Runtime::new()?;
    rt.block_on(async {
        let db = open(&dir);
        db.execute(
            "CREATE TABLE v (i INTEGER, f REAL, s TEXT, b INTEGER, n TEXT, raw BLOB)",
            &[],
        )
        .await?;
        db.execute(
            "INSERT INTO v (i, f, s, b, n, raw) VALUES (?, ?, ?, ?, ?, ?)",
            &[
                RowValues::Int(-42),
                RowValues::Float(2.5),
                RowValues::Text("hello".into()),
                RowValues::Bool(true),
                RowValues::Null,
                RowValues::Blob(vec![0, 1, 2]),
            ],
        )
        .await?;

        let row = db.get("SELECT * FROM v", &[]).await?.expect("row");
        assert_eq!(row.get("i"), Some(&RowValues::Int(-42)));
        assert_eq!(row.get("f").and_then(RowValues::as_float), Some(2.5));
        assert_eq!(row.get("s").and_then(RowValues::as_text), Some("hello"));
        assert_eq!(row.get("b").and_then(RowValues::as_bool), Some(&true));
        assert!(row.get("n").is_some_and(RowValues::is_null));
        assert_eq!(row.get("raw").and_then(RowValues::as_blob), Some(&[0_u8, 1, 2][..]));
        Ok::<(), DbError>(())
    })?;
    Ok(())
}

#[test]
fn foreign_keys_are_enforced() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let rt = Runtime::new()?;
    rt.block_on(async {
        let db = open(&dir);
        db.execute(DDL, &[]).await?;
        db.execute(
            "CREATE TABLE child (id INTEGER PRIMARY KEY, t_id INTEGER NOT NULL REFERENCES t(id))",
            &[],
        )
        .await?;

        let err = db
            .execute("INSERT INTO child (t_id) VALUES (?)", &[RowValues::Int(99)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::SqliteError(_)));
        Ok::<(), DbError>(())
    })?;
    Ok(())
}

#[test]
fn statement_errors_do_not_poison_the_handle() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let rt = Runtime::new()?;
    rt.block_on(async {
        let db = open(&dir);
        let err = db.query("SELEC nonsense", &[]).await.unwrap_err();
        assert!(matches!(err, DbError::SqliteError(_)));

        db.execute(DDL, &[]).await?;
        let rs = db.query("SELECT COUNT(*) AS n FROM t", &[]).await?;
        assert_eq!(rs.results[0].get("n"), Some(&RowValues::Int(0)));
        Ok::<(), DbError>(())
    })?;
    Ok(())
}
