#![cfg(feature = "sqlite")]

use std::sync::Arc;

use sql_bridge::prelude::*;
use tokio::runtime::Runtime;

const DDL: &str = "CREATE TABLE IF NOT EXISTS t (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT)";

fn open(dir: &tempfile::TempDir) -> Database {
    Database::new(BackendConfig::sqlite_builder(dir.path().join("tx.db")).finish())
}

async fn names(db: &Database) -> Result<Vec<String>, DbError> {
    Ok(db
        .query("SELECT name FROM t ORDER BY id", &[])
        .await?
        .into_iter()
        .filter_map(|row| row.get("name").and_then(RowValues::as_text).map(String::from))
        .collect())
}

#[test]
fn transaction_commits_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let rt = Runtime::new()?;
    rt.block_on(async {
        let db = open(&dir);
        db.execute(DDL, &[]).await?;

        let results = db
            .transaction(&[
                Statement::new("INSERT INTO t (name) VALUES (?)", vec!["x".into()]),
                Statement::new("INSERT INTO t (name) VALUES (?)", vec!["y".into()]),
            ])
            .await?;
        assert_eq!(results, vec![WriteResult::new(1, 1), WriteResult::new(2, 1)]);
        assert_eq!(names(&db).await?, ["x", "y"]);
        Ok::<(), DbError>(())
    })?;
    Ok(())
}

#[test]
fn malformed_last_statement_rolls_everything_back() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let rt = Runtime::new()?;
    rt.block_on(async {
        let db = open(&dir);
        db.execute(DDL, &[]).await?;
        db.execute("INSERT INTO t (name) VALUES (?)", &["kept".into()])
            .await?;

        let err = db
            .transaction(&[
                Statement::new("INSERT INTO t (name) VALUES (?)", vec!["x".into()]),
                Statement::new("UPDATE t SET name = ? WHERE name = ?", vec!["z".into(), "kept".into()]),
                Statement::new_without_params("INSERT INTO nowhere VALUES (1)"),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::SqliteError(_)));
        assert_eq!(names(&db).await?, ["kept"]);

        // The handle is usable again after the rollback
        let results = db
            .transaction(&[Statement::new(
                "INSERT INTO t (name) VALUES (?)",
                vec!["after".into()],
            )])
            .await?;
        assert_eq!(results.len(), 1);
        assert_eq!(names(&db).await?, ["kept", "after"]);
        Ok::<(), DbError>(())
    })?;
    Ok(())
}

#[test]
fn empty_transaction_is_a_no_op() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let rt = Runtime::new()?;
    rt.block_on(async {
        let db = open(&dir);
        assert!(db.transaction(&[]).await?.is_empty());
        Ok::<(), DbError>(())
    })?;
    Ok(())
}

#[test]
fn concurrent_writes_do_not_interleave_with_a_transaction()
-> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let rt = Runtime::new()?;
    rt.block_on(async {
        let db = Arc::new(open(&dir));
        db.execute(DDL, &[]).await?;

        let batch: Vec<Statement> = (0..50)
            .map(|i| Statement::new("INSERT INTO t (name) VALUES (?)", vec![format!("tx{i}").into()]))
            .collect();

        let tx_db = Arc::clone(&db);
        let tx_task = tokio::spawn(async move { tx_db.transaction(&batch).await });

        let mut writers = Vec::new();
        for i in 0..10 {
            let db = Arc::clone(&db);
            writers.push(tokio::spawn(async move {
                db.execute("INSERT INTO t (name) VALUES (?)", &[format!("solo{i}").into()])
                    .await
            }));
        }

        let tx_results = tx_task.await.expect("transaction task")?;
        assert_eq!(tx_results.len(), 50);
        for writer in writers {
            writer.await.expect("writer task")?;
        }

        // Transaction rows got consecutive ids: nothing ran in between
        let ids: Vec<i64> = tx_results.iter().map(|r| r.inserted_id).collect();
        assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));
        assert_eq!(names(&db).await?.len(), 60);
        Ok::<(), DbError>(())
    })?;
    Ok(())
}
