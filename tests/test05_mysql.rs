#![cfg(feature = "mysql")]

//! Runs against a live server only when `TESTING_MYSQL_HOST` is set; the
//! other connection details come from `TESTING_MYSQL_USER`,
//! `TESTING_MYSQL_PASSWORD`, `TESTING_MYSQL_DB` and `TESTING_MYSQL_PORT`.

use std::env;

use sql_bridge::prelude::*;
use tokio::runtime::Runtime;

fn mysql_config() -> Option<BackendConfig> {
    let host = env::var("TESTING_MYSQL_HOST").ok()?;
    let port = env::var("TESTING_MYSQL_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3306);
    Some(
        BackendConfig::mysql_builder(
            host,
            env::var("TESTING_MYSQL_DB").unwrap_or_else(|_| "test_db".to_string()),
        )
        .port(port)
        .user(env::var("TESTING_MYSQL_USER").unwrap_or_else(|_| "root".to_string()))
        .password(env::var("TESTING_MYSQL_PASSWORD").unwrap_or_default())
        .pool_capacity(4)
        .finish(),
    )
}

fn table_name(prefix: &str) -> String {
    format!("{prefix}_{}", std::process::id())
}

#[test]
fn embedded_dialect_runs_on_mysql() -> Result<(), Box<dyn std::error::Error>> {
    let Some(cfg) = mysql_config() else {
        eprintln!("TESTING_MYSQL_HOST not set; skipping");
        return Ok(());
    };
    let t = table_name("bridge_verbs");

    let rt = Runtime::new()?;
    rt.block_on(async {
        let db = Database::new(cfg);
        db.execute(&format!("DROP TABLE IF EXISTS {t}"), &[]).await?;
        db.execute(
            &format!(
                "CREATE TABLE {t} (id INTEGER PRIMARY KEY AUTOINCREMENT, name VARCHAR(64) UNIQUE, created_at DATETIME)"
            ),
            &[],
        )
        .await?;
        assert_eq!(db.backend_kind(), Some(BackendKind::Mysql));

        let inserted = db
            .execute(
                &format!("INSERT INTO {t} (name, created_at) VALUES (?, DATETIME('now'))"),
                &["a".into()],
            )
            .await?;
        assert_eq!(inserted, WriteResult::new(1, 1));

        let row = db
            .get(&format!("SELECT id, name FROM {t} WHERE id = ?"), &[RowValues::Int(1)])
            .await?
            .expect("row 1 exists");
        assert_eq!(row.get("id"), Some(&RowValues::Int(1)));
        assert_eq!(row.get("name").and_then(RowValues::as_text), Some("a"));

        let ignored = db
            .execute(&format!("INSERT OR IGNORE INTO {t} (name) VALUES (?)"), &["a".into()])
            .await?;
        assert_eq!(ignored.rows_affected, 0);

        let tagged = db
            .get(
                &format!("SELECT '<' || name || '>' || ? AS tagged FROM {t} WHERE id = 1"),
                &["!".into()],
            )
            .await?
            .expect("row");
        assert_eq!(tagged.get("tagged").and_then(RowValues::as_text), Some("<a>!"));

        // Control statements are accepted and ignored
        assert_eq!(db.execute("PRAGMA foreign_keys = ON", &[]).await?, WriteResult::none());

        db.execute(&format!("DROP TABLE {t}"), &[]).await?;
        db.close().await;
        Ok::<(), DbError>(())
    })?;
    Ok(())
}

#[test]
fn mysql_transaction_is_atomic() -> Result<(), Box<dyn std::error::Error>> {
    let Some(cfg) = mysql_config() else {
        eprintln!("TESTING_MYSQL_HOST not set; skipping");
        return Ok(());
    };
    let t = table_name("bridge_tx");

    let rt = Runtime::new()?;
    rt.block_on(async {
        let db = Database::new(cfg);
        db.execute(&format!("DROP TABLE IF EXISTS {t}"), &[]).await?;
        db.execute(
            &format!("CREATE TABLE {t} (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT) ENGINE=InnoDB"),
            &[],
        )
        .await?;

        let results = db
            .transaction(&[
                Statement::new_without_params("BEGIN TRANSACTION"),
                Statement::new(format!("INSERT INTO {t} (name) VALUES (?)"), vec!["x".into()]),
                Statement::new(format!("INSERT INTO {t} (name) VALUES (?)"), vec!["y".into()]),
            ])
            .await?;
        assert_eq!(results[0], WriteResult::none());
        assert!(results[1..].iter().all(|r| r.rows_affected == 1));

        let err = db
            .transaction(&[
                Statement::new(format!("INSERT INTO {t} (name) VALUES (?)"), vec!["z".into()]),
                Statement::new_without_params("INSERT INTO bridge_missing_table VALUES (1)"),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::MysqlError(_)));

        let names: Vec<String> = db
            .query(&format!("SELECT name FROM {t} ORDER BY id"), &[])
            .await?
            .into_iter()
            .filter_map(|row| row.get("name").and_then(RowValues::as_text).map(String::from))
            .collect();
        assert_eq!(names, ["x", "y"]);

        db.execute(&format!("DROP TABLE {t}"), &[]).await?;
        db.close().await;
        Ok::<(), DbError>(())
    })?;
    Ok(())
}
