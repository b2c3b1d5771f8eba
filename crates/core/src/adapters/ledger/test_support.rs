use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection},
    ConnectOptions, Connection, Row,
};
use tempfile::TempDir;

use super::sqlite_ledger::SqliteLedger;
use crate::adapters::config::database_config::DatabaseConfig;

const SCHEMA: [&str; 3] = [
    "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
    "CREATE TABLE transactions (
        id INTEGER PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users(id),
        amount REAL,
        is_verified BOOLEAN NOT NULL DEFAULT FALSE
    )",
    "CREATE TABLE pushed_txn (txn_id INTEGER)",
];

/// Throwaway SQLite file with the users/transactions/pushed_txn schema.
pub struct TestDatabase {
    dir: TempDir,
}

impl TestDatabase {
    pub async fn empty() -> Self {
        let db = TestDatabase {
            dir: tempfile::tempdir().unwrap(),
        };
        for statement in SCHEMA {
            db.execute(statement).await;
        }
        db
    }

    /// Alice has an unverified transaction 10, Bob a verified transaction 11.
    pub async fn example() -> Self {
        let db = Self::empty().await;
        db.insert_user(1, "Alice").await;
        db.insert_user(2, "Bob").await;
        db.insert_transaction(10, 1, 50.0, false).await;
        db.insert_transaction(11, 2, 75.0, true).await;
        db
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}", self.dir.path().join("test.sqlite").display())
    }

    pub fn ledger(&self) -> SqliteLedger {
        SqliteLedger::new(DatabaseConfig {
            url: self.url().into(),
            busy_timeout_secs: 0,
        })
    }

    async fn connect(&self) -> SqliteConnection {
        self.url()
            .parse::<SqliteConnectOptions>()
            .unwrap()
            .create_if_missing(true)
            .connect()
            .await
            .unwrap()
    }

    pub async fn execute(&self, statement: &str) {
        let mut conn = self.connect().await;
        sqlx::query(statement).execute(&mut conn).await.unwrap();
        conn.close().await.unwrap();
    }

    pub async fn insert_user(&self, id: i64, name: &str) {
        let mut conn = self.connect().await;
        sqlx::query("INSERT INTO users (id, name) VALUES (?1, ?2)")
            .bind(id)
            .bind(name)
            .execute(&mut conn)
            .await
            .unwrap();
        conn.close().await.unwrap();
    }

    pub async fn insert_transaction(&self, id: i64, user_id: i64, amount: f64, is_verified: bool) {
        let mut conn = self.connect().await;
        sqlx::query(
            "INSERT INTO transactions (id, user_id, amount, is_verified) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(id)
        .bind(user_id)
        .bind(amount)
        .bind(is_verified)
        .execute(&mut conn)
        .await
        .unwrap();
        conn.close().await.unwrap();
    }

    pub async fn mark(&self, txn_id: i64) {
        let mut conn = self.connect().await;
        sqlx::query("INSERT INTO pushed_txn (txn_id) VALUES (?1)")
            .bind(txn_id)
            .execute(&mut conn)
            .await
            .unwrap();
        conn.close().await.unwrap();
    }

    /// Every mark row, duplicates included, sorted by id.
    pub async fn marks(&self) -> Vec<i64> {
        let mut conn = self.connect().await;
        let rows = sqlx::query("SELECT txn_id FROM pushed_txn ORDER BY txn_id")
            .fetch_all(&mut conn)
            .await
            .unwrap();
        conn.close().await.unwrap();
        rows.iter().map(|row| row.get::<i64, _>("txn_id")).collect()
    }
}
