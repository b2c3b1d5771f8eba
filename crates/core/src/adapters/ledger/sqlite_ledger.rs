use std::{fmt::Debug, str::FromStr};

use error_stack::ResultExt;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow},
    ConnectOptions, Connection, Row,
};
use thiserror::Error;
use tracing::instrument;

use crate::adapters::config::database_config::DatabaseConfig;
use crate::domain::sheets::payload::SheetRow;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Failed to connect to the transaction database")]
    Connection,
    #[error("Query against the transaction database failed")]
    Query,
    #[error("Failed to commit pushed marks")]
    Commit,
}

const UNPUSHED_QUERY: &str = "
    SELECT u.id AS user_id, u.name AS user_name, t.id AS txn_id, CAST(t.amount AS REAL) AS amount
    FROM users u
    JOIN transactions t ON u.id = t.user_id
    LEFT JOIN pushed_txn p ON t.id = p.txn_id
    WHERE t.is_verified = FALSE AND p.txn_id IS NULL
    ORDER BY t.id
";

const VERIFIED_QUERY: &str = "
    SELECT u.id AS user_id, u.name AS user_name, t.id AS txn_id, CAST(t.amount AS REAL) AS amount
    FROM users u
    JOIN transactions t ON u.id = t.user_id
    WHERE t.is_verified = TRUE
    ORDER BY t.id
";

// Ids arrive as a JSON array so the whole batch is a single statement. Ids that already have a
// mark are skipped instead of failing the batch.
const MARK_PUSHED_STATEMENT: &str = "
    INSERT INTO pushed_txn (txn_id)
    SELECT DISTINCT j.value
    FROM json_each(?1) AS j
    WHERE NOT EXISTS (SELECT 1 FROM pushed_txn p WHERE p.txn_id = j.value)
";

/// Opens per-run connections to the SQLite database holding users, transactions and pushed
/// marks.
#[derive(Clone)]
pub struct SqliteLedger {
    config: DatabaseConfig,
}

impl Debug for SqliteLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteLedger {{ url: {} }}", self.config.url)
    }
}

impl SqliteLedger {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    #[instrument(name = "SqliteLedger::open")]
    pub async fn open(&self) -> error_stack::Result<LedgerSession, LedgerError> {
        let options = SqliteConnectOptions::from_str(&self.config.url)
            .change_context(LedgerError::Connection)
            .attach_printable_lazy(|| format!("Invalid database url {}", self.config.url))?
            .create_if_missing(false)
            .busy_timeout(self.config.busy_timeout());

        let conn = options
            .connect()
            .await
            .change_context(LedgerError::Connection)
            .attach_printable_lazy(|| format!("Could not open {}", self.config.url))?;

        Ok(LedgerSession { conn })
    }
}

fn sheet_row(row: &SqliteRow) -> Result<SheetRow, sqlx::Error> {
    Ok(SheetRow {
        user_id: row.try_get("user_id")?,
        user_name: row.try_get("user_name")?,
        txn_id: row.try_get("txn_id")?,
        amount: row.try_get("amount")?,
    })
}

async fn fetch_rows(
    conn: &mut SqliteConnection,
    query: &'static str,
) -> error_stack::Result<Vec<SheetRow>, LedgerError> {
    let rows = sqlx::query(query)
        .fetch_all(conn)
        .await
        .change_context(LedgerError::Query)?;

    rows.iter()
        .map(sheet_row)
        .collect::<Result<Vec<_>, _>>()
        .change_context(LedgerError::Query)
        .attach_printable("Unexpected column type in transaction rows")
}

/// One open connection. Dropping the session closes the connection, which also rolls back any
/// claim still open on it.
pub struct LedgerSession {
    conn: SqliteConnection,
}

impl Debug for LedgerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerSession")
    }
}

impl LedgerSession {
    /// Verified transactions with their owners, ordered by transaction id.
    #[instrument(name = "LedgerSession::verified_rows")]
    pub async fn verified_rows(&mut self) -> error_stack::Result<Vec<SheetRow>, LedgerError> {
        fetch_rows(&mut self.conn, VERIFIED_QUERY).await
    }

    /// Starts a write transaction with `BEGIN IMMEDIATE`. SQLite grants a single writer at a
    /// time, so another claim on the same database waits (up to the busy timeout) until this one
    /// commits or rolls back.
    #[instrument(name = "LedgerSession::claim")]
    pub async fn claim(&mut self) -> error_stack::Result<Claim<'_>, LedgerError> {
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut self.conn)
            .await
            .change_context(LedgerError::Connection)
            .attach_printable("Could not acquire the database write lock")?;

        Ok(Claim {
            conn: &mut self.conn,
        })
    }

    #[instrument(name = "LedgerSession::close")]
    pub async fn close(self) -> error_stack::Result<(), LedgerError> {
        self.conn
            .close()
            .await
            .change_context(LedgerError::Connection)
    }
}

/// Open write transaction spanning the candidate read and the mark insert. Must end with
/// [`Claim::commit`] or [`Claim::rollback`].
pub struct Claim<'s> {
    conn: &'s mut SqliteConnection,
}

impl Debug for Claim<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Claim")
    }
}

/// Counts from one batched mark insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkOutcome {
    pub inserted: u64,
    pub already_marked: u64,
}

impl Claim<'_> {
    /// Unverified transactions that have no pushed mark, ordered by transaction id.
    #[instrument(name = "Claim::unpushed_rows")]
    pub async fn unpushed_rows(&mut self) -> error_stack::Result<Vec<SheetRow>, LedgerError> {
        fetch_rows(&mut *self.conn, UNPUSHED_QUERY).await
    }

    #[instrument(name = "Claim::mark_pushed")]
    pub async fn mark_pushed(
        &mut self,
        txn_ids: &[i64],
    ) -> error_stack::Result<MarkOutcome, LedgerError> {
        let ids = serde_json::to_string(txn_ids).change_context(LedgerError::Query)?;

        let result = sqlx::query(MARK_PUSHED_STATEMENT)
            .bind(ids)
            .execute(&mut *self.conn)
            .await
            .change_context(LedgerError::Query)
            .attach_printable_lazy(|| format!("Failed to mark {} transactions", txn_ids.len()))?;

        let inserted = result.rows_affected();
        Ok(MarkOutcome {
            inserted,
            already_marked: (txn_ids.len() as u64).saturating_sub(inserted),
        })
    }

    #[instrument(name = "Claim::commit")]
    pub async fn commit(self) -> error_stack::Result<(), LedgerError> {
        sqlx::query("COMMIT")
            .execute(&mut *self.conn)
            .await
            .map(|_| ())
            .change_context(LedgerError::Commit)
    }

    #[instrument(name = "Claim::rollback")]
    pub async fn rollback(self) -> error_stack::Result<(), LedgerError> {
        sqlx::query("ROLLBACK")
            .execute(&mut *self.conn)
            .await
            .map(|_| ())
            .change_context(LedgerError::Query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ledger::test_support::TestDatabase;

    #[tokio::test]
    async fn test_unpushed_rows_is_anti_join() {
        let db = TestDatabase::example().await;
        db.insert_transaction(12, 2, 20.0, false).await;
        db.mark(12).await;

        let mut session = db.ledger().open().await.unwrap();
        let mut claim = session.claim().await.unwrap();
        let rows = claim.unpushed_rows().await.unwrap();
        claim.rollback().await.unwrap();

        assert_eq!(
            rows,
            vec![SheetRow {
                user_id: 1,
                user_name: "Alice".to_string(),
                txn_id: 10,
                amount: Some(50.0),
            }]
        );
    }

    #[tokio::test]
    async fn test_verified_rows_ignore_marks() {
        let db = TestDatabase::example().await;
        db.mark(11).await;

        let mut session = db.ledger().open().await.unwrap();
        let rows = session.verified_rows().await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].txn_id, 11);
        assert_eq!(rows[0].user_name, "Bob");
        assert_eq!(rows[0].amount, Some(75.0));
    }

    #[tokio::test]
    async fn test_integer_amount_reads_as_real() {
        let db = TestDatabase::example().await;
        db.execute("INSERT INTO transactions (id, user_id, amount, is_verified) VALUES (13, 1, 5, 1)")
            .await;

        let mut session = db.ledger().open().await.unwrap();
        let rows = session.verified_rows().await.unwrap();

        assert_eq!(
            rows.iter().map(|r| r.amount).collect::<Vec<_>>(),
            vec![Some(75.0), Some(5.0)]
        );
    }

    #[tokio::test]
    async fn test_null_amount_reads_as_none() {
        let db = TestDatabase::example().await;
        db.execute("INSERT INTO transactions (id, user_id, amount, is_verified) VALUES (13, 1, NULL, 1)")
            .await;

        let mut session = db.ledger().open().await.unwrap();
        let rows = session.verified_rows().await.unwrap();

        assert_eq!(rows.iter().map(|r| r.amount).collect::<Vec<_>>(), vec![Some(75.0), None]);
    }

    #[tokio::test]
    async fn test_mark_pushed_skips_existing_marks() {
        let db = TestDatabase::example().await;
        db.mark(10).await;

        let mut session = db.ledger().open().await.unwrap();
        let mut claim = session.claim().await.unwrap();
        let outcome = claim.mark_pushed(&[10, 11, 11]).await.unwrap();
        claim.commit().await.unwrap();

        assert_eq!(
            outcome,
            MarkOutcome {
                inserted: 1,
                already_marked: 2,
            }
        );
        assert_eq!(db.marks().await, vec![10, 11]);
    }

    #[tokio::test]
    async fn test_rollback_discards_marks() {
        let db = TestDatabase::example().await;

        let mut session = db.ledger().open().await.unwrap();
        let mut claim = session.claim().await.unwrap();
        claim.mark_pushed(&[10]).await.unwrap();
        claim.rollback().await.unwrap();
        session.close().await.unwrap();

        assert!(db.marks().await.is_empty());
    }

    #[tokio::test]
    async fn test_claim_is_exclusive() {
        let db = TestDatabase::example().await;

        let mut first = db.ledger().open().await.unwrap();
        let mut second = db.ledger().open().await.unwrap();

        let _claim = first.claim().await.unwrap();
        let report = second.claim().await.unwrap_err();
        assert!(matches!(report.current_context(), LedgerError::Connection));
    }

    #[tokio::test]
    async fn test_open_missing_database_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = SqliteLedger::new(DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("missing.sqlite").display()).into(),
            busy_timeout_secs: 0,
        });

        let report = ledger.open().await.unwrap_err();
        assert!(matches!(report.current_context(), LedgerError::Connection));
    }
}
