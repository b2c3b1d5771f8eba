use std::{fmt, sync::Arc};

use error_stack::ResultExt;
use tracing::instrument;

use crate::adapters::ledger::sqlite_ledger::{Claim, LedgerSession, SqliteLedger};
use crate::domain::sheets::payload::SheetPayload;
use crate::ports::routine::{Routine, RoutineError};
use crate::ports::sheet_sink::SheetSink;

pub const APPEND_SYNC_ROUTINE: &str = "append";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppendOutcome {
    /// Unverified, unmarked transactions found by the query.
    pub candidates: usize,
    /// Marks written after the append.
    pub marked: u64,
    /// Candidates that already had a mark by insert time.
    pub already_marked: u64,
}

/// Appends unverified transactions that were never pushed, then marks them as pushed.
///
/// The candidate read, the append and the mark insert happen inside one `BEGIN IMMEDIATE`
/// claim, so two runs against the same database cannot push the same transaction. Marks are
/// only written once the append succeeded.
pub struct AppendSyncRoutine {
    ledger: SqliteLedger,
    sheet: Arc<dyn SheetSink>,
}

impl fmt::Debug for AppendSyncRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppendSyncRoutine")
            .field("ledger", &self.ledger)
            .field("target", &self.sheet.target())
            .finish()
    }
}

impl AppendSyncRoutine {
    pub fn new(ledger: SqliteLedger, sheet: Arc<dyn SheetSink>) -> Self {
        Self { ledger, sheet }
    }

    #[instrument(skip(self), name = "AppendSyncRoutine::sync")]
    pub async fn sync(&self) -> error_stack::Result<AppendOutcome, RoutineError> {
        tracing::trace!("{}: 🔌 Opening transaction database", self.name());
        let mut session = self
            .ledger
            .open()
            .await
            .change_context(RoutineError::routine_failure(
                "Could not open the transaction database",
            ))?;

        let outcome = self.claim_and_push(&mut session).await;

        if let Err(report) = session.close().await {
            tracing::warn!("{}: ⚠️ Failed to close database: {:?}", self.name(), report);
        }

        outcome
    }

    async fn claim_and_push(
        &self,
        session: &mut LedgerSession,
    ) -> error_stack::Result<AppendOutcome, RoutineError> {
        let mut claim = session
            .claim()
            .await
            .change_context(RoutineError::routine_failure(
                "Could not lock the transaction database",
            ))?;

        match self.push_candidates(&mut claim).await {
            Ok(outcome) if outcome.candidates == 0 => {
                claim
                    .rollback()
                    .await
                    .change_context(RoutineError::routine_failure(
                        "Failed to release the database lock",
                    ))?;
                Ok(outcome)
            }
            Ok(outcome) => {
                claim
                    .commit()
                    .await
                    .change_context(RoutineError::routine_failure(
                        "Rows were appended but their pushed marks could not be committed",
                    ))?;
                Ok(outcome)
            }
            Err(report) => {
                if let Err(rollback) = claim.rollback().await {
                    tracing::warn!("{}: ⚠️ Rollback failed: {:?}", self.name(), rollback);
                }
                Err(report)
            }
        }
    }

    async fn push_candidates(
        &self,
        claim: &mut Claim<'_>,
    ) -> error_stack::Result<AppendOutcome, RoutineError> {
        tracing::trace!("{}: 📋 Selecting unpushed transactions", self.name());
        let rows = claim
            .unpushed_rows()
            .await
            .change_context(RoutineError::routine_failure(
                "Failed to query unpushed transactions",
            ))?;

        if rows.is_empty() {
            return Ok(AppendOutcome::default());
        }

        let payload = SheetPayload::new(rows);

        tracing::trace!(
            "{}: ☁️  Appending {} rows to {}",
            self.name(),
            payload.len(),
            self.sheet.target()
        );
        self.sheet
            .append_rows(&payload)
            .await
            .change_context(RoutineError::routine_failure(
                "Sync failed, no state changed: could not append rows",
            ))?;

        tracing::trace!("{}: 📝 Marking transactions as pushed", self.name());
        let marks = claim
            .mark_pushed(&payload.txn_ids())
            .await
            .change_context(RoutineError::routine_failure(
                "Rows were appended but marking them as pushed failed",
            ))?;

        if marks.already_marked > 0 {
            tracing::warn!(
                "{}: ⚠️ {} transactions were already marked as pushed",
                self.name(),
                marks.already_marked
            );
        }

        Ok(AppendOutcome {
            candidates: payload.len(),
            marked: marks.inserted,
            already_marked: marks.already_marked,
        })
    }
}

#[async_trait::async_trait]
impl Routine for AppendSyncRoutine {
    fn name(&self) -> &str {
        APPEND_SYNC_ROUTINE
    }

    #[instrument(skip(self), name = "AppendSyncRoutine::run")]
    async fn run(&self) -> error_stack::Result<(), RoutineError> {
        let outcome = self.sync().await?;

        if outcome.candidates == 0 {
            tracing::info!("{}: No new transactions to push", self.name());
        } else {
            tracing::info!(
                "{}: ✅ Successfully pushed {} new transactions to {}",
                self.name(),
                outcome.candidates,
                self.sheet.target()
            );
        }

        Ok(())
    }
}
