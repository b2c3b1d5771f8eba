use std::{fmt, sync::Arc};

use error_stack::ResultExt;
use tracing::instrument;

use crate::adapters::ledger::sqlite_ledger::SqliteLedger;
use crate::domain::sheets::payload::SheetPayload;
use crate::ports::routine::{Routine, RoutineError};
use crate::ports::sheet_sink::SheetSink;

pub const SNAPSHOT_SYNC_ROUTINE: &str = "snapshot";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotOutcome {
    pub rows: usize,
}

/// Replaces the target range with every verified transaction. Pushed marks are neither read
/// nor written.
pub struct SnapshotSyncRoutine {
    ledger: SqliteLedger,
    sheet: Arc<dyn SheetSink>,
}

impl fmt::Debug for SnapshotSyncRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotSyncRoutine")
            .field("ledger", &self.ledger)
            .field("target", &self.sheet.target())
            .finish()
    }
}

impl SnapshotSyncRoutine {
    pub fn new(ledger: SqliteLedger, sheet: Arc<dyn SheetSink>) -> Self {
        Self { ledger, sheet }
    }

    #[instrument(skip(self), name = "SnapshotSyncRoutine::sync")]
    pub async fn sync(&self) -> error_stack::Result<SnapshotOutcome, RoutineError> {
        tracing::trace!("{}: 📋 Selecting verified transactions", self.name());
        let mut session = self
            .ledger
            .open()
            .await
            .change_context(RoutineError::routine_failure(
                "Could not open the transaction database",
            ))?;

        let rows = session.verified_rows().await;

        if let Err(report) = session.close().await {
            tracing::warn!("{}: ⚠️ Failed to close database: {:?}", self.name(), report);
        }

        let payload = SheetPayload::new(rows.change_context(RoutineError::routine_failure(
            "Failed to query verified transactions",
        ))?);

        tracing::trace!(
            "{}: ☁️  Overwriting {} with {} rows",
            self.name(),
            self.sheet.target(),
            payload.len()
        );
        self.sheet
            .overwrite_range(&payload)
            .await
            .change_context(RoutineError::routine_failure(
                "Failed to overwrite the snapshot range",
            ))
            .attach_printable("The range may be partially cleared until the next successful run")?;

        Ok(SnapshotOutcome {
            rows: payload.len(),
        })
    }
}

#[async_trait::async_trait]
impl Routine for SnapshotSyncRoutine {
    fn name(&self) -> &str {
        SNAPSHOT_SYNC_ROUTINE
    }

    #[instrument(skip(self), name = "SnapshotSyncRoutine::run")]
    async fn run(&self) -> error_stack::Result<(), RoutineError> {
        let outcome = self.sync().await?;

        tracing::info!(
            "{}: ✅ Wrote {} verified transactions to {}",
            self.name(),
            outcome.rows,
            self.sheet.target()
        );

        Ok(())
    }
}
