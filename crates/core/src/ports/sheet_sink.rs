use thiserror::Error;

use crate::domain::sheets::{a1_notation::A1Notation, payload::SheetPayload};

#[derive(Error, Debug)]
pub enum SheetSinkError {
    #[error("Failed to append rows")]
    Append,
    #[error("Failed to clear range")]
    Clear,
    #[error("Failed to write range")]
    Write,
    #[error("Spreadsheet call timed out")]
    Timeout,
}

/// Destination worksheet for synced transactions.
#[async_trait::async_trait]
pub trait SheetSink: Send + Sync {
    /// Range the sink writes to, for logging.
    fn target(&self) -> A1Notation;

    /// Adds the payload after the existing content of the target. Never clears anything.
    async fn append_rows(&self, payload: &SheetPayload)
        -> error_stack::Result<(), SheetSinkError>;

    /// Clears the whole target range, then writes the payload from its top-left cell.
    async fn overwrite_range(
        &self,
        payload: &SheetPayload,
    ) -> error_stack::Result<(), SheetSinkError>;
}
