use std::fmt::Debug;

use google_sheets4::api::ValueRange;

use crate::domain::sheets::a1_notation::A1Notation;
use crate::ports::sheet_sink::SheetSinkError;

/// Raw value-range calls against one spreadsheet.
#[async_trait::async_trait]
pub trait RangeClient: Debug + Send + Sync {
    /// Inserts rows after the last non-empty row of `range`.
    async fn append_range(
        &self,
        range: &A1Notation,
        value_range: ValueRange,
    ) -> error_stack::Result<(), SheetSinkError>;

    async fn clear_range(&self, range: &A1Notation) -> error_stack::Result<(), SheetSinkError>;

    /// Writes `value_range` starting at the top-left cell of `range`.
    async fn write_range(
        &self,
        range: &A1Notation,
        value_range: ValueRange,
    ) -> error_stack::Result<(), SheetSinkError>;
}
