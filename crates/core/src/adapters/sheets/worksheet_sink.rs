use std::sync::Arc;

use error_stack::ResultExt;
use google_sheets4::api::ValueRange;
use tracing::instrument;

use super::{
    range_client::RangeClient, spreadsheet_manager::SpreadsheetManager,
    value_range_factory::ValueRangeFactory,
};
use crate::adapters::config::sheets_config::WorksheetTarget;
use crate::domain::sheets::a1_notation::{
    A1Notation, ColumnSpan, ColumnSpanParseError, ToA1Notation,
};
use crate::domain::sheets::payload::{SheetPayload, HEADER};
use crate::ports::sheet_sink::{SheetSink, SheetSinkError};

/// [`SheetSink`] writing to a column span of one worksheet, e.g. `'Sheet2'!A:D`.
#[derive(Debug)]
pub struct WorksheetSink<C = SpreadsheetManager> {
    client: Arc<C>,
    range: A1Notation,
}

impl<C: RangeClient> WorksheetSink<C> {
    pub fn new(
        client: Arc<C>,
        target: &WorksheetTarget,
    ) -> error_stack::Result<Self, ColumnSpanParseError> {
        let span = target
            .columns
            .parse::<ColumnSpan>()
            .attach_printable_lazy(|| format!("Invalid column span '{}'", target.columns))?;

        if span.width() != HEADER.len() as u32 {
            tracing::warn!(
                "Column span {} is {} columns wide but rows have {} cells",
                target.columns,
                span.width(),
                HEADER.len()
            );
        }

        Ok(Self {
            client,
            range: span.to_a1_notation(Some(target.worksheet_name.as_ref())),
        })
    }
}

#[async_trait::async_trait]
impl<C: RangeClient> SheetSink for WorksheetSink<C> {
    fn target(&self) -> A1Notation {
        self.range.clone()
    }

    #[instrument(skip(payload), fields(rows = payload.len()))]
    async fn append_rows(
        &self,
        payload: &SheetPayload,
    ) -> error_stack::Result<(), SheetSinkError> {
        self.client
            .append_range(&self.range, ValueRange::from_payload(payload))
            .await
    }

    #[instrument(skip(payload), fields(rows = payload.len()))]
    async fn overwrite_range(
        &self,
        payload: &SheetPayload,
    ) -> error_stack::Result<(), SheetSinkError> {
        self.client.clear_range(&self.range).await?;
        self.client
            .write_range(&self.range, ValueRange::from_payload(payload))
            .await
    }
}
