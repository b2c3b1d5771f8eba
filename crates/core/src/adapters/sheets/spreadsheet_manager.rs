use std::{fmt::Debug, future::Future, time::Duration};

use error_stack::ResultExt;
use google_sheets4::{
    api::{ClearValuesRequest, ValueRange},
    Sheets,
};
use thiserror::Error;
use tracing::instrument;

use crate::adapters::config::sheets_config::SpreadsheetConfig;
use crate::domain::sheets::a1_notation::A1Notation;
use crate::ports::sheet_sink::SheetSinkError;

use super::{
    auth::{self},
    http_client::{self, HttpsConnector},
    range_client::RangeClient,
};

/// Written as-is; the sheet must not parse names that look like formulas or dates.
const VALUE_INPUT_OPTION: &str = "RAW";
const INSERT_DATA_OPTION: &str = "INSERT_ROWS";

#[derive(Error, Debug)]
pub enum SpreadsheetManagerError {
    #[error("Failed to initialize the Google Sheets client")]
    Initialization,
}

/// Authorized handle to one spreadsheet. Every call is bounded by the configured transmit
/// timeout.
pub struct SpreadsheetManager {
    pub config: SpreadsheetConfig,
    hub: Sheets<HttpsConnector>,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpreadsheetManager {{ config: {:?} }}", self.config)
    }
}

async fn with_timeout<T, E, F>(
    timeout: Duration,
    call: F,
    failure: SheetSinkError,
) -> error_stack::Result<T, SheetSinkError>
where
    F: Future<Output = Result<T, E>>,
    E: error_stack::Context,
{
    tokio::time::timeout(timeout, call)
        .await
        .change_context(SheetSinkError::Timeout)
        .attach_printable_lazy(|| format!("No response after {:?}", timeout))?
        .change_context(failure)
}

impl SpreadsheetManager {
    #[instrument(name = "SpreadsheetManager::new")]
    pub async fn new(
        config: SpreadsheetConfig,
    ) -> error_stack::Result<Self, SpreadsheetManagerError> {
        let client =
            http_client::http_client().change_context(SpreadsheetManagerError::Initialization)?;
        let auth = auth::auth(&config, client.clone())
            .await
            .change_context(SpreadsheetManagerError::Initialization)?;
        let hub = Sheets::new(client, auth);

        Ok(SpreadsheetManager { config, hub })
    }

    fn timeout(&self) -> Duration {
        self.config.transmit_timeout()
    }
}

#[async_trait::async_trait]
impl RangeClient for SpreadsheetManager {
    #[instrument(skip(value_range))]
    async fn append_range(
        &self,
        range: &A1Notation,
        value_range: ValueRange,
    ) -> error_stack::Result<(), SheetSinkError> {
        let call = self
            .hub
            .spreadsheets()
            .values_append(value_range, &self.config.spreadsheet_id, range.as_ref())
            .value_input_option(VALUE_INPUT_OPTION)
            .insert_data_option(INSERT_DATA_OPTION)
            .doit();

        with_timeout(self.timeout(), call, SheetSinkError::Append)
            .await
            .map(|_| ())
            .attach_printable_lazy(|| format!("Failed to append to range {}", range))
    }

    #[instrument]
    async fn clear_range(
        &self,
        range: &A1Notation,
    ) -> error_stack::Result<(), SheetSinkError> {
        let call = self
            .hub
            .spreadsheets()
            .values_clear(
                ClearValuesRequest::default(),
                &self.config.spreadsheet_id,
                range.as_ref(),
            )
            .doit();

        with_timeout(self.timeout(), call, SheetSinkError::Clear)
            .await
            .map(|_| ())
            .attach_printable_lazy(|| format!("Failed to clear range {}", range))
    }

    #[instrument(skip(value_range))]
    async fn write_range(
        &self,
        range: &A1Notation,
        value_range: ValueRange,
    ) -> error_stack::Result<(), SheetSinkError> {
        let call = self
            .hub
            .spreadsheets()
            .values_update(value_range, &self.config.spreadsheet_id, range.as_ref())
            .value_input_option(VALUE_INPUT_OPTION)
            .doit();

        with_timeout(self.timeout(), call, SheetSinkError::Write)
            .await
            .map(|_| ())
            .attach_printable_lazy(|| format!("Failed to write to range {}", range))
    }
}
