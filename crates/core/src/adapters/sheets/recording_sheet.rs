use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use error_stack::report;

use crate::domain::sheets::{
    a1_notation::{A1Notation, ColumnSpan, ToA1Notation},
    payload::SheetPayload,
};
use crate::ports::sheet_sink::{SheetSink, SheetSinkError};

#[derive(Debug, Clone, PartialEq)]
pub enum SheetCall {
    Append(SheetPayload),
    Overwrite(SheetPayload),
}

/// In-memory sink that records successful calls. With `failing` set every call errors and
/// nothing is recorded.
#[derive(Debug, Default)]
pub struct RecordingSheet {
    calls: Mutex<Vec<SheetCall>>,
    failing: AtomicBool,
}

impl RecordingSheet {
    pub fn failing() -> Self {
        let sheet = Self::default();
        sheet.set_failing(true);
        sheet
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<SheetCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(
        &self,
        call: SheetCall,
        error: SheetSinkError,
    ) -> error_stack::Result<(), SheetSinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(report!(error));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait::async_trait]
impl SheetSink for RecordingSheet {
    fn target(&self) -> A1Notation {
        "A:D"
            .parse::<ColumnSpan>()
            .unwrap()
            .to_a1_notation(Some("Recording"))
    }

    async fn append_rows(
        &self,
        payload: &SheetPayload,
    ) -> error_stack::Result<(), SheetSinkError> {
        self.record(SheetCall::Append(payload.clone()), SheetSinkError::Append)
    }

    async fn overwrite_range(
        &self,
        payload: &SheetPayload,
    ) -> error_stack::Result<(), SheetSinkError> {
        self.record(SheetCall::Overwrite(payload.clone()), SheetSinkError::Write)
    }
}
