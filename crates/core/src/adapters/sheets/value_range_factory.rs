use google_sheets4::api::ValueRange;
use serde_json::Value;

use crate::domain::sheets::payload::{SheetCell, SheetPayload};

pub trait ValueRangeFactory {
    fn from_payload(payload: &SheetPayload) -> Self;
}

fn wrap_cell(cell: SheetCell) -> Value {
    match cell {
        SheetCell::Text(text) => Value::String(text),
        SheetCell::Integer(number) => Value::from(number),
        // JSON has no NaN or infinity
        SheetCell::Number(number) => serde_json::Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(String::new())),
        SheetCell::Empty => Value::String(String::new()),
    }
}

impl ValueRangeFactory for ValueRange {
    fn from_payload(payload: &SheetPayload) -> Self {
        let values = payload
            .cells()
            .into_iter()
            .map(|row| row.into_iter().map(wrap_cell).collect::<Vec<_>>())
            .collect::<Vec<_>>();

        Self {
            major_dimension: Some("ROWS".to_string()),
            range: None,
            values: Some(values),
        }
    }
}
