use std::{fmt::Formatter, str::FromStr};
use thiserror::Error;

use super::column::{parse_col, Column, ColumnParseError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Notation(String);

impl std::fmt::Display for A1Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<A1Notation> for String {
    fn from(a1_notation: A1Notation) -> Self {
        a1_notation.0
    }
}

impl AsRef<str> for A1Notation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub trait ToA1Notation {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation;
}

/// Quotes a sheet title for use as an A1 prefix. Single quotes inside the title are doubled.
fn quote_sheet_name(sheet_name: &str) -> String {
    format!("'{}'", sheet_name.replace('\'', "''"))
}

/// Whole-column span such as `A:D`. Unbounded in rows, so appends land after the last
/// non-empty row and clears wipe every row of the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpan {
    pub start: Column,
    pub end: Column,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColumnSpanParseError {
    #[error("Missing ':' separator in column span")]
    MissingSeparator,
    #[error("Error parsing column: {0}")]
    ColumnParseError(ColumnParseError),
    #[error("Span end column comes before its start column")]
    Reversed,
}

impl ColumnSpan {
    pub fn new(start: Column, end: Column) -> Result<Self, ColumnSpanParseError> {
        if end < start {
            return Err(ColumnSpanParseError::Reversed);
        }
        Ok(ColumnSpan { start, end })
    }

    pub fn width(&self) -> u32 {
        self.end.value() - self.start.value() + 1
    }
}

impl FromStr for ColumnSpan {
    type Err = ColumnSpanParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .trim()
            .split_once(':')
            .ok_or(ColumnSpanParseError::MissingSeparator)?;
        ColumnSpan::new(
            parse_col(start).map_err(ColumnSpanParseError::ColumnParseError)?,
            parse_col(end).map_err(ColumnSpanParseError::ColumnParseError)?,
        )
    }
}

impl ToA1Notation for ColumnSpan {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation {
        match sheet_name {
            Some(sheet_name) => A1Notation(format!(
                "{}!{}:{}",
                quote_sheet_name(sheet_name),
                self.start,
                self.end
            )),
            None => A1Notation(format!("{}:{}", self.start, self.end)),
        }
    }
}
