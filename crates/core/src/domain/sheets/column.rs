use std::{fmt::Formatter, str::FromStr};

use thiserror::Error;

/// 1-based spreadsheet column (`A` = 1, `Z` = 26, `AA` = 27).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Column(u32);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColumnParseError {
    #[error("Empty column")]
    Empty,
    #[error("Non-alphabetic character in column")]
    NonAlphabeticCharacter,
    #[error("Column number cannot be zero")]
    Zero,
    #[error("Column out of range")]
    Overflow,
}

impl Column {
    pub fn new(value: u32) -> Result<Self, ColumnParseError> {
        if value == 0 {
            return Err(ColumnParseError::Zero);
        }
        Ok(Column(value))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", number_to_letters(self.0))
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Column(u32: {}, letters: {})", self.0, self)
    }
}

impl FromStr for Column {
    type Err = ColumnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_col(s)
    }
}

impl From<Column> for String {
    fn from(col: Column) -> Self {
        number_to_letters(col.0)
    }
}

pub fn parse_col<T: AsRef<str>>(col_str: T) -> Result<Column, ColumnParseError> {
    let col_str = col_str.as_ref();
    if col_str.is_empty() {
        return Err(ColumnParseError::Empty);
    }
    if col_str.chars().any(|c| !c.is_ascii_alphabetic()) {
        return Err(ColumnParseError::NonAlphabeticCharacter);
    }

    let col_num = col_str
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .try_fold(0u32, |acc, c| {
            acc.checked_mul(26)
                .and_then(|acc| acc.checked_add(c as u32 - 'A' as u32 + 1))
        })
        .ok_or(ColumnParseError::Overflow)?;

    Ok(Column(col_num))
}

fn number_to_letters(number: u32) -> String {
    let mut number = number;
    let mut result = String::new();
    while number > 0 {
        let remainder = (number - 1) % 26;
        let letter = (remainder as u8 + b'A') as char;
        result.push(letter);
        number = (number - remainder) / 26;
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_letter() {
        assert_eq!(parse_col("A").unwrap().value(), 1);
        assert_eq!(parse_col("d").unwrap().value(), 4);
        assert_eq!(parse_col("Z").unwrap().value(), 26);
    }

    #[test]
    fn test_parse_double_letter() {
        assert_eq!(parse_col("AA").unwrap().value(), 27);
        assert_eq!(parse_col("AZ").unwrap().value(), 52);
        assert_eq!(parse_col("BA").unwrap().value(), 53);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_col(""), Err(ColumnParseError::Empty));
        assert_eq!(parse_col("A1"), Err(ColumnParseError::NonAlphabeticCharacter));
        assert_eq!(parse_col("ZZZZZZZZZZ"), Err(ColumnParseError::Overflow));
    }

    #[test]
    fn test_display() {
        assert_eq!(Column::new(1).unwrap().to_string(), "A");
        assert_eq!(Column::new(4).unwrap().to_string(), "D");
        assert_eq!(Column::new(27).unwrap().to_string(), "AA");
        assert_eq!(Column::new(702).unwrap().to_string(), "ZZ");
        assert_eq!(Column::new(703).unwrap().to_string(), "AAA");
    }

    #[test]
    fn test_zero_column_rejected() {
        assert_eq!(Column::new(0), Err(ColumnParseError::Zero));
    }

    #[test]
    fn test_debug() {
        let col = Column::new(28).unwrap();
        assert_eq!(format!("{:?}", col), "Column(u32: 28, letters: AB)");
    }
}
