/// Header row written ahead of every batch of transactions.
pub const HEADER: [&str; 4] = ["User ID", "User Name", "Transaction ID", "Amount"];

/// One transaction as it appears on the spreadsheet, joined with its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub user_id: i64,
    pub user_name: String,
    pub txn_id: i64,
    /// `None` when the stored amount is NULL.
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    Text(String),
    Integer(i64),
    Number(f64),
    Empty,
}

impl SheetRow {
    pub fn cells(&self) -> Vec<SheetCell> {
        vec![
            SheetCell::Integer(self.user_id),
            SheetCell::Text(self.user_name.clone()),
            SheetCell::Integer(self.txn_id),
            self.amount.map_or(SheetCell::Empty, SheetCell::Number),
        ]
    }
}

/// Rows sent to the spreadsheet in a single call. The header always comes first; there is no
/// way to build a payload without it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetPayload {
    rows: Vec<SheetRow>,
}

impl SheetPayload {
    pub fn new(rows: Vec<SheetRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    /// Number of data rows, header excluded.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_header_only(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn txn_ids(&self) -> Vec<i64> {
        self.rows.iter().map(|row| row.txn_id).collect()
    }

    pub fn cells(&self) -> Vec<Vec<SheetCell>> {
        let header = HEADER
            .iter()
            .map(|title| SheetCell::Text(title.to_string()))
            .collect::<Vec<_>>();

        std::iter::once(header)
            .chain(self.rows.iter().map(SheetRow::cells))
            .collect()
    }
}
