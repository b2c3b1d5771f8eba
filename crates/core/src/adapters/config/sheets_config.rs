use std::time::Duration;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct SpreadsheetConfig {
    /// Path to the service account key file.
    pub priv_key: Box<str>,
    pub spreadsheet_id: Box<str>,
    #[serde(default = "default_transmit_timeout_secs")]
    pub transmit_timeout_secs: u64,
    pub append: WorksheetTarget,
    pub snapshot: WorksheetTarget,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct WorksheetTarget {
    pub worksheet_name: Box<str>,
    #[serde(default = "default_columns")]
    pub columns: Box<str>,
}

fn default_transmit_timeout_secs() -> u64 {
    30
}

fn default_columns() -> Box<str> {
    "A:D".into()
}

impl SpreadsheetConfig {
    pub fn transmit_timeout(&self) -> Duration {
        Duration::from_secs(self.transmit_timeout_secs)
    }
}
