use std::time::Duration;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite://prod.sqlite`. The file must already exist.
    pub url: Box<str>,
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_busy_timeout_secs() -> u64 {
    5
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}
