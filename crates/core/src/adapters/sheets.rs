pub mod auth;
pub mod http_client;
pub mod range_client;
pub mod spreadsheet_manager;
pub mod value_range_factory;
pub mod worksheet_sink;

#[cfg(test)]
pub mod recording_sheet;
