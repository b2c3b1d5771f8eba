pub mod application_service;
pub mod command_handler;
pub mod routine;
pub mod sheet_sink;
