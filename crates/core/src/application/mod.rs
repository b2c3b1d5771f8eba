pub mod append_sync;
pub mod service;
pub mod snapshot_sync;
