pub mod sheets;

// Re-export commonly used types
pub use sheets::payload::{SheetCell, SheetPayload, SheetRow, HEADER};
