//! Durable backup slot and CSV export for the accumulated record collection.

pub mod error;
pub mod export;
pub mod slot;

pub use error::StoreError;
pub use export::{export_csv, export_file_name, write_csv, CSV_HEADER};
pub use slot::JsonSlot;
