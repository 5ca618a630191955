//! hela-finance: record storage, the per-user session cache, CSV export/import
//! and confirmation-message import.

pub mod csv_io;
pub mod session;
pub mod sms;
pub mod store;

pub use csv_io::{export_csv, import_csv};
pub use session::Session;
pub use sms::{draft_from_message, import_message};
pub use store::{JsonFileStore, MemoryStore, RecordStore, StoreError, StoredRecord, new_id, resolve_id, short_id};
