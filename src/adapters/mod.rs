// Adapters layer: concrete implementations for external systems (upstream API, storage, encoding).

pub mod bynder;
pub mod sample;
pub mod storage;
pub mod workbook;
pub mod xlsx;

pub use bynder::BynderClient;
pub use sample::SampleSource;
pub use storage::LocalStorage;
pub use workbook::{CsvZipEncoder, WorkbookEncoder};
pub use xlsx::XlsxEncoder;
