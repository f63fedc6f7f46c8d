pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{
    BynderClient, CsvZipEncoder, LocalStorage, SampleSource, WorkbookEncoder, XlsxEncoder,
};
pub use app::{build_service, build_source, AssetService, MediaQuery, MetapropertyQuery, Reply};
pub use config::AppConfig;
pub use core::{etl::EtlEngine, fetcher::PaginatedFetcher, flatten::TabularFlattener};
pub use utils::error::{EtlError, Result};
