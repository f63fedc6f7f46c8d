// App layer: request parsing, response envelope and the operations exposed to callers.

pub mod envelope;
pub mod handlers;
pub mod query;

use crate::adapters::{BynderClient, LocalStorage, SampleSource};
use crate::config::{AppConfig, UpstreamMode};
use crate::domain::ports::MediaSource;
use crate::utils::error::Result;
use std::sync::Arc;

pub use envelope::{ApiResponse, ErrorBody, Reply};
pub use handlers::{AssetService, MediaQuery, MetapropertyQuery};

/// 依配置選擇上游實作
pub fn build_source(config: &AppConfig) -> Result<Arc<dyn MediaSource>> {
    match config.upstream.mode {
        UpstreamMode::Sample => {
            tracing::info!("🧪 Using built-in sample data");
            Ok(Arc::new(SampleSource::default()))
        }
        UpstreamMode::Bynder => {
            let client = BynderClient::new(&config.upstream)?;
            Ok(Arc::new(client))
        }
    }
}

/// 組裝本機輸出目錄與上游來源
pub fn build_service(config: &AppConfig) -> Result<AssetService<LocalStorage>> {
    let storage = LocalStorage::init(&config.export.output_dir)?;
    let source = build_source(config)?;
    Ok(AssetService::new(config, source, storage))
}
