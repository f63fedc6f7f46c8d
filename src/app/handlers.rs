use crate::adapters::WorkbookEncoder;
use crate::app::envelope::Reply;
use crate::app::query::{parse_bool, parse_count, parse_page};
use crate::config::{AppConfig, FetchConfig};
use crate::core::etl::EtlEngine;
use crate::core::export::{artifact_stem, MediaExportPipeline, MetapropertyExportPipeline};
use crate::core::fetcher::{sanitize_filters, PaginatedFetcher};
use crate::core::flatten::{FieldClassifier, TabularFlattener};
use crate::domain::model::{
    ExportArtifact, ExportOutcome, Filters, MetapropertyMap, PageRequest, Record,
};
use crate::domain::ports::{MediaSource, Storage};
use crate::utils::error::{EtlError, Result};
use std::sync::Arc;

const DEFAULT_LIST_SIZE: usize = 100;

/// 呼叫端傳入的媒體查詢參數（尚未轉型）
#[derive(Debug, Clone, Default)]
pub struct MediaQuery {
    pub limit: Option<String>,
    pub page: Option<String>,
    pub total: Option<String>,
    pub filters: Filters,
    /// 匯出檔名（不含副檔名）
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MetapropertyQuery {
    pub options: Option<String>,
    pub count: Option<String>,
}

/// 對外操作的進入點；每個請求各自擁有自己的累積結果與表格
pub struct AssetService<S: Storage> {
    source: Arc<dyn MediaSource>,
    engine: EtlEngine<S, WorkbookEncoder>,
    flattener: TabularFlattener,
    fetch: FetchConfig,
    portal: Option<String>,
    production: bool,
}

impl<S: Storage> AssetService<S> {
    pub fn new(config: &AppConfig, source: Arc<dyn MediaSource>, storage: S) -> Self {
        Self {
            source,
            engine: EtlEngine::new(
                storage,
                WorkbookEncoder::for_format(config.export.format),
                config.export.download_base_url.clone(),
            ),
            flattener: TabularFlattener::new(FieldClassifier::from_rules(&config.export.fields)),
            fetch: config.fetch.clone(),
            portal: config.upstream.base_url.clone(),
            production: config.is_production(),
        }
    }

    fn fetcher(&self) -> PaginatedFetcher<'_> {
        PaginatedFetcher::new(self.source.as_ref())
            .with_page_size(self.fetch.max_page_size)
            .with_error_policy(self.fetch.on_page_error)
    }

    fn fail<T>(&self, operation: &str, error: EtlError) -> Reply<T> {
        match error.severity() {
            crate::utils::error::ErrorSeverity::Low => {
                tracing::info!("🔍 {}: {}", operation, error)
            }
            _ => tracing::error!("❌ {} failed: {}", operation, error),
        }
        Reply::from_error(&error, self.production)
    }

    pub async fn list_media(&self, query: &MediaQuery) -> Reply<Vec<Record>> {
        match self.try_list_media(query).await {
            Ok(items) => Reply::ok(format!("Retrieved {} media items", items.len()), items),
            Err(e) => self.fail("list_media", e),
        }
    }

    async fn try_list_media(&self, query: &MediaQuery) -> Result<Vec<Record>> {
        let limit = parse_count(
            query.limit.as_deref(),
            DEFAULT_LIST_SIZE,
            self.fetch.max_list_size,
        );
        let include_total = parse_bool(query.total.as_deref());
        tracing::info!("📥 list_media limit={} filters={}", limit, query.filters.len());

        match parse_page(query.page.as_deref()) {
            // 指定頁碼時只向上游要這一頁
            Some(page) => {
                if limit == 0 {
                    return Ok(Vec::new());
                }
                let size = limit.min(self.fetch.max_page_size as usize) as u32;
                let request = PageRequest {
                    page,
                    size,
                    include_total,
                    filters: sanitize_filters(&query.filters),
                };
                let mut items = self.source.list_media(&request).await?;
                items.truncate(size as usize);
                Ok(items)
            }
            None => {
                self.fetcher()
                    .fetch_all(limit, &query.filters, include_total)
                    .await
            }
        }
    }

    pub async fn get_media(&self, id: Option<&str>) -> Reply<Record> {
        match self.try_get_media(id).await {
            Ok(record) => Reply::ok("Media item retrieved", record),
            Err(e) => self.fail("get_media", e),
        }
    }

    async fn try_get_media(&self, id: Option<&str>) -> Result<Record> {
        let id = id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| EtlError::invalid_parameter("id", "media id is required"))?;
        tracing::info!("📥 get_media id={}", id);

        self.source
            .get_media(id)
            .await?
            .ok_or_else(|| EtlError::NotFound {
                resource: "Media".to_string(),
                id: id.to_string(),
            })
    }

    pub async fn list_metaproperties(&self, query: &MetapropertyQuery) -> Reply<MetapropertyMap> {
        // options 預設開啟
        let options = query
            .options
            .as_deref()
            .map(|v| parse_bool(Some(v)))
            .unwrap_or(true);
        let count = parse_bool(query.count.as_deref());
        tracing::info!("📥 list_metaproperties options={} count={}", options, count);

        match self.source.list_metaproperties(options, count).await {
            Ok(map) => Reply::ok(format!("Retrieved {} metaproperties", map.len()), map),
            Err(e) => self.fail("list_metaproperties", e),
        }
    }

    pub async fn export_media(&self, query: &MediaQuery) -> Reply<ExportArtifact> {
        let limit = parse_count(
            query.limit.as_deref(),
            self.fetch.max_export_size,
            self.fetch.max_export_size,
        );
        let stem = artifact_stem(
            query.name.as_deref(),
            self.portal.as_deref(),
            "media",
            chrono::Utc::now(),
        );
        let pipeline = MediaExportPipeline::new(
            self.fetcher(),
            &self.flattener,
            limit,
            query.filters.clone(),
        );

        match self.engine.run(&pipeline, &stem).await {
            Ok(outcome) => export_reply(outcome, "media items"),
            Err(e) => self.fail("export_media", e),
        }
    }

    pub async fn export_metaproperties(&self, name: Option<&str>) -> Reply<ExportArtifact> {
        let stem = artifact_stem(
            name,
            self.portal.as_deref(),
            "metaproperties",
            chrono::Utc::now(),
        );
        let pipeline = MetapropertyExportPipeline::new(self.source.as_ref());

        match self.engine.run(&pipeline, &stem).await {
            Ok(outcome) => export_reply(outcome, "metaproperties"),
            Err(e) => self.fail("export_metaproperties", e),
        }
    }
}

fn export_reply(outcome: ExportOutcome, what: &str) -> Reply<ExportArtifact> {
    match outcome {
        ExportOutcome::Created(artifact) => Reply::ok(
            format!("Exported {} {}", artifact.total_items, what),
            artifact,
        ),
        ExportOutcome::Empty => Reply::ok_empty(format!("No {} found to export", what)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{LocalStorage, SampleSource};
    use crate::config::UpstreamMode;
    use crate::domain::model::FilterValue;
    use tempfile::TempDir;

    fn service(temp_dir: &TempDir, total: usize) -> AssetService<LocalStorage> {
        let mut config = AppConfig::default();
        config.upstream.mode = UpstreamMode::Sample;
        config.export.download_base_url = "https://files.example.com/exports".to_string();
        config.fetch.max_list_size = 50;
        let storage = LocalStorage::init(temp_dir.path()).unwrap();
        AssetService::new(&config, Arc::new(SampleSource::new(total)), storage)
    }

    #[tokio::test]
    async fn test_list_media_clamps_limit() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir, 500);

        let reply = service
            .list_media(&MediaQuery {
                limit: Some("5000".to_string()),
                ..Default::default()
            })
            .await;

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body.data.unwrap().len(), 50);
    }

    #[tokio::test]
    async fn test_list_media_single_page() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir, 30);

        let reply = service
            .list_media(&MediaQuery {
                limit: Some("10".to_string()),
                page: Some("3".to_string()),
                ..Default::default()
            })
            .await;

        let items = reply.body.data.unwrap();
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].get("id").unwrap(), "sample-21");
    }

    #[tokio::test]
    async fn test_list_media_negative_limit_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir, 30);

        let reply = service
            .list_media(&MediaQuery {
                limit: Some("-1".to_string()),
                ..Default::default()
            })
            .await;

        assert!(reply.is_success());
        assert!(reply.body.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_media_errors() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir, 3);

        let missing = service.get_media(None).await;
        assert_eq!(missing.status, 400);
        assert_eq!(missing.body.error.unwrap().code, "INVALID_PARAMETER");

        let unknown = service.get_media(Some("sample-99")).await;
        assert_eq!(unknown.status, 404);

        let found = service.get_media(Some("sample-2")).await;
        assert_eq!(found.body.data.unwrap().get("id").unwrap(), "sample-2");
    }

    #[tokio::test]
    async fn test_export_media_writes_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir, 40);

        let mut filters = Filters::new();
        filters.insert("type".to_string(), FilterValue::from("image"));
        let reply = service
            .export_media(&MediaQuery {
                filters,
                name: Some("images".to_string()),
                ..Default::default()
            })
            .await;

        let artifact = reply.body.data.unwrap();
        // 40 筆中 image 佔 14 筆
        assert_eq!(artifact.total_items, 14);
        assert_eq!(artifact.filename, "images.xlsx");
        assert_eq!(
            artifact.download_url,
            "https://files.example.com/exports/images.xlsx"
        );
        assert!(temp_dir.path().join("images.xlsx").exists());
    }

    #[tokio::test]
    async fn test_export_media_empty_result() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir, 0);

        let reply = service.export_media(&MediaQuery::default()).await;

        assert!(reply.is_success());
        assert!(reply.body.data.is_none());
        assert_eq!(reply.body.message, "No media items found to export");
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_list_metaproperties_defaults_to_options() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir, 3);

        let reply = service
            .list_metaproperties(&MetapropertyQuery::default())
            .await;
        let map = reply.body.data.unwrap();
        assert!(map.values().any(|mp| !mp.options.is_empty()));

        let reply = service
            .list_metaproperties(&MetapropertyQuery {
                options: Some("0".to_string()),
                count: None,
            })
            .await;
        assert!(reply.body.data.unwrap().values().all(|mp| mp.options.is_empty()));
    }
}
