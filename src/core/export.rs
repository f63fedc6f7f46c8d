use crate::core::etl::Pipeline;
use crate::core::fetcher::PaginatedFetcher;
use crate::core::flatten::TabularFlattener;
use crate::core::metaproperty::{flatten_metaproperties, METAPROPERTY_SHEET, OPTION_SHEET};
use crate::domain::model::{Filters, MetapropertyMap, Record, Workbook};
use crate::domain::ports::MediaSource;
use crate::utils::error::Result;
use crate::utils::slug::slugify;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub const MEDIA_SHEET: &str = "Media";

/// 媒體匯出：分頁取回後攤平成單一工作表
pub struct MediaExportPipeline<'a> {
    fetcher: PaginatedFetcher<'a>,
    flattener: &'a TabularFlattener,
    limit: usize,
    filters: Filters,
}

impl<'a> MediaExportPipeline<'a> {
    pub fn new(
        fetcher: PaginatedFetcher<'a>,
        flattener: &'a TabularFlattener,
        limit: usize,
        filters: Filters,
    ) -> Self {
        Self {
            fetcher,
            flattener,
            limit,
            filters,
        }
    }
}

#[async_trait]
impl Pipeline for MediaExportPipeline<'_> {
    type Data = Vec<Record>;

    fn kind(&self) -> &str {
        "media"
    }

    async fn extract(&self) -> Result<Vec<Record>> {
        self.fetcher.fetch_all(self.limit, &self.filters, false).await
    }

    fn item_count(&self, data: &Vec<Record>) -> usize {
        data.len()
    }

    fn transform(&self, data: Vec<Record>) -> Result<Workbook> {
        let table = self.flattener.flatten(&data);
        Ok(Workbook::new().with_sheet(MEDIA_SHEET, table))
    }
}

/// Metaproperty 匯出：屬性與選項各一張工作表
pub struct MetapropertyExportPipeline<'a> {
    source: &'a dyn MediaSource,
}

impl<'a> MetapropertyExportPipeline<'a> {
    pub fn new(source: &'a dyn MediaSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Pipeline for MetapropertyExportPipeline<'_> {
    type Data = MetapropertyMap;

    fn kind(&self) -> &str {
        "metaproperties"
    }

    async fn extract(&self) -> Result<MetapropertyMap> {
        self.source.list_metaproperties(true, true).await
    }

    fn item_count(&self, data: &MetapropertyMap) -> usize {
        data.len()
    }

    fn transform(&self, data: MetapropertyMap) -> Result<Workbook> {
        let tables = flatten_metaproperties(&data);
        Ok(Workbook::new()
            .with_sheet(METAPROPERTY_SHEET, tables.metaproperties)
            .with_sheet(OPTION_SHEET, tables.options))
    }
}

/// 呼叫端有指定名稱就直接使用，否則以入口網站名稱加時間戳記命名
pub fn artifact_stem(
    requested: Option<&str>,
    portal: Option<&str>,
    kind: &str,
    now: DateTime<Utc>,
) -> String {
    match requested.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!(
            "{}_{}_{}",
            slugify(portal),
            kind,
            now.format("%Y%m%d_%H%M%S")
        ),
    }
}
