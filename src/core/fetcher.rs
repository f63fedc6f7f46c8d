use crate::domain::model::{Filters, PageRequest, Record};
use crate::domain::ports::MediaSource;
use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};

/// 上游單頁上限
pub const MAX_PAGE_SIZE: u32 = 100;

/// 分頁參數，呼叫端的同名 filter 會被覆蓋
const RESERVED_KEYS: &[&str] = &["page", "limit", "size", "total"];

/// 單頁請求失敗時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageErrorPolicy {
    /// 記錄警告並回傳目前已取得的資料
    #[default]
    #[serde(alias = "stop")]
    StopWithPartial,
    /// 直接把錯誤往上拋
    Propagate,
}

/// 逐頁向上游取資料，直到達到筆數上限或上游回傳空頁
pub struct PaginatedFetcher<'a> {
    source: &'a dyn MediaSource,
    page_size: u32,
    on_page_error: PageErrorPolicy,
}

impl<'a> PaginatedFetcher<'a> {
    pub fn new(source: &'a dyn MediaSource) -> Self {
        Self {
            source,
            page_size: MAX_PAGE_SIZE,
            on_page_error: PageErrorPolicy::default(),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_error_policy(mut self, policy: PageErrorPolicy) -> Self {
        self.on_page_error = policy;
        self
    }

    pub async fn fetch_all(
        &self,
        limit: usize,
        filters: &Filters,
        include_total: bool,
    ) -> Result<Vec<Record>> {
        let mut collected: Vec<Record> = Vec::new();
        if limit == 0 {
            return Ok(collected);
        }

        let filters = sanitize_filters(filters);
        let mut page: u32 = 1;

        while collected.len() < limit {
            let remaining = limit - collected.len();
            let size = remaining.min(self.page_size as usize) as u32;
            let request = PageRequest {
                page,
                size,
                // 只有第一頁需要總數
                include_total: include_total && page == 1,
                filters: filters.clone(),
            };

            tracing::debug!("📡 Requesting page {} (size {})", page, size);

            match self.source.list_media(&request).await {
                Ok(items) if items.is_empty() => {
                    tracing::debug!("📭 Page {} is empty, upstream exhausted", page);
                    break;
                }
                Ok(items) => {
                    let received = items.len();
                    collected.extend(items);
                    tracing::debug!(
                        "📥 Page {}: {} items ({} / {})",
                        page,
                        received,
                        collected.len(),
                        limit
                    );
                    if received < size as usize {
                        break;
                    }
                    page += 1;
                }
                Err(e @ EtlError::UpstreamUnavailable { .. }) => return Err(e),
                Err(e) => match self.on_page_error {
                    PageErrorPolicy::StopWithPartial => {
                        tracing::warn!(
                            "⚠️ Page {} failed, returning {} partial items: {}",
                            page,
                            collected.len(),
                            e
                        );
                        break;
                    }
                    PageErrorPolicy::Propagate => {
                        tracing::error!("❌ Page {} failed: {}", page, e);
                        return Err(e);
                    }
                },
            }
        }

        collected.truncate(limit);
        tracing::info!("📦 Fetched {} items (limit {})", collected.len(), limit);
        Ok(collected)
    }
}

/// 去掉空值與保留鍵
pub fn sanitize_filters(filters: &Filters) -> Filters {
    filters
        .iter()
        .filter(|(key, value)| {
            if RESERVED_KEYS.contains(&key.to_ascii_lowercase().as_str()) {
                tracing::debug!("🔧 Filter '{}' overridden by pagination parameters", key);
                return false;
            }
            !key.trim().is_empty() && !value.is_blank()
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FilterValue, MetapropertyMap};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// 依序回傳預先設定的頁面，並記錄收到的請求
    struct ScriptedSource {
        pages: Mutex<Vec<Result<Vec<Record>>>>,
        requests: Mutex<Vec<PageRequest>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<Vec<Record>>>) -> Self {
            Self {
                pages: Mutex::new(pages.into_iter().rev().collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<PageRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MediaSource for ScriptedSource {
        async fn list_media(&self, request: &PageRequest) -> Result<Vec<Record>> {
            self.requests.lock().unwrap().push(request.clone());
            self.pages.lock().unwrap().pop().unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn get_media(&self, _id: &str) -> Result<Option<Record>> {
            Ok(None)
        }

        async fn list_metaproperties(&self, _options: bool, _count: bool) -> Result<MetapropertyMap> {
            Ok(MetapropertyMap::new())
        }
    }

    fn records(start: usize, count: usize) -> Vec<Record> {
        (start..start + count)
            .map(|i| Record::from_value(json!({"id": format!("m-{}", i)})).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_zero_limit_makes_no_calls() {
        let source = ScriptedSource::new(vec![Ok(records(0, 10))]);
        let fetcher = PaginatedFetcher::new(&source);

        let result = fetcher.fetch_all(0, &Filters::new(), true).await.unwrap();

        assert!(result.is_empty());
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_limit_within_one_page_makes_single_call() {
        let source = ScriptedSource::new(vec![Ok(records(0, 30)), Ok(records(30, 30))]);
        let fetcher = PaginatedFetcher::new(&source);

        let result = fetcher.fetch_all(30, &Filters::new(), false).await.unwrap();

        assert_eq!(result.len(), 30);
        let requests = source.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].page, 1);
        assert_eq!(requests[0].size, 30);
    }

    #[tokio::test]
    async fn test_overshooting_page_is_truncated() {
        // 上游不理會 size，回傳比要求多的資料
        let source = ScriptedSource::new(vec![Ok(records(0, 10))]);
        let fetcher = PaginatedFetcher::new(&source);

        let result = fetcher.fetch_all(4, &Filters::new(), false).await.unwrap();

        assert_eq!(result.len(), 4);
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_stops_at_first_empty_page() {
        let source = ScriptedSource::new(vec![
            Ok(records(0, 2)),
            Ok(records(2, 2)),
            Ok(Vec::new()),
            Ok(records(100, 2)),
        ]);
        let fetcher = PaginatedFetcher::new(&source).with_page_size(2);

        let result = fetcher.fetch_all(1000, &Filters::new(), false).await.unwrap();

        let ids: Vec<_> = result.iter().map(|r| r.get("id").unwrap().clone()).collect();
        assert_eq!(ids, vec![json!("m-0"), json!("m-1"), json!("m-2"), json!("m-3")]);
        assert_eq!(source.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_page_size_shrinks_for_last_page() {
        let source = ScriptedSource::new(vec![Ok(records(0, 100)), Ok(records(100, 50))]);
        let fetcher = PaginatedFetcher::new(&source);

        let result = fetcher.fetch_all(150, &Filters::new(), true).await.unwrap();

        assert_eq!(result.len(), 150);
        let requests = source.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!((requests[0].page, requests[0].size), (1, 100));
        assert_eq!((requests[1].page, requests[1].size), (2, 50));
        // 只有第一頁帶 total
        assert!(requests[0].include_total);
        assert!(!requests[1].include_total);
    }

    #[tokio::test]
    async fn test_page_error_returns_partial_by_default() {
        let source = ScriptedSource::new(vec![
            Ok(records(0, 2)),
            Err(EtlError::upstream_failed(Some(500), "server error")),
            Ok(records(4, 2)),
        ]);
        let fetcher = PaginatedFetcher::new(&source).with_page_size(2);

        let result = fetcher.fetch_all(10, &Filters::new(), false).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(source.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_page_error_propagates_when_configured() {
        let source = ScriptedSource::new(vec![
            Ok(records(0, 2)),
            Err(EtlError::upstream_failed(Some(502), "bad gateway")),
        ]);
        let fetcher = PaginatedFetcher::new(&source)
            .with_page_size(2)
            .with_error_policy(PageErrorPolicy::Propagate);

        let err = fetcher.fetch_all(10, &Filters::new(), false).await.unwrap_err();

        assert!(matches!(
            err,
            EtlError::UpstreamRequestFailed {
                status: Some(502),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unavailable_upstream_always_aborts() {
        let source = ScriptedSource::new(vec![Err(EtlError::UpstreamUnavailable {
            message: "no token".to_string(),
        })]);
        let fetcher = PaginatedFetcher::new(&source);

        let err = fetcher.fetch_all(10, &Filters::new(), false).await.unwrap_err();

        assert!(matches!(err, EtlError::UpstreamUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_filters_are_forwarded_without_reserved_or_blank_keys() {
        let source = ScriptedSource::new(vec![Ok(records(0, 1))]);
        let fetcher = PaginatedFetcher::new(&source);

        let mut filters = Filters::new();
        filters.insert("type".to_string(), FilterValue::from("image"));
        filters.insert("keyword".to_string(), FilterValue::from(""));
        filters.insert("isPublic".to_string(), FilterValue::from(false));
        filters.insert("page".to_string(), FilterValue::from("7"));
        filters.insert("Limit".to_string(), FilterValue::from("9999"));
        filters.insert("brandId".to_string(), FilterValue::from("b-1"));

        fetcher.fetch_all(5, &filters, false).await.unwrap();

        let sent = &source.requests()[0];
        assert_eq!(sent.page, 1);
        assert_eq!(sent.size, 5);
        let keys: Vec<_> = sent.filters.keys().cloned().collect();
        assert_eq!(keys, vec!["brandId", "isPublic", "type"]);
        assert_eq!(sent.filters["isPublic"], FilterValue::Flag(false));
    }
}
