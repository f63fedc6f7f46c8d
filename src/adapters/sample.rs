use crate::domain::model::{
    FilterValue, Metaproperty, MetapropertyMap, MetapropertyOption, PageRequest, Record,
};
use crate::domain::ports::MediaSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::json;

const DEFAULT_SAMPLE_SIZE: usize = 250;
const MEDIA_TYPES: [&str; 3] = ["image", "video", "document"];

/// 不連線上游的示範資料來源，供本機開發與展示使用
#[derive(Debug, Clone)]
pub struct SampleSource {
    total: usize,
}

impl SampleSource {
    pub fn new(total: usize) -> Self {
        Self { total }
    }

    fn media(index: usize) -> Record {
        let kind = MEDIA_TYPES[index % MEDIA_TYPES.len()];
        let id = format!("sample-{}", index + 1);
        let extension = match kind {
            "image" => "jpg",
            "video" => "mp4",
            _ => "pdf",
        };
        let departments = if index % 3 == 0 {
            json!(["Marketing", "Sales"])
        } else {
            json!(["Marketing"])
        };
        let value = json!({
            "id": id,
            "name": format!("Sample asset {}", index + 1),
            "type": kind,
            "extension": [extension],
            "fileSize": 1024 * (index as u64 + 1) * 37,
            "tags": ["sample", kind],
            "isPublic": index % 2 == 0,
            "dateCreated": format!("2024-01-{:02}T10:00:00Z", index % 28 + 1),
            "thumbnails": {
                "mini": format!("https://cdn.example.com/{}/mini.jpg", id),
                "thul": format!("https://cdn.example.com/{}/thul.jpg", id),
                "webimage": format!("https://cdn.example.com/{}/web.jpg", id)
            },
            "property_Department": departments,
        });
        Record::from_value(value).unwrap_or_default()
    }

    fn matches(record: &Record, request: &PageRequest) -> bool {
        request.filters.iter().all(|(key, expected)| match record.get(key) {
            Some(serde_json::Value::String(actual)) => {
                matches!(expected, FilterValue::Text(text) if text == actual)
            }
            Some(serde_json::Value::Bool(actual)) => match expected {
                FilterValue::Flag(flag) => flag == actual,
                FilterValue::Text(text) => text == &actual.to_string(),
            },
            // 不認得的 filter 直接忽略
            _ => true,
        })
    }
}

impl Default for SampleSource {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_SIZE)
    }
}

#[async_trait]
impl MediaSource for SampleSource {
    async fn list_media(&self, request: &PageRequest) -> Result<Vec<Record>> {
        let skip = (request.page.saturating_sub(1) as usize) * request.size as usize;
        let page = (0..self.total)
            .map(Self::media)
            .filter(|record| Self::matches(record, request))
            .skip(skip)
            .take(request.size as usize)
            .collect();
        Ok(page)
    }

    async fn get_media(&self, id: &str) -> Result<Option<Record>> {
        let index = id
            .strip_prefix("sample-")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| (1..=self.total).contains(n));
        Ok(index.map(|n| Self::media(n - 1)))
    }

    async fn list_metaproperties(&self, options: bool, count: bool) -> Result<MetapropertyMap> {
        let option = |id: &str, name: &str, zindex: i64, media_count: u64| MetapropertyOption {
            id: id.to_string(),
            name: name.to_string(),
            label: name.to_string(),
            display_label: name.to_string(),
            zindex,
            media_count: if count { media_count } else { 0 },
        };

        let mut map = MetapropertyMap::new();
        map.insert(
            "sample-mp-department".to_string(),
            Metaproperty {
                id: "sample-mp-department".to_string(),
                name: "Department".to_string(),
                label: "Department".to_string(),
                kind: "select".to_string(),
                is_multiselect: true,
                is_required: false,
                is_filterable: true,
                options: if options {
                    vec![
                        option("sample-opt-marketing", "Marketing", 1, self.total as u64),
                        option("sample-opt-sales", "Sales", 2, self.total.div_ceil(3) as u64),
                    ]
                } else {
                    Vec::new()
                },
            },
        );
        map.insert(
            "sample-mp-usage".to_string(),
            Metaproperty {
                id: "sample-mp-usage".to_string(),
                name: "UsageRights".to_string(),
                label: "Usage rights".to_string(),
                kind: "select".to_string(),
                is_multiselect: false,
                is_required: true,
                is_filterable: false,
                options: if options {
                    vec![option("sample-opt-internal", "Internal", 1, 0)]
                } else {
                    Vec::new()
                },
            },
        );
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Filters;

    fn page(page: u32, size: u32, filters: Filters) -> PageRequest {
        PageRequest {
            page,
            size,
            include_total: false,
            filters,
        }
    }

    #[test]
    fn test_sample_pages_run_out() {
        let source = SampleSource::new(5);
        let first = tokio_test::block_on(source.list_media(&page(1, 3, Filters::new()))).unwrap();
        let second = tokio_test::block_on(source.list_media(&page(2, 3, Filters::new()))).unwrap();
        let third = tokio_test::block_on(source.list_media(&page(3, 3, Filters::new()))).unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 2);
        assert!(third.is_empty());
    }

    #[test]
    fn test_sample_type_filter() {
        let source = SampleSource::new(9);
        let mut filters = Filters::new();
        filters.insert("type".to_string(), FilterValue::from("video"));

        let items = tokio_test::block_on(source.list_media(&page(1, 100, filters))).unwrap();

        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|r| r.get("type") == Some(&json!("video"))));
    }

    #[tokio::test]
    async fn test_sample_lookup() {
        let source = SampleSource::new(3);
        assert!(source.get_media("sample-2").await.unwrap().is_some());
        assert!(source.get_media("sample-4").await.unwrap().is_none());
        assert!(source.get_media("other").await.unwrap().is_none());

        let without_options = source.list_metaproperties(false, false).await.unwrap();
        assert!(without_options.values().all(|mp| mp.options.is_empty()));
    }
}
