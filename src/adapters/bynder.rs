use crate::config::UpstreamConfig;
use crate::domain::model::{Metaproperty, MetapropertyMap, PageRequest, Record};
use crate::domain::ports::MediaSource;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use url::Url;

const MEDIA_PATH: &str = "api/v4/media/";
const METAPROPERTIES_PATH: &str = "api/v4/metaproperties/";
/// 錯誤訊息中保留的回應內容長度
const ERROR_BODY_LIMIT: usize = 300;

/// Bynder v4 REST API 的 reqwest 實作
pub struct BynderClient {
    client: Client,
    base_url: Option<Url>,
    token: Option<String>,
}

impl BynderClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        let base_url = match config.base_url.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_base_url(raw)?),
            _ => None,
        };
        let token = config
            .token
            .as_ref()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self
            .base_url
            .as_ref()
            .ok_or_else(|| EtlError::UpstreamUnavailable {
                message: "upstream.base_url is not configured".to_string(),
            })?;
        base.join(path).map_err(|e| EtlError::ConfigError {
            message: format!("Cannot build upstream URL for '{}': {}", path, e),
        })
    }

    fn get(&self, url: Url) -> Result<RequestBuilder> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| EtlError::UpstreamUnavailable {
                message: "upstream.token is not configured".to_string(),
            })?;
        Ok(self.client.get(url).bearer_auth(token))
    }

    /// 非 2xx 回應轉成錯誤；401/403 視為上游未授權
    async fn check_status(response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        tracing::debug!("📡 {} failed with {}: {}", what, status, body);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(EtlError::UpstreamUnavailable {
                message: format!("{} rejected credentials ({})", what, status),
            });
        }

        Err(EtlError::upstream_failed(
            Some(status.as_u16()),
            format!("{} returned {}: {}", what, status, body),
        ))
    }
}

#[async_trait]
impl MediaSource for BynderClient {
    async fn list_media(&self, request: &PageRequest) -> Result<Vec<Record>> {
        let url = self.endpoint(MEDIA_PATH)?;
        let query = page_query(request);

        tracing::debug!("📡 GET {} {:?}", url, query);
        let response = self.get(url)?.query(&query).send().await?;
        let response = Self::check_status(response, "Media listing").await?;
        let body: serde_json::Value = response.json().await?;

        parse_media_page(body)
    }

    async fn get_media(&self, id: &str) -> Result<Option<Record>> {
        let mut url = self.endpoint(MEDIA_PATH)?;
        url.path_segments_mut()
            .map_err(|_| EtlError::ConfigError {
                message: "upstream.base_url cannot be a base URL".to_string(),
            })?
            .pop_if_empty()
            .push(id)
            .push("");

        tracing::debug!("📡 GET {}", url);
        let response = self.get(url)?.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check_status(response, "Media lookup").await?;
        let body: serde_json::Value = response.json().await?;

        match body {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::Object(data) => Ok(Some(Record::new(data))),
            other => Err(EtlError::upstream_failed(
                None,
                format!("Media lookup returned unexpected JSON: {}", json_kind(&other)),
            )),
        }
    }

    async fn list_metaproperties(&self, options: bool, count: bool) -> Result<MetapropertyMap> {
        let url = self.endpoint(METAPROPERTIES_PATH)?;
        let query = [
            ("options", flag(options).to_string()),
            ("count", flag(count).to_string()),
        ];

        tracing::debug!("📡 GET {} {:?}", url, query);
        let response = self.get(url)?.query(&query).send().await?;
        let response = Self::check_status(response, "Metaproperty listing").await?;
        let body: serde_json::Value = response.json().await?;

        parse_metaproperties(body)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| EtlError::InvalidConfigValueError {
        field: "upstream.base_url".to_string(),
        value: raw.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;
    // 確保 join 時不會吃掉最後一段路徑
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}

fn page_query(request: &PageRequest) -> Vec<(String, String)> {
    // 分頁參數放在最後，避免被同名 filter 覆蓋
    let mut query: Vec<(String, String)> = request
        .filters
        .iter()
        .map(|(key, value)| (key.clone(), value.to_string()))
        .collect();
    query.push(("page".to_string(), request.page.to_string()));
    query.push(("limit".to_string(), request.size.to_string()));
    if request.include_total {
        query.push(("total".to_string(), "1".to_string()));
    }
    query
}

/// 接受純陣列，或帶 total 時的 `{ "media": [...], "total": {...} }`
fn parse_media_page(body: serde_json::Value) -> Result<Vec<Record>> {
    let items = match body {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut obj) => {
            if let Some(total) = obj.get("total") {
                tracing::info!("📊 Upstream total: {}", total);
            }
            match obj.remove("media") {
                Some(serde_json::Value::Array(items)) => items,
                Some(serde_json::Value::Null) | None => Vec::new(),
                Some(other) => {
                    return Err(EtlError::upstream_failed(
                        None,
                        format!("Media listing returned 'media' as {}", json_kind(&other)),
                    ))
                }
            }
        }
        serde_json::Value::Null => Vec::new(),
        other => {
            return Err(EtlError::upstream_failed(
                None,
                format!("Media listing returned unexpected JSON: {}", json_kind(&other)),
            ))
        }
    };

    let total = items.len();
    let records: Vec<Record> = items.into_iter().filter_map(Record::from_value).collect();
    if records.len() < total {
        tracing::warn!("⚠️ Skipped {} non-object media items", total - records.len());
    }
    Ok(records)
}

/// 上游回傳 id -> metaproperty 的物件；舊版 API 可能是陣列
fn parse_metaproperties(body: serde_json::Value) -> Result<MetapropertyMap> {
    let mut map = MetapropertyMap::new();
    match body {
        serde_json::Value::Object(entries) => {
            for (key, value) in entries {
                let mut mp: Metaproperty = serde_json::from_value(value)?;
                if !mp.id.is_empty() && mp.id != key {
                    tracing::warn!("⚠️ Metaproperty key '{}' has body id '{}'", key, mp.id);
                }
                // 以鍵為準，確保選項能唯一連回屬性
                mp.id = key.clone();
                map.insert(key, without_blank_options(mp));
            }
        }
        serde_json::Value::Array(items) => {
            for value in items {
                let mp: Metaproperty = serde_json::from_value(value)?;
                if mp.id.is_empty() {
                    tracing::warn!("⚠️ Skipped metaproperty '{}' without id", mp.name);
                    continue;
                }
                if map.contains_key(&mp.id) {
                    tracing::warn!("⚠️ Duplicate metaproperty id '{}', keeping the last", mp.id);
                }
                map.insert(mp.id.clone(), without_blank_options(mp));
            }
        }
        serde_json::Value::Null => {}
        other => {
            return Err(EtlError::upstream_failed(
                None,
                format!("Metaproperty listing returned unexpected JSON: {}", json_kind(&other)),
            ))
        }
    }
    Ok(map)
}

/// 沒有 id 的選項無法被引用，丟掉並記錄
fn without_blank_options(mut mp: Metaproperty) -> Metaproperty {
    let before = mp.options.len();
    mp.options.retain(|option| !option.id.is_empty());
    if mp.options.len() < before {
        tracing::warn!(
            "⚠️ Dropped {} options without id from '{}'",
            before - mp.options.len(),
            mp.id
        );
    }
    mp
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FilterValue, Filters};
    use serde_json::json;

    #[test]
    fn test_page_query_puts_pagination_last() {
        let mut filters = Filters::new();
        filters.insert("type".to_string(), FilterValue::from("image"));
        filters.insert("isPublic".to_string(), FilterValue::from(true));
        let request = PageRequest {
            page: 2,
            size: 50,
            include_total: false,
            filters,
        };

        let query = page_query(&request);
        assert_eq!(
            query,
            vec![
                ("isPublic".to_string(), "true".to_string()),
                ("type".to_string(), "image".to_string()),
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_media_page_shapes() {
        let bare = parse_media_page(json!([{"id": "a"}, 5, {"id": "b"}])).unwrap();
        assert_eq!(bare.len(), 2);

        let wrapped =
            parse_media_page(json!({"total": {"count": 120}, "media": [{"id": "a"}]})).unwrap();
        assert_eq!(wrapped.len(), 1);

        assert!(parse_media_page(json!({"total": {"count": 0}})).unwrap().is_empty());
        assert!(parse_media_page(json!("oops")).is_err());
    }

    #[test]
    fn test_parse_metaproperties_uses_key_as_fallback_id() {
        let map = parse_metaproperties(json!({
            "mp-1": {"name": "Department", "type": "select", "options": []},
            "mp-2": {"id": "mp-2", "name": "Region", "isRequired": 1}
        }))
        .unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map["mp-1"].id, "mp-1");
        assert!(map["mp-2"].is_required);
    }

    #[test]
    fn test_parse_metaproperties_prefers_key_over_body_id() {
        let map = parse_metaproperties(json!({
            "k1": {"id": "x", "name": "First"},
            "k2": {"id": "x", "name": "Second"}
        }))
        .unwrap();

        assert_eq!(map["k1"].id, "k1");
        assert_eq!(map["k2"].id, "k2");
    }

    #[test]
    fn test_parse_metaproperties_tolerates_odd_option_ids() {
        let map = parse_metaproperties(json!({
            "mp-1": {"name": "Region", "options": [
                {"id": 5, "name": "emea"},
                {"label": "No id"},
                {"id": "o-2", "name": "apac"}
            ]}
        }))
        .unwrap();

        let ids: Vec<&str> = map["mp-1"].options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "o-2"]);
    }

    #[test]
    fn test_parse_metaproperties_array_skips_missing_ids() {
        let map = parse_metaproperties(json!([
            {"id": 7, "name": "Numeric"},
            {"name": "Anonymous"}
        ]))
        .unwrap();

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["7"]);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base_url("https://portal.example.com/proxy").unwrap();
        assert_eq!(
            url.join(MEDIA_PATH).unwrap().as_str(),
            "https://portal.example.com/proxy/api/v4/media/"
        );
        assert!(parse_base_url("not a url").is_err());
    }
}
