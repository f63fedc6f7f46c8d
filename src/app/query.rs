use crate::domain::model::{FilterValue, Filters};
use crate::utils::error::{EtlError, Result};

/// 解析數量參數：缺少或無法解析時用預設值，負數視為 0，超過上限則截斷
pub fn parse_count(raw: Option<&str>, default: usize, max: usize) -> usize {
    let value = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => return default.min(max),
        Some(value) => value,
    };

    match value.parse::<i64>() {
        Ok(n) if n <= 0 => 0,
        Ok(n) => (n as u64).min(max as u64) as usize,
        Err(_) => {
            tracing::debug!("🔧 Ignoring non-numeric count '{}'", value);
            default.min(max)
        }
    }
}

/// 頁碼至少為 1
pub fn parse_page(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .map(|n| n.clamp(1, u32::MAX as i64) as u32)
}

/// 只接受 "true" 或 "1"
pub fn parse_bool(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true") | Some("1")
    )
}

/// 查詢參數轉成 filter；"true"/"false" 轉成布林
pub fn parse_filters<'a, I>(pairs: I) -> Filters
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| {
            let value = match value.trim() {
                "true" => FilterValue::Flag(true),
                "false" => FilterValue::Flag(false),
                other => FilterValue::Text(other.to_string()),
            };
            (key.trim().to_string(), value)
        })
        .collect()
}

/// CLI 的 `key=value` 形式
pub fn parse_filter_args(args: &[String]) -> Result<Filters> {
    let pairs = args
        .iter()
        .map(|arg| {
            arg.split_once('=').ok_or_else(|| {
                EtlError::invalid_parameter("filter", format!("'{}' is not KEY=VALUE", arg))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parse_filters(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(None, 100, 1000), 100);
        assert_eq!(parse_count(Some("250"), 100, 1000), 250);
        assert_eq!(parse_count(Some("5000"), 100, 1000), 1000);
        assert_eq!(parse_count(Some("-3"), 100, 1000), 0);
        assert_eq!(parse_count(Some("0"), 100, 1000), 0);
        assert_eq!(parse_count(Some("abc"), 100, 1000), 100);
        assert_eq!(parse_count(Some(""), 2000, 1000), 1000);
    }

    #[test]
    fn test_parse_page_and_bool() {
        assert_eq!(parse_page(None), None);
        assert_eq!(parse_page(Some("0")), Some(1));
        assert_eq!(parse_page(Some("4")), Some(4));
        assert!(parse_bool(Some("true")));
        assert!(parse_bool(Some("1")));
        assert!(parse_bool(Some("TRUE")));
        assert!(!parse_bool(Some("yes")));
        assert!(!parse_bool(None));
    }

    #[test]
    fn test_parse_filter_args() {
        let filters = parse_filter_args(&[
            "type=image".to_string(),
            "isPublic=true".to_string(),
            "keyword=a=b".to_string(),
        ])
        .unwrap();

        assert_eq!(filters["type"], FilterValue::from("image"));
        assert_eq!(filters["isPublic"], FilterValue::Flag(true));
        assert_eq!(filters["keyword"], FilterValue::from("a=b"));

        assert!(parse_filter_args(&["broken".to_string()]).is_err());
    }
}
