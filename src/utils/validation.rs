use crate::utils::error::{EtlError, Result};
use std::fmt::Display;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl Display, reason: impl Into<String>) -> EtlError {
    EtlError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 只接受 http/https
pub fn validate_url(field: &str, raw: &str) -> Result<()> {
    validate_non_empty_string(field, raw)?;
    let url = Url::parse(raw).map_err(|e| invalid(field, raw, format!("Invalid URL format: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(field, raw, format!("Unsupported URL scheme: {}", scheme))),
    }
}

pub fn validate_path(field: &str, path: &str) -> Result<()> {
    validate_non_empty_string(field, path)?;
    if path.contains('\0') {
        return Err(invalid(field, path, "Path contains null bytes"));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| EtlError::MissingConfigError {
        field: field.to_string(),
    })
}

pub fn validate_non_empty_string(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty"));
    }
    Ok(())
}

/// 上下限皆可省略；`None` 代表不檢查該側
pub fn validate_bounds<T>(field: &str, value: T, min: Option<T>, max: Option<T>) -> Result<()>
where
    T: PartialOrd + Display + Copy,
{
    match (min, max) {
        (Some(min), Some(max)) if value < min || value > max => Err(invalid(
            field,
            value,
            format!("Value must be between {} and {}", min, max),
        )),
        (Some(min), None) if value < min => {
            Err(invalid(field, value, format!("Value must be at least {}", min)))
        }
        (None, Some(max)) if value > max => {
            Err(invalid(field, value, format!("Value must be at most {}", max)))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("upstream.base_url", "https://portal.getbynder.com").is_ok());
        assert!(validate_url("upstream.base_url", "http://localhost:8080").is_ok());
        assert!(validate_url("upstream.base_url", "").is_err());
        assert!(validate_url("upstream.base_url", "invalid-url").is_err());
        assert!(validate_url("upstream.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_bounds() {
        assert!(validate_bounds("fetch.max_page_size", 100, Some(1), Some(100)).is_ok());
        assert!(validate_bounds("fetch.max_page_size", 101, Some(1), Some(100)).is_err());
        assert!(validate_bounds("fetch.max_page_size", 0, Some(1), Some(100)).is_err());
        assert!(validate_bounds("fetch.max_list_size", 5usize, Some(1), None).is_ok());
        assert!(validate_bounds("fetch.max_list_size", 0usize, Some(1), None).is_err());
        assert!(validate_bounds("fetch.max_list_size", 7usize, None, Some(5)).is_err());

        let err = validate_bounds("fetch.max_list_size", 0usize, Some(1), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for fetch.max_list_size ('0'): Value must be at least 1"
        );
    }

    #[test]
    fn test_validate_required_and_non_empty() {
        let missing: Option<String> = None;
        assert!(validate_required_field("upstream.base_url", &missing).is_err());
        let present = Some("https://portal.example.com".to_string());
        assert_eq!(
            validate_required_field("upstream.base_url", &present).unwrap(),
            "https://portal.example.com"
        );
        assert!(validate_non_empty_string("upstream.token", "   ").is_err());
        assert!(validate_path("export.output_dir", "./exports").is_ok());
        assert!(validate_path("export.output_dir", "").is_err());
        assert!(validate_path("export.output_dir", "bad\0path").is_err());
    }
}
