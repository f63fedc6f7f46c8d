use crate::adapters::xlsx::XLSX_MAX_ROWS;
use crate::core::fetcher::{PageErrorPolicy, MAX_PAGE_SIZE};
use crate::core::flatten::FieldRules;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_bounds, validate_non_empty_string, validate_path, validate_required_field,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub upstream: UpstreamConfig,
    pub fetch: FetchConfig,
    pub export: ExportConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamMode {
    #[default]
    Bynder,
    /// 使用內建示範資料，不連線上游
    Sample,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub mode: UpstreamMode,
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub request_timeout_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            mode: UpstreamMode::Bynder,
            base_url: None,
            token: None,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub max_page_size: u32,
    pub on_page_error: PageErrorPolicy,
    pub max_list_size: usize,
    pub max_export_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_page_size: MAX_PAGE_SIZE,
            on_page_error: PageErrorPolicy::StopWithPartial,
            max_list_size: 1000,
            max_export_size: 10_000,
        }
    }
}

/// 匯出檔案格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    /// 每個工作表一個 CSV，打包成 ZIP
    CsvZip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
    pub output_dir: String,
    pub download_base_url: String,
    pub fields: FieldRules,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Xlsx,
            output_dir: "./exports".to_string(),
            download_base_url: "http://localhost:3000/exports".to_string(),
            fields: FieldRules::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BYNDER_TOKEN})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        if self.upstream.mode == UpstreamMode::Bynder {
            let base_url = validate_required_field("upstream.base_url", &self.upstream.base_url)?;
            validate_url("upstream.base_url", base_url)?;

            let token = validate_required_field("upstream.token", &self.upstream.token)?;
            validate_non_empty_string("upstream.token", token)?;
            if ENV_VAR.is_match(token) {
                return Err(EtlError::MissingConfigError {
                    field: format!("upstream.token (unresolved {})", token),
                });
            }
        }

        validate_bounds(
            "upstream.request_timeout_seconds",
            self.upstream.request_timeout_seconds,
            Some(1),
            Some(600),
        )?;
        validate_bounds(
            "fetch.max_page_size",
            self.fetch.max_page_size,
            Some(1),
            Some(MAX_PAGE_SIZE),
        )?;
        validate_bounds("fetch.max_list_size", self.fetch.max_list_size, Some(1), None)?;
        let export_ceiling = match self.export.format {
            // 標題列佔一列
            ExportFormat::Xlsx => Some(XLSX_MAX_ROWS - 1),
            ExportFormat::CsvZip => None,
        };
        validate_bounds(
            "fetch.max_export_size",
            self.fetch.max_export_size,
            Some(1),
            export_ceiling,
        )?;
        validate_path("export.output_dir", &self.export.output_dir)?;
        validate_url("export.download_base_url", &self.export.download_base_url)?;

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
