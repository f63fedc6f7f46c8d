use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    #[error("Upstream request failed: {message}")]
    UpstreamRequestFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn upstream_failed(status: Option<u16>, message: impl Into<String>) -> Self {
        EtlError::UpstreamRequestFailed {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        EtlError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// 機器可讀的錯誤代碼，放進回應 envelope
    pub fn code(&self) -> &'static str {
        match self {
            EtlError::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            EtlError::UpstreamRequestFailed { .. } | EtlError::ApiError(_) => {
                "UPSTREAM_REQUEST_FAILED"
            }
            EtlError::NotFound { .. } => "NOT_FOUND",
            EtlError::InvalidParameter { .. } => "INVALID_PARAMETER",
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    /// 對應的 HTTP 狀態碼
    pub fn status_code(&self) -> u16 {
        match self {
            EtlError::UpstreamUnavailable { .. } => 503,
            EtlError::UpstreamRequestFailed { .. } | EtlError::ApiError(_) => 502,
            EtlError::NotFound { .. } => 404,
            EtlError::InvalidParameter { .. } => 400,
            _ => 500,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::NotFound { .. } => ErrorSeverity::Low,
            EtlError::UpstreamRequestFailed { .. } | EtlError::ApiError(_) => {
                ErrorSeverity::Medium
            }
            EtlError::InvalidParameter { .. }
            | EtlError::CsvError(_)
            | EtlError::XlsxError(_)
            | EtlError::ZipError(_)
            | EtlError::SerializationError(_) => ErrorSeverity::High,
            EtlError::UpstreamUnavailable { .. }
            | EtlError::IoError(_)
            | EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    /// 給使用者看的訊息，不含內部細節
    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::UpstreamUnavailable { .. } => {
                "The asset-management service is not configured or not reachable".to_string()
            }
            EtlError::UpstreamRequestFailed { .. } | EtlError::ApiError(_) => {
                "The asset-management service returned an error".to_string()
            }
            EtlError::NotFound { resource, id } => format!("{} '{}' was not found", resource, id),
            EtlError::InvalidParameter { name, reason } => {
                format!("Invalid parameter '{}': {}", name, reason)
            }
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => self.to_string(),
            _ => "Internal error while processing the request".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::UpstreamUnavailable { .. } => {
                "Check upstream.base_url and upstream.token in the configuration"
            }
            EtlError::UpstreamRequestFailed { .. } | EtlError::ApiError(_) => {
                "Retry later or check the upstream service status"
            }
            EtlError::NotFound { .. } => "Verify the id and try again",
            EtlError::InvalidParameter { .. } => "Fix the request parameters",
            EtlError::IoError(_) => "Check that export.output_dir exists and is writable",
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => "Fix the configuration file",
            _ => "Run with --verbose for details",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
