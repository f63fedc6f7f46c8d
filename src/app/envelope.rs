use crate::utils::error::EtlError;
use serde::{Deserialize, Serialize};

/// 所有操作共用的回應格式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    /// 只在非 production 環境提供
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// HTTP 狀態碼加上回應內容，交給外層路由輸出
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub status: u16,
    pub body: ApiResponse<T>,
}

impl<T> Reply<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: 200,
            body: ApiResponse {
                success: true,
                message: message.into(),
                data: Some(data),
                error: None,
            },
        }
    }

    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: ApiResponse {
                success: true,
                message: message.into(),
                data: None,
                error: None,
            },
        }
    }

    pub fn from_error(error: &EtlError, production: bool) -> Self {
        Self {
            status: error.status_code(),
            body: ApiResponse {
                success: false,
                message: error.user_friendly_message(),
                data: None,
                error: Some(ErrorBody {
                    code: error.code().to_string(),
                    message: error.to_string(),
                    details: (!production).then(|| format!("{:?}", error)),
                }),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.body.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let reply = Reply::ok("Found 1 item", vec![1, 2]);
        assert_eq!(reply.status, 200);
        assert_eq!(
            serde_json::to_value(&reply.body).unwrap(),
            json!({"success": true, "message": "Found 1 item", "data": [1, 2]})
        );
    }

    #[test]
    fn test_error_envelope_hides_details_in_production() {
        let err = EtlError::NotFound {
            resource: "Media".to_string(),
            id: "m-1".to_string(),
        };

        let reply: Reply<()> = Reply::from_error(&err, true);
        assert_eq!(reply.status, 404);
        assert!(!reply.is_success());
        let body = serde_json::to_value(&reply.body).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["message"], "Media 'm-1' was not found");
        assert!(body["error"].get("details").is_none());

        let reply: Reply<()> = Reply::from_error(&err, false);
        assert!(reply.body.error.unwrap().details.is_some());
    }
}
