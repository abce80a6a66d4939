use futures_util::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const JSON_MIME: &str = "application/json";
pub const DEFAULT_METHOD: &str = "GET";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("response is not valid JSON: {0}")]
    Decode(String),
    #[error("server rejected request: {0}")]
    Rejected(String),
    #[error("invalid request: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post_json<T: Serialize + ?Sized>(body: &T) -> Result<Self, ApiError> {
        let body =
            serde_json::to_string(body).map_err(|err| ApiError::InvalidInput(err.to_string()))?;
        Ok(Self {
            method: Some("POST".to_string()),
            headers: Vec::new(),
            body: Some(body),
        })
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub url: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl PreparedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// JSON content type first, then caller headers; a caller header replaces
/// any earlier header with the same case-insensitive name.
pub fn merge_headers(caller: &[(String, String)]) -> Vec<(String, String)> {
    let mut merged = vec![(CONTENT_TYPE.to_string(), JSON_MIME.to_string())];
    for (name, value) in caller {
        merged.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        merged.push((name.clone(), value.clone()));
    }
    merged
}

pub fn prepare(url: &str, options: &RequestOptions) -> PreparedRequest {
    let method = options
        .method
        .as_deref()
        .map(str::trim)
        .filter(|method| !method.is_empty())
        .map(str::to_ascii_uppercase)
        .unwrap_or_else(|| DEFAULT_METHOD.to_string());
    PreparedRequest {
        url: url.to_string(),
        method,
        headers: merge_headers(&options.headers),
        body: options.body.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport {
    fn send(&self, request: PreparedRequest) -> LocalBoxFuture<'_, Result<RawResponse, ApiError>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResult {
    pub fn completed(success: bool, data: Value) -> Self {
        Self {
            success,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        let error = if error.trim().is_empty() {
            "unknown error".to_string()
        } else {
            error
        };
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }

    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let data = self.data.clone().unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

pub fn interpret_response(raw: &RawResponse) -> Result<ApiResult, ApiError> {
    let data: Value =
        serde_json::from_str(&raw.body).map_err(|err| ApiError::Decode(err.to_string()))?;
    Ok(ApiResult::completed(raw.is_success(), data))
}

pub async fn execute<T: Transport + ?Sized>(
    transport: &T,
    url: &str,
    options: &RequestOptions,
) -> Result<ApiResult, ApiError> {
    let raw = transport.send(prepare(url, options)).await?;
    interpret_response(&raw)
}

/// Never fails: every error is handed to `on_failure` and folded into a
/// `success: false` result.
pub async fn api_request<T, F>(
    transport: &T,
    url: &str,
    options: &RequestOptions,
    on_failure: F,
) -> ApiResult
where
    T: Transport + ?Sized,
    F: FnOnce(&ApiError),
{
    match execute(transport, url, options).await {
        Ok(result) => result,
        Err(err) => {
            on_failure(&err);
            ApiResult::failure(err.to_string())
        }
    }
}
