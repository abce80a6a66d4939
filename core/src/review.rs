use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{execute, ApiError, ApiResult, RequestOptions, Transport};

pub const UPDATE_WEIGHT_PATH: &str = "/api/update_weight";
pub const SUBJECTS_PATH: &str = "/api/subjects";
pub const CREATE_SUBJECT_PATH: &str = "/api/create_subject";
pub const WEIGHTS_PATH: &str = "/api/weights";
pub const STATISTICS_PATH: &str = "/api/statistics";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Familiarity {
    Familiar,
    Blur,
    Strange,
}

impl Familiarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Familiarity::Familiar => "familiar",
            Familiarity::Blur => "blur",
            Familiarity::Strange => "strange",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "familiar" => Some(Familiarity::Familiar),
            "blur" => Some(Familiarity::Blur),
            "strange" => Some(Familiarity::Strange),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct FamiliarityUpdate<'a> {
    image_key: &'a str,
    familiarity: Familiarity,
}

#[derive(Serialize)]
struct WeightUpdate<'a> {
    image_key: &'a str,
    weight: f64,
}

#[derive(Serialize)]
struct NewSubject<'a> {
    subject_name: &'a str,
}

/// `{"status": "success" | "error", "message": ...}` envelope used by the
/// mutating endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct StatusReply {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusReply {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SubjectList {
    pub subjects: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubjectStats {
    #[serde(default)]
    pub subject_stats: Value,
    #[serde(flatten)]
    pub totals: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub subjects: Vec<String>,
    pub stats: SubjectStats,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Endpoint {
    pub url: String,
    pub options: RequestOptions,
}

/// Builds requests against the review server rooted at `base` (empty for
/// same-origin).
#[derive(Clone, Debug, Default)]
pub struct ReviewEndpoints {
    base: String,
}

impl ReviewEndpoints {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn update_familiarity(
        &self,
        image_key: &str,
        familiarity: Familiarity,
    ) -> Result<Endpoint, ApiError> {
        let image_key = require_non_empty(image_key, "image key")?;
        Ok(Endpoint {
            url: self.url(UPDATE_WEIGHT_PATH),
            options: RequestOptions::post_json(&FamiliarityUpdate {
                image_key,
                familiarity,
            })?,
        })
    }

    pub fn set_weight(&self, image_key: &str, weight: f64) -> Result<Endpoint, ApiError> {
        let image_key = require_non_empty(image_key, "image key")?;
        if !weight.is_finite() {
            return Err(ApiError::InvalidInput("weight must be a finite number".to_string()));
        }
        Ok(Endpoint {
            url: self.url(UPDATE_WEIGHT_PATH),
            options: RequestOptions::post_json(&WeightUpdate { image_key, weight })?,
        })
    }

    pub fn subjects(&self) -> Endpoint {
        Endpoint {
            url: self.url(SUBJECTS_PATH),
            options: RequestOptions::get(),
        }
    }

    pub fn create_subject(&self, subject_name: &str) -> Result<Endpoint, ApiError> {
        let subject_name = require_non_empty(subject_name, "subject name")?;
        Ok(Endpoint {
            url: self.url(CREATE_SUBJECT_PATH),
            options: RequestOptions::post_json(&NewSubject { subject_name })?,
        })
    }

    pub fn subject_weights(&self, subject: &str) -> Result<Endpoint, ApiError> {
        let subject = require_non_empty(subject, "subject name")?;
        let path = path_with_segment(WEIGHTS_PATH, subject)?;
        Ok(Endpoint {
            url: self.url(&path),
            options: RequestOptions::get(),
        })
    }

    pub fn statistics(&self) -> Endpoint {
        Endpoint {
            url: self.url(STATISTICS_PATH),
            options: RequestOptions::get(),
        }
    }
}

fn require_non_empty<'a>(value: &'a str, what: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(trimmed)
}

fn path_with_segment(prefix: &str, segment: &str) -> Result<String, ApiError> {
    let mut url = url::Url::parse("http://localhost/")
        .map_err(|err| ApiError::InvalidInput(err.to_string()))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ApiError::InvalidInput("cannot build path".to_string()))?;
        path.clear();
        path.extend(prefix.split('/').filter(|part| !part.is_empty()));
        path.push(segment);
    }
    Ok(url.path().to_string())
}

/// Folds the mutating endpoints' status envelope into the result: a 2xx
/// reply saying `"status": "error"` still counts as a failure.
pub fn fold_status(result: ApiResult) -> Result<ApiResult, ApiError> {
    if let Some(error) = result.error.as_ref() {
        return Err(ApiError::Transport(error.clone()));
    }
    let reply: Option<StatusReply> = result
        .data
        .clone()
        .and_then(|data| serde_json::from_value(data).ok());
    match reply {
        Some(reply) if !reply.is_success() => Err(ApiError::Rejected(
            reply.message.unwrap_or_else(|| reply.status.clone()),
        )),
        _ if !result.success => Err(ApiError::Rejected(
            result
                .data
                .as_ref()
                .and_then(|data| data.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("request was not accepted")
                .to_string(),
        )),
        _ => Ok(result),
    }
}

/// Typed client for the review server.
pub struct ReviewClient<T> {
    transport: T,
    endpoints: ReviewEndpoints,
}

impl<T: Transport> ReviewClient<T> {
    pub fn new(transport: T, base: &str) -> Self {
        Self {
            transport,
            endpoints: ReviewEndpoints::new(base),
        }
    }

    pub fn endpoints(&self) -> &ReviewEndpoints {
        &self.endpoints
    }

    async fn call(&self, endpoint: Endpoint) -> Result<ApiResult, ApiError> {
        execute(&self.transport, &endpoint.url, &endpoint.options).await
    }

    pub async fn update_familiarity(
        &self,
        image_key: &str,
        familiarity: Familiarity,
    ) -> Result<(), ApiError> {
        let endpoint = self.endpoints.update_familiarity(image_key, familiarity)?;
        fold_status(self.call(endpoint).await?)?;
        Ok(())
    }

    pub async fn set_weight(&self, image_key: &str, weight: f64) -> Result<(), ApiError> {
        let endpoint = self.endpoints.set_weight(image_key, weight)?;
        fold_status(self.call(endpoint).await?)?;
        Ok(())
    }

    pub async fn create_subject(&self, subject_name: &str) -> Result<(), ApiError> {
        let endpoint = self.endpoints.create_subject(subject_name)?;
        fold_status(self.call(endpoint).await?)?;
        Ok(())
    }

    pub async fn subjects(&self) -> Result<Vec<String>, ApiError> {
        let result = fold_status(self.call(self.endpoints.subjects()).await?)?;
        Ok(result.decode_data::<SubjectList>()?.subjects)
    }

    pub async fn subject_weights(&self, subject: &str) -> Result<BTreeMap<String, f64>, ApiError> {
        let endpoint = self.endpoints.subject_weights(subject)?;
        let result = fold_status(self.call(endpoint).await?)?;
        result.decode_data()
    }

    pub async fn statistics(&self) -> Result<Statistics, ApiError> {
        let result = fold_status(self.call(self.endpoints.statistics()).await?)?;
        result.decode_data()
    }
}
