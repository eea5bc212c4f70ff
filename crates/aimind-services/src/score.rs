//! Drawing score (T-score) client for the AI models service.

use std::time::Duration;

use aimind_core::models::JsonObject;
use aimind_core::AnalysisSubject;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};

const SCORE_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_AGE: u64 = 8;
const MIN_AGE: u64 = 7;
const MAX_AGE: u64 = 13;

#[async_trait]
pub trait ScoreClient: Send + Sync {
    /// Score an analysis. `None` when inputs are insufficient or the call fails.
    async fn analyze_score(
        &self,
        element_analysis: &JsonObject,
        child_info: &JsonObject,
    ) -> Option<Value>;
}

/// Body posted to `/analyze/score`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRequest {
    pub results: Map<String, Value>,
    pub age: u64,
    pub gender: &'static str,
}

/// Build the score request, or `None` if nothing should be sent.
pub fn build_score_request(
    element_analysis: &JsonObject,
    child_info: &JsonObject,
) -> Option<ScoreRequest> {
    let results: Map<String, Value> = element_analysis
        .iter()
        .filter(|(key, _)| key.parse::<AnalysisSubject>().is_ok())
        .filter(|(_, value)| value.as_object().is_some_and(|obj| !obj.is_empty()))
        .map(|(key, value)| (key.clone(), json!({ "image_json": value })))
        .collect();
    if results.is_empty() {
        return None;
    }

    let gender = normalize_gender(first_present(child_info, &["gender", "성별"]))?;
    let age = normalize_age(first_present(child_info, &["age", "나이"]));

    Some(ScoreRequest {
        results,
        age,
        gender,
    })
}

/// First value under `keys` that is neither null, false, zero nor empty.
fn first_present<'a>(info: &'a JsonObject, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|key| info.get(*key)).find(|value| match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Bool(true) => true,
    })
}

fn normalize_age(value: Option<&Value>) -> u64 {
    let age = match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().unwrap_or(u64::MAX)
        }
        _ => 0,
    };
    if age == 0 {
        DEFAULT_AGE
    } else {
        age.clamp(MIN_AGE, MAX_AGE)
    }
}

fn normalize_gender(value: Option<&Value>) -> Option<&'static str> {
    let raw = value?.as_str()?.trim().to_lowercase();
    match raw.as_str() {
        "male" | "m" | "남" | "남아" => Some("남"),
        "female" | "f" | "여" | "여아" => Some("여"),
        _ => None,
    }
}

/// Posts to `{base_url}/analyze/score`.
pub struct HttpScoreClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpScoreClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(SCORE_TIMEOUT)
            .build()
            .context("Failed to create HTTP client for score service")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn request(&self, body: &ScoreRequest) -> Result<Value> {
        let url = format!("{}/analyze/score", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .context("Failed to send request to score service")?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(anyhow::anyhow!("Score service returned {}", status));
        }

        response
            .json()
            .await
            .context("Failed to parse score service response")
    }
}

#[async_trait]
impl ScoreClient for HttpScoreClient {
    async fn analyze_score(
        &self,
        element_analysis: &JsonObject,
        child_info: &JsonObject,
    ) -> Option<Value> {
        let body = build_score_request(element_analysis, child_info)?;
        match self.request(&body).await {
            Ok(scores) => Some(scores),
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), base_url = %self.base_url, "Score request failed");
                None
            }
        }
    }
}
