use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::document::StoredDocument;

pub type JsonObject = Map<String, Value>;

/// Body of a `drawing_analyses` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DrawingAnalysisBody {
    /// `{ name, age, gender }`
    pub child_info: JsonObject,
    /// Subject name to element JSON.
    pub element_analysis: JsonObject,
    pub analyzed_image_urls: BTreeMap<String, String>,
    pub psychological_interpretation: JsonObject,
    pub comparison: JsonObject,
    pub recommendations: Vec<Value>,
    pub overall_psychology_result: JsonObject,
}

pub type DrawingAnalysis = StoredDocument<DrawingAnalysisBody>;

/// Save request for one drawing analysis.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DrawingAnalysisSaveRequest {
    pub user_id: i64,
    pub child_info: JsonObject,
    pub element_analysis: JsonObject,
    /// Subject name to data URL; missing or blank entries are skipped.
    pub box_images_base64: BTreeMap<String, Option<String>>,
    pub psychological_interpretation: JsonObject,
    pub comparison: JsonObject,
    pub recommendations: Vec<Value>,
    pub overall_psychology_result: JsonObject,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DrawingAnalysisSummary {
    pub id: Uuid,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub analyzed_image_urls: BTreeMap<String, String>,
}

impl From<&DrawingAnalysis> for DrawingAnalysisSummary {
    fn from(doc: &DrawingAnalysis) -> Self {
        Self {
            id: doc.id,
            user_id: doc.user_id,
            created_at: doc.created_at,
            analyzed_image_urls: doc.body.analyzed_image_urls.clone(),
        }
    }
}

/// Body of a legacy `analysis_logs` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisLogBody {
    pub image_to_json: JsonObject,
    pub json_to_llm_json: JsonObject,
    pub llm_result_text: Option<JsonObject>,
    pub ocr_json: JsonObject,
}

pub type AnalysisLog = StoredDocument<AnalysisLogBody>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisSaveRequest {
    pub user_id: i64,
    pub image_to_json: JsonObject,
    pub json_to_llm_json: JsonObject,
    pub llm_result_text: Option<JsonObject>,
    pub ocr_json: JsonObject,
}

impl AnalysisSaveRequest {
    pub fn into_body(self) -> (i64, AnalysisLogBody) {
        (
            self.user_id,
            AnalysisLogBody {
                image_to_json: self.image_to_json,
                json_to_llm_json: self.json_to_llm_json,
                llm_result_text: self.llm_result_text,
                ocr_json: self.ocr_json,
            },
        )
    }
}
