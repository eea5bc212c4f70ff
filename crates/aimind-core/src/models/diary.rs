use serde::{Deserialize, Serialize};

use super::document::StoredDocument;

/// Body of a `diary_ocr` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiaryOcrEntryBody {
    pub region: String,
    pub image_url: String,
    /// `YYYY-MM-DD` as extracted by OCR.
    pub date: String,
    pub title: String,
    pub original_text: String,
    pub corrected_text: String,
    pub weather: String,
    pub child_id: Option<i64>,
    pub child_name: String,
}

pub type DiaryOcrEntry = StoredDocument<DiaryOcrEntryBody>;

/// Text fields submitted alongside a diary image.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiaryEntryForm {
    pub region: String,
    pub date: String,
    pub title: String,
    pub original_text: String,
    pub corrected_text: String,
    pub weather: String,
    pub child_id: String,
    pub child_name: String,
}

impl DiaryEntryForm {
    /// Trim every field and parse `child_id` when it is all digits.
    pub fn into_body(self, image_url: String) -> DiaryOcrEntryBody {
        let child_id = self.child_id.trim();
        let child_id = if !child_id.is_empty() && child_id.bytes().all(|b| b.is_ascii_digit()) {
            child_id.parse().ok()
        } else {
            None
        };

        DiaryOcrEntryBody {
            region: self.region.trim().to_string(),
            image_url,
            date: self.date.trim().to_string(),
            title: self.title.trim().to_string(),
            original_text: self.original_text.trim().to_string(),
            corrected_text: self.corrected_text.trim().to_string(),
            weather: self.weather.trim().to_string(),
            child_id,
            child_name: self.child_name.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_trims_and_parses_child_id() {
        let form = DiaryEntryForm {
            title: "  소풍  ".into(),
            child_id: " 12 ".into(),
            weather: "맑음\n".into(),
            ..Default::default()
        };
        let body = form.into_body("https://cdn/x.jpg".into());
        assert_eq!(body.title, "소풍");
        assert_eq!(body.weather, "맑음");
        assert_eq!(body.child_id, Some(12));
        assert_eq!(body.image_url, "https://cdn/x.jpg");
    }

    #[test]
    fn test_non_numeric_child_id_dropped() {
        let form = DiaryEntryForm {
            child_id: "-3".into(),
            ..Default::default()
        };
        assert_eq!(form.into_body(String::new()).child_id, None);
    }
}
