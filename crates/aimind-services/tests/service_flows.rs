use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use aimind_core::models::{DiaryEntryForm, DrawingAnalysisSaveRequest};
use aimind_core::{
    AnalysisSubject, AppError, Config, ImageConfig, ServicesConfig, StorageBackend, StorageConfig,
};
use aimind_processing::data_url;
use aimind_services::{AppServices, DiaryUpload, InMemoryDocumentStore};
use aimind_storage::InMemoryStorage;
use mockito::Matcher;
use serde_json::json;

fn config(aimodels_base_url: String, ocr_base_url: String) -> Config {
    Config {
        environment: "test".to_string(),
        log_json: false,
        storage: StorageConfig {
            backend: StorageBackend::Memory,
            bucket: "aimind-media".to_string(),
            region: "ap-northeast-2".to_string(),
            access_key_id: "test".to_string(),
            secret_access_key: "test".to_string(),
            public_base_url: Some("https://cdn.aimind.test".to_string()),
            endpoint: None,
            put_timeout: Duration::from_secs(5),
        },
        image: ImageConfig::default(),
        services: ServicesConfig {
            aimodels_base_url,
            ocr_base_url,
        },
    }
}

#[tokio::test]
async fn test_analysis_save_then_get_with_scores() {
    let mut server = mockito::Server::new_async().await;
    let score_mock = server
        .mock("POST", "/analyze/score")
        .match_body(Matcher::PartialJson(json!({"age": 10, "gender": "남"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"house": {"t_score": 48}}"#)
        .create_async()
        .await;

    let storage = InMemoryStorage::new();
    let services = AppServices::new(
        &config(server.url(), server.url()),
        Arc::new(storage.clone()),
        Arc::new(InMemoryDocumentStore::new()),
    )
    .unwrap();

    let mut boxes = BTreeMap::new();
    boxes.insert(
        "house".to_string(),
        Some(data_url::encode(b"\x89PNG-ish", Some("image/png"))),
    );
    let request: DrawingAnalysisSaveRequest = DrawingAnalysisSaveRequest {
        user_id: 42,
        child_info: serde_json::from_value(json!({"age": "10", "gender": "male"})).unwrap(),
        element_analysis: serde_json::from_value(json!({"house": {"door": 1}})).unwrap(),
        box_images_base64: boxes,
        ..Default::default()
    };

    let summary = services
        .drawing_analyses
        .save(request)
        .await
        .unwrap()
        .into_record();
    let url = &summary.analyzed_image_urls[AnalysisSubject::House.as_str()];
    assert!(url.starts_with("https://cdn.aimind.test/users/42/analyses/"));
    assert!(url.ends_with("_house.png"));

    let key = url.trim_start_matches("https://cdn.aimind.test/");
    let stored = storage.get("aimind-media", key).unwrap();
    assert_eq!(stored.content_type, "image/png");

    let doc = services
        .drawing_analyses
        .get(42, &summary.id.to_string())
        .await
        .unwrap();
    score_mock.assert_async().await;
    assert_eq!(
        doc.body.comparison["drawing_scores"],
        json!({"house": {"t_score": 48}})
    );
}

#[tokio::test]
async fn test_diary_extract_and_save() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/diary-ocr")
        .with_status(200)
        .with_body(r#"[{"title": "바다", "weather": "맑음"}]"#)
        .create_async()
        .await;

    let storage = InMemoryStorage::new();
    let services = AppServices::new(
        &config(server.url(), server.url()),
        Arc::new(storage.clone()),
        Arc::new(InMemoryDocumentStore::new()),
    )
    .unwrap();

    let upload = DiaryUpload {
        data: b"\xFF\xD8diary".to_vec(),
        filename: Some("diary.jpeg".to_string()),
        content_type: None,
    };

    let extracted = services.diaries.extract(upload.clone()).await.unwrap();
    assert_eq!(extracted["title"], json!("바다"));
    assert!(extracted["image_data_url"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));

    let form = DiaryEntryForm {
        title: extracted["title"].as_str().unwrap().to_string(),
        weather: extracted["weather"].as_str().unwrap().to_string(),
        child_id: "abc".to_string(),
        ..Default::default()
    };
    let entry = services.diaries.save(7, upload, form).await.unwrap();
    assert!(entry
        .body
        .image_url
        .starts_with("https://cdn.aimind.test/users/7/diary-ocr/"));
    assert!(entry.body.image_url.ends_with(".jpg"));
    assert_eq!(entry.body.child_id, None);
    assert_eq!(storage.len(), 1);
}

#[tokio::test]
async fn test_profile_upload_storage_failure_is_fatal() {
    let services = AppServices::new(
        &config("http://127.0.0.1:1".into(), "http://127.0.0.1:1".into()),
        Arc::new(InMemoryStorage::failing()),
        Arc::new(InMemoryDocumentStore::new()),
    )
    .unwrap();

    let err = services
        .uploader
        .upload_profile_image(1, b"\xFF\xD8".to_vec(), Some("image/jpeg"), Some("me.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));
}
