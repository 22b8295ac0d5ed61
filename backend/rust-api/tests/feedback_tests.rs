use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use morningsprint_api::services::feedback_service::CoachBackend;

mod common;

const BOUNDARY: &str = "sprint-test-boundary";

fn multipart_body(fields: &[(&str, &str)], audio: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = audio {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"audio.webm\"\r\nContent-Type: audio/webm\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn post_feedback(app: &axum::Router, body: Vec<u8>) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/ai/feedback")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn missing_prompt_is_a_client_error() {
    let app = common::create_test_app().router;

    let body = multipart_body(&[("language", "en")], Some(b"fake-audio"));
    let (status, _) = post_feedback(&app, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unconfigured_coach_returns_deterministic_fallback() {
    let app = common::create_test_app().router;

    let prompt = "Talk about a memorable trip you took.";
    // No audio needed: the fallback fires before the audio check.
    let body = multipart_body(&[("prompt", prompt)], None);
    let (status, feedback) = post_feedback(&app, body).await;

    assert_eq!(status, StatusCode::OK);
    for skill in ["fluency", "pronunciation", "grammar", "vocabulary"] {
        assert_eq!(feedback["rubric"][skill], 0);
    }
    assert_eq!(feedback["overall_score"], 0);
    assert_eq!(feedback["next_prompt"], prompt);
    assert_eq!(feedback["corrections"].as_array().unwrap().len(), 1);
    assert!(!feedback["encouragement"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn configured_coach_requires_audio() {
    let app = common::create_test_app_with_coach(Some(Arc::new(ScriptedCoach {
        review: "{}".to_string(),
    })))
    .router;

    let body = multipart_body(&[("prompt", "Prompt?")], None);
    let (status, _) = post_feedback(&app, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_coach_response_yields_neutral_feedback() {
    let app = common::create_test_app_with_coach(Some(Arc::new(ScriptedCoach {
        review: "I am sorry, I cannot produce JSON today.".to_string(),
    })))
    .router;

    let body = multipart_body(&[("prompt", "Prompt?"), ("language", "EN-US")], Some(b"audio"));
    let (status, feedback) = post_feedback(&app, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(feedback["overall_score"], 60);
    assert_eq!(feedback["corrections"].as_array().unwrap().len(), 0);
    assert_eq!(feedback["rubric"]["fluency"], 3);
    // Transcript from the (scripted) transcription survives.
    assert_eq!(feedback["transcript"], "scripted transcript");
}

#[tokio::test]
async fn valid_coach_response_passes_through() {
    let review = r#"{
        "transcript": "ignored",
        "rubric": {"fluency": 4, "pronunciation": 3, "grammar": 5, "vocabulary": 4},
        "overall_score": 82,
        "corrections": [{"issue": "tense", "suggestion": "past tense", "example": "I woke up"}],
        "next_prompt": "Describe your evening routine.",
        "encouragement": "Well done!"
    }"#;
    let app = common::create_test_app_with_coach(Some(Arc::new(ScriptedCoach {
        review: review.to_string(),
    })))
    .router;

    let body = multipart_body(&[("prompt", "Prompt?")], Some(b"audio"));
    let (status, feedback) = post_feedback(&app, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(feedback["overall_score"], 82);
    assert_eq!(feedback["rubric"]["grammar"], 5);
    assert_eq!(feedback["transcript"], "scripted transcript");
    assert_eq!(feedback["next_prompt"], "Describe your evening routine.");
}

struct ScriptedCoach {
    review: String,
}

#[async_trait]
impl CoachBackend for ScriptedCoach {
    async fn transcribe(&self, _audio: &[u8], _language: &str) -> Result<String> {
        Ok("scripted transcript".to_string())
    }

    async fn review(&self, _prompt: &str, _transcript: &str) -> Result<String> {
        Ok(self.review.clone())
    }
}
