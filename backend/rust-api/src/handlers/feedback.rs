use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::services::{feedback_service::FeedbackService, AppState};

/// POST /api/v1/ai/feedback - Transcribe a drill recording and return
/// structured feedback.
///
/// Multipart fields: `audio` (binary), `prompt` (required), `language`
/// (optional, defaults to "en"). Internal failures are absorbed into a
/// 200 fallback body; the drill experience never shows a hard error.
pub async fn transcribe_and_feedback(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut audio: Option<Vec<u8>> = None;
    let mut prompt: Option<String> = None;
    let mut language: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    format!("Invalid multipart body: {}", e),
                ))
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let bytes = field.bytes().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read audio field: {}", e),
                    )
                })?;
                audio = Some(bytes.to_vec());
            }
            "prompt" => {
                let text = field.text().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read prompt field: {}", e),
                    )
                })?;
                prompt = Some(text);
            }
            "language" => {
                let text = field.text().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read language field: {}", e),
                    )
                })?;
                language = Some(text);
            }
            _ => {}
        }
    }

    let Some(prompt) = prompt.filter(|p| !p.is_empty()) else {
        return Err((StatusCode::BAD_REQUEST, "Missing prompt".to_string()));
    };

    // Without a coach credential the fallback is immediate; the audio field
    // is not even required.
    if !state.coach.is_configured() {
        tracing::info!("Speech coach not configured, returning fallback feedback");
        return Ok(Json(FeedbackService::fallback_feedback(&prompt)));
    }

    let Some(audio) = audio else {
        return Err((StatusCode::BAD_REQUEST, "Missing audio file".to_string()));
    };

    let language = normalize_language(language.as_deref());

    tracing::info!(
        "Processing feedback request: {} bytes of audio, language={}",
        audio.len(),
        language
    );

    let feedback = state.coach.get_feedback(&audio, &prompt, &language).await;
    Ok(Json(feedback))
}

/// Only the first two characters of the language code are significant.
fn normalize_language(language: Option<&str>) -> String {
    let code: String = language
        .unwrap_or("en")
        .trim()
        .to_lowercase()
        .chars()
        .take(2)
        .collect();
    if code.is_empty() {
        "en".to_string()
    } else {
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_defaults_to_en() {
        assert_eq!(normalize_language(None), "en");
        assert_eq!(normalize_language(Some("")), "en");
        assert_eq!(normalize_language(Some("   ")), "en");
    }

    #[test]
    fn language_keeps_first_two_lowercased_chars() {
        assert_eq!(normalize_language(Some("EN-US")), "en");
        assert_eq!(normalize_language(Some("es")), "es");
        assert_eq!(normalize_language(Some("pt-BR")), "pt");
        assert_eq!(normalize_language(Some("F")), "f");
    }
}
