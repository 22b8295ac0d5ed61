use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use validator::Validate;

use crate::config::Config;
use crate::metrics;
use crate::models::feedback::{Correction, FeedbackResponse, Rubric};
use crate::services::events::{CoreEvent, EventReporter, FallbackReason};

const TRANSCRIPTION_MODEL: &str = "whisper-1";
const REVIEW_MODEL: &str = "gpt-4o-mini";

lazy_static! {
    // Coaches are told to answer with JSON only, but models still wrap the
    // payload in prose often enough that we extract the first object block.
    static ref JSON_BLOCK: Regex = Regex::new(r"\{[\s\S]*\}").unwrap();
}

/// External speech-coach boundary: transcription plus a free-text review
/// that should contain the structured feedback JSON.
#[async_trait]
pub trait CoachBackend: Send + Sync {
    async fn transcribe(&self, audio: &[u8], language: &str) -> Result<String>;
    async fn review(&self, prompt: &str, transcript: &str) -> Result<String>;
}

/// OpenAI-compatible backend (Whisper + chat completions).
pub struct OpenAiCoach {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiCoach {
    pub fn new(api_key: String, base_url: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client for speech coach")?;
        Ok(Self {
            http,
            api_key,
            base_url,
        })
    }

    fn review_instructions(prompt: &str, transcript: &str) -> String {
        format!(
            "You are a language learning coach. Analyze the following spoken response to a drill prompt.\n\n\
             Drill Prompt: \"{prompt}\"\n\
             Student's Response (transcribed): \"{transcript}\"\n\n\
             Provide feedback in the following JSON format only, no other text:\n\
             {{\n\
               \"transcript\": \"{transcript}\",\n\
               \"rubric\": {{\n\
                 \"fluency\": <0-5>,\n\
                 \"pronunciation\": <0-5>,\n\
                 \"grammar\": <0-5>,\n\
                 \"vocabulary\": <0-5>\n\
               }},\n\
               \"overall_score\": <0-100>,\n\
               \"corrections\": [\n\
                 {{\n\
                   \"issue\": \"<specific issue>\",\n\
                   \"suggestion\": \"<how to improve>\",\n\
                   \"example\": \"<correct example>\"\n\
                 }}\n\
               ],\n\
               \"next_prompt\": \"<suggested follow-up practice prompt>\",\n\
               \"encouragement\": \"<positive, motivating message>\"\n\
             }}\n\n\
             Be constructive and encouraging while providing specific actionable feedback."
        )
    }
}

#[async_trait]
impl CoachBackend for OpenAiCoach {
    async fn transcribe(&self, audio: &[u8], language: &str) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("audio.webm")
            .mime_str("audio/webm")
            .context("Failed to build audio part")?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", TRANSCRIPTION_MODEL)
            .text("language", language.to_string());

        let response = self
            .http
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("Failed to call transcription API")?;

        if !response.status().is_success() {
            anyhow::bail!("Transcription API returned status: {}", response.status());
        }

        let body: serde_json::Value = response.json().await?;
        let text = body["text"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Transcription response missing text"))?
            .to_string();
        Ok(text)
    }

    async fn review(&self, prompt: &str, transcript: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": REVIEW_MODEL,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a helpful language learning coach. Always respond with valid JSON only.",
                },
                {
                    "role": "user",
                    "content": Self::review_instructions(prompt, transcript),
                },
            ],
            "temperature": 0.7,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to call review API")?;

        if !response.status().is_success() {
            anyhow::bail!("Review API returned status: {}", response.status());
        }

        let body: serde_json::Value = response.json().await?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Review response missing content"))?
            .to_string();
        Ok(content)
    }
}

/// Wraps the coach backend and enforces the feedback contract: callers
/// always receive a well-formed [`FeedbackResponse`], never an error.
pub struct FeedbackService {
    backend: Option<Arc<dyn CoachBackend>>,
    reporter: Arc<dyn EventReporter>,
}

impl FeedbackService {
    pub fn new(backend: Option<Arc<dyn CoachBackend>>, reporter: Arc<dyn EventReporter>) -> Self {
        Self { backend, reporter }
    }

    pub fn from_config(config: &Config, reporter: Arc<dyn EventReporter>) -> Result<Self> {
        let backend = match &config.openai_api_key {
            Some(key) => Some(Arc::new(OpenAiCoach::new(
                key.clone(),
                config.openai_base_url.clone(),
            )?) as Arc<dyn CoachBackend>),
            None => None,
        };
        Ok(Self::new(backend, reporter))
    }

    /// Pure configuration check, no network involved.
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn get_feedback(
        &self,
        audio: &[u8],
        prompt: &str,
        language: &str,
    ) -> FeedbackResponse {
        let Some(backend) = &self.backend else {
            self.fallback(FallbackReason::Unconfigured);
            return Self::fallback_feedback(prompt);
        };

        let transcript = match backend.transcribe(audio, language).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Transcription failed: {:#}", e);
                self.fallback(FallbackReason::Transport);
                return Self::fallback_feedback(prompt);
            }
        };

        let raw = match backend.review(prompt, &transcript).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Feedback review failed: {:#}", e);
                self.fallback(FallbackReason::Transport);
                // Transcript fidelity wins over feedback fidelity.
                let mut feedback = Self::fallback_feedback(prompt);
                feedback.transcript = transcript;
                return feedback;
            }
        };

        match Self::parse_review(&raw) {
            Some(mut feedback) => {
                feedback.transcript = transcript;
                metrics::FEEDBACK_REQUESTS_TOTAL
                    .with_label_values(&["ai"])
                    .inc();
                feedback
            }
            None => {
                tracing::warn!("Review response violated the feedback contract");
                self.fallback(FallbackReason::Malformed);
                Self::neutral_feedback(transcript, prompt)
            }
        }
    }

    /// Zero-score fallback: no analysis was produced at all.
    pub fn fallback_feedback(prompt: &str) -> FeedbackResponse {
        FeedbackResponse {
            transcript: "[AI transcription unavailable - please review your own recording]"
                .to_string(),
            rubric: Rubric::uniform(0),
            overall_score: 0,
            corrections: vec![Correction {
                issue: "AI analysis unavailable".to_string(),
                suggestion: "Self-evaluate your response for clarity and accuracy".to_string(),
                example: "Listen to your recording and note areas for improvement".to_string(),
            }],
            next_prompt: prompt.to_string(),
            encouragement: "Great job practicing! AI feedback is currently unavailable, but keep \
                            up the good work. Self-reflection is also valuable for learning."
                .to_string(),
        }
    }

    /// Mid-score fallback: the coach answered but the payload was unusable.
    pub fn neutral_feedback(transcript: String, prompt: &str) -> FeedbackResponse {
        FeedbackResponse {
            transcript,
            rubric: Rubric::uniform(3),
            overall_score: 60,
            corrections: vec![],
            next_prompt: prompt.to_string(),
            encouragement: "Good effort! Keep practicing to improve.".to_string(),
        }
    }

    fn parse_review(raw: &str) -> Option<FeedbackResponse> {
        let block = JSON_BLOCK.find(raw)?.as_str();
        let feedback: FeedbackResponse = serde_json::from_str(block).ok()?;
        feedback.validate().ok()?;
        Some(feedback)
    }

    fn fallback(&self, reason: FallbackReason) {
        metrics::FEEDBACK_REQUESTS_TOTAL
            .with_label_values(&[reason.as_str()])
            .inc();
        self.reporter.report(CoreEvent::FeedbackFallback { reason });
    }
}
