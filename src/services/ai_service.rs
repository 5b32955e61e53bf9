use crate::error::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Returned by the explain endpoint when Gemini answers without any text.
pub const MISSING_EXPLANATION: &str = "This condition is characterized by key clinical features visible in the video. The diagnosis is confirmed by the presence of specific signs that differentiate it from similar conditions.";

/// Canned explanation used whenever the explanation gateway fails.
pub const FALLBACK_EXPLANATION: &str =
    "The diagnosis is based on characteristic clinical features visible in the video presentation.";

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty())
    }
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct AIService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl AIService {
    pub fn new(api_key: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn generate_mcq(&self, disease: &str) -> Result<String> {
        let prompt = format!(
            r#"Generate a multiple choice question about {disease}.
Include 4 options (A, B, C, D). Mark the correct answer with an asterisk (*).
Example:
What is a key symptom of Parkinson's Disease?
A) Fever
B) Tremor*
C) Rash
D) Headache"#
        );

        tracing::info!(%disease, "Requesting MCQ from Gemini");
        self.generate_content(&prompt)
            .await?
            .ok_or_else(|| Error::Upstream("Gemini response contained no question text".to_string()))
    }

    pub async fn explain(&self, disease: &str, mcq: &str) -> Result<String> {
        let prompt = format!(
            r#"You are a clinical professor explaining a diagnosis to medical students.

DISEASE: {disease}
QUIZ QUESTION: {mcq}

Provide a concise clinical explanation (3-4 sentences) that:
1. Explains WHY this is the correct diagnosis
2. Mentions key clinical features seen in the video
3. Differentiates from similar conditions
4. Uses plain language (no jargon without explanation)

Format as single paragraph. NO headings or bullet points."#
        );

        tracing::info!(%disease, "Requesting explanation from Gemini");
        match self.generate_content(&prompt).await? {
            Some(text) => Ok(text),
            None => {
                tracing::warn!(%disease, "Gemini explanation was empty, using canned text");
                Ok(MISSING_EXPLANATION.to_string())
            }
        }
    }

    /// Errors from reqwest are stripped of their URL, which carries the API key.
    async fn generate_content(&self, prompt: &str) -> Result<Option<String>> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateContentRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::Reqwest(e.without_url()))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            return Err(Error::Upstream(format!("Gemini: {} {}", status.as_u16(), message)));
        }

        let parsed: GenerateContentResponse = res
            .json()
            .await
            .map_err(|e| Error::Reqwest(e.without_url()))?;
        Ok(parsed.first_text())
    }
}
