#![warn(missing_docs)]
//! # insta-audit-client
//!
//! ## Purpose
//! Performs exactly one request/response cycle against the hosted
//! text-generation API and yields an [`AnalysisResult`] or a failure.
//!
//! ## Responsibilities
//! - Validate the generation endpoint policy (HTTPS only).
//! - Encode the prompt, system instruction and output schema into the wire
//!   request body.
//! - Execute the call through an injectable [`GenerationTransport`].
//! - Classify the outcome as success, empty response, malformed response or
//!   transport failure.
//!
//! ## Data flow
//! [`AnalysisRequest`] -> `build_audit_prompt` -> [`GenerationRequest`] ->
//! [`GenerationTransport::generate`] -> [`GenerationResponse::text`] ->
//! `parse_analysis_result` -> [`AnalysisResult`].
//!
//! ## Ownership and lifetimes
//! Request bodies are built per call and owned; the client itself is cheap to
//! clone because the transport is shared behind an [`Arc`].
//!
//! ## Error model
//! [`AuditError`] separates empty payloads, contract violations and transport
//! failures. No retry is attempted; the caller decides whether to re-invoke.
//!
//! ## Security and privacy notes
//! The API key travels in a request header, never in the URL, and is never
//! logged. Logs carry only the prompt fingerprint.

use std::sync::Arc;
use std::time::Duration;

use insta_audit_contract::{ContractError, parse_analysis_result};
use insta_audit_core::{AnalysisRequest, AnalysisResult};
use insta_audit_request::{AuditPrompt, RESPONSE_MIME_TYPE, TEMPERATURE, build_audit_prompt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Longest service error body kept in a transport error.
const ERROR_BODY_LIMIT: usize = 512;

/// Wire body of one generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Role-tagged conversation; audits send a single user turn.
    pub contents: Vec<Content>,
    /// System instruction content.
    pub system_instruction: Content,
    /// Sampling and output-format configuration.
    pub generation_config: GenerationConfig,
}

impl GenerationRequest {
    /// Encodes a built prompt into the wire body.
    pub fn from_prompt(prompt: &AuditPrompt) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.prompt_text.clone(),
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: prompt.system_instruction.clone(),
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: RESPONSE_MIME_TYPE.to_string(),
                response_schema: prompt.output_schema.clone(),
                temperature: TEMPERATURE,
            },
        }
    }
}

/// One role-tagged message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Message author role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Text parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One text part of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Part text.
    #[serde(default)]
    pub text: String,
}

/// Generation configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Output MIME type; structured JSON for audits.
    pub response_mime_type: String,
    /// Structured-output schema.
    pub response_schema: Value,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Decoded response envelope.
///
/// The envelope is read leniently; only the text payload is held to the
/// audit contract.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerationResponse {
    /// Candidate completions.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One candidate completion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Candidate {
    /// Candidate content, absent when generation was blocked.
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerationResponse {
    /// Builds a response with a single text candidate.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part { text: text.into() }],
                }),
            }],
        }
    }

    /// Returns the first candidate's concatenated text, or `None` when there
    /// is no non-blank text.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|part| part.text.as_str()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Abstract transport used by [`AuditClient`].
pub trait GenerationTransport: Send + Sync {
    /// Sends one generation request to `endpoint`.
    ///
    /// # Errors
    /// Returns [`AuditError::Transport`] when the call cannot complete.
    fn generate(
        &self,
        endpoint: &Url,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, AuditError>;
}

/// Audit client that validates endpoint policy and runs one audit per call.
#[derive(Clone)]
pub struct AuditClient {
    endpoint: Url,
    transport: Arc<dyn GenerationTransport>,
}

impl AuditClient {
    /// Creates a validated audit client.
    ///
    /// # Errors
    /// Returns [`AuditError::InvalidEndpoint`] when `endpoint` is not an HTTPS
    /// URL.
    pub fn new(
        endpoint: impl AsRef<str>,
        transport: Arc<dyn GenerationTransport>,
    ) -> Result<Self, AuditError> {
        let endpoint = validate_endpoint(endpoint.as_ref())?;
        Ok(Self {
            endpoint,
            transport,
        })
    }

    /// Runs one audit for `request`.
    ///
    /// # Errors
    /// - [`AuditError::EmptyResponse`] when the service returns no text.
    /// - [`AuditError::MalformedResponse`] when the text is not valid JSON or
    ///   violates the audit contract.
    /// - [`AuditError::Transport`] when the call itself fails.
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AuditError> {
        let prompt = build_audit_prompt(request);
        let fingerprint = prompt.fingerprint();
        let body = GenerationRequest::from_prompt(&prompt);

        info!(
            fingerprint = %fingerprint,
            platform = request.platform.code(),
            language = request.language.code(),
            "dispatching audit request"
        );

        let response = self.transport.generate(&self.endpoint, &body)?;
        let text = response.text().ok_or(AuditError::EmptyResponse)?;
        let result = parse_analysis_result(&text)?;

        debug!(
            fingerprint = %fingerprint,
            score = result.score,
            problems = result.problems.len(),
            "audit response decoded"
        );
        Ok(result)
    }
}

/// Builds the `generateContent` endpoint for `model` under `api_base`.
///
/// # Errors
/// Returns [`AuditError::InvalidEndpoint`] for an unparsable base, a non-HTTPS
/// scheme or a blank model name.
pub fn generate_content_endpoint(api_base: &str, model: &str) -> Result<Url, AuditError> {
    let model = model.trim();
    if model.is_empty() {
        return Err(AuditError::InvalidEndpoint(
            "model name is empty".to_string(),
        ));
    }

    let base = api_base.trim().trim_end_matches('/');
    validate_endpoint(&format!("{base}/models/{model}:generateContent"))
}

/// Validates generation endpoint constraints.
///
/// # Errors
/// Returns [`AuditError::InvalidEndpoint`] for unparsable or non-HTTPS URLs.
pub fn validate_endpoint(endpoint: &str) -> Result<Url, AuditError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| AuditError::InvalidEndpoint(format!("invalid endpoint url: {error}")))?;

    if parsed.scheme() != "https" {
        return Err(AuditError::InvalidEndpoint(
            "generation endpoint must use https".to_string(),
        ));
    }

    Ok(parsed)
}

/// Blocking HTTP transport for the hosted generation API.
pub struct HttpGenerationTransport {
    client: reqwest::blocking::Client,
    api_key: String,
}

impl HttpGenerationTransport {
    /// Creates an HTTP transport with a per-request `timeout`.
    ///
    /// # Errors
    /// Returns [`AuditError::Transport`] when the key is blank or the HTTP
    /// client cannot be built.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, AuditError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AuditError::Transport("api key is empty".to_string()));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| AuditError::Transport(format!("http client setup failed: {error}")))?;

        Ok(Self { client, api_key })
    }
}

impl GenerationTransport for HttpGenerationTransport {
    fn generate(
        &self,
        endpoint: &Url,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, AuditError> {
        let response = self
            .client
            .post(endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .map_err(|error| AuditError::Transport(format!("request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().unwrap_or_default();
            if body.len() > ERROR_BODY_LIMIT {
                let mut cut = ERROR_BODY_LIMIT;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(AuditError::Transport(format!(
                "service returned {status}: {body}"
            )));
        }

        response
            .json::<GenerationResponse>()
            .map_err(|error| AuditError::Transport(format!("undecodable response envelope: {error}")))
    }
}

/// Errors produced by the audit client.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Endpoint violates URL or security requirements.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Service returned no text payload.
    #[error("generation service returned no text")]
    EmptyResponse,
    /// Text payload is not valid JSON or violates the audit contract.
    #[error("malformed audit response: {0}")]
    MalformedResponse(#[from] ContractError),
    /// Network call could not complete (connectivity, auth, quota, server).
    #[error("generation transport failure: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for endpoint policy and wire encoding.

    use insta_audit_core::{Language, Platform};
    use serde_json::json;

    use super::*;

    #[test]
    fn validates_https_endpoint_policy() {
        assert!(validate_endpoint("https://api.example.test/v1/models/m:generateContent").is_ok());
        assert!(validate_endpoint("http://api.example.test/v1").is_err());
        assert!(validate_endpoint("not a url").is_err());
    }

    #[test]
    fn builds_generate_content_endpoint() {
        let url = generate_content_endpoint("https://api.example.test/v1beta/", "flash")
            .expect("endpoint should build");
        assert_eq!(
            url.as_str(),
            "https://api.example.test/v1beta/models/flash:generateContent"
        );
        assert!(generate_content_endpoint("https://api.example.test", " ").is_err());
    }

    #[test]
    fn wire_body_uses_camel_case_config() {
        let request = AnalysisRequest::new("jane", "baking", Platform::TikTok, Language::Ar)
            .expect("valid request");
        let body = GenerationRequest::from_prompt(&build_audit_prompt(&request));
        let encoded = serde_json::to_value(&body).expect("body should encode");

        assert_eq!(encoded["contents"][0]["role"], json!("user"));
        assert_eq!(
            encoded["generationConfig"]["responseMimeType"],
            json!("application/json")
        );
        assert_eq!(encoded["generationConfig"]["responseSchema"]["type"], json!("OBJECT"));
        let temperature = encoded["generationConfig"]["temperature"]
            .as_f64()
            .expect("temperature is numeric");
        assert!((temperature - 0.7).abs() < 1e-6);
        assert!(encoded["systemInstruction"].get("role").is_none());
        assert!(
            encoded["systemInstruction"]["parts"][0]["text"]
                .as_str()
                .expect("instruction text")
                .ends_with("Respond strictly in Arabic.")
        );
    }

    #[test]
    fn response_text_joins_parts_and_treats_blank_as_absent() {
        let raw = json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        });
        let response: GenerationResponse = serde_json::from_value(raw).expect("envelope decodes");
        assert_eq!(response.text().as_deref(), Some("{\"a\":1}"));

        assert_eq!(GenerationResponse::default().text(), None);
        assert_eq!(GenerationResponse::from_text("  ").text(), None);

        let blocked: GenerationResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] }))
                .expect("blocked envelope decodes");
        assert_eq!(blocked.text(), None);
    }
}
