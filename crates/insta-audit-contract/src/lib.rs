#![warn(missing_docs)]
//! # insta-audit-contract
//!
//! ## Purpose
//! Defines the structured-output contract of the audit response and the strict
//! decoder that turns the service's text payload into an [`AnalysisResult`].
//!
//! ## Responsibilities
//! - Describe the response shape in the generation service's schema dialect
//!   ([`response_schema`]), sent alongside every prompt.
//! - Decode raw JSON text into an owned [`AnalysisResult`] without
//!   substituting defaults for absent fields.
//! - Reject values that parse but violate contract ranges (score, severity).
//!
//! ## Data flow
//! Service text payload -> [`parse_analysis_result`] -> [`AnalysisResult`] ->
//! presentation flow.
//!
//! ## Ownership and lifetimes
//! Decoded values are owned so they outlive the transient response buffer.
//!
//! ## Error model
//! Invalid JSON or missing/mistyped fields return
//! [`ContractError::Decode`]; range violations return
//! [`ContractError::InvalidContract`]. Neither yields a partial result.

use insta_audit_core::{
    ActionItem, AnalysisResult, Issue, MAX_SCORE, MIN_SCORE, ProfileAudit, Severity,
};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Top-level fields every response must carry.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "score",
    "summary",
    "profile_audit",
    "problems",
    "solutions",
    "hashtags",
];

/// Fields every `profile_audit` object must carry.
pub const PROFILE_AUDIT_FIELDS: [&str; 3] = ["bio_check", "visual_coherence", "content_strategy"];

/// Returns the structured-output descriptor for the audit response.
///
/// The descriptor mirrors [`AnalysisResult`] field for field and uses the
/// upper-case type names the generation API expects.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": {
                "type": "NUMBER",
                "description": "A score from 0 to 100 representing profile quality."
            },
            "summary": {
                "type": "STRING",
                "description": "A short, punchy summary of why the account isn't growing."
            },
            "profile_audit": {
                "type": "OBJECT",
                "properties": {
                    "bio_check": { "type": "STRING", "description": "Critique of the bio." },
                    "visual_coherence": {
                        "type": "STRING",
                        "description": "Critique of the visual feed style or video consistency."
                    },
                    "content_strategy": {
                        "type": "STRING",
                        "description": "Critique of the implied content strategy."
                    }
                },
                "required": PROFILE_AUDIT_FIELDS
            },
            "problems": {
                "type": "ARRAY",
                "description": "List of specific problems stopping growth.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "severity": { "type": "STRING", "enum": ["high", "medium", "low"] }
                    },
                    "required": ["title", "description", "severity"]
                }
            },
            "solutions": {
                "type": "ARRAY",
                "description": "Actionable steps to fix the problems.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "step": { "type": "STRING", "description": "The action to take." },
                        "details": { "type": "STRING", "description": "How to do it." }
                    },
                    "required": ["step", "details"]
                }
            },
            "hashtags": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "5-10 recommended hashtags based on the niche."
            }
        },
        "required": REQUIRED_FIELDS
    })
}

// Wire shapes. No field carries `#[serde(default)]`: absence is an error.

#[derive(Deserialize)]
struct WireResult {
    score: f64,
    summary: String,
    profile_audit: WireProfileAudit,
    problems: Vec<WireIssue>,
    solutions: Vec<WireActionItem>,
    hashtags: Vec<String>,
}

#[derive(Deserialize)]
struct WireProfileAudit {
    bio_check: String,
    visual_coherence: String,
    content_strategy: String,
}

#[derive(Deserialize)]
struct WireIssue {
    title: String,
    description: String,
    severity: Severity,
}

#[derive(Deserialize)]
struct WireActionItem {
    step: String,
    details: String,
}

/// Parses a service text payload into a validated [`AnalysisResult`].
///
/// Fractional scores are rounded to the nearest integer. Unknown extra fields
/// are ignored. The hashtag count is not checked.
///
/// # Errors
/// Returns [`ContractError::Decode`] for invalid JSON or a missing/mistyped
/// field. Returns [`ContractError::InvalidContract`] when the score is not a
/// finite number in `[0, 100]`.
pub fn parse_analysis_result(raw: &str) -> Result<AnalysisResult, ContractError> {
    let wire: WireResult = serde_json::from_str(raw).map_err(ContractError::Decode)?;
    let score = validate_score(wire.score)?;

    Ok(AnalysisResult {
        score,
        summary: wire.summary,
        profile_audit: ProfileAudit {
            bio_check: wire.profile_audit.bio_check,
            visual_coherence: wire.profile_audit.visual_coherence,
            content_strategy: wire.profile_audit.content_strategy,
        },
        problems: wire
            .problems
            .into_iter()
            .map(|issue| Issue {
                title: issue.title,
                description: issue.description,
                severity: issue.severity,
            })
            .collect(),
        solutions: wire
            .solutions
            .into_iter()
            .map(|item| ActionItem {
                step: item.step,
                details: item.details,
            })
            .collect(),
        hashtags: wire.hashtags,
    })
}

fn validate_score(score: f64) -> Result<u8, ContractError> {
    if !score.is_finite() {
        return Err(ContractError::InvalidContract(
            "score is not a finite number".to_string(),
        ));
    }

    let rounded = score.round();
    if rounded < f64::from(MIN_SCORE) || rounded > f64::from(MAX_SCORE) {
        return Err(ContractError::InvalidContract(format!(
            "score {score} is outside [{MIN_SCORE}, {MAX_SCORE}]"
        )));
    }

    // Range checked above.
    Ok(rounded as u8)
}

/// Audit contract errors.
#[derive(Debug, Error)]
pub enum ContractError {
    /// JSON syntax error or missing/mistyped field.
    #[error("audit decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Parsed payload violates contract ranges.
    #[error("audit contract violation: {0}")]
    InvalidContract(String),
}
