#![warn(missing_docs)]
//! # insta-audit-request
//!
//! ## Purpose
//! Builds the outbound prompt and output contract for one audit request.
//!
//! ## Responsibilities
//! - Render the fixed instructional template with username, niche and the
//!   human-readable platform name.
//! - Pick the response language and the matching system instruction.
//! - Attach the structured-output schema from `insta-audit-contract`.
//!
//! ## Data flow
//! [`AnalysisRequest`] -> [`build_audit_prompt`] -> [`AuditPrompt`] -> audit
//! client.
//!
//! ## Error model
//! None. The caller validates required fields before this stage, so building
//! a prompt cannot fail.
//!
//! ## Security and privacy notes
//! [`AuditPrompt::fingerprint`] lets logs correlate requests without writing
//! the user's username or niche.

use insta_audit_contract::response_schema;
use insta_audit_core::AnalysisRequest;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Sampling temperature sent with every audit request.
pub const TEMPERATURE: f32 = 0.7;

/// Response format requested from the generation service.
pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// Hex characters kept from the prompt digest.
const FINGERPRINT_LEN: usize = 16;

/// Everything the audit client needs to issue one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditPrompt {
    /// User-role prompt text.
    pub prompt_text: String,
    /// Structured-output descriptor the response must conform to.
    pub output_schema: Value,
    /// English name of the response language.
    pub language_name: &'static str,
    /// System instruction pinning role and response language.
    pub system_instruction: String,
}

impl AuditPrompt {
    /// Returns a short stable digest of prompt and system instruction.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.prompt_text.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.system_instruction.as_bytes());
        let mut digest = hex::encode(hasher.finalize());
        digest.truncate(FINGERPRINT_LEN);
        digest
    }
}

/// Builds the prompt, schema and system instruction for `request`.
///
/// Pure function: identical requests yield identical prompts.
pub fn build_audit_prompt(request: &AnalysisRequest) -> AuditPrompt {
    let platform_name = request.platform.display_name();
    let language_name = request.language.display_name();

    AuditPrompt {
        prompt_text: render_prompt(
            &request.username,
            &request.niche,
            platform_name,
            language_name,
        ),
        output_schema: response_schema(),
        language_name,
        system_instruction: system_instruction(language_name),
    }
}

/// Returns the system instruction for `language_name`.
pub fn system_instruction(language_name: &str) -> String {
    format!("You are a professional Social Media Auditor. Respond strictly in {language_name}.")
}

fn render_prompt(username: &str, niche: &str, platform: &str, language: &str) -> String {
    format!(
        "You are an expert Social Media Strategist and Growth Hacker for {platform}.

User Context:
Username/Link: {username}
Niche/Description: {niche}
Platform: {platform}

Task:
1. Analyze the potential growth bottlenecks for this niche on {platform}.
2. Critique the Bio and Visuals based on best practices for {platform} (e.g., reels vs photos, hooks, trends).
3. Identify why the account might not be growing (Shadowban risk, bad hooks, low retention, poor lighting, etc).
4. Provide actionable solutions tailored to {platform} algorithms.
5. Output ONLY JSON.
6. IMPORTANT: All text in the JSON response MUST be in {language} language.
"
    )
}

#[cfg(test)]
mod tests {
    //! Unit tests for prompt rendering.

    use insta_audit_core::{Language, Platform};

    use super::*;

    fn request(platform: Platform, language: Language) -> AnalysisRequest {
        AnalysisRequest::new("jane_doe", "sustainable fashion reselling", platform, language)
            .expect("fixture request should be valid")
    }

    #[test]
    fn embeds_user_context_and_readable_names() {
        let prompt = build_audit_prompt(&request(Platform::Instagram, Language::En));
        assert!(prompt.prompt_text.contains("Username/Link: jane_doe"));
        assert!(
            prompt
                .prompt_text
                .contains("Niche/Description: sustainable fashion reselling")
        );
        assert!(prompt.prompt_text.contains("Instagram"));
        assert!(prompt.prompt_text.contains("in English language"));
        assert_eq!(prompt.language_name, "English");
        assert_eq!(
            prompt.system_instruction,
            "You are a professional Social Media Auditor. Respond strictly in English."
        );
    }

    #[test]
    fn never_leaks_raw_codes() {
        for platform in [Platform::Instagram, Platform::TikTok] {
            for language in Language::ALL {
                let prompt = build_audit_prompt(&request(platform, language));
                assert!(!prompt.prompt_text.contains(platform.code()));
                assert!(
                    !prompt
                        .prompt_text
                        .contains(&format!("in {} language", language.code()))
                );
                assert!(prompt.prompt_text.contains(platform.display_name()));
                assert!(prompt.prompt_text.contains(language.display_name()));
            }
        }
    }

    #[test]
    fn is_deterministic() {
        let first = build_audit_prompt(&request(Platform::TikTok, Language::He));
        let second = build_audit_prompt(&request(Platform::TikTok, Language::He));
        assert_eq!(first, second);
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(first.fingerprint().len(), 16);
    }

    #[test]
    fn fingerprint_changes_with_language() {
        let arabic = build_audit_prompt(&request(Platform::TikTok, Language::Ar));
        let hebrew = build_audit_prompt(&request(Platform::TikTok, Language::He));
        assert_ne!(arabic.fingerprint(), hebrew.fingerprint());
    }
}
