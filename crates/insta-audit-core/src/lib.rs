#![warn(missing_docs)]
//! # insta-audit-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `insta-audit` workspace.
//!
//! ## Responsibilities
//! - Represent the submitted profile audit request ([`AnalysisRequest`]).
//! - Represent the structured audit returned by the generation service
//!   ([`AnalysisResult`] and its parts).
//! - Map platform/language codes to human-readable names.
//!
//! ## Data flow
//! The form collects raw text -> [`AnalysisRequest::new`] validates required
//! fields -> the request builder renders a prompt -> the contract decoder
//! produces an [`AnalysisResult`] -> the UI projects it into a report.
//!
//! ## Ownership and lifetimes
//! Requests and results own their strings so they can move freely between the
//! form, the client and the view state without borrowing from input buffers.
//!
//! ## Error model
//! Validation failures return [`CoreError`] variants.
//!
//! ## Example
//! ```rust
//! use insta_audit_core::{AnalysisRequest, Language, Platform};
//!
//! let request = AnalysisRequest::new("jane_doe", "thrift fashion", Platform::Instagram, Language::En)
//!     .expect("valid request");
//! assert_eq!(request.platform.display_name(), "Instagram");
//! assert!(AnalysisRequest::new("  ", "x", Platform::TikTok, Language::Ar).is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest score the audit contract allows.
pub const MIN_SCORE: u8 = 0;

/// Highest score the audit contract allows.
pub const MAX_SCORE: u8 = 100;

/// Social platform the audited profile lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Instagram profile (default form selection).
    #[default]
    Instagram,
    /// TikTok profile.
    TikTok,
}

impl Platform {
    /// Returns the stable lowercase code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::TikTok => "tiktok",
        }
    }

    /// Returns the name used in prompts and headings.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Instagram => "Instagram",
            Self::TikTok => "TikTok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "instagram" | "ig" => Ok(Self::Instagram),
            "tiktok" | "tt" => Ok(Self::TikTok),
            other => Err(CoreError::UnknownPlatform(other.to_string())),
        }
    }
}

/// Interface and response language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Arabic (initial language).
    #[default]
    Ar,
    /// English.
    En,
    /// Hebrew.
    He,
}

impl Language {
    /// All supported languages in menu order.
    pub const ALL: [Language; 3] = [Language::Ar, Language::En, Language::He];

    /// Returns the two-letter code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Ar => "ar",
            Self::En => "en",
            Self::He => "he",
        }
    }

    /// Returns the English name of the language, as written into prompts.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Ar => "Arabic",
            Self::En => "English",
            Self::He => "Hebrew",
        }
    }

    /// Returns `true` for right-to-left scripts.
    pub fn is_rtl(self) -> bool {
        matches!(self, Self::Ar | Self::He)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ar" => Ok(Self::Ar),
            "en" => Ok(Self::En),
            "he" => Ok(Self::He),
            other => Err(CoreError::UnknownLanguage(other.to_string())),
        }
    }
}

/// Validated audit request created on form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Username or profile link, stored as entered.
    pub username: String,
    /// Free-form niche description, stored as entered.
    pub niche: String,
    /// Target platform.
    pub platform: Platform,
    /// Language every text field of the audit must be written in.
    pub language: Language,
}

impl AnalysisRequest {
    /// Constructs a validated request.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyField`] when `username` or `niche` is blank
    /// after trimming. No other normalization is applied.
    pub fn new(
        username: impl Into<String>,
        niche: impl Into<String>,
        platform: Platform,
        language: Language,
    ) -> Result<Self, CoreError> {
        let username = username.into();
        let niche = niche.into();

        if username.trim().is_empty() {
            return Err(CoreError::EmptyField("username"));
        }
        if niche.trim().is_empty() {
            return Err(CoreError::EmptyField("niche"));
        }

        Ok(Self {
            username,
            niche,
            platform,
            language,
        })
    }
}

/// Qualitative ranking of a diagnosed problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks growth outright.
    High,
    /// Noticeably slows growth.
    Medium,
    /// Minor polish item.
    Low,
}

impl Severity {
    /// Returns the lowercase wire value.
    pub fn code(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// One problem stopping the profile from growing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Short headline.
    pub title: String,
    /// Explanation of the problem.
    pub description: String,
    /// How much the problem matters.
    pub severity: Severity,
}

/// One actionable fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    /// The action to take.
    pub step: String,
    /// How to do it.
    pub details: String,
}

/// Critique of the profile surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAudit {
    /// Critique of the bio.
    pub bio_check: String,
    /// Critique of feed or video visual consistency.
    pub visual_coherence: String,
    /// Critique of the implied content strategy.
    pub content_strategy: String,
}

/// Complete audit for one profile.
///
/// Built only by the strict contract decoder; a value of this type is always
/// whole, never partially filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Profile quality score in `[0, 100]`.
    pub score: u8,
    /// Short summary of why the account is not growing.
    pub summary: String,
    /// Bio, visual and strategy critique.
    pub profile_audit: ProfileAudit,
    /// Problems in the order the service returned them.
    pub problems: Vec<Issue>,
    /// Fixes in the order the service returned them.
    pub solutions: Vec<ActionItem>,
    /// Suggested hashtags; the service is asked for 5-10 but the count is not
    /// enforced.
    pub hashtags: Vec<String>,
}

impl AnalysisResult {
    /// Returns the colour band for [`Self::score`].
    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }

    /// Returns problems with [`Severity::High`].
    pub fn high_severity_problems(&self) -> impl Iterator<Item = &Issue> {
        self.problems
            .iter()
            .filter(|issue| issue.severity == Severity::High)
    }
}

/// Coarse score grouping used for report styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// Score of 80 or more.
    Strong,
    /// Score from 50 to 79.
    Fair,
    /// Score below 50.
    Weak,
}

impl ScoreBand {
    /// Maps a score into its band.
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::Strong,
            50..=79 => Self::Fair,
            _ => Self::Weak,
        }
    }
}

/// Error type for core model validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A required text field is blank.
    #[error("{0} must be non-empty")]
    EmptyField(&'static str),
    /// Platform code is not recognised.
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),
    /// Language code is not recognised.
    #[error("unknown language: {0}")]
    UnknownLanguage(String),
}
