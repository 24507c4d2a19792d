#![warn(missing_docs)]
//! # insta-audit-ui
//!
//! ## Purpose
//! Defines the UI-facing state model for `insta-audit`: the request
//! lifecycle and the projection of state into what the view draws.
//!
//! ## Responsibilities
//! - Hold form input and decide when submission is allowed.
//! - Run the `Idle -> Loading -> Success | Failed` lifecycle with at most one
//!   request in flight.
//! - Discard results that arrive for a request that is no longer current.
//! - Project results and gate overlays into localized view data.
//!
//! ## Data flow
//! Form -> [`AuditFlow::begin`] -> audit client -> [`AuditFlow::complete`] ->
//! [`project_view`] -> rendered shell.
//!
//! ## Ownership and lifetimes
//! [`AuditFlow`] owns the current result; views borrow nothing and copy only
//! static locale strings.
//!
//! ## Error model
//! Submission guards return [`FlowError`]. Audit failures are logged with
//! full detail and collapsed into the localized generic error message.

use insta_audit_core::{
    AnalysisRequest, AnalysisResult, CoreError, Language, Platform, ScoreBand, Severity,
};
use insta_audit_gate::Overlay;
use insta_audit_locale::{severity_label, strings};
use thiserror::Error;
use tracing::{error, info, warn};

/// Raw form fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    /// Username or profile link.
    pub username: String,
    /// Niche description.
    pub niche: String,
    /// Selected platform tab.
    pub platform: Platform,
}

impl FormInput {
    /// Returns `true` when both required fields are non-blank.
    pub fn can_submit(&self) -> bool {
        !self.username.trim().is_empty() && !self.niche.trim().is_empty()
    }

    /// Builds a validated request in `language`.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyField`] when a required field is blank.
    pub fn to_request(&self, language: Language) -> Result<AnalysisRequest, CoreError> {
        AnalysisRequest::new(
            self.username.clone(),
            self.niche.clone(),
            self.platform,
            language,
        )
    }
}

/// Request lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Form shown, no error.
    Idle,
    /// Request in flight; form disabled.
    Loading,
    /// Audit received.
    Success(AnalysisResult),
    /// Last request failed; form shown with the generic error banner.
    Failed,
}

/// Proof that a request was started; required to commit its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    request: AnalysisRequest,
}

impl RequestTicket {
    /// Returns the validated request to send.
    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }
}

/// Result of [`AuditFlow::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// Outcome was applied to the flow.
    Applied,
    /// Ticket was stale; outcome dropped.
    Discarded,
}

/// Top-level request lifecycle record.
#[derive(Debug, Clone)]
pub struct AuditFlow {
    language: Language,
    state: FlowState,
    generation: u64,
    in_flight: Option<u64>,
}

impl AuditFlow {
    /// Creates an idle flow in `language`.
    pub fn new(language: Language) -> Self {
        Self {
            language,
            state: FlowState::Idle,
            generation: 0,
            in_flight: None,
        }
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Returns the current interface language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Returns the current result, if any.
    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            FlowState::Success(result) => Some(result),
            _ => None,
        }
    }

    /// Returns `true` while a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.state == FlowState::Loading
    }

    /// Switches the interface language. Does not touch an in-flight request.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Starts a request for `form`, clearing any previous error.
    ///
    /// # Errors
    /// - [`FlowError::AlreadyLoading`] while another request is in flight.
    /// - [`FlowError::ResultShown`] while a report is displayed.
    /// - [`FlowError::InvalidInput`] when a required field is blank.
    pub fn begin(&mut self, form: &FormInput) -> Result<RequestTicket, FlowError> {
        match self.state {
            FlowState::Loading => return Err(FlowError::AlreadyLoading),
            FlowState::Success(_) => return Err(FlowError::ResultShown),
            FlowState::Idle | FlowState::Failed => {}
        }

        let request = form.to_request(self.language)?;
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.state = FlowState::Loading;

        info!(generation = self.generation, "audit request started");
        Ok(RequestTicket {
            generation: self.generation,
            request,
        })
    }

    /// Commits the outcome of `ticket`'s request.
    ///
    /// Outcomes for tickets that are no longer current (after a reset) are
    /// discarded. Failures are logged in full; the view only ever shows the
    /// generic localized message.
    pub fn complete<E>(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<AnalysisResult, E>,
    ) -> Commit
    where
        E: std::fmt::Display,
    {
        if self.in_flight != Some(ticket.generation) {
            warn!(
                generation = ticket.generation,
                "discarding outcome of a superseded audit request"
            );
            return Commit::Discarded;
        }

        self.in_flight = None;
        self.state = match outcome {
            Ok(result) => {
                info!(
                    generation = ticket.generation,
                    score = result.score,
                    "audit request succeeded"
                );
                FlowState::Success(result)
            }
            Err(failure) => {
                error!(
                    generation = ticket.generation,
                    error = %failure,
                    "audit request failed"
                );
                FlowState::Failed
            }
        };
        Commit::Applied
    }

    /// Returns to the empty form, dropping any result, error or in-flight
    /// request.
    pub fn reset(&mut self) {
        self.in_flight = None;
        self.state = FlowState::Idle;
    }
}

impl Default for AuditFlow {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

/// One problem as shown in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemView {
    /// Problem headline.
    pub title: String,
    /// Problem explanation.
    pub description: String,
    /// Severity for styling.
    pub severity: Severity,
    /// Localized severity badge.
    pub badge: &'static str,
}

/// One numbered solution as shown in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionView {
    /// 1-based position.
    pub number: usize,
    /// Action to take.
    pub step: String,
    /// How to do it.
    pub details: String,
}

/// Localized report projection of an [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportView {
    /// Score in `[0, 100]`.
    pub score: u8,
    /// Score styling band.
    pub band: ScoreBand,
    /// Summary headline.
    pub summary: String,
    /// `(heading, critique)` pairs for bio, visuals and content strategy.
    pub audit: Vec<(&'static str, String)>,
    /// Problems in service order.
    pub problems: Vec<ProblemView>,
    /// Solutions in service order.
    pub solutions: Vec<SolutionView>,
    /// Hashtags, each with exactly one leading `#`.
    pub hashtags: Vec<String>,
}

impl ReportView {
    /// Builds the report for `result` in `language`.
    pub fn new(result: &AnalysisResult, language: Language) -> Self {
        let table = strings(language);
        Self {
            score: result.score,
            band: result.score_band(),
            summary: result.summary.clone(),
            audit: vec![
                (table.bio_audit, result.profile_audit.bio_check.clone()),
                (
                    table.visual_audit,
                    result.profile_audit.visual_coherence.clone(),
                ),
                (
                    table.content_audit,
                    result.profile_audit.content_strategy.clone(),
                ),
            ],
            problems: result
                .problems
                .iter()
                .map(|issue| ProblemView {
                    title: issue.title.clone(),
                    description: issue.description.clone(),
                    severity: issue.severity,
                    badge: severity_label(language, issue.severity),
                })
                .collect(),
            solutions: result
                .solutions
                .iter()
                .enumerate()
                .map(|(index, item)| SolutionView {
                    number: index + 1,
                    step: item.step.clone(),
                    details: item.details.clone(),
                })
                .collect(),
            hashtags: result
                .hashtags
                .iter()
                .filter_map(|tag| normalize_hashtag(tag))
                .collect(),
        }
    }
}

/// Normalizes a hashtag to a single leading `#`; blank tags yield `None`.
pub fn normalize_hashtag(tag: &str) -> Option<String> {
    let bare = tag.trim().trim_start_matches('#').trim();
    if bare.is_empty() {
        None
    } else {
        Some(format!("#{bare}"))
    }
}

/// Main content below the overlays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Audit form, optionally with the generic error banner above it.
    Form {
        /// Submit control accepts clicks.
        submit_enabled: bool,
        /// Label of the submit control.
        submit_label: &'static str,
        /// Localized error banner text.
        error: Option<&'static str>,
    },
    /// Finished report.
    Report(ReportView),
}

/// Everything the shell needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    /// Interface language.
    pub language: Language,
    /// Layout direction is right-to-left.
    pub rtl: bool,
    /// Overlays from the gate.
    pub overlay: Overlay,
    /// Main content.
    pub body: Body,
}

/// Projects flow, form and gate overlay into a [`ViewModel`].
pub fn project_view(flow: &AuditFlow, form: &FormInput, overlay: Overlay) -> ViewModel {
    let language = flow.language();
    let table = strings(language);

    let body = match flow.state() {
        FlowState::Success(result) => Body::Report(ReportView::new(result, language)),
        state => {
            let loading = *state == FlowState::Loading;
            Body::Form {
                submit_enabled: !loading && overlay.main_interactive && form.can_submit(),
                submit_label: if loading {
                    table.analyzing
                } else {
                    table.analyze_btn
                },
                error: (*state == FlowState::Failed).then_some(table.error_msg),
            }
        }
    };

    ViewModel {
        language,
        rtl: language.is_rtl(),
        overlay,
        body,
    }
}

/// Submission guard errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    /// A request is already in flight.
    #[error("an audit request is already in flight")]
    AlreadyLoading,
    /// A report is displayed; reset first.
    #[error("reset the current report before starting a new audit")]
    ResultShown,
    /// Form input failed validation.
    #[error("invalid form input: {0}")]
    InvalidInput(#[from] CoreError),
}
