#![warn(missing_docs)]
//! # insta-audit-app
//!
//! ## Purpose
//! Orchestrates gate, request lifecycle and audit client for `insta-audit`.
//!
//! ## Responsibilities
//! - Load runtime configuration from the environment.
//! - Open the persisted flag store, falling back to a fresh one when the file
//!   is unusable.
//! - Expose the named user transitions (unlock, accept cookies, submit,
//!   reset, language switch) over one owned state record.
//! - Keep secrets out of log-bound strings.
//!
//! ## Data flow
//! Env -> [`AppConfig`] -> [`AuditApp::new`] (gate + flow + client) -> shell
//! events -> [`AuditApp::view`] -> rendered frame.
//!
//! ## Ownership and lifetimes
//! [`AuditApp`] owns every piece of mutable UI state; the shell only reads
//! [`ViewModel`] snapshots and calls transitions.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Audit failures never reach
//! the caller as errors: they become the `Failed` flow state.
//!
//! ## Security and privacy notes
//! - The API key is held only by the HTTP transport.
//! - [`redact_sensitive`] strips key/token markers from log-bound text.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use insta_audit_client::{AuditClient, AuditError, GenerationTransport, generate_content_endpoint};
use insta_audit_core::{CoreError, Language, Platform};
use insta_audit_gate::{FileFlagStore, FlagStore, Gate, GateError, LinkOpener, PROFILE_URL};
use insta_audit_ui::{AuditFlow, Commit, FlowError, FormInput, ViewModel, project_view};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("INSTA_AUDIT_VERSION");

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Default base URL of the generation API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default location of the persisted flag file.
pub const DEFAULT_STATE_PATH: &str = "insta-audit-state.json";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Runtime configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Generation API key.
    pub api_key: String,
    /// Generation model name.
    pub model: String,
    /// Base URL of the generation API.
    pub api_base: String,
    /// Flag file location.
    pub state_path: PathBuf,
    /// Initial interface language.
    pub language: Language,
    /// HTTP timeout.
    pub timeout: Duration,
    /// Profile opened on unlock.
    pub profile_url: Url,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("state_path", &self.state_path)
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .field("profile_url", &self.profile_url.as_str())
            .finish()
    }
}

impl AppConfig {
    /// Loads configuration from process environment variables.
    ///
    /// # Errors
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`.
    ///
    /// Variables:
    /// - `INSTA_AUDIT_API_KEY` (required)
    /// - `INSTA_AUDIT_MODEL`, `INSTA_AUDIT_API_BASE`, `INSTA_AUDIT_STATE_PATH`,
    ///   `INSTA_AUDIT_LANG`, `INSTA_AUDIT_TIMEOUT_SECS`,
    ///   `INSTA_AUDIT_PROFILE_URL` (optional, defaults logged at `info`)
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] for an absent or blank API key and
    /// [`ConfigError::Invalid`] for unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("INSTA_AUDIT_API_KEY")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing("INSTA_AUDIT_API_KEY"))?;

        let model = or_default(&lookup, "INSTA_AUDIT_MODEL", DEFAULT_MODEL);
        let api_base = or_default(&lookup, "INSTA_AUDIT_API_BASE", DEFAULT_API_BASE);
        let state_path = PathBuf::from(or_default(
            &lookup,
            "INSTA_AUDIT_STATE_PATH",
            DEFAULT_STATE_PATH,
        ));

        let language = parse_var(&lookup, "INSTA_AUDIT_LANG", Language::default().code(), |raw| {
            raw.parse::<Language>().map_err(|error: CoreError| error.to_string())
        })?;
        let timeout = parse_var(
            &lookup,
            "INSTA_AUDIT_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
            |raw| match raw.parse::<u64>() {
                Ok(0) => Err("timeout must be positive".to_string()),
                Ok(secs) => Ok(Duration::from_secs(secs)),
                Err(error) => Err(error.to_string()),
            },
        )?;
        let profile_url = parse_var(&lookup, "INSTA_AUDIT_PROFILE_URL", PROFILE_URL, |raw| {
            Url::parse(raw).map_err(|error| error.to_string())
        })?;

        Ok(Self {
            api_key,
            model,
            api_base,
            state_path,
            language,
            timeout,
            profile_url,
        })
    }
}

fn or_default<F>(lookup: &F, key: &'static str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => value,
        _ => {
            info!("{key} not set, using default: {default}");
            default.to_string()
        }
    }
}

fn parse_var<F, T, P>(lookup: &F, key: &'static str, default: &str, parse: P) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Result<T, String>,
{
    let raw = or_default(lookup, key, default);
    parse(&raw).map_err(|reason| {
        warn!("Invalid {key} value: {reason}");
        ConfigError::Invalid { key, reason }
    })
}

/// Opens the flag file, replacing an unusable one with an empty store.
///
/// A corrupt or unreadable file is logged and treated as "no flags set"; the
/// next write overwrites it.
pub fn open_flag_store(path: &Path) -> FileFlagStore {
    match FileFlagStore::open(path) {
        Ok(store) => store,
        Err(error) => {
            warn!(path = %path.display(), %error, "flag store unusable, starting fresh");
            FileFlagStore::fresh(path)
        }
    }
}

/// Owned application state and its named transitions.
pub struct AuditApp {
    gate: Gate,
    flow: AuditFlow,
    form: FormInput,
    client: AuditClient,
}

impl AuditApp {
    /// Wires gate, flow and client.
    ///
    /// # Errors
    /// Returns [`AppError::Client`] for an invalid endpoint and
    /// [`AppError::Gate`] when flags cannot be read.
    pub fn new(
        config: &AppConfig,
        store: Box<dyn FlagStore>,
        opener: Arc<dyn LinkOpener>,
        transport: Arc<dyn GenerationTransport>,
        now_ms: u64,
    ) -> Result<Self, AppError> {
        let endpoint = generate_content_endpoint(&config.api_base, &config.model)?;
        let client = AuditClient::new(endpoint.as_str(), transport)?;
        let gate = Gate::start(store, opener, config.profile_url.clone(), now_ms)?;

        info!(
            version = APP_VERSION,
            model = %config.model,
            language = config.language.code(),
            "insta-audit started"
        );

        Ok(Self {
            gate,
            flow: AuditFlow::new(config.language),
            form: FormInput::default(),
            client,
        })
    }

    /// Returns the current frame.
    pub fn view(&self) -> ViewModel {
        project_view(&self.flow, &self.form, self.gate.overlay())
    }

    /// Returns the gate.
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Returns the request lifecycle.
    pub fn flow(&self) -> &AuditFlow {
        &self.flow
    }

    /// Returns the form fields.
    pub fn form(&self) -> &FormInput {
        &self.form
    }

    /// Sets the username field.
    pub fn set_username(&mut self, username: impl Into<String>) {
        self.form.username = username.into();
    }

    /// Sets the niche field.
    pub fn set_niche(&mut self, niche: impl Into<String>) {
        self.form.niche = niche.into();
    }

    /// Selects the platform tab.
    pub fn set_platform(&mut self, platform: Platform) {
        self.form.platform = platform;
    }

    /// Switches the interface and response language.
    pub fn set_language(&mut self, language: Language) {
        self.flow.set_language(language);
    }

    /// Follows the profile link and unlocks.
    ///
    /// # Errors
    /// Returns [`AppError::Gate`] when the flag cannot be persisted.
    pub fn unlock(&mut self, now_ms: u64) -> Result<(), AppError> {
        self.gate.unlock(now_ms).map_err(AppError::Gate)
    }

    /// Accepts cookies from the banner.
    ///
    /// # Errors
    /// Returns [`AppError::Gate`] when consent cannot be persisted.
    pub fn accept_cookies(&mut self, now_ms: u64) -> Result<(), AppError> {
        self.gate.accept_cookies(now_ms).map_err(AppError::Gate)
    }

    /// Advances gate timers.
    ///
    /// # Errors
    /// Returns [`AppError::Gate`] when an auto-accept cannot be persisted.
    pub fn tick(&mut self, now_ms: u64) -> Result<(), AppError> {
        self.gate.tick(now_ms).map_err(AppError::Gate)
    }

    /// Returns the earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.gate.next_deadline()
    }

    /// One idle step of an event loop: fires everything due at `now_ms` and
    /// returns how long the loop may wait for input before the next timer.
    ///
    /// `None` means no timer is pending and the loop may block indefinitely.
    ///
    /// # Errors
    /// Returns [`AppError::Gate`] when an auto-accept cannot be persisted.
    pub fn drive(&mut self, now_ms: u64) -> Result<Option<Duration>, AppError> {
        self.tick(now_ms)?;
        Ok(self
            .next_deadline()
            .map(|deadline| Duration::from_millis(deadline.saturating_sub(now_ms))))
    }

    /// Submits the form and waits for the audit.
    ///
    /// The audit outcome lands in the flow state; an audit failure is not an
    /// error of this call.
    ///
    /// # Errors
    /// Returns [`AppError::Locked`] while the lock overlay is up and
    /// [`AppError::Flow`] when submission is not allowed.
    pub fn submit(&mut self) -> Result<Commit, AppError> {
        if !self.gate.overlay().main_interactive {
            return Err(AppError::Locked);
        }

        let ticket = self.flow.begin(&self.form)?;
        let outcome = self
            .client
            .analyze(ticket.request())
            .map_err(|error| redact_sensitive(&error.to_string()));
        Ok(self.flow.complete(ticket, outcome))
    }

    /// Discards the report or error and shows the empty form again.
    pub fn reset(&mut self) {
        self.flow.reset();
    }

    /// Fires anything already due at `now_ms`, then releases the remaining
    /// timers before the shell exits.
    ///
    /// # Errors
    /// Returns [`AppError::Gate`] when an overdue auto-accept cannot be
    /// persisted; timers are released either way.
    pub fn shutdown(&mut self, now_ms: u64) -> Result<(), AppError> {
        let flushed = self.tick(now_ms);
        self.gate.teardown();
        info!("insta-audit stopped");
        flushed
    }
}

/// Redacts common secret markers in log-safe output.
///
/// A `key`, `token` or `authorization` marker counts only when it starts a
/// word and is directly followed by `=`, `:` or `"`; `bearer` counts when
/// followed by a space. The value after the marker, up to the next
/// whitespace, `&`, `,`, `}` or quote, is replaced.
pub fn redact_sensitive(input: &str) -> String {
    let lower = input.to_ascii_lowercase();
    let bytes = input.as_bytes();
    let mut output = String::with_capacity(input.len());
    let mut cursor = 0;

    while let Some((position, marker_len)) = next_marker(&lower, cursor) {
        let mut value_start = position + marker_len;
        while value_start < input.len() && matches!(bytes[value_start], b'=' | b':' | b' ' | b'"') {
            value_start += 1;
        }
        if lower[value_start..].starts_with("bearer ") {
            value_start += "bearer ".len();
        }
        let value_end = input[value_start..]
            .find(|c: char| c.is_whitespace() || matches!(c, '&' | '"' | ',' | '}'))
            .map_or(input.len(), |offset| value_start + offset);

        output.push_str(&input[cursor..position + marker_len]);
        if value_end > value_start {
            output.push_str("=<redacted>");
        }
        cursor = value_end.max(position + marker_len);
    }

    output.push_str(&input[cursor..]);
    output
}

fn next_marker(lower: &str, from: usize) -> Option<(usize, usize)> {
    const MARKERS: [(&str, &str); 4] = [
        ("key", "=:\""),
        ("token", "=:\""),
        ("authorization", "=:\""),
        ("bearer", " "),
    ];

    let bytes = lower.as_bytes();
    MARKERS
        .iter()
        .filter_map(|(marker, followers)| {
            let mut start = from;
            while let Some(offset) = lower[start..].find(marker) {
                let position = start + offset;
                let end = position + marker.len();
                let starts_word = position == 0 || !bytes[position - 1].is_ascii_alphanumeric();
                let introduces_value = bytes
                    .get(end)
                    .is_some_and(|next| followers.as_bytes().contains(next));
                if starts_word && introduces_value {
                    return Some((position, marker.len()));
                }
                start = position + 1;
            }
            None
        })
        .min_by_key(|(position, _)| *position)
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required variable is absent or blank.
    #[error("{0} must be set")]
    Missing(&'static str),
    /// Variable could not be parsed.
    #[error("invalid {key}: {reason}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Parse failure.
        reason: String,
    },
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Gate or flag storage error.
    #[error("gate error: {0}")]
    Gate(#[from] GateError),
    /// Audit client setup error.
    #[error("client error: {0}")]
    Client(#[from] AuditError),
    /// Submission guard error.
    #[error("flow error: {0}")]
    Flow(#[from] FlowError),
    /// Main content is behind the lock overlay.
    #[error("unlock the app before submitting")]
    Locked,
    /// Terminal input or output failed.
    #[error("terminal i/o failure: {0}")]
    Io(#[from] std::io::Error),
}
