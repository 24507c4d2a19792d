//! Shared fixtures for app integration tests.

use std::sync::{Arc, Mutex};

use insta_audit_app::{AppConfig, AuditApp};
use insta_audit_client::{AuditError, GenerationRequest, GenerationResponse, GenerationTransport};
use insta_audit_gate::{GateError, LinkOpener, MemoryFlagStore};
use url::Url;

/// Canned generation transport that records every request it receives.
pub struct FakeTransport {
    reply: Box<dyn Fn() -> Result<GenerationResponse, AuditError> + Send + Sync>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeTransport {
    /// Replies with `text` as the only candidate part.
    #[allow(dead_code)]
    pub fn text(text: &'static str) -> Arc<Self> {
        Self::with(move || Ok(GenerationResponse::from_text(text)))
    }

    /// Replies with the given closure's result.
    #[allow(dead_code)]
    pub fn with<F>(reply: F) -> Arc<Self>
    where
        F: Fn() -> Result<GenerationResponse, AuditError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            reply: Box::new(reply),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Returns the number of calls made.
    #[allow(dead_code)]
    pub fn calls(&self) -> usize {
        self.requests.lock().expect("request log lock should work").len()
    }

    /// Returns the first user prompt sent.
    #[allow(dead_code)]
    pub fn first_prompt(&self) -> String {
        let requests = self.requests.lock().expect("request log lock should work");
        requests[0].contents[0].parts[0].text.clone()
    }
}

impl GenerationTransport for FakeTransport {
    fn generate(
        &self,
        _endpoint: &Url,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, AuditError> {
        self.requests
            .lock()
            .expect("request log lock should work")
            .push(request.clone());
        (self.reply)()
    }
}

/// Link opener that records opened URLs.
#[derive(Default)]
pub struct RecordingOpener {
    pub opened: Mutex<Vec<String>>,
}

impl LinkOpener for RecordingOpener {
    fn open(&self, url: &Url) -> Result<(), GateError> {
        self.opened
            .lock()
            .expect("opener lock should work")
            .push(url.to_string());
        Ok(())
    }
}

/// Valid audit payload from the reference scenario.
#[allow(dead_code)]
pub const SCENARIO_PAYLOAD: &str = r#"{
    "score": 72,
    "summary": "Strong niche, but hooks lose viewers early.",
    "profile_audit": {
        "bio_check": "Bio does not say what you sell.",
        "visual_coherence": "Filters change from post to post.",
        "content_strategy": "No recurring series."
    },
    "problems": [
        { "title": "Weak Hook", "description": "The first second shows nothing.", "severity": "high" }
    ],
    "solutions": [
        { "step": "Lead with the find", "details": "Open every reel on the best thrifted piece." }
    ],
    "hashtags": ["sustainablefashion", "thrift"]
}"#;

/// Test configuration in English with a fake API key.
#[allow(dead_code)]
pub fn config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "INSTA_AUDIT_API_KEY" => Some("test-key".to_string()),
        "INSTA_AUDIT_LANG" => Some("en".to_string()),
        _ => None,
    })
    .expect("test config should load")
}

/// Builds an app over `store` and `transport` at t=0.
#[allow(dead_code)]
pub fn app_with(store: MemoryFlagStore, transport: Arc<FakeTransport>) -> AuditApp {
    AuditApp::new(
        &config(),
        Box::new(store),
        Arc::new(RecordingOpener::default()),
        transport,
        0,
    )
    .expect("app should build")
}

/// Builds an unlocked, consented app and fills the reference form.
#[allow(dead_code)]
pub fn ready_app(transport: Arc<FakeTransport>) -> AuditApp {
    let store = MemoryFlagStore::with_entries([("unlocked", "true"), ("cookiesAccepted", "true")]);
    let mut app = app_with(store, transport);
    app.set_username("jane_doe");
    app.set_niche("sustainable fashion reselling");
    app
}
