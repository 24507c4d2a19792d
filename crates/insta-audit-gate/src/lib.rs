#![warn(missing_docs)]
//! # insta-audit-gate
//!
//! ## Purpose
//! Implements the "follow to unlock" overlay and the cookie-consent banner,
//! together with the two persisted client flags that drive them.
//!
//! ## Responsibilities
//! - Persist the `unlocked` and `cookiesAccepted` flags behind a narrow
//!   [`FlagStore`] interface (memory and JSON-file backends).
//! - Model cancellable delayed tasks on a caller-supplied millisecond clock
//!   ([`TimerQueue`]).
//! - Drive the one-way `Locked -> Unlocked` and
//!   `BannerVisible -> BannerDismissed` transitions ([`Gate`]).
//!
//! ## Data flow
//! Startup reads flags -> [`Gate::start`] mounts the banner when allowed ->
//! user actions ([`Gate::unlock`], [`Gate::accept_cookies`]) and clock ticks
//! ([`Gate::tick`]) move the state -> [`Gate::overlay`] tells the view what to
//! render.
//!
//! ## Ownership and lifetimes
//! The gate owns its store, timers and state. The link opener is shared
//! behind an [`Arc`] so the shell can keep its own handle.
//!
//! ## Error model
//! Storage and link failures are reported as [`GateError`]. In-memory
//! transitions are applied before persistence, so a storage failure never
//! leaves the view stuck behind an overlay the user already dismissed.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use insta_audit_gate::{Gate, GateError, LinkOpener, MemoryFlagStore, PROFILE_URL};
//! use url::Url;
//!
//! struct NoopOpener;
//! impl LinkOpener for NoopOpener {
//!     fn open(&self, _url: &Url) -> Result<(), GateError> { Ok(()) }
//! }
//!
//! let profile = Url::parse(PROFILE_URL).unwrap();
//! let mut gate = Gate::start(Box::new(MemoryFlagStore::default()), Arc::new(NoopOpener), profile, 0).unwrap();
//! assert!(gate.overlay().lock_overlay);
//! gate.unlock(10).unwrap();
//! assert!(!gate.overlay().lock_overlay);
//! ```

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Storage key of the unlock flag.
pub const UNLOCKED_KEY: &str = "unlocked";

/// Storage key of the cookie-consent flag.
pub const COOKIES_ACCEPTED_KEY: &str = "cookiesAccepted";

/// The only value that counts as a set flag.
pub const FLAG_TRUE: &str = "true";

/// Canonical external profile opened on unlock.
pub const PROFILE_URL: &str = "https://instagram.com/yaz.salaq";

/// Delay between banner mount and banner becoming visible.
pub const BANNER_ENTRANCE_DELAY_MS: u64 = 1_000;

/// Visible time before the banner accepts on its own.
pub const BANNER_AUTO_ACCEPT_MS: u64 = 8_000;

/// Exit animation after a manual accept.
pub const BANNER_EXIT_MANUAL_MS: u64 = 300;

/// Exit animation after an automatic accept.
pub const BANNER_EXIT_AUTO_MS: u64 = 500;

/// Persistence of the two client flags.
///
/// Implementations own the storage format; callers only see booleans.
pub trait FlagStore: Send {
    /// Returns `true` when the unlock flag is persisted.
    ///
    /// # Errors
    /// Returns [`GateError`] when storage cannot be read.
    fn is_unlocked(&self) -> Result<bool, GateError>;

    /// Persists the unlock flag.
    ///
    /// # Errors
    /// Returns [`GateError`] when storage cannot be written.
    fn set_unlocked(&mut self) -> Result<(), GateError>;

    /// Returns `true` when cookie consent is persisted.
    ///
    /// # Errors
    /// Returns [`GateError`] when storage cannot be read.
    fn has_cookie_consent(&self) -> Result<bool, GateError>;

    /// Persists cookie consent.
    ///
    /// # Errors
    /// Returns [`GateError`] when storage cannot be written.
    fn set_cookie_consent(&mut self) -> Result<(), GateError>;
}

/// String key-value flags shared by the store backends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FlagMap(BTreeMap<String, String>);

impl FlagMap {
    fn is_set(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|value| value == FLAG_TRUE)
    }

    fn set(&mut self, key: &str) {
        self.0.insert(key.to_string(), FLAG_TRUE.to_string());
    }
}

/// In-memory flag store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryFlagStore {
    flags: FlagMap,
}

impl MemoryFlagStore {
    /// Creates a store pre-seeded with raw key/value pairs.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let flags = entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Self {
            flags: FlagMap(flags),
        }
    }
}

impl FlagStore for MemoryFlagStore {
    fn is_unlocked(&self) -> Result<bool, GateError> {
        Ok(self.flags.is_set(UNLOCKED_KEY))
    }

    fn set_unlocked(&mut self) -> Result<(), GateError> {
        self.flags.set(UNLOCKED_KEY);
        Ok(())
    }

    fn has_cookie_consent(&self) -> Result<bool, GateError> {
        Ok(self.flags.is_set(COOKIES_ACCEPTED_KEY))
    }

    fn set_cookie_consent(&mut self) -> Result<(), GateError> {
        self.flags.set(COOKIES_ACCEPTED_KEY);
        Ok(())
    }
}

/// Flag store backed by a JSON object of string values on disk.
///
/// A missing file means no flags are set. Every write replaces the file
/// through a sibling `.tmp` file and a rename.
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
    flags: FlagMap,
}

impl FileFlagStore {
    /// Opens (or lazily creates) the flag file at `path`.
    ///
    /// # Errors
    /// Returns [`GateError::Io`] when the file exists but cannot be read and
    /// [`GateError::Corrupt`] when it is not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, GateError> {
        let path = path.into();
        let flags = match fs::read_to_string(&path) {
            Ok(raw) => FlagMap(serde_json::from_str(&raw).map_err(|error| {
                GateError::Corrupt(format!("{}: {error}", path.display()))
            })?),
            Err(error) if error.kind() == ErrorKind::NotFound => FlagMap::default(),
            Err(error) => return Err(GateError::Io(error)),
        };

        debug!(path = %path.display(), entries = flags.0.len(), "flag store opened");
        Ok(Self { path, flags })
    }

    /// Creates an empty store at `path` without reading it. The first write
    /// replaces whatever the file held.
    pub fn fresh(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            flags: FlagMap::default(),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(OsString::from).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn persist(&self) -> Result<(), GateError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        // Write beside the target and rename so a torn write never replaces
        // the last good file.
        let tmp_path = self.temp_path();
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &self.flags.0)
                .map_err(|error| GateError::Corrupt(error.to_string()))?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        debug!(path = %self.path.display(), entries = self.flags.0.len(), "flag store saved");
        Ok(())
    }
}

impl FlagStore for FileFlagStore {
    fn is_unlocked(&self) -> Result<bool, GateError> {
        Ok(self.flags.is_set(UNLOCKED_KEY))
    }

    fn set_unlocked(&mut self) -> Result<(), GateError> {
        self.flags.set(UNLOCKED_KEY);
        self.persist()
    }

    fn has_cookie_consent(&self) -> Result<bool, GateError> {
        Ok(self.flags.is_set(COOKIES_ACCEPTED_KEY))
    }

    fn set_cookie_consent(&mut self) -> Result<(), GateError> {
        self.flags.set(COOKIES_ACCEPTED_KEY);
        self.persist()
    }
}

/// Handle of one scheduled delayed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct ScheduledTask<E> {
    id: TimerId,
    due_ms: u64,
    event: E,
}

/// Cancellable delayed tasks on a caller-driven millisecond clock.
///
/// Nothing fires on its own: [`TimerQueue::fire_due`] releases every task
/// whose deadline has passed. Cancelled tasks are removed and never fire.
#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    next_id: u64,
    tasks: Vec<ScheduledTask<E>>,
}

impl<E> TimerQueue<E> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            tasks: Vec::new(),
        }
    }

    /// Schedules `event` to fire `delay_ms` after `now_ms`.
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.tasks.push(ScheduledTask {
            id,
            due_ms: now_ms.saturating_add(delay_ms),
            event,
        });
        id
    }

    /// Cancels one task. Returns `true` when it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        before != self.tasks.len()
    }

    /// Cancels every pending task.
    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    /// Removes and returns `(deadline, event)` pairs due at `now_ms`,
    /// earliest first.
    pub fn fire_due(&mut self, now_ms: u64) -> Vec<(u64, E)> {
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|task| task.due_ms <= now_ms);
        self.tasks = pending;
        due.sort_by_key(|task| (task.due_ms, task.id));
        due.into_iter().map(|task| (task.due_ms, task.event)).collect()
    }

    /// Returns the earliest pending deadline.
    pub fn next_due(&self) -> Option<u64> {
        self.tasks.iter().map(|task| task.due_ms).min()
    }

    /// Returns the number of pending tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Opens the external profile link as part of unlocking.
pub trait LinkOpener: Send + Sync {
    /// Opens `url` in a new browsing context.
    ///
    /// # Errors
    /// Returns [`GateError::Link`] when the link cannot be opened.
    fn open(&self, url: &Url) -> Result<(), GateError>;
}

/// Persisted-flag projection of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatingState {
    /// Lock overlay is active.
    pub locked: bool,
    /// Consent is still outstanding and the banner has not been dismissed.
    pub cookie_banner_visible: bool,
}

/// Render lifecycle of the cookie banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerPhase {
    /// Not mounted: consent already given, or waiting for unlock.
    Unmounted,
    /// Mounted and waiting out the entrance delay.
    Entering,
    /// On screen; auto-accept countdown running since `since_ms`.
    Visible {
        /// Clock value when the banner became visible.
        since_ms: u64,
    },
    /// Dismissal triggered; exit animation running.
    Exiting,
    /// Gone for good.
    Dismissed,
}

/// What the view should draw on top of the main content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlay {
    /// Lock overlay is drawn and the main content is blurred.
    pub lock_overlay: bool,
    /// Cookie banner is on screen.
    pub cookie_banner: bool,
    /// Main content accepts input.
    pub main_interactive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateEvent {
    BannerEnter,
    BannerAutoAccept,
    BannerExitDone,
}

/// Unlock/consent state machine.
pub struct Gate {
    store: Box<dyn FlagStore>,
    opener: Arc<dyn LinkOpener>,
    profile_url: Url,
    locked: bool,
    consent: bool,
    banner: BannerPhase,
    timers: TimerQueue<GateEvent>,
    auto_accept: Option<TimerId>,
    torn_down: bool,
}

impl Gate {
    /// Loads persisted flags and mounts the banner when it may be shown.
    ///
    /// # Errors
    /// Returns [`GateError`] when the flags cannot be read.
    pub fn start(
        store: Box<dyn FlagStore>,
        opener: Arc<dyn LinkOpener>,
        profile_url: Url,
        now_ms: u64,
    ) -> Result<Self, GateError> {
        let locked = !store.is_unlocked()?;
        let consent = store.has_cookie_consent()?;

        let mut gate = Self {
            store,
            opener,
            profile_url,
            locked,
            consent,
            banner: BannerPhase::Unmounted,
            timers: TimerQueue::new(),
            auto_accept: None,
            torn_down: false,
        };
        info!(locked, consent, "gate started");
        gate.mount_banner_if_needed(now_ms);
        Ok(gate)
    }

    /// Returns the flag projection.
    pub fn state(&self) -> GatingState {
        GatingState {
            locked: self.locked,
            cookie_banner_visible: !self.consent
                && !matches!(self.banner, BannerPhase::Exiting | BannerPhase::Dismissed),
        }
    }

    /// Returns the banner lifecycle phase.
    pub fn banner_phase(&self) -> BannerPhase {
        self.banner
    }

    /// Returns the render projection. The banner never draws while locked.
    pub fn overlay(&self) -> Overlay {
        Overlay {
            lock_overlay: self.locked,
            cookie_banner: !self.locked && matches!(self.banner, BannerPhase::Visible { .. }),
            main_interactive: !self.locked,
        }
    }

    /// Returns the backing flag store.
    pub fn flags(&self) -> &dyn FlagStore {
        self.store.as_ref()
    }

    /// Returns the profile opened on unlock.
    pub fn profile_url(&self) -> &Url {
        &self.profile_url
    }

    /// Returns the earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_due()
    }

    /// Opens the profile link and unlocks permanently.
    ///
    /// A link failure is logged and does not block the unlock. Calling this
    /// while already unlocked does nothing.
    ///
    /// # Errors
    /// Returns [`GateError`] when the unlock flag cannot be persisted; the
    /// in-memory state is unlocked regardless.
    pub fn unlock(&mut self, now_ms: u64) -> Result<(), GateError> {
        if !self.locked || self.torn_down {
            return Ok(());
        }

        if let Err(error) = self.opener.open(&self.profile_url) {
            warn!(%error, "profile link could not be opened");
        }

        self.locked = false;
        info!("gate unlocked");
        self.mount_banner_if_needed(now_ms);
        self.store.set_unlocked()
    }

    /// Handles an explicit click on the banner's accept button.
    ///
    /// # Errors
    /// Returns [`GateError`] when consent cannot be persisted.
    pub fn accept_cookies(&mut self, now_ms: u64) -> Result<(), GateError> {
        if self.torn_down || !matches!(self.banner, BannerPhase::Entering | BannerPhase::Visible { .. })
        {
            return Ok(());
        }

        if let Some(id) = self.auto_accept.take() {
            self.timers.cancel(id);
        }
        info!(trigger = "manual", "cookie consent accepted");
        self.dismiss_banner(now_ms, BANNER_EXIT_MANUAL_MS)
    }

    /// Advances the clock to `now_ms`, firing due timers.
    ///
    /// Follow-up timers are scheduled from the deadline that fired, not from
    /// `now_ms`, so a coarse clock reaches the same state as a fine one.
    ///
    /// # Errors
    /// Returns [`GateError`] when an auto-accept cannot be persisted.
    pub fn tick(&mut self, now_ms: u64) -> Result<(), GateError> {
        if self.torn_down {
            return Ok(());
        }

        loop {
            let fired = self.timers.fire_due(now_ms);
            if fired.is_empty() {
                return Ok(());
            }

            for (due_ms, event) in fired {
                match event {
                    GateEvent::BannerEnter => {
                        self.banner = BannerPhase::Visible { since_ms: due_ms };
                        self.auto_accept = Some(self.timers.schedule(
                            due_ms,
                            BANNER_AUTO_ACCEPT_MS,
                            GateEvent::BannerAutoAccept,
                        ));
                        debug!(due_ms, "cookie banner visible");
                    }
                    GateEvent::BannerAutoAccept => {
                        self.auto_accept = None;
                        info!(trigger = "timeout", "cookie consent accepted");
                        self.dismiss_banner(due_ms, BANNER_EXIT_AUTO_MS)?;
                    }
                    GateEvent::BannerExitDone => {
                        self.banner = BannerPhase::Dismissed;
                    }
                }
            }
        }
    }

    /// Cancels every pending timer. Later ticks and clicks are ignored.
    pub fn teardown(&mut self) {
        self.timers.cancel_all();
        self.auto_accept = None;
        self.torn_down = true;
        debug!("gate torn down");
    }

    fn mount_banner_if_needed(&mut self, now_ms: u64) {
        if self.locked || self.consent || self.banner != BannerPhase::Unmounted {
            return;
        }
        self.banner = BannerPhase::Entering;
        self.timers
            .schedule(now_ms, BANNER_ENTRANCE_DELAY_MS, GateEvent::BannerEnter);
    }

    fn dismiss_banner(&mut self, now_ms: u64, exit_ms: u64) -> Result<(), GateError> {
        self.consent = true;
        self.banner = BannerPhase::Exiting;
        // Entrance may still be pending after an early click.
        self.timers.cancel_all();
        self.timers
            .schedule(now_ms, exit_ms, GateEvent::BannerExitDone);
        self.store.set_cookie_consent()
    }
}

/// Errors produced by the gate and its stores.
#[derive(Debug, Error)]
pub enum GateError {
    /// Filesystem failure in a file-backed store.
    #[error("flag storage i/o failure: {0}")]
    Io(#[from] std::io::Error),
    /// Stored flags could not be decoded or encoded.
    #[error("flag storage is corrupt: {0}")]
    Corrupt(String),
    /// External link could not be opened.
    #[error("failed to open link: {0}")]
    Link(String),
}
