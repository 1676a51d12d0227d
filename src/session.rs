//! # Session Store Module
//!
//! Per-user conversation sessions. Each user owns at most one pending text
//! waiting for a color choice.
//!
//! Sessions sit behind their own async mutex so one event per user runs at a
//! time while different users proceed in parallel. The outer map lock is only
//! held for lookups and never across an `.await`.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use teloxide::types::UserId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::dialogue::QrDialogueState;

/// Transient state for one user
#[derive(Debug)]
pub struct Session {
    pending_text: Option<String>,
    last_activity: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            pending_text: None,
            last_activity: Instant::now(),
        }
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending_text.as_deref()
    }

    /// Stores `text`, replacing whatever was pending
    pub fn set_pending(&mut self, text: String) {
        self.pending_text = Some(text);
    }

    /// Removes and returns the pending text
    pub fn take_pending(&mut self) -> Option<String> {
        self.pending_text.take()
    }

    pub fn clear_pending(&mut self) {
        self.pending_text = None;
    }

    pub fn state(&self) -> QrDialogueState {
        QrDialogueState::from_pending(self.pending())
    }
}

/// Exclusive access to one user's session for the lifetime of the guard
pub struct SessionGuard {
    guard: OwnedMutexGuard<Session>,
}

impl Deref for SessionGuard {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.guard
    }
}

impl DerefMut for SessionGuard {
    fn deref_mut(&mut self) -> &mut Session {
        &mut self.guard
    }
}

type SessionSlot = Arc<AsyncMutex<Session>>;

/// Thread-safe store of per-user sessions
pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, SessionSlot>>,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Lock the user's session, creating an empty one on first contact.
    ///
    /// Waits while another event for the same user holds the session.
    pub async fn acquire(&self, user_id: UserId) -> SessionGuard {
        let slot = self.slot_or_insert(user_id);
        let mut guard = slot.lock_owned().await;
        guard.last_activity = Instant::now();
        SessionGuard { guard }
    }

    pub async fn set_pending(&self, user_id: UserId, text: String) {
        self.acquire(user_id).await.set_pending(text);
    }

    pub async fn get_pending(&self, user_id: UserId) -> Option<String> {
        let slot = self.existing_slot(user_id)?;
        let session = slot.lock().await;
        session.pending_text.clone()
    }

    /// Idempotent; unknown users are a no-op
    pub async fn clear_pending(&self, user_id: UserId) {
        if let Some(slot) = self.existing_slot(user_id) {
            slot.lock().await.clear_pending();
        }
    }

    pub fn len(&self) -> usize {
        self.lock_map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict sessions idle longer than the configured TTL
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    /// Evict sessions idle longer than the TTL as of `now`.
    ///
    /// Sessions referenced by an in-flight event are never evicted.
    pub fn evict_idle_at(&self, now: Instant) -> usize {
        let mut sessions = self.lock_map();
        Self::evict_idle_locked(&mut sessions, &self.config, now)
    }

    fn evict_idle_locked(
        sessions: &mut HashMap<UserId, SessionSlot>,
        config: &SessionConfig,
        now: Instant,
    ) -> usize {
        let before = sessions.len();
        sessions.retain(|_, slot| match idle_since(slot) {
            Some(last_activity) => now.saturating_duration_since(last_activity) <= config.idle_ttl,
            None => true,
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    fn slot_or_insert(&self, user_id: UserId) -> SessionSlot {
        let mut sessions = self.lock_map();
        if let Some(slot) = sessions.get(&user_id) {
            return Arc::clone(slot);
        }

        if sessions.len() >= self.config.max_sessions {
            Self::evict_idle_locked(&mut sessions, &self.config, Instant::now());
        }
        if sessions.len() >= self.config.max_sessions {
            let oldest = sessions
                .iter()
                .filter_map(|(id, slot)| idle_since(slot).map(|at| (*id, at)))
                .min_by_key(|(_, at)| *at)
                .map(|(id, _)| id);
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                    debug!(user_id = %id, "Evicted least recently active session at capacity");
                }
                None => warn!(
                    capacity = self.config.max_sessions,
                    "Session store over capacity, every session is in use"
                ),
            }
        }

        let slot = Arc::new(AsyncMutex::new(Session::new()));
        sessions.insert(user_id, Arc::clone(&slot));
        slot
    }

    fn existing_slot(&self, user_id: UserId) -> Option<SessionSlot> {
        self.lock_map().get(&user_id).map(Arc::clone)
    }

    fn lock_map(&self) -> MutexGuard<'_, HashMap<UserId, SessionSlot>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Last activity of a session nobody else references, `None` if in use.
fn idle_since(slot: &SessionSlot) -> Option<Instant> {
    if Arc::strong_count(slot) > 1 {
        return None;
    }
    slot.try_lock().ok().map(|session| session.last_activity)
}
