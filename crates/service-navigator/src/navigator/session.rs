use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{EligibilityResult, Explanation, FormAnswers, IntentMatch, PolicyContext};
use super::summary::SummaryArtifact;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

/// Outcome of a completed submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionOutcome {
    pub answers: FormAnswers,
    pub result: EligibilityResult,
    pub explanation: Explanation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<SummaryArtifact>,
}

/// Conversation state for one citizen. Never shared between ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub query: Option<String>,
    pub intent: Option<IntentMatch>,
    pub context: PolicyContext,
    pub outcome: Option<SubmissionOutcome>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            query: None,
            intent: None,
            context: PolicyContext::empty(),
            outcome: None,
        }
    }

    pub fn is_analyzed(&self) -> bool {
        self.intent
            .as_ref()
            .map(IntentMatch::is_recognized)
            .unwrap_or(false)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.id.clone());
    }
}

/// Storage abstraction so the service can be exercised in isolation.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, session: Session) -> Result<Session, SessionStoreError>;
    fn update(&self, session: Session) -> Result<(), SessionStoreError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Sessions kept by [`InMemorySessionRepository::new`] before the oldest is evicted.
pub const DEFAULT_SESSION_CAPACITY: usize = 10_000;

#[derive(Debug, Default)]
struct SessionTable {
    sessions: HashMap<SessionId, Session>,
    // insertion order, oldest first
    order: VecDeque<SessionId>,
}

/// Bounded in-process store; inserting past capacity drops the oldest session.
#[derive(Debug)]
pub struct InMemorySessionRepository {
    table: Mutex<SessionTable>,
    capacity: usize,
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: Mutex::new(SessionTable::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn session_count(&self) -> Result<usize, SessionStoreError> {
        Ok(self.lock()?.sessions.len())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SessionTable>, SessionStoreError> {
        self.table
            .lock()
            .map_err(|_| SessionStoreError::Unavailable("session lock poisoned".to_string()))
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn insert(&self, session: Session) -> Result<Session, SessionStoreError> {
        let mut table = self.lock()?;
        if table.sessions.contains_key(&session.id) {
            return Err(SessionStoreError::Conflict);
        }
        while table.sessions.len() >= self.capacity {
            let Some(oldest) = table.order.pop_front() else {
                break;
            };
            table.sessions.remove(&oldest);
            debug!(session = %oldest, "evicted oldest session");
        }
        table.order.push_back(session.id.clone());
        table.sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn update(&self, session: Session) -> Result<(), SessionStoreError> {
        let mut table = self.lock()?;
        match table.sessions.get_mut(&session.id) {
            Some(existing) => {
                *existing = session;
                Ok(())
            }
            None => Err(SessionStoreError::NotFound),
        }
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.lock()?.sessions.get(id).cloned())
    }
}
