//! In-process storage for active wizard sessions

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::info;

use core_kernel::SessionId;
use domain_claims::WizardController;

#[derive(Debug)]
struct Session {
    wizard: WizardController,
    last_active: Instant,
}

/// Active wizards keyed by session id
///
/// Each operation holds the lock only while a synchronous wizard transition
/// runs, so concurrent requests against one session are serialized. Completed
/// wizards are removed by the caller; abandoned ones by [`evict_idle`](Self::evict_idle).
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new wizard and returns its session id
    pub async fn insert(&self, wizard: WizardController) -> SessionId {
        let id = SessionId::new();
        let session = Session {
            wizard,
            last_active: Instant::now(),
        };
        self.sessions.write().await.insert(id, session);
        id
    }

    /// Runs `f` against a session's wizard, or returns `None` if the id is unknown
    pub async fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut WizardController) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(&id).map(|session| {
            session.last_active = Instant::now();
            f(&mut session.wizard)
        })
    }

    /// Read-only access to a session's wizard
    pub async fn inspect<T>(&self, id: SessionId, f: impl FnOnce(&WizardController) -> T) -> Option<T> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).map(|session| f(&session.wizard))
    }

    /// Drops a session, returning its wizard if it existed
    pub async fn remove(&self, id: SessionId) -> Option<WizardController> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|session| session.wizard)
    }

    /// Drops sessions untouched for longer than `max_idle`
    ///
    /// # Returns
    ///
    /// The number of sessions removed
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_active.elapsed() <= max_idle);
        before - sessions.len()
    }

    /// Runs [`evict_idle`](Self::evict_idle) on a timer until the runtime shuts down
    pub fn spawn_idle_eviction(&self, max_idle: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        let period = (max_idle / 4).max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(max_idle).await;
                if evicted > 0 {
                    info!(evicted, "idle wizard sessions evicted");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
