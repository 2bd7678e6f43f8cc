//! Session Manager
//!
//! Keeps sessions in memory and drops the ones left idle longer than the
//! configured TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Session;
use crate::config::RenderConfig;
use crate::error::{AppError, Result};

pub type SharedSession = Arc<Mutex<Session>>;

/// Manages inspection sessions
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionManagerInner>,
}

struct SessionManagerInner {
    /// Active sessions indexed by ID
    sessions: RwLock<HashMap<Uuid, SharedSession>>,

    /// Render bounds handed to new sessions
    render: RenderConfig,

    /// Idle time before a session expires
    ttl: Duration,
}

impl SessionManager {
    pub fn new(render: RenderConfig, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(SessionManagerInner {
                sessions: RwLock::new(HashMap::new()),
                render,
                ttl,
            }),
        }
    }

    /// Create a new session
    pub async fn create_session(&self) -> SharedSession {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session::new(id, self.inner.render)));

        self.inner
            .sessions
            .write()
            .await
            .insert(id, Arc::clone(&session));

        tracing::info!(session_id = %id, dpi = self.inner.render.default_dpi, "Created session");
        session
    }

    /// Get a session by ID, marking it as used
    pub async fn get_session(&self, id: Uuid) -> Result<SharedSession> {
        let session = self
            .inner
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;

        // A held lock means a request is running on it right now
        if let Some(mut s) = session.try_lock() {
            s.touch();
        }
        Ok(session)
    }

    /// Get a session by string ID
    pub async fn get_session_by_str(&self, id: &str) -> Result<SharedSession> {
        let uuid = Uuid::parse_str(id).map_err(|_| AppError::SessionNotFound(id.to_string()))?;
        self.get_session(uuid).await
    }

    /// Delete a session
    pub async fn remove_session(&self, id: Uuid) -> Result<()> {
        self.inner
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;

        tracing::info!(session_id = %id, "Session removed");
        Ok(())
    }

    pub async fn session_count(&self) -> usize {
        self.inner.sessions.read().await.len()
    }

    /// Drop sessions idle for longer than the TTL
    ///
    /// Returns the number of sessions removed. A session whose lock is held
    /// by a running request is in use and is skipped.
    pub async fn cleanup_expired(&self) -> usize {
        let ttl = chrono::Duration::from_std(self.inner.ttl)
            .unwrap_or_else(|_| chrono::Duration::days(36_500));
        let cutoff = Utc::now() - ttl;

        let mut sessions = self.inner.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, session| match session.try_lock() {
            Some(s) if s.last_accessed < cutoff => {
                tracing::debug!(session_id = %id, "Expired idle session");
                false
            }
            _ => true,
        });
        let count = before - sessions.len();

        if count > 0 {
            tracing::info!(count = count, "Cleaned up expired sessions");
        }
        count
    }

    /// Start background cleanup task
    pub fn start_cleanup_task(self, every: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);

            loop {
                interval.tick().await;
                self.cleanup_expired().await;
            }
        })
    }
}
