use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    services::{catalog::MovieCatalog, session::SearchSession},
};

const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn MovieCatalog>,
    pub sessions: Arc<RwLock<HashMap<Uuid, Arc<SearchSession>>>>,
    /// Upper bound for `?wait=true` long-polls
    pub settle_timeout: Duration,
}

impl AppState {
    pub fn new(catalog: Arc<dyn MovieCatalog>) -> Self {
        Self {
            catalog,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
        }
    }

    pub fn with_settle_timeout(mut self, settle_timeout: Duration) -> Self {
        self.settle_timeout = settle_timeout;
        self
    }

    pub async fn create_session(&self) -> Arc<SearchSession> {
        let session = Arc::new(SearchSession::new(Arc::clone(&self.catalog)));
        self.sessions
            .write()
            .await
            .insert(session.id(), Arc::clone(&session));

        tracing::info!(session_id = %session.id(), "Search session created");
        session
    }

    pub async fn session(&self, id: Uuid) -> AppResult<Arc<SearchSession>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
    }

    pub async fn remove_session(&self, id: Uuid) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
    }

    /// Drops sessions that have been idle for longer than `max_idle`
    pub async fn reap_idle(&self, max_idle: chrono::Duration) -> usize {
        let cutoff = chrono::Utc::now() - max_idle;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_active() >= cutoff);
        before - sessions.len()
    }

    /// Spawns the background task that periodically reaps idle sessions
    pub fn spawn_session_reaper(
        &self,
        interval: Duration,
        max_idle: chrono::Duration,
    ) -> SessionReaperHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let state = self.clone();

        tokio::spawn(async move {
            Self::session_reaper_task(state, interval, max_idle, shutdown_rx).await;
        });

        SessionReaperHandle { shutdown_tx }
    }

    async fn session_reaper_task(
        state: AppState,
        interval: Duration,
        max_idle: chrono::Duration,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Session reaper task started");
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let reaped = state.reap_idle(max_idle).await;
                    if reaped > 0 {
                        tracing::info!(reaped, "Reaped idle search sessions");
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Session reaper shutting down");
                    break;
                }
            }
        }
    }
}

/// Handle for stopping the session reaper
pub struct SessionReaperHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SessionReaperHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}
