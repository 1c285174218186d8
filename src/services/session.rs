use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{FetchTicket, MovieId, Notice, Notifier},
    services::{
        catalog::MovieCatalog,
        controller::{SearchController, SearchView},
    },
};

/// One user's search, with fetches running in the background
///
/// Every operation locks the controller, applies the change and, when the
/// fetch key moved, spawns a task that awaits the catalog and resolves the
/// ticket it was issued for. Superseded tasks still run to completion; the
/// controller drops their outcome.
pub struct SearchSession {
    id: Uuid,
    controller: Arc<Mutex<SearchController>>,
    catalog: Arc<dyn MovieCatalog>,
    notices: Mutex<mpsc::UnboundedReceiver<Notice>>,
    /// Bumped every time a fetch outcome is applied
    revision: Arc<watch::Sender<u64>>,
    last_active_ms: AtomicI64,
}

impl SearchSession {
    pub fn new(catalog: Arc<dyn MovieCatalog>) -> Self {
        let (notifier, notices) = Notifier::channel();
        let (revision, _) = watch::channel(0);

        Self {
            id: Uuid::new_v4(),
            controller: Arc::new(Mutex::new(SearchController::new(notifier))),
            catalog,
            notices: Mutex::new(notices),
            revision: Arc::new(revision),
            last_active_ms: AtomicI64::new(Utc::now().timestamp_millis()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.last_active_ms.load(Ordering::Relaxed))
            .single()
            .unwrap_or_else(Utc::now)
    }

    pub async fn submit(&self, raw: &str) -> AppResult<SearchView> {
        self.touch();
        let mut controller = self.controller.lock().await;
        if let Some(ticket) = controller.submit_query(raw)? {
            self.dispatch(ticket);
        }
        Ok(controller.view())
    }

    pub async fn change_page(&self, page: u32) -> AppResult<SearchView> {
        self.touch();
        let mut controller = self.controller.lock().await;
        if let Some(ticket) = controller.change_page(page)? {
            self.dispatch(ticket);
        }
        Ok(controller.view())
    }

    pub async fn select(&self, movie_id: MovieId) -> AppResult<SearchView> {
        self.touch();
        let mut controller = self.controller.lock().await;
        controller.select_movie(movie_id)?;
        Ok(controller.view())
    }

    pub async fn clear_selection(&self) -> SearchView {
        self.touch();
        let mut controller = self.controller.lock().await;
        controller.clear_selection();
        controller.view()
    }

    pub async fn view(&self) -> SearchView {
        self.touch();
        self.controller.lock().await.view()
    }

    /// Waits until no fetch is pending, or `timeout` elapses
    ///
    /// Returns the latest view either way.
    pub async fn settled_view(&self, timeout: Duration) -> SearchView {
        self.touch();
        let mut revision = self.revision.subscribe();

        let settle = async {
            loop {
                {
                    let controller = self.controller.lock().await;
                    if !controller.is_pending() {
                        return;
                    }
                }
                if revision.changed().await.is_err() {
                    return;
                }
            }
        };

        if tokio::time::timeout(timeout, settle).await.is_err() {
            tracing::debug!(session_id = %self.id, "Session did not settle before timeout");
        }

        self.controller.lock().await.view()
    }

    /// Takes every queued notice, oldest first
    pub async fn drain_notices(&self) -> Vec<Notice> {
        self.touch();
        let mut rx = self.notices.lock().await;
        let mut notices = Vec::new();
        while let Ok(notice) = rx.try_recv() {
            notices.push(notice);
        }
        notices
    }

    fn touch(&self) {
        self.last_active_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    fn dispatch(&self, ticket: FetchTicket) {
        let catalog = Arc::clone(&self.catalog);
        let controller = Arc::clone(&self.controller);
        let revision = Arc::clone(&self.revision);

        let span = tracing::info_span!(
            "movie_search",
            session_id = %self.id,
            query = %ticket.key.query,
            page = ticket.key.page,
            seq = ticket.seq,
        );

        tokio::spawn(
            async move {
                let outcome = catalog.search(&ticket.key.query, ticket.key.page).await;
                let applied = controller.lock().await.resolve(&ticket, outcome);
                if applied {
                    revision.send_modify(|r| *r += 1);
                }
            }
            .instrument(span),
        );
    }
}
