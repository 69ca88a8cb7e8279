//! Paginated fetch controller.
//!
//! `load`, `refresh` and `load_more` are mutually exclusive: the status flag
//! is checked and set in one `send_if_modified` closure before the fetch
//! starts. Each started fetch captures the current generation and its
//! result is applied only if that generation is still current, which is how
//! `reset` and `set_filters` abandon in-flight calls.
//!
//! A refresh triggered from outside while a fetch is in flight is not
//! dropped: it is parked in `refresh_pending` and run by whichever call
//! finishes that fetch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, info_span, warn, Instrument};

use fw_core::finance::{FetchStatus, ListFilters, Page, PageBuffer, PageItem};
use fw_core::ports::{
    ErrorKind, GatewayError, PageSource, RefreshTriggerPort, SessionInvalidationPort,
};

use crate::usecases::internal::{with_timeout, DEFAULT_REQUEST_TIMEOUT};

pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Observable controller state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSnapshot<T> {
    pub buffer: PageBuffer<T>,
    pub status: FetchStatus,
    /// Human-readable message of the last failed fetch.
    pub error: Option<String>,
    pub filters: ListFilters,
    /// An external refresh arrived while busy and runs once idle.
    pub refresh_pending: bool,
}

impl<T> Default for PageSnapshot<T> {
    fn default() -> Self {
        Self {
            buffer: PageBuffer::default(),
            status: FetchStatus::Idle,
            error: None,
            filters: ListFilters::default(),
            refresh_pending: false,
        }
    }
}

/// What happened to one controller call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Fetched and applied to the buffer.
    Applied,
    /// Not started: another fetch in flight, or nothing more to load.
    Skipped,
    /// Fetched, but superseded by `reset`/`set_filters` before it landed.
    Discarded,
    /// Fetch failed; the message is in the snapshot's `error`.
    Failed { kind: ErrorKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Load,
    Refresh,
    LoadMore,
}

impl Operation {
    fn status(self) -> FetchStatus {
        match self {
            Operation::Load => FetchStatus::Loading,
            Operation::Refresh => FetchStatus::Refreshing,
            Operation::LoadMore => FetchStatus::LoadingMore,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Refresh => "refresh",
            Operation::LoadMore => "load_more",
        }
    }
}

struct Ticket {
    generation: u64,
    offset: usize,
    filters: ListFilters,
}

pub struct PaginatedFetchController<T: PageItem> {
    name: &'static str,
    source: Arc<dyn PageSource<T>>,
    state: watch::Sender<PageSnapshot<T>>,
    // Only read or bumped inside `state` closures, which serializes it with
    // the status flag.
    generation: AtomicU64,
    page_size: usize,
    request_timeout: Duration,
    session_invalidation: Option<Arc<dyn SessionInvalidationPort>>,
}

impl<T: PageItem> PaginatedFetchController<T> {
    pub fn new(name: &'static str, source: Arc<dyn PageSource<T>>) -> Self {
        let (state, _) = watch::channel(PageSnapshot::default());
        Self {
            name,
            source,
            state,
            generation: AtomicU64::new(0),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            session_invalidation: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Forward `Unauthorized` fetch failures to the session owner.
    pub fn with_session_invalidation(mut self, port: Arc<dyn SessionInvalidationPort>) -> Self {
        self.session_invalidation = Some(port);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn snapshot(&self) -> PageSnapshot<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PageSnapshot<T>> {
        self.state.subscribe()
    }

    /// Fetch the first page and replace the buffer with it.
    ///
    /// If a refresh was parked while this fetch ran, it is issued before
    /// returning.
    pub async fn load(&self) -> FetchOutcome {
        self.run(Operation::Load).await
    }

    /// Like [`load`](Self::load), reported as a pull-to-refresh. A failed
    /// refresh keeps the current buffer.
    pub async fn refresh(&self) -> FetchOutcome {
        self.run(Operation::Refresh).await
    }

    /// Fetch the page after `offset` and append it.
    pub async fn load_more(&self) -> FetchOutcome {
        self.run(Operation::LoadMore).await
    }

    /// Drop the buffer and abandon any in-flight fetch.
    pub fn reset(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            state.buffer.clear();
            state.status = FetchStatus::Idle;
            state.error = None;
            state.refresh_pending = false;
        });
        debug!(list = self.name, "list reset");
    }

    /// Replace the filters, dropping the buffer. Call `load` afterwards.
    pub fn set_filters(&self, filters: ListFilters) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            state.buffer.clear();
            state.status = FetchStatus::Idle;
            state.error = None;
            state.refresh_pending = false;
            state.filters = filters;
        });
        debug!(list = self.name, "list filters changed");
    }

    /// Replace a held item in place. Returns false if it is not held.
    pub fn update_item(&self, item: T) -> bool {
        self.state
            .send_if_modified(|state| state.buffer.update_item(item))
    }

    /// Remove a held item locally.
    pub fn remove_item(&self, id: &str) -> Option<T> {
        let mut removed = None;
        self.state.send_if_modified(|state| {
            removed = state.buffer.remove_item(id);
            removed.is_some()
        });
        removed
    }

    async fn run(&self, operation: Operation) -> FetchOutcome {
        let outcome = self.run_once(operation).await;
        if outcome == FetchOutcome::Skipped {
            return outcome;
        }
        while self.has_parked_refresh() {
            debug!(list = self.name, "running parked refresh");
            // Skipped means another fetch took over; it runs the parked refresh.
            if self.run_once(Operation::Refresh).await == FetchOutcome::Skipped {
                break;
            }
        }
        outcome
    }

    fn has_parked_refresh(&self) -> bool {
        self.state.borrow().refresh_pending
    }

    /// Park a refresh behind the in-flight fetch. False if the controller
    /// is already idle.
    fn park_refresh(&self) -> bool {
        self.state.send_if_modified(|state| {
            if !state.status.is_busy() {
                return false;
            }
            state.refresh_pending = true;
            true
        })
    }

    async fn run_once(&self, operation: Operation) -> FetchOutcome {
        let span = info_span!(
            "usecase.pagination.fetch",
            list = self.name,
            op = operation.name()
        );
        async {
            let Some(ticket) = self.begin(operation) else {
                debug!("fetch skipped");
                return FetchOutcome::Skipped;
            };

            let result = with_timeout(
                "fetch page",
                self.request_timeout,
                self.source
                    .fetch_page(ticket.offset, self.page_size, &ticket.filters),
            )
            .await;

            let outcome = self.finish(operation, ticket.generation, result);

            match outcome {
                FetchOutcome::Applied => {
                    let state = self.state.borrow();
                    info!(
                        items = state.buffer.len(),
                        offset = state.buffer.offset(),
                        total = state.buffer.total(),
                        has_more = state.buffer.has_more(),
                        "page applied"
                    );
                }
                FetchOutcome::Discarded => debug!("stale page discarded"),
                FetchOutcome::Failed { kind } => {
                    warn!(?kind, "page fetch failed");
                }
                FetchOutcome::Skipped => {}
            }

            // A discarded result belongs to an abandoned fetch.
            if outcome == (FetchOutcome::Failed { kind: ErrorKind::Unauthorized }) {
                if let Some(port) = &self.session_invalidation {
                    port.invalidate_session("list fetch unauthorized");
                }
            }

            outcome
        }
        .instrument(span)
        .await
    }

    fn begin(&self, operation: Operation) -> Option<Ticket> {
        let mut ticket = None;
        self.state.send_if_modified(|state| {
            if state.status.is_busy() {
                return false;
            }
            if operation == Operation::LoadMore && !state.buffer.has_more() {
                return false;
            }
            state.status = operation.status();
            if operation != Operation::LoadMore {
                // This fetch starts after the trigger, so it covers it.
                state.refresh_pending = false;
            }
            ticket = Some(Ticket {
                generation: self.generation.load(Ordering::SeqCst),
                offset: match operation {
                    Operation::LoadMore => state.buffer.offset(),
                    Operation::Load | Operation::Refresh => 0,
                },
                filters: state.filters.clone(),
            });
            true
        });
        ticket
    }

    fn finish(
        &self,
        operation: Operation,
        generation: u64,
        result: Result<Page<T>, GatewayError>,
    ) -> FetchOutcome {
        let mut outcome = FetchOutcome::Discarded;
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            state.status = FetchStatus::Idle;
            match result {
                Ok(page) => {
                    match operation {
                        Operation::Load | Operation::Refresh => state.buffer.replace_with(page),
                        Operation::LoadMore => {
                            state.buffer.append(page);
                        }
                    }
                    state.error = None;
                    outcome = FetchOutcome::Applied;
                }
                Err(err) => {
                    if operation == Operation::Load {
                        state.buffer.clear();
                    }
                    state.error = Some(err.to_string());
                    outcome = FetchOutcome::Failed { kind: err.kind() };
                }
            }
            true
        });
        outcome
    }
}

#[async_trait]
impl<T: PageItem> RefreshTriggerPort for PaginatedFetchController<T> {
    async fn trigger_refresh(&self) {
        while self.refresh().await == FetchOutcome::Skipped {
            if self.park_refresh() {
                debug!(list = self.name, "refresh parked behind in-flight fetch");
                return;
            }
        }
    }
}
