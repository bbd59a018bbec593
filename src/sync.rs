use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::mpsc;

use crate::client::{JsonRequest, Params, RequestMode};
use crate::pagination::{self, NavigationLink, PaginationModel};
use crate::query::{ListQuery, Location};
use crate::reply::Reply;
use crate::types::{CountReply, ListResource};

pub type Generation = u64;

/// Outcome of one request: the server's reply, or a transport/format
/// error rendered to text.
pub type Settled<T> = std::result::Result<Reply<T>, String>;

#[derive(Debug, Clone)]
pub enum SyncEvent<R> {
    Items {
        generation: Generation,
        result: Settled<Vec<R>>,
    },
    /// Carries its query: pagination is derived from the limit and page
    /// that were asked for, not from whatever query is active on arrival.
    Count {
        generation: Generation,
        query: ListQuery,
        result: Settled<CountReply>,
    },
}

impl<R> SyncEvent<R> {
    pub fn generation(&self) -> Generation {
        match self {
            SyncEvent::Items { generation, .. } | SyncEvent::Count { generation, .. } => {
                *generation
            }
        }
    }
}

/// Which of the active generation's responses have settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Settlement {
    #[default]
    Pending,
    ItemsReady,
    CountReady,
    BothReady,
}

impl Settlement {
    fn with_items(self) -> Self {
        match self {
            Settlement::Pending | Settlement::ItemsReady => Settlement::ItemsReady,
            Settlement::CountReady | Settlement::BothReady => Settlement::BothReady,
        }
    }

    fn with_count(self) -> Self {
        match self {
            Settlement::Pending | Settlement::CountReady => Settlement::CountReady,
            Settlement::ItemsReady | Settlement::BothReady => Settlement::BothReady,
        }
    }

    pub fn is_settled(&self) -> bool {
        *self == Settlement::BothReady
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Items,
    Count,
}

/// Something the user must be told after a settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The server answered with an application-level failure.
    Failure { panel: Panel, message: String },
    /// The request never produced a usable answer.
    Error { panel: Panel, message: String },
}

/// State of one list view: the active query and the two panels.
///
/// Rows and pagination each update as soon as their own response lands, so
/// the two may briefly disagree until both have settled. A failure in one
/// panel leaves the other, and its own previous state, untouched.
#[derive(Debug, Clone)]
pub struct ListView<R: ListResource> {
    pub query: ListQuery,
    pub rows: Vec<R>,
    pub pagination: Option<PaginationModel>,
    pub links: Vec<NavigationLink>,
    pub settlement: Settlement,
    pub selected: usize,
    pub updated_at: Option<DateTime<Local>>,
    latest: Generation,
    discard_stale: bool,
}

impl<R: ListResource> ListView<R> {
    pub fn new(query: ListQuery, discard_stale: bool) -> Self {
        Self {
            query,
            rows: Vec::new(),
            pagination: None,
            links: Vec::new(),
            settlement: Settlement::Pending,
            selected: 0,
            updated_at: None,
            latest: 0,
            discard_stale,
        }
    }

    pub fn location(&self) -> Location {
        Location::new(R::VIEW, self.query.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.latest > 0 && !self.settlement.is_settled()
    }

    pub fn selected_row(&self) -> Option<&R> {
        self.rows.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.rows.is_empty() && self.selected < self.rows.len() - 1 {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Make `query` the active one and open a new generation for it.
    pub fn begin(&mut self, query: ListQuery) -> Generation {
        self.latest += 1;
        self.query = query;
        self.settlement = if R::COUNT_ENDPOINT.is_some() {
            Settlement::Pending
        } else {
            Settlement::CountReady
        };
        self.latest
    }

    /// Fold one settled response into the view.
    pub fn apply(&mut self, event: SyncEvent<R>) -> Option<Notice> {
        let generation = event.generation();
        let is_latest = generation == self.latest;
        if !is_latest && self.discard_stale {
            tracing::debug!(
                view = ?R::VIEW,
                generation,
                latest = self.latest,
                "discarding stale list response"
            );
            return None;
        }

        match event {
            SyncEvent::Items { result, .. } => {
                if is_latest {
                    self.settlement = self.settlement.with_items();
                }
                match result {
                    Ok(Reply::Ok(rows)) => {
                        self.rows = rows;
                        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
                        self.updated_at = Some(Local::now());
                        None
                    }
                    Ok(Reply::Failure { message }) => {
                        tracing::info!(view = ?R::VIEW, %message, "items request failed");
                        Some(Notice::Failure {
                            panel: Panel::Items,
                            message,
                        })
                    }
                    Err(message) => Some(Notice::Error {
                        panel: Panel::Items,
                        message,
                    }),
                }
            }
            SyncEvent::Count { query, result, .. } => {
                if is_latest {
                    self.settlement = self.settlement.with_count();
                }
                match result {
                    Ok(Reply::Ok(CountReply { count })) => {
                        let model = PaginationModel::derive(count, query.limit, query.page);
                        self.links = pagination::render(&model, &Location::new(R::VIEW, query));
                        self.pagination = Some(model);
                        None
                    }
                    Ok(Reply::Failure { message }) => {
                        tracing::info!(view = ?R::VIEW, %message, "count request failed");
                        Some(Notice::Failure {
                            panel: Panel::Count,
                            message,
                        })
                    }
                    Err(message) => Some(Notice::Error {
                        panel: Panel::Count,
                        message,
                    }),
                }
            }
        }
    }
}

/// Dispatches the requests of a list view through a `JsonRequest`: one
/// items request and one count request per query, fired together.
///
/// Every dispatch is tagged with a generation. With stale discarding on, a
/// response from a superseded generation is dropped; otherwise the last
/// response to arrive wins, whichever query it belonged to.
#[derive(Clone)]
pub struct ListSynchronizer {
    requester: Arc<dyn JsonRequest>,
}

impl ListSynchronizer {
    pub fn new(requester: Arc<dyn JsonRequest>) -> Self {
        Self { requester }
    }

    /// Start a new generation for `query` and fire its requests without
    /// waiting on either. Each settlement is sent through `tx` wrapped by
    /// `wrap`. Nothing in flight is cancelled.
    pub fn synchronize<R, A>(
        &self,
        view: &mut ListView<R>,
        query: ListQuery,
        tx: &mpsc::UnboundedSender<A>,
        wrap: fn(SyncEvent<R>) -> A,
    ) -> Generation
    where
        R: ListResource,
        A: Send + 'static,
    {
        let generation = view.begin(query.clone());
        tracing::debug!(
            view = ?R::VIEW,
            generation,
            query = %query.encode(),
            "synchronizing list"
        );

        // Unpaginated lists take no query parameters.
        let item_params = if R::COUNT_ENDPOINT.is_some() {
            query.to_params()
        } else {
            Params::new()
        };
        self.spawn_items(generation, item_params, tx.clone(), wrap);

        if let Some(endpoint) = R::COUNT_ENDPOINT {
            self.spawn_count(endpoint, generation, query, tx.clone(), wrap);
        }

        generation
    }

    fn spawn_items<R, A>(
        &self,
        generation: Generation,
        params: Params,
        tx: mpsc::UnboundedSender<A>,
        wrap: fn(SyncEvent<R>) -> A,
    ) where
        R: ListResource,
        A: Send + 'static,
    {
        let requester = Arc::clone(&self.requester);
        tokio::spawn(async move {
            let result = requester
                .request(R::ITEMS_ENDPOINT, params, RequestMode::Read)
                .await
                .and_then(Reply::<Vec<R>>::from_payload)
                .map_err(|e| {
                    tracing::warn!(endpoint = R::ITEMS_ENDPOINT, generation, "{}", e);
                    e.to_string()
                });
            tx.send(wrap(SyncEvent::Items { generation, result }))
            .ok();
        });
    }

    fn spawn_count<R, A>(
        &self,
        endpoint: &'static str,
        generation: Generation,
        query: ListQuery,
        tx: mpsc::UnboundedSender<A>,
        wrap: fn(SyncEvent<R>) -> A,
    ) where
        R: ListResource,
        A: Send + 'static,
    {
        let requester = Arc::clone(&self.requester);
        tokio::spawn(async move {
            // The count is independent of sort, page, and limit.
            let result = requester
                .request(endpoint, Params::new(), RequestMode::Read)
                .await
                .and_then(Reply::<CountReply>::from_payload)
                .map_err(|e| {
                    tracing::warn!(endpoint, generation, "{}", e);
                    e.to_string()
                });
            tx.send(wrap(SyncEvent::Count {
                generation,
                query,
                result,
            }))
            .ok();
        });
    }
}
