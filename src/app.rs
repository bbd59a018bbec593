use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;

use crate::action::{Action, View};
use crate::cache::RememberedLocations;
use crate::client::{JsonRequest, Params, RequestMode};
use crate::config::Config;
use crate::detail::{self, Detail, Lookup, UserKey};
use crate::error::Result;
use crate::pagination::{LinkRole, NavigationLink};
use crate::query::{ListQuery, Location, QueryDefaults};
use crate::reply::Reply;
use crate::sync::{ListSynchronizer, ListView, Notice, Panel};
use crate::tui::Event;
use crate::types::{Ack, Asset, ListResource, Page, User};
use crate::validate::{self, FieldValidity, Validation};

const LIMIT_STEP: i64 = 5;
const RELOAD_ASSETS_ENDPOINT: &str = "/api/asset/reload";

/// Lookup prompt opened over the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupPrompt {
    pub view: View,
    pub input: String,
    /// `None` while unchecked or still being checked.
    pub validity: Option<FieldValidity>,
}

/// What a detail fetch is keyed on.
#[derive(Debug, Clone)]
enum DetailKey {
    User(UserKey),
    Page(String),
    Asset(String),
}

pub struct App {
    pub view: View,
    pub users: ListView<User>,
    pub pages: ListView<Page>,
    pub assets: ListView<Asset>,
    pub lookup: Option<LookupPrompt>,
    pub detail: Option<Detail>,
    pub scroll_offset: u16,
    /// Failure reported by the server, shown verbatim.
    pub alert: Option<String>,
    pub error: Option<String>,
    /// A write is in flight; further writes are refused until it settles.
    pub submitting: bool,
    pub should_quit: bool,
    base_url: String,
    remembered: Option<RememberedLocations>,
    lookup_id: u64,
    requester: Arc<dyn JsonRequest>,
    synchronizer: ListSynchronizer,
    action_tx: mpsc::UnboundedSender<Action>,
}

fn initial_query(
    view: View,
    start: Option<&Location>,
    remembered: Option<&RememberedLocations>,
) -> ListQuery {
    start
        .filter(|loc| loc.view == view)
        .map(|loc| loc.query.clone())
        .or_else(|| remembered.and_then(|r| r.get(view)).map(|loc| loc.query))
        .unwrap_or_else(|| ListQuery::new(&QueryDefaults::for_view(view)))
}

fn lookup_action<T>(lookup: Lookup<T>, wrap: fn(T) -> Detail, id: u64) -> Action {
    match lookup {
        Lookup::Found(entity) => Action::DetailLoaded(Box::new(wrap(entity)), id),
        Lookup::Field(validity) => Action::LookupValidated(Validation::Field(validity), id),
        Lookup::Alert(message) => Action::Alert(message),
    }
}

impl App {
    pub fn new(
        requester: Arc<dyn JsonRequest>,
        config: &Config,
        start: Option<Location>,
        remembered: Option<RememberedLocations>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        let discard = config.lists.discard_stale_responses;
        let query = |view| initial_query(view, start.as_ref(), remembered.as_ref());
        let users = ListView::new(query(View::Users), discard);
        let pages = ListView::new(query(View::Pages), discard);
        let assets = ListView::new(query(View::Assets), discard);

        Self {
            view: start.map(|loc| loc.view).unwrap_or_default(),
            users,
            pages,
            assets,
            lookup: None,
            detail: None,
            scroll_offset: 0,
            alert: None,
            error: None,
            submitting: false,
            should_quit: false,
            base_url: config.server.base_url.trim_end_matches('/').to_string(),
            remembered,
            lookup_id: 0,
            synchronizer: ListSynchronizer::new(Arc::clone(&requester)),
            requester,
            action_tx,
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::Refresh,
            Event::Key(key) => self.handle_key(key),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        if self.lookup.is_some() {
            return match key.code {
                KeyCode::Esc => Action::CloseLookup,
                KeyCode::Enter => Action::LookupSubmit,
                KeyCode::Backspace => Action::LookupBackspace,
                KeyCode::Char(c) => Action::LookupInput(c),
                _ => Action::None,
            };
        }

        if self.detail.is_some() {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => Action::CloseDetail,
                KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
                KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Tab => Action::NextView,
            KeyCode::BackTab => Action::PrevView,
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Enter => Action::Select,
            KeyCode::Char('+') | KeyCode::Char('=') => Action::ChangeLimit(LIMIT_STEP),
            KeyCode::Char('-') => Action::ChangeLimit(-LIMIT_STEP),
            KeyCode::Char('s') => Action::CycleSort,
            KeyCode::Char('d') => Action::ToggleDescending,
            KeyCode::Home | KeyCode::Char('g') => Action::FollowLink(LinkRole::First),
            KeyCode::Char('h') | KeyCode::Left => Action::FollowLink(LinkRole::Prev),
            KeyCode::Char('l') | KeyCode::Right => Action::FollowLink(LinkRole::Next),
            KeyCode::End | KeyCode::Char('G') => Action::FollowLink(LinkRole::Last),
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char('R') if self.view == View::Assets => Action::ReloadAssets,
            KeyCode::Char('y') => Action::YankLocation,
            KeyCode::Char('o') => Action::OpenLocation,
            KeyCode::Char('/') => Action::OpenLookup,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if action.is_user_input() {
            self.alert = None;
            self.error = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::NextView => {
                self.view = self.view.next();
                self.refresh();
            }
            Action::PrevView => {
                self.view = self.view.prev();
                self.refresh();
            }
            Action::Refresh => self.refresh(),

            Action::ScrollUp => {
                if self.detail.is_some() {
                    self.scroll_offset = self.scroll_offset.saturating_sub(1);
                } else {
                    match self.view {
                        View::Users => self.users.select_prev(),
                        View::Pages => self.pages.select_prev(),
                        View::Assets => self.assets.select_prev(),
                    }
                }
            }
            Action::ScrollDown => {
                if let Some(detail) = &self.detail {
                    let last = detail.line_count().saturating_sub(1);
                    let last = u16::try_from(last).unwrap_or(u16::MAX);
                    self.scroll_offset = self.scroll_offset.saturating_add(1).min(last);
                } else {
                    match self.view {
                        View::Users => self.users.select_next(),
                        View::Pages => self.pages.select_next(),
                        View::Assets => self.assets.select_next(),
                    }
                }
            }
            Action::Select => {
                let key = match self.view {
                    View::Users => self
                        .users
                        .selected_row()
                        .map(|u| DetailKey::User(UserKey::Id(u.id.clone()))),
                    View::Pages => self
                        .pages
                        .selected_row()
                        .map(|p| DetailKey::Page(p.path.clone())),
                    View::Assets => self
                        .assets
                        .selected_row()
                        .map(|a| DetailKey::Asset(a.path.clone())),
                };
                if let Some(key) = key {
                    self.spawn_fetch_detail(key);
                }
            }

            // Query edits only apply to paged views
            Action::ChangeLimit(delta) => {
                if self.view.is_paged() {
                    let query = self.query_of(self.view);
                    let next = query.with_limit(i64::from(query.limit) + delta);
                    self.navigate(Location::new(self.view, next));
                }
            }
            Action::CycleSort => {
                if let Some(next) = self.next_sort() {
                    self.navigate(Location::new(self.view, next));
                }
            }
            Action::ToggleDescending => {
                if self.view.is_paged() {
                    let query = self.query_of(self.view);
                    let next = query.with_sort(&query.sort_key, !query.descending);
                    self.navigate(Location::new(self.view, next));
                }
            }
            Action::FollowLink(role) => {
                let target = self
                    .links_of(self.view)
                    .iter()
                    .find(|link| link.role == role)
                    .and_then(|link| Location::parse(&link.href));
                match target {
                    Some(location) => self.navigate(location),
                    None => tracing::debug!(%role, "no such navigation link"),
                }
            }

            Action::UsersSynced(event) => {
                let notice = self.users.apply(event);
                self.surface(notice);
            }
            Action::PagesSynced(event) => {
                let notice = self.pages.apply(event);
                self.surface(notice);
            }
            Action::AssetsSynced(event) => {
                let notice = self.assets.apply(event);
                self.surface(notice);
            }

            Action::YankLocation => {
                let url = self.location_url();
                match arboard::Clipboard::new().and_then(|mut c| c.set_text(url.clone())) {
                    Ok(()) => tracing::debug!(%url, "copied location"),
                    Err(e) => self.error = Some(format!("Clipboard unavailable: {}", e)),
                }
            }
            Action::OpenLocation => {
                let url = self.location_url();
                if let Err(e) = open::that(&url) {
                    self.error = Some(format!("Could not open {}: {}", url, e));
                }
            }

            Action::OpenLookup => {
                self.lookup = Some(LookupPrompt {
                    view: self.view,
                    input: String::new(),
                    validity: None,
                });
            }
            Action::CloseLookup => {
                self.lookup = None;
                self.lookup_id += 1;
            }
            Action::LookupInput(c) => {
                if let Some(prompt) = self.lookup.as_mut() {
                    prompt.input.push(c);
                }
                self.spawn_validate();
            }
            Action::LookupBackspace => {
                if let Some(prompt) = self.lookup.as_mut() {
                    prompt.input.pop();
                }
                self.spawn_validate();
            }
            Action::LookupSubmit => {
                let key = self.lookup.as_ref().and_then(|prompt| {
                    let input = prompt.input.trim();
                    match prompt.view {
                        View::Users => UserKey::from_input(input).map(DetailKey::User),
                        _ if input.is_empty() => None,
                        View::Pages => Some(DetailKey::Page(input.to_string())),
                        View::Assets => Some(DetailKey::Asset(input.to_string())),
                    }
                });
                if let Some(key) = key {
                    self.spawn_fetch_detail(key);
                }
            }
            Action::LookupValidated(validation, id) => {
                if id != self.lookup_id {
                    tracing::debug!(id, latest = self.lookup_id, "discarding stale check");
                    return;
                }
                match (validation, self.lookup.as_mut()) {
                    (Validation::Field(validity), Some(prompt)) => prompt.validity = Some(validity),
                    (Validation::Field(FieldValidity::Invalid(message)), None) => {
                        self.alert = Some(message)
                    }
                    (Validation::Field(FieldValidity::Valid), None) => {}
                    (Validation::Alert(message), _) => self.alert = Some(message),
                }
            }
            Action::DetailLoaded(detail, id) => {
                if id == self.lookup_id {
                    self.lookup = None;
                    self.detail = Some(*detail);
                    self.scroll_offset = 0;
                }
            }
            Action::CloseDetail => {
                self.detail = None;
                self.scroll_offset = 0;
            }

            Action::ReloadAssets => {
                if self.submitting {
                    tracing::debug!("write already in flight");
                    return;
                }
                self.submitting = true;
                self.spawn_reload_assets();
            }
            Action::WriteFinished { failure } => {
                self.submitting = false;
                match failure {
                    Some(message) => self.alert = Some(message),
                    None => self.refresh_view(View::Assets),
                }
            }

            Action::Alert(message) => {
                tracing::info!(%message, "server reported failure");
                self.alert = Some(message);
            }
            Action::Error(message) => {
                self.error = Some(message);
            }
            Action::None => {}
        }
    }

    pub fn location(&self) -> Location {
        match self.view {
            View::Users => self.users.location(),
            View::Pages => self.pages.location(),
            View::Assets => self.assets.location(),
        }
    }

    /// The location as a full URL on the configured server.
    pub fn location_url(&self) -> String {
        format!("{}{}", self.base_url, self.location().href())
    }

    pub fn is_loading(&self) -> bool {
        match self.view {
            View::Users => self.users.is_loading(),
            View::Pages => self.pages.is_loading(),
            View::Assets => self.assets.is_loading(),
        }
    }

    pub fn links_of(&self, view: View) -> &[NavigationLink] {
        match view {
            View::Users => &self.users.links,
            View::Pages => &self.pages.links,
            View::Assets => &self.assets.links,
        }
    }

    fn query_of(&self, view: View) -> &ListQuery {
        match view {
            View::Users => &self.users.query,
            View::Pages => &self.pages.query,
            View::Assets => &self.assets.query,
        }
    }

    fn sort_keys(view: View) -> &'static [&'static str] {
        match view {
            View::Users => User::SORT_KEYS,
            View::Pages => Page::SORT_KEYS,
            View::Assets => Asset::SORT_KEYS,
        }
    }

    fn next_sort(&self) -> Option<ListQuery> {
        let keys = Self::sort_keys(self.view);
        if keys.is_empty() {
            return None;
        }
        let query = self.query_of(self.view);
        let next = keys
            .iter()
            .position(|k| *k == query.sort_key)
            .map(|i| (i + 1) % keys.len())
            .unwrap_or(0);
        Some(query.with_sort(keys[next], query.descending))
    }

    fn refresh(&mut self) {
        self.refresh_view(self.view);
    }

    fn refresh_view(&mut self, view: View) {
        let query = self.query_of(view).clone();
        self.synchronize(view, query);
    }

    fn navigate(&mut self, location: Location) {
        self.view = location.view;
        self.synchronize(location.view, location.query);
    }

    fn synchronize(&mut self, view: View, query: ListQuery) {
        let tx = &self.action_tx;
        match view {
            View::Users => {
                self.synchronizer
                    .synchronize(&mut self.users, query, tx, Action::UsersSynced);
            }
            View::Pages => {
                self.synchronizer
                    .synchronize(&mut self.pages, query, tx, Action::PagesSynced);
            }
            View::Assets => {
                self.synchronizer
                    .synchronize(&mut self.assets, query, tx, Action::AssetsSynced);
            }
        }

        if self.remembered.is_some() {
            let location = match view {
                View::Users => self.users.location(),
                View::Pages => self.pages.location(),
                View::Assets => self.assets.location(),
            };
            if let Some(remembered) = self.remembered.as_mut() {
                remembered.remember(&location);
                remembered.save();
            }
        }
    }

    fn surface(&mut self, notice: Option<Notice>) {
        match notice {
            Some(Notice::Failure { message, .. }) => self.alert = Some(message),
            Some(Notice::Error { panel, message }) => {
                let what = match panel {
                    Panel::Items => "list",
                    Panel::Count => "count",
                };
                self.error = Some(format!("Could not load {}: {}", what, message));
            }
            None => {}
        }
    }

    fn spawn_validate(&mut self) {
        self.lookup_id += 1;
        let id = self.lookup_id;
        let Some(prompt) = self.lookup.as_mut() else {
            return;
        };
        prompt.validity = None;
        // Assets have no existence check
        if prompt.input.is_empty() || prompt.view == View::Assets {
            return;
        }

        let key = match prompt.view {
            View::Users => match UserKey::from_input(&prompt.input) {
                // Ids have no existence check
                Some(UserKey::Id(_)) | None => return,
                Some(key) => DetailKey::User(key),
            },
            _ => DetailKey::Page(prompt.input.clone()),
        };
        let tx = self.action_tx.clone();
        let requester = Arc::clone(&self.requester);
        tokio::spawn(async move {
            let requester = requester.as_ref();
            let checked = match key {
                DetailKey::User(UserKey::Email(email)) => {
                    validate::check_email(requester, &email, true).await
                }
                DetailKey::User(UserKey::Username(name)) => {
                    validate::check_username(requester, &name, true).await
                }
                DetailKey::Page(path) => validate::check_path(requester, &path, true).await,
                _ => return,
            };
            let action = match checked {
                Ok(validation) => Action::LookupValidated(validation, id),
                Err(e) => Action::from(e),
            };
            tx.send(action).ok();
        });
    }

    fn spawn_fetch_detail(&mut self, key: DetailKey) {
        self.lookup_id += 1;
        let id = self.lookup_id;
        let tx = self.action_tx.clone();
        let requester = Arc::clone(&self.requester);
        tokio::spawn(async move {
            let requester = requester.as_ref();
            let fetched = match key {
                DetailKey::User(key) => detail::fetch_user(requester, &key)
                    .await
                    .map(|l| lookup_action(l, Detail::User, id)),
                DetailKey::Page(path) => detail::fetch_page(requester, &path)
                    .await
                    .map(|l| lookup_action(l, Detail::Page, id)),
                DetailKey::Asset(path) => detail::fetch_asset(requester, &path, false)
                    .await
                    .map(|l| lookup_action(l, Detail::Asset, id)),
            };
            tx.send(fetched.unwrap_or_else(Action::from)).ok();
        });
    }

    fn spawn_reload_assets(&self) {
        let tx = self.action_tx.clone();
        let requester = Arc::clone(&self.requester);
        tokio::spawn(async move {
            let result: Result<Reply<Ack>> = requester
                .request(RELOAD_ASSETS_ENDPOINT, Params::new(), RequestMode::Write)
                .await
                .and_then(Reply::<Ack>::from_status);
            let failure = match result {
                Ok(Reply::Ok(_)) => None,
                Ok(Reply::Failure { message }) => Some(message),
                Err(e) => Some(e.to_string()),
            };
            tx.send(Action::WriteFinished { failure }).ok();
        });
    }
}
