use crate::detail::Detail;
use crate::error::ConsoleError;
use crate::pagination::LinkRole;
use crate::sync::SyncEvent;
use crate::types::{Asset, Page, User};
use crate::validate::Validation;

/// List views of the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Users,
    Pages,
    Assets,
}

impl View {
    pub const ALL: [View; 3] = [View::Users, View::Pages, View::Assets];

    pub fn path(&self) -> &'static str {
        match self {
            View::Users => "/control/listUsers",
            View::Pages => "/control/listPages",
            View::Assets => "/control/listAssets",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        View::ALL.into_iter().find(|v| v.path() == path)
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Users => "Users",
            View::Pages => "Pages",
            View::Assets => "Assets",
        }
    }

    /// Whether the view has a count endpoint and pagination bar.
    pub fn is_paged(&self) -> bool {
        !matches!(self, View::Assets)
    }

    /// Label of the lookup field.
    pub fn lookup_field(&self) -> &'static str {
        match self {
            View::Users => "username",
            View::Pages | View::Assets => "path",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            View::Users => View::Pages,
            View::Pages => View::Assets,
            View::Assets => View::Users,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            View::Users => View::Assets,
            View::Pages => View::Users,
            View::Assets => View::Pages,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    NextView,
    PrevView,
    Refresh,

    // Row selection
    ScrollUp,
    ScrollDown,
    Select,

    // Query edits; each rewrites the location and re-synchronizes
    ChangeLimit(i64),
    CycleSort,
    ToggleDescending,
    FollowLink(LinkRole),

    // Settlements of in-flight list requests
    UsersSynced(SyncEvent<User>),
    PagesSynced(SyncEvent<Page>),
    AssetsSynced(SyncEvent<Asset>),

    // Sharing the current location
    YankLocation,
    OpenLocation,

    // Lookup prompt
    OpenLookup,
    CloseLookup,
    LookupInput(char),
    LookupBackspace,
    LookupSubmit,
    LookupValidated(Validation, u64),
    DetailLoaded(Box<Detail>, u64),
    CloseDetail,

    // Writes
    ReloadAssets,
    WriteFinished { failure: Option<String> },

    /// Application-level failure reported by the server.
    Alert(String),
    /// Transport or format failure.
    Error(String),
    None,
}

impl Action {
    /// Actions triggered by a key press. These dismiss any shown alert.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            Action::NextView
                | Action::PrevView
                | Action::Refresh
                | Action::ScrollUp
                | Action::ScrollDown
                | Action::Select
                | Action::ChangeLimit(_)
                | Action::CycleSort
                | Action::ToggleDescending
                | Action::FollowLink(_)
                | Action::YankLocation
                | Action::OpenLocation
                | Action::OpenLookup
                | Action::LookupSubmit
                | Action::ReloadAssets
        )
    }
}

impl From<ConsoleError> for Action {
    fn from(err: ConsoleError) -> Self {
        Action::Error(err.to_string())
    }
}
