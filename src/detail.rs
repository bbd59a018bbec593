use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;

use crate::client::{JsonRequest, Params, RequestMode};
use crate::error::{ConsoleError, Result};
use crate::reply::{FailureCode, Reply};
use crate::types::{AssetDetail, PageDetail, UserDetail};
use crate::validate::FieldValidity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    User(UserDetail),
    Page(PageDetail),
    Asset(AssetDetail),
}

impl Detail {
    /// Lines the detail popup shows: one per field, then a blank line and
    /// the contents.
    pub fn line_count(&self) -> usize {
        let (fields, contents) = match self {
            Detail::User(_) => (4, None),
            Detail::Page(page) => (3, Some(&page.contents)),
            Detail::Asset(asset) => (1, Some(&asset.contents)),
        };
        fields + contents.map_or(0, |c| 1 + c.lines().count())
    }
}

/// Outcome of a lookup: the entity, a validity for the key field when the
/// server says the key matches nothing, or any other failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    Field(FieldValidity),
    Alert(String),
}

/// How to find a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKey {
    Id(String),
    Username(String),
    Email(String),
}

impl UserKey {
    /// Read a lookup prompt: `#<id>`, an email address, or a username.
    pub fn from_input(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            None
        } else if let Some(id) = input.strip_prefix('#').filter(|id| !id.is_empty()) {
            Some(UserKey::Id(id.to_string()))
        } else if input.contains('@') {
            Some(UserKey::Email(input.to_string()))
        } else {
            Some(UserKey::Username(input.to_string()))
        }
    }

    fn to_params(&self) -> Params {
        match self {
            UserKey::Id(v) => Params::new().with("id", v),
            UserKey::Username(v) => Params::new().with("username", v),
            UserKey::Email(v) => Params::new().with("email", v),
        }
    }

    fn missing_message(&self) -> &'static str {
        match self {
            UserKey::Id(_) => "That ID does not exist",
            UserKey::Username(_) => "That username does not exist",
            UserKey::Email(_) => "That email address does not exist",
        }
    }
}

#[derive(Deserialize)]
struct EncodedPage {
    path: String,
    title: String,
    contents: String,
    syntax: String,
}

#[derive(Deserialize)]
struct EncodedAsset {
    path: String,
    contents: String,
}

/// Text contents travel base64-encoded.
fn decode_contents(encoded: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ConsoleError::Decode(format!("contents: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub async fn fetch_page(requester: &dyn JsonRequest, path: &str) -> Result<Lookup<PageDetail>> {
    let value = requester
        .request("/api/page/fetch", Params::new().with("path", path), RequestMode::Read)
        .await?;
    let reply = Reply::<EncodedPage>::from_payload(value)?;
    if reply.code() == Some(FailureCode::PagePathNotFound) {
        return Ok(Lookup::Field(FieldValidity::Invalid(
            "Path does not exist".to_string(),
        )));
    }
    match reply {
        Reply::Ok(page) => Ok(Lookup::Found(PageDetail {
            contents: decode_contents(&page.contents)?,
            path: page.path,
            title: page.title,
            syntax: page.syntax.to_uppercase(),
        })),
        Reply::Failure { message } => Ok(Lookup::Alert(message)),
    }
}

pub async fn fetch_user(requester: &dyn JsonRequest, key: &UserKey) -> Result<Lookup<UserDetail>> {
    let value = requester
        .request("/api/user/fetch", key.to_params(), RequestMode::Read)
        .await?;
    let reply = Reply::<UserDetail>::from_payload(value)?;
    match reply.code() {
        Some(FailureCode::UserInvalidQuery) | Some(FailureCode::UserIdNotFound) => {
            return Ok(Lookup::Field(FieldValidity::Invalid(
                key.missing_message().to_string(),
            )));
        }
        _ => {}
    }
    match reply {
        Reply::Ok(user) => Ok(Lookup::Found(user)),
        Reply::Failure { message } => Ok(Lookup::Alert(message)),
    }
}

pub async fn fetch_asset(
    requester: &dyn JsonRequest,
    path: &str,
    root: bool,
) -> Result<Lookup<AssetDetail>> {
    let params = Params::new().with("path", path).with("root", root);
    let value = requester
        .request("/api/asset/fetch", params, RequestMode::Read)
        .await?;
    match Reply::<EncodedAsset>::from_payload(value)? {
        Reply::Ok(asset) => Ok(Lookup::Found(AssetDetail {
            contents: decode_contents(&asset.contents)?,
            path: asset.path,
        })),
        Reply::Failure { message } => Ok(Lookup::Alert(message)),
    }
}
