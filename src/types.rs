use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::action::View;

/// A row type backed by an items endpoint and, when paginated, a count
/// endpoint.
pub trait ListResource: DeserializeOwned + Clone + Send + Sync + 'static {
    const VIEW: View;
    const ITEMS_ENDPOINT: &'static str;
    /// `None` for unpaginated lists.
    const COUNT_ENDPOINT: Option<&'static str>;
    const DEFAULT_SORT: &'static str;
    const SORT_KEYS: &'static [&'static str];
    const LOWERCASE_SORT: bool = false;
}

/// Row of `/api/user/list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub operator: bool,
    pub created: String,
}

impl ListResource for User {
    const VIEW: View = View::Users;
    const ITEMS_ENDPOINT: &'static str = "/api/user/list";
    const COUNT_ENDPOINT: Option<&'static str> = Some("/api/user/count");
    const DEFAULT_SORT: &'static str = "username";
    const SORT_KEYS: &'static [&'static str] = &["username", "email", "operator", "when_created"];
    const LOWERCASE_SORT: bool = true;
}

/// Row of `/api/page/list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub path: String,
    pub title: String,
    pub content_length: u64,
    pub syntax: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub published: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_edited: Option<String>,
}

impl ListResource for Page {
    const VIEW: View = View::Pages;
    const ITEMS_ENDPOINT: &'static str = "/api/page/list";
    const COUNT_ENDPOINT: Option<&'static str> = Some("/api/page/count");
    const DEFAULT_SORT: &'static str = "path";
    const SORT_KEYS: &'static [&'static str] = &[
        "path",
        "title",
        "contents_length",
        "syntax",
        "published",
        "last_edited",
    ];
}

/// Row of `/api/asset/list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub path: String,
    pub size: u64,
    pub protect: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub uploaded: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_edited: Option<String>,
}

impl ListResource for Asset {
    const VIEW: View = View::Assets;
    const ITEMS_ENDPOINT: &'static str = "/api/asset/list";
    const COUNT_ENDPOINT: Option<&'static str> = None;
    const DEFAULT_SORT: &'static str = "";
    const SORT_KEYS: &'static [&'static str] = &[];
}

/// Same layout as the server's own file-safe timestamps.
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

fn format_epoch(seconds: i64) -> Option<String> {
    DateTime::from_timestamp(seconds, 0).map(|t| t.format(TIMESTAMP_FORMAT).to_string())
}

/// Timestamps arrive as preformatted strings, epoch seconds, or an
/// `{"seconds", "nanos"}` / `{"epochSecond", "nano"}` object. None of them
/// may fail a whole list.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(format_epoch)
            .or_else(|| Some(n.to_string())),
        Some(Value::Object(map)) => map
            .get("seconds")
            .or_else(|| map.get("epochSecond"))
            .and_then(Value::as_i64)
            .and_then(format_epoch),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CountReply {
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ExistsReply {
    pub exists: bool,
}

/// Successful mutation acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub id: String,
    pub username: String,
    pub email_address: String,
    pub operator: bool,
}

/// Page as served by `/api/page/fetch`, contents already base64-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDetail {
    pub path: String,
    pub title: String,
    pub contents: String,
    pub syntax: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDetail {
    pub path: String,
    pub contents: String,
}

/// Human-readable size using decimal units.
pub fn format_bytes_size(num: u64) -> String {
    let n = num as f64;
    if num < 1_000 {
        format!("{} B", num)
    } else if num < 1_000_000 {
        format!("{:.1} KB", n / 1_000.0)
    } else if num < 1_000_000_000 {
        format!("{:.1} MB", n / 1_000_000.0)
    } else {
        format!("{:.1} GB", n / 1_000_000_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_row_uses_camel_case_keys() {
        let page: Page = serde_json::from_value(json!({
            "path": "/index",
            "title": "Home",
            "contentLength": 1200,
            "syntax": "markdown",
            "published": "2020-01-01T00-00-00",
            "lastEdited": null
        }))
        .unwrap();
        assert_eq!(page.content_length, 1200);
        assert!(page.last_edited.is_none());
    }

    #[test]
    fn asset_timestamps_accept_any_instant_shape() {
        let assets: Vec<Asset> = serde_json::from_value(json!([
            {"path": "a.css", "size": 10, "protect": false,
             "uploaded": "20210101-000000", "lastEdited": null},
            {"path": "b.png", "size": 20, "protect": true,
             "uploaded": 1609459200, "lastEdited": 1609459200.5},
            {"path": "c.js", "size": 30, "protect": false,
             "uploaded": {"seconds": 1609545600, "nanos": 0},
             "lastEdited": {"epochSecond": 1609545601, "nano": 12}},
            {"path": "d.txt", "size": 40, "protect": false}
        ]))
        .unwrap();

        assert_eq!(assets[0].uploaded.as_deref(), Some("20210101-000000"));
        assert_eq!(assets[1].uploaded.as_deref(), Some("20210101-000000"));
        assert_eq!(assets[1].last_edited.as_deref(), Some("20210101-000000"));
        assert_eq!(assets[2].uploaded.as_deref(), Some("20210102-000000"));
        assert_eq!(assets[2].last_edited.as_deref(), Some("20210102-000001"));
        assert!(assets[3].uploaded.is_none());
        assert!(assets[3].last_edited.is_none());
    }

    #[test]
    fn user_detail_reads_email_address() {
        let user: UserDetail = serde_json::from_value(json!({
            "id": "0b5e",
            "username": "admin",
            "emailAddress": "admin@example.org",
            "operator": true
        }))
        .unwrap();
        assert_eq!(user.email_address, "admin@example.org");
    }

    #[test]
    fn bytes_size_units() {
        assert_eq!(format_bytes_size(0), "0 B");
        assert_eq!(format_bytes_size(999), "999 B");
        assert_eq!(format_bytes_size(1_000), "1.0 KB");
        assert_eq!(format_bytes_size(15_360), "15.4 KB");
        assert_eq!(format_bytes_size(2_500_000), "2.5 MB");
        assert_eq!(format_bytes_size(3_000_000_000), "3.0 GB");
    }

    #[test]
    fn only_asset_list_is_unpaginated() {
        assert!(User::COUNT_ENDPOINT.is_some());
        assert!(Page::COUNT_ENDPOINT.is_some());
        assert!(Asset::COUNT_ENDPOINT.is_none());
    }
}
