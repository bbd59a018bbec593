use crate::action::View;
use crate::client::Params;
use crate::types::{Asset, ListResource, Page, User};

pub const DEFAULT_LIMIT: u32 = 20;
pub const MIN_LIMIT: u32 = 5;
pub const MAX_LIMIT: u32 = 100;

/// View-specific decoding defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDefaults {
    pub sort_key: String,
    pub lowercase_sort: bool,
}

impl QueryDefaults {
    pub fn for_resource<R: ListResource>() -> Self {
        Self {
            sort_key: R::DEFAULT_SORT.to_string(),
            lowercase_sort: R::LOWERCASE_SORT,
        }
    }

    pub fn for_view(view: View) -> Self {
        match view {
            View::Users => Self::for_resource::<User>(),
            View::Pages => Self::for_resource::<Page>(),
            View::Assets => Self::for_resource::<Asset>(),
        }
    }
}

/// Typed form of a location query string.
///
/// Decoding never fails: absent fields take their defaults and malformed
/// numbers read as zero before clamping. Encoding always writes every field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Always within `MIN_LIMIT..=MAX_LIMIT`.
    pub limit: u32,
    pub sort_key: String,
    pub descending: bool,
    /// Not known to be in range until the total count has arrived.
    pub page: u32,
}

/// Clamp a raw limit into `MIN_LIMIT..=MAX_LIMIT`.
pub fn clamp_limit(raw: i64) -> u32 {
    raw.clamp(MIN_LIMIT as i64, MAX_LIMIT as i64) as u32
}

/// Lenient integer read: blank or malformed input is zero.
fn parse_number(raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(0)
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// First value of `key` in a query string, percent-decoded.
fn query_value(query: &str, key: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(k, _)| decode_component(k) == key)
        .map(|(_, v)| decode_component(v))
}

impl ListQuery {
    pub fn new(defaults: &QueryDefaults) -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            sort_key: defaults.sort_key.clone(),
            descending: false,
            page: 0,
        }
    }

    pub fn decode(query: &str, defaults: &QueryDefaults) -> Self {
        let limit = query_value(query, "limit")
            .map(|v| parse_number(&v))
            .unwrap_or(DEFAULT_LIMIT as i64);

        let sort_key = match query_value(query, "order") {
            Some(order) if !order.is_empty() => {
                if defaults.lowercase_sort {
                    order.to_lowercase()
                } else {
                    order
                }
            }
            _ => defaults.sort_key.clone(),
        };

        let descending = query_value(query, "desc")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let page = query_value(query, "page")
            .map(|v| parse_number(&v).max(0))
            .unwrap_or(0);

        Self {
            limit: clamp_limit(limit),
            sort_key,
            descending,
            page: page.min(u32::MAX as i64) as u32,
        }
    }

    pub fn encode(&self) -> String {
        self.to_params().encode()
    }

    /// Parameters for an items request, in location order.
    pub fn to_params(&self) -> Params {
        Params::new()
            .with("limit", self.limit)
            .with("order", &self.sort_key)
            .with("desc", self.descending)
            .with("page", self.page)
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    pub fn with_limit(&self, limit: i64) -> Self {
        Self {
            limit: clamp_limit(limit),
            ..self.clone()
        }
    }

    pub fn with_sort(&self, sort_key: &str, descending: bool) -> Self {
        Self {
            sort_key: sort_key.to_string(),
            descending,
            ..self.clone()
        }
    }
}

/// A console location: a view path plus its query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub view: View,
    pub query: ListQuery,
}

impl Location {
    pub fn new(view: View, query: ListQuery) -> Self {
        Self { view, query }
    }

    /// Parse an href such as `/control/listUsers?limit=10&page=2`. A full URL
    /// is accepted; its scheme and host are ignored.
    pub fn parse(href: &str) -> Option<Self> {
        let href = match href.split_once("://") {
            Some((_, rest)) => &rest[rest.find('/').unwrap_or(rest.len())..],
            None => href,
        };
        let (path, query) = href.split_once('?').unwrap_or((href, ""));
        let view = View::from_path(path)?;
        let query = ListQuery::decode(query, &QueryDefaults::for_view(view));
        Some(Self { view, query })
    }

    pub fn href(&self) -> String {
        if self.view.is_paged() {
            format!("{}?{}", self.view.path(), self.query.encode())
        } else {
            self.view.path().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_defaults() -> QueryDefaults {
        QueryDefaults::for_view(View::Users)
    }

    fn page_defaults() -> QueryDefaults {
        QueryDefaults::for_view(View::Pages)
    }

    #[test]
    fn empty_query_takes_defaults() {
        let q = ListQuery::decode("", &user_defaults());
        assert_eq!(
            q,
            ListQuery {
                limit: 20,
                sort_key: "username".to_string(),
                descending: false,
                page: 0,
            }
        );
    }

    #[test]
    fn full_query_decodes() {
        let q = ListQuery::decode("?limit=10&order=title&desc=TRUE&page=3", &page_defaults());
        assert_eq!(q.limit, 10);
        assert_eq!(q.sort_key, "title");
        assert!(q.descending);
        assert_eq!(q.page, 3);
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(ListQuery::decode("limit=500", &page_defaults()).limit, 100);
        assert_eq!(ListQuery::decode("limit=1", &page_defaults()).limit, 5);
        assert_eq!(ListQuery::decode("limit=-40", &page_defaults()).limit, 5);
    }

    #[test]
    fn malformed_numbers_read_as_zero() {
        let q = ListQuery::decode("limit=lots&page=two", &page_defaults());
        assert_eq!(q.limit, 5);
        assert_eq!(q.page, 0);
    }

    #[test]
    fn negative_page_reads_as_zero() {
        assert_eq!(ListQuery::decode("page=-2", &page_defaults()).page, 0);
    }

    #[test]
    fn desc_only_true_literal_counts() {
        assert!(!ListQuery::decode("desc=1", &page_defaults()).descending);
        assert!(!ListQuery::decode("desc=yes", &page_defaults()).descending);
        assert!(ListQuery::decode("desc=True", &page_defaults()).descending);
    }

    #[test]
    fn user_sort_key_is_lowercased() {
        let q = ListQuery::decode("order=EMAIL", &user_defaults());
        assert_eq!(q.sort_key, "email");
        let q = ListQuery::decode("order=Title", &page_defaults());
        assert_eq!(q.sort_key, "Title");
    }

    #[test]
    fn empty_order_falls_back_to_default() {
        assert_eq!(ListQuery::decode("order=", &page_defaults()).sort_key, "path");
    }

    #[test]
    fn first_occurrence_wins() {
        assert_eq!(ListQuery::decode("page=1&page=9", &page_defaults()).page, 1);
    }

    #[test]
    fn encode_writes_every_field_in_order() {
        let q = ListQuery::new(&page_defaults());
        assert_eq!(q.encode(), "limit=20&order=path&desc=false&page=0");
    }

    #[test]
    fn encode_then_decode_is_identity() {
        let queries = [
            ListQuery::new(&page_defaults()),
            ListQuery {
                limit: 5,
                sort_key: "last_edited".to_string(),
                descending: true,
                page: 12,
            },
            ListQuery {
                limit: 100,
                sort_key: "odd key&=?".to_string(),
                descending: false,
                page: u32::MAX,
            },
        ];
        for q in queries {
            assert_eq!(ListQuery::decode(&q.encode(), &page_defaults()), q);
        }
    }

    #[test]
    fn with_limit_clamps() {
        let q = ListQuery::new(&page_defaults());
        assert_eq!(q.with_limit(0).limit, 5);
        assert_eq!(q.with_limit(105).limit, 100);
        assert_eq!(q.with_limit(45).limit, 45);
    }

    #[test]
    fn location_round_trips() {
        let loc = Location::parse("/control/listUsers?limit=10&order=email&desc=true&page=2").unwrap();
        assert_eq!(loc.view, View::Users);
        assert_eq!(loc.query.limit, 10);
        assert_eq!(
            loc.href(),
            "/control/listUsers?limit=10&order=email&desc=true&page=2"
        );
        assert_eq!(Location::parse(&loc.href()), Some(loc));
    }

    #[test]
    fn location_accepts_full_url() {
        let loc = Location::parse("https://cms.example.org/control/listPages?page=4").unwrap();
        assert_eq!(loc.view, View::Pages);
        assert_eq!(loc.query.page, 4);
    }

    #[test]
    fn unknown_location_path_is_rejected() {
        assert!(Location::parse("/control/configSite").is_none());
    }

    #[test]
    fn unpaged_location_has_no_query() {
        let loc = Location::parse("/control/listAssets?page=3").unwrap();
        assert_eq!(loc.href(), "/control/listAssets");
    }
}
