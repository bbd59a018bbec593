use std::fmt;

use crate::query::Location;

/// Derived once both a page of items and the total count are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationModel {
    /// Always within `0..=total_pages`.
    pub current_page: u32,
    /// Highest page index, `floor(total / limit)`. Zero means a single page.
    pub total_pages: u32,
}

impl PaginationModel {
    pub fn derive(total: u64, limit: u32, requested_page: u32) -> Self {
        let limit = u64::from(limit.max(1));
        let total_pages = (total / limit).min(u64::from(u32::MAX)) as u32;
        Self {
            current_page: requested_page.min(total_pages),
            total_pages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    First,
    Prev,
    Current,
    Next,
    Last,
}

impl fmt::Display for LinkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkRole::First => write!(f, "first"),
            LinkRole::Prev => write!(f, "prev"),
            LinkRole::Current => write!(f, "current"),
            LinkRole::Next => write!(f, "next"),
            LinkRole::Last => write!(f, "last"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationLink {
    pub target_page: u32,
    pub role: LinkRole,
    /// `base` with only its page replaced.
    pub href: String,
}

/// Build the navigation links for `model`. Pure: the same inputs always
/// give the same sequence.
pub fn render(model: &PaginationModel, base: &Location) -> Vec<NavigationLink> {
    let current = model.current_page;
    let total = model.total_pages;

    let link = |target_page: u32, role: LinkRole| NavigationLink {
        target_page,
        role,
        href: Location::new(base.view, base.query.with_page(target_page)).href(),
    };

    let mut links = Vec::with_capacity(5);
    if current > 1 {
        links.push(link(0, LinkRole::First));
    }
    if current > 0 {
        links.push(link(current - 1, LinkRole::Prev));
    }
    links.push(link(current, LinkRole::Current));
    if current < total {
        links.push(link(current + 1, LinkRole::Next));
    }
    if current < total.saturating_sub(1) {
        links.push(link(total, LinkRole::Last));
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::View;
    use crate::query::{ListQuery, QueryDefaults};

    fn base() -> Location {
        let query = ListQuery {
            limit: 20,
            sort_key: "title".to_string(),
            descending: true,
            page: 0,
        };
        Location::new(View::Pages, query)
    }

    fn roles(links: &[NavigationLink]) -> Vec<LinkRole> {
        links.iter().map(|l| l.role).collect()
    }

    #[test]
    fn total_pages_is_floor_and_page_is_clamped() {
        let model = PaginationModel::derive(47, 20, 5);
        assert_eq!(model.total_pages, 2);
        assert_eq!(model.current_page, 2);
    }

    #[test]
    fn clamping_holds_across_ranges() {
        for total in [0u64, 1, 4, 5, 19, 20, 21, 99, 100, 101, 1_000, 12_345] {
            for limit in [5u32, 7, 20, 33, 100] {
                for page in [0u32, 1, 2, 50, 5_000, u32::MAX] {
                    let model = PaginationModel::derive(total, limit, page);
                    assert_eq!(u64::from(model.total_pages), total / u64::from(limit));
                    assert!(model.current_page <= model.total_pages);
                }
            }
        }
    }

    #[test]
    fn single_page_only_has_current() {
        let links = render(&PaginationModel::derive(0, 20, 0), &base());
        assert_eq!(roles(&links), vec![LinkRole::Current]);
        assert_eq!(links[0].target_page, 0);
    }

    #[test]
    fn last_page_has_no_next_or_last() {
        let model = PaginationModel {
            current_page: 4,
            total_pages: 4,
        };
        let links = render(&model, &base());
        assert_eq!(
            roles(&links),
            vec![LinkRole::First, LinkRole::Prev, LinkRole::Current]
        );
    }

    #[test]
    fn middle_page_has_every_link() {
        let model = PaginationModel {
            current_page: 3,
            total_pages: 6,
        };
        let links = render(&model, &base());
        let targets: Vec<u32> = links.iter().map(|l| l.target_page).collect();
        assert_eq!(
            roles(&links),
            vec![
                LinkRole::First,
                LinkRole::Prev,
                LinkRole::Current,
                LinkRole::Next,
                LinkRole::Last
            ]
        );
        assert_eq!(targets, vec![0, 2, 3, 4, 6]);
    }

    #[test]
    fn page_one_has_prev_but_no_first() {
        let model = PaginationModel {
            current_page: 1,
            total_pages: 3,
        };
        assert_eq!(
            roles(&render(&model, &base())),
            vec![LinkRole::Prev, LinkRole::Current, LinkRole::Next, LinkRole::Last]
        );
    }

    #[test]
    fn penultimate_page_has_next_but_no_last() {
        let model = PaginationModel {
            current_page: 2,
            total_pages: 3,
        };
        assert_eq!(
            roles(&render(&model, &base())),
            vec![LinkRole::First, LinkRole::Prev, LinkRole::Current, LinkRole::Next]
        );
    }

    #[test]
    fn hrefs_only_replace_page() {
        let model = PaginationModel {
            current_page: 1,
            total_pages: 2,
        };
        let links = render(&model, &base());
        let next = links.iter().find(|l| l.role == LinkRole::Next).unwrap();
        assert_eq!(
            next.href,
            "/control/listPages?limit=20&order=title&desc=true&page=2"
        );

        let decoded = Location::parse(&next.href).unwrap();
        assert_eq!(decoded.query, base().query.with_page(2));
        assert_eq!(
            decoded.query,
            ListQuery::decode(
                next.href.split_once('?').unwrap().1,
                &QueryDefaults::for_view(View::Pages)
            )
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let model = PaginationModel::derive(230, 20, 7);
        assert_eq!(render(&model, &base()), render(&model, &base()));
    }
}
