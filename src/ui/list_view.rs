use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::action::View;
use crate::app::App;
use crate::sync::ListView;
use crate::types::{format_bytes_size, Asset, ListResource, Page, User};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    match app.view {
        View::Users => render_rows(frame, &app.users, area, user_line),
        View::Pages => render_rows(frame, &app.pages, area, page_line),
        View::Assets => render_rows(frame, &app.assets, area, asset_line),
    }
}

fn render_rows<R: ListResource>(
    frame: &mut Frame,
    view: &ListView<R>,
    area: Rect,
    line: fn(&R, usize, Style) -> Line<'static>,
) {
    let mut title = format!(" {} ({}) ", R::VIEW.title(), view.rows.len());
    if let Some(at) = view.updated_at {
        title.push_str(&format!("· {} ", at.format("%H:%M:%S")));
    }
    let block = Block::default().borders(Borders::ALL).title(title);

    if view.rows.is_empty() {
        let text = if view.is_loading() {
            "Loading..."
        } else {
            "Nothing to show"
        };
        let empty = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = view
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i == view.selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(line(row, w, style))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(view.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Pad or cut `s` to exactly `width` characters.
fn fit(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let cut: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        format!("{:<width$}", s)
    }
}

/// Timestamp column; missing values render as a dimmed dash.
fn timestamp(value: Option<&str>, width: usize) -> Span<'static> {
    match value {
        Some(ts) => Span::styled(fit(ts, width), Style::default().fg(Color::Gray)),
        None => Span::styled(fit("-", width), Style::default().fg(Color::DarkGray)),
    }
}

fn user_line(user: &User, w: usize, style: Style) -> Line<'static> {
    let fixed = 49; // email(30) + operator(8) + created(~8) + spaces(3)
    let flex = w.saturating_sub(fixed).max(12);
    let operator = if user.operator { "operator" } else { "" };
    Line::from(vec![
        Span::styled(fit(&user.username, flex), style),
        Span::raw(" "),
        Span::styled(fit(&user.email, 30), Style::default().fg(Color::Cyan)),
        Span::raw(" "),
        Span::styled(fit(operator, 8), Style::default().fg(Color::Magenta)),
        Span::raw(" "),
        Span::styled(user.created.clone(), Style::default().fg(Color::DarkGray)),
    ])
}

fn page_line(page: &Page, w: usize, style: Style) -> Line<'static> {
    let fixed = 86; // path(24) + length(8) + syntax(10) + 2 timestamps(20) + spaces(4)
    let flex = w.saturating_sub(fixed).max(10);
    Line::from(vec![
        Span::styled(fit(&page.path, 24), style),
        Span::raw(" "),
        Span::raw(fit(&page.title, flex)),
        Span::raw(" "),
        Span::styled(
            format!("{:>8}", page.content_length),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" "),
        Span::styled(fit(&page.syntax, 10), Style::default().fg(Color::Cyan)),
        timestamp(page.published.as_deref(), 20),
        Span::raw(" "),
        timestamp(page.last_edited.as_deref(), 20),
    ])
}

fn asset_line(asset: &Asset, w: usize, style: Style) -> Line<'static> {
    let fixed = 56; // size(10) + protect(3) + 2 timestamps(20) + spaces(3)
    let flex = w.saturating_sub(fixed).max(10);
    let protect = if asset.protect { "P" } else { "" };
    Line::from(vec![
        Span::styled(fit(&asset.path, flex), style),
        Span::raw(" "),
        Span::styled(
            format!("{:>10}", format_bytes_size(asset.size)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!(" {:<2}", protect), Style::default().fg(Color::Red)),
        timestamp(asset.uploaded.as_deref(), 20),
        Span::raw(" "),
        timestamp(asset.last_edited.as_deref(), 20),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_pads_and_cuts_by_chars() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("αβγδεζ", 5), "αβ...");
    }

    #[test]
    fn missing_timestamp_is_dimmed_dash() {
        let span = timestamp(None, 3);
        assert_eq!(span.content, "-  ");
        assert_eq!(span.style.fg, Some(Color::DarkGray));
    }
}
