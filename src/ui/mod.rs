mod list_view;
mod pagination;
mod popup;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use ratatui::Frame;

use crate::action::View;
use crate::app::App;

pub fn render(frame: &mut Frame, app: &App) {
    let paged = app.view.is_paged();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(if paged { 1 } else { 0 }),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    list_view::render(frame, app, chunks[2]);
    if paged {
        pagination::render(frame, app, chunks[3]);
    }
    render_status_bar(frame, app, chunks[4]);

    if let Some(detail) = &app.detail {
        popup::render_detail(frame, detail, app.scroll_offset);
    }
    if let Some(prompt) = &app.lookup {
        popup::render_lookup(frame, prompt);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "wsc ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.location_url(), Style::default().fg(Color::White)),
    ]))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<&str> = View::ALL.iter().map(|v| v.title()).collect();
    let selected = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);

    let query = app.location().query;
    let title = if app.view.is_paged() {
        format!(
            " limit {} | sort {}{} ",
            query.limit,
            query.sort_key,
            if query.descending { " desc" } else { "" }
        )
    } else {
        String::new()
    };

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(title))
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(error) = &app.error {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(alert) = &app.alert {
        Line::from(vec![Span::styled(
            format!("Error: {}", alert),
            Style::default().fg(Color::LightRed),
        )])
    } else if app.submitting {
        Line::from(vec![Span::styled(
            "Submitting...",
            Style::default().fg(Color::Yellow),
        )])
    } else if app.is_loading() {
        Line::from(vec![Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        )])
    } else {
        let help = match app.view {
            View::Assets => {
                "Tab: views | j/k: nav | Enter: open | /: find | R: reload | r: refresh | y/o: copy/open | q: quit"
            }
            _ => {
                "Tab: views | j/k: nav | h/l/g/G: pages | +/-: limit | s/d: sort | /: find | y/o: copy/open | q: quit"
            }
        };
        Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}
