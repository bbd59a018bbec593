use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::action::View;
use crate::app::App;
use crate::pagination::{LinkRole, NavigationLink};

fn label(link: &NavigationLink) -> String {
    // Pages are zero-based on the wire, one-based on screen
    match link.role {
        LinkRole::First => "« first".to_string(),
        LinkRole::Prev => "‹ prev".to_string(),
        LinkRole::Current => format!("[{}]", link.target_page + 1),
        LinkRole::Next => "next ›".to_string(),
        LinkRole::Last => "last »".to_string(),
    }
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let links = app.links_of(app.view);
    let mut spans: Vec<Span> = Vec::new();

    for link in links {
        let style = if link.role == LinkRole::Current {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        spans.push(Span::styled(label(link), style));
        spans.push(Span::raw("  "));
    }

    let pagination = match app.view {
        View::Users => app.users.pagination,
        View::Pages => app.pages.pagination,
        View::Assets => None,
    };
    if let Some(model) = pagination {
        spans.push(Span::styled(
            format!("page {} of {}", model.current_page + 1, model.total_pages + 1),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
