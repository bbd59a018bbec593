use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::LookupPrompt;
use crate::detail::Detail;
use crate::validate::FieldValidity;

fn title(text: &str) -> Span<'static> {
    Span::styled(
        format!(" {} ", text),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

/// Lookup prompt with the live validity of what has been typed.
pub fn render_lookup(frame: &mut Frame, prompt: &LookupPrompt) {
    let area = centered_rect(60, 6, frame.area());
    frame.render_widget(Clear, area);

    let feedback = match &prompt.validity {
        None => Span::raw(""),
        Some(FieldValidity::Valid) => Span::styled("✓", Style::default().fg(Color::Green)),
        Some(FieldValidity::Invalid(message)) => {
            Span::styled(message.clone(), Style::default().fg(Color::Red))
        }
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{}: ", prompt.view.lookup_field()),
                Style::default().fg(Color::Gray),
            ),
            Span::raw(prompt.input.clone()),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(feedback),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: fetch | Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title(&format!("Find in {}", prompt.view.title()))),
    );
    frame.render_widget(popup, area);
}

fn field(name: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", name), Style::default().fg(Color::Gray)),
        Span::raw(value.to_string()),
    ])
}

pub fn render_detail(frame: &mut Frame, detail: &Detail, scroll: u16) {
    let outer = frame.area();
    let area = centered_rect(
        outer.width.saturating_mul(4) / 5,
        outer.height.saturating_mul(4) / 5,
        outer,
    );
    frame.render_widget(Clear, area);

    let (heading, mut lines, contents) = match detail {
        Detail::User(user) => (
            format!("User {}", user.username),
            vec![
                field("id", &user.id),
                field("username", &user.username),
                field("email", &user.email_address),
                field("operator", if user.operator { "yes" } else { "no" }),
            ],
            None,
        ),
        Detail::Page(page) => (
            format!("Page {}", page.path),
            vec![
                field("path", &page.path),
                field("title", &page.title),
                field("syntax", &page.syntax),
            ],
            Some(&page.contents),
        ),
        Detail::Asset(asset) => (
            format!("Asset {}", asset.path),
            vec![field("path", &asset.path)],
            Some(&asset.contents),
        ),
    };

    if let Some(contents) = contents {
        lines.push(Line::from(""));
        lines.extend(contents.lines().map(|l| Line::from(l.to_string())));
    }

    let popup = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title(&heading)))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(popup, area);
}

/// Centered rect of at most `width` x `height` inside `outer`
fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let popup_width = width.min(outer.width);
    let popup_height = height.min(outer.height);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((outer.height.saturating_sub(popup_height)) / 2),
            Constraint::Length(popup_height),
            Constraint::Min(0),
        ])
        .split(outer);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((outer.width.saturating_sub(popup_width)) / 2),
            Constraint::Length(popup_width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}
