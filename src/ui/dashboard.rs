//! Page frame around every screen: header, body, status bar

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::dashboard::DashboardContext;
use crate::routes::Route;

/// Header, body and status bar areas
pub fn split_page(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(10),   // Screen
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

pub fn render_header(
    frame: &mut Frame,
    area: Rect,
    route: Route,
    locale: &str,
    context: &DashboardContext,
) {
    let account = match &context.account {
        Some(account) => format!(
            "{}  {} credits{}",
            account.email,
            account.usage_credits,
            if account.is_admin { "  [admin]" } else { "" }
        ),
        None => "loading account...".to_string(),
    };
    let line = Line::from(vec![
        Span::styled(
            " docdash ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(route.title(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {}", route.path(locale)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("   "),
        Span::styled(account, Style::default().fg(Color::Green)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

pub fn render_status_bar(frame: &mut Frame, area: Rect, in_wizard: bool, loading: usize) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let mut spans = if in_wizard {
        vec![
            key("Esc"),
            Span::raw(" back/leave  "),
            key("F1-F3"),
            Span::raw(" steps"),
        ]
    } else {
        vec![
            key("d"),
            Span::raw(" docs  "),
            key("b"),
            Span::raw(" buy  "),
            key("c"),
            Span::raw(" request  "),
            key("u"),
            Span::raw(" queue  "),
            key("a"),
            Span::raw(" admin  "),
            key("?"),
            Span::raw(" help  "),
            key("q"),
            Span::raw(" quit"),
        ]
    };
    if loading > 0 {
        spans.push(Span::styled(
            format!("   loading ({loading})"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
