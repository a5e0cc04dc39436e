//! Admin statistics: four groups of stat cards

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::SaasStats;
use crate::dashboard::{format_openai_amount, format_rating};

struct StatGroup {
    title: &'static str,
    cards: Vec<(&'static str, String)>,
}

fn stat_groups(stats: &SaasStats) -> Vec<StatGroup> {
    vec![
        StatGroup {
            title: "Accounts",
            cards: vec![
                ("Total accounts", stats.total_accounts.to_string()),
                ("Paid accounts", stats.paid_accounts_count.to_string()),
                ("Verified accounts", stats.verified_accounts_count.to_string()),
                ("Monthly active users", stats.monthly_active_users.to_string()),
            ],
        },
        StatGroup {
            title: "3rd party charges",
            cards: vec![("OpenAI", format_openai_amount(stats))],
        },
        StatGroup {
            title: "Features",
            cards: vec![
                ("Total summaries", stats.total_summaries.to_string()),
                ("Summaries v1", stats.total_summaries_v1.to_string()),
                ("Summaries v2", stats.total_summaries_v2.to_string()),
                ("Searches", stats.total_searches.to_string()),
                ("Custom requests", stats.total_custom_requests.to_string()),
            ],
        },
        StatGroup {
            title: "Ratings",
            cards: vec![("Average rating", format_rating(stats))],
        },
    ]
}

pub fn render_admin(frame: &mut Frame, area: Rect, stats: Option<&SaasStats>) {
    let Some(stats) = stats else {
        let block = Block::default()
            .title(" Admin ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Loading statistics...",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block),
            area,
        );
        return;
    };

    let groups = stat_groups(stats);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (row, pair) in rows.iter().zip(groups.chunks(2)) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(*row);
        for (col, group) in cols.iter().zip(pair) {
            let lines: Vec<Line> = group
                .cards
                .iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::styled(format!("{label:<22}"), Style::default().fg(Color::Gray)),
                        Span::styled(
                            value.clone(),
                            Style::default()
                                .fg(Color::White)
                                .add_modifier(Modifier::BOLD),
                        ),
                    ])
                })
                .collect();
            let block = Block::default()
                .title(format!(" {} ", group.title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan));
            frame.render_widget(Paragraph::new(lines).block(block), *col);
        }
    }
}
