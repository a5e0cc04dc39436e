//! Summaries table and the detail view of the picked summary

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
    Frame,
};

use super::form_field::move_selection;
use crate::dashboard::{compression_ratio, format_ratio, DashboardContext};

pub struct SummariesScreen {
    pub state: TableState,
}

impl SummariesScreen {
    pub fn new() -> Self {
        Self {
            state: TableState::default(),
        }
    }

    /// Keep the highlight inside the table after a reload
    pub fn clamp(&mut self, len: usize) {
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            _ => {}
        }
    }

    /// Move the highlight; returns true if the key was consumed
    pub fn handle_key(&mut self, key: KeyCode, len: usize) -> bool {
        let current = self.state.selected().unwrap_or(0);
        match move_selection(current, len, key) {
            Some(next) => {
                self.state.select(Some(next));
                true
            }
            None => false,
        }
    }

    /// Record the highlighted row as the page's selected summary
    pub fn open_selected(&self, context: &mut DashboardContext) -> Option<u64> {
        let index = self.state.selected()?;
        let id = context.summaries.get(index)?.id;
        context.select_summary(id).then_some(id)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, context: &DashboardContext) {
        let block = Block::default()
            .title(format!(" Documents ({}) ", context.summaries.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        if context.summaries.is_empty() {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "no documents yet",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let header = Row::new(vec!["ID", "Original", "Condensed", "Ratio"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
        let rows = context.summaries.iter().map(|s| {
            Row::new(vec![
                s.id.to_string(),
                s.original_char_count.to_string(),
                s.condensed_char_count.to_string(),
                format_ratio(s),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(8),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Min(6),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

        frame.render_stateful_widget(table, area, &mut self.state);
    }
}

impl Default for SummariesScreen {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_summary_detail(frame: &mut Frame, area: Rect, context: &DashboardContext) {
    let block = Block::default()
        .title(" Summary ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let Some(summary) = context.selected_summary() else {
        frame.render_widget(
            Paragraph::new("No summary selected. Press d and pick one.").block(block),
            area,
        );
        return;
    };

    let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::Gray));
    let mut lines = vec![
        Line::from(vec![label("ID:         "), Span::raw(summary.id.to_string())]),
        Line::from(vec![
            label("Original:   "),
            Span::raw(format!("{} characters", summary.original_char_count)),
        ]),
        Line::from(vec![
            label("Condensed:  "),
            Span::raw(format!("{} characters", summary.condensed_char_count)),
        ]),
        Line::from(vec![label("Ratio:      "), Span::raw(format_ratio(summary))]),
    ];
    if let Some(ratio) = compression_ratio(summary) {
        let saved = 100.0 - 100.0 / ratio;
        lines.push(Line::from(vec![
            label("Saved:      "),
            Span::styled(format!("{saved:.1}%"), Style::default().fg(Color::Green)),
        ]));
    }
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
