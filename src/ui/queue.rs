//! Custom requests sent from this session

use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{LanguageModel, ScanningMode};

#[derive(Debug, Clone, PartialEq)]
pub struct QueuedRequest {
    pub id: u64,
    pub file_names: Vec<String>,
    pub mode: Option<ScanningMode>,
    pub model: Option<LanguageModel>,
    pub submitted_at: DateTime<Local>,
}

#[derive(Default)]
pub struct QueueScreen {
    /// Newest first
    pub requests: Vec<QueuedRequest>,
}

impl QueueScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: QueuedRequest) {
        self.requests.insert(0, request);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Queue ({}) ", self.requests.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        if self.requests.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "No custom requests yet. Press c to create one.",
                    Style::default().fg(Color::DarkGray),
                ))
                .block(block),
                area,
            );
            return;
        }

        let items: Vec<ListItem> = self
            .requests
            .iter()
            .map(|r| {
                let mode = r.mode.map(|m| m.label()).unwrap_or("-");
                let model = r.model.map(|m| m.label()).unwrap_or("-");
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(format!("#{} ", r.id), Style::default().fg(Color::Yellow)),
                        Span::raw(r.file_names.join(", ")),
                    ]),
                    Line::from(Span::styled(
                        format!(
                            "   {mode} · {model} · processing since {}",
                            r.submitted_at.format("%H:%M:%S")
                        ),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }
}
