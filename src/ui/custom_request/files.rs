//! Files step rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::CustomRequestScreen;
use crate::flows::custom_request::FileKind;
use crate::ui::form_field::{render_text_field, TextFieldView};

fn human_size(bytes: u64) -> String {
    match bytes {
        b if b >= 1024 * 1024 => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
        b if b >= 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        b => format!("{b} B"),
    }
}

impl CustomRequestScreen {
    pub(crate) fn render_files_step(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Path input
                Constraint::Length(1), // Add error
                Constraint::Min(4),    // Chosen files
                Constraint::Length(1),
            ])
            .split(area);

        let placeholder = format!(
            "path to a {} file",
            self.uploads_hint()
        );
        render_text_field(
            frame,
            chunks[0],
            TextFieldView {
                label: "Add file",
                value: &self.files.input,
                placeholder: &placeholder,
                focused: self.focus == 0,
                error: None,
                masked: false,
            },
        );

        if let Some(err) = &self.file_error {
            frame.render_widget(
                Paragraph::new(Span::styled(err.as_str(), Style::default().fg(Color::Red))),
                chunks[1],
            );
        }

        let items: Vec<ListItem> = self
            .files
            .files
            .iter()
            .map(|f| {
                let tag = match f.kind {
                    FileKind::Pdf => "PDF ",
                    FileKind::Text => "TXT ",
                    FileKind::Docx => "DOCX",
                    FileKind::Other => "    ",
                };
                ListItem::new(Line::from(vec![
                    Span::styled(tag, Style::default().fg(Color::Magenta)),
                    Span::raw(" "),
                    Span::raw(f.name.clone()),
                    Span::styled(
                        format!("  {}", human_size(f.size)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let focused = self.focus == 1;
        let mut title = vec![Span::styled(
            format!(" Files ({}) ", self.files.files.len()),
            if focused {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            },
        )];
        if let Some(err) = self.errors.for_field("files") {
            title.push(Span::styled(err.to_string(), Style::default().fg(Color::Red)));
        }
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(if focused {
                        Color::Cyan
                    } else {
                        Color::Gray
                    }))
                    .title(Line::from(title)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default();
        if focused && !self.files.files.is_empty() {
            state.select(Some(self.file_cursor));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);

        let hint = Paragraph::new(Line::from(Span::styled(
            "Enter adds the typed path, Del removes the highlighted file",
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(hint, chunks[3]);
    }
}
