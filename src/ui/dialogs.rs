use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Drawn in place of a step that has no view. The only way out is leaving
/// the screen.
pub fn render_dashboard_error(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "There was an error in the dashboard",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press d to return to your documents",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

/// What the user chose in the payment-required modal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentRequiredChoice {
    AddPaymentMethod,
    Dismiss,
}

/// Shown when the backend answers 402
pub struct PaymentRequiredDialog {
    pub visible: bool,
    pub message: String,
}

impl PaymentRequiredDialog {
    pub fn new() -> Self {
        Self {
            visible: false,
            message: String::new(),
        }
    }

    pub fn show(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.visible = true;
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<PaymentRequiredChoice> {
        let choice = match key {
            KeyCode::Enter | KeyCode::Char('b') => PaymentRequiredChoice::AddPaymentMethod,
            KeyCode::Esc | KeyCode::Char('q') => PaymentRequiredChoice::Dismiss,
            _ => return None,
        };
        self.visible = false;
        Some(choice)
    }

    pub fn render(&self, frame: &mut Frame) {
        if !self.visible {
            return;
        }

        let area = centered_rect(50, 30, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(" Payment method required ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));

        let mut text = vec![
            Line::from(""),
            Line::from("You need a payment method on file and enough credits"),
            Line::from("to use this feature."),
        ];
        if !self.message.is_empty() {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(
                self.message.clone(),
                Style::default().fg(Color::DarkGray),
            )));
        }
        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" buy credits  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" close"),
        ]));

        frame.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
    }
}

impl Default for PaymentRequiredDialog {
    fn default() -> Self {
        Self::new()
    }
}

const SHORTCUTS: &[(&str, &str)] = &[
    ("d", "Documents (summaries)"),
    ("b", "Buy credits"),
    ("c", "New custom request"),
    ("u", "Queue"),
    ("a", "Admin statistics"),
    ("r", "Reload data"),
    ("?", "Toggle help"),
    ("q", "Quit"),
];

const WIZARD_SHORTCUTS: &[(&str, &str)] = &[
    ("Tab", "Next field"),
    ("Enter", "Next step / submit"),
    ("Esc", "Previous step / leave"),
    ("F1-F3", "Jump to step"),
];

pub struct HelpDialog {
    pub visible: bool,
}

impl HelpDialog {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn render(&self, frame: &mut Frame) {
        if !self.visible {
            return;
        }

        let area = centered_rect(60, 70, frame.area());
        frame.render_widget(Clear, area);

        let heading = |text: &'static str| {
            Line::from(Span::styled(
                text,
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(Color::Cyan),
            ))
        };
        let row = |(key, desc): &(&'static str, &'static str)| {
            Line::from(vec![
                Span::styled(format!("{key:<8}"), Style::default().fg(Color::Yellow)),
                Span::raw(*desc),
            ])
        };

        let mut help_text = vec![heading("Keyboard Shortcuts"), Line::from("")];
        help_text.extend(SHORTCUTS.iter().map(row));
        help_text.push(Line::from(""));
        help_text.push(heading("In a wizard:"));
        help_text.extend(WIZARD_SHORTCUTS.iter().map(row));

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        frame.render_widget(Paragraph::new(help_text).block(block), area);
    }
}

impl Default for HelpDialog {
    fn default() -> Self {
        Self::new()
    }
}
