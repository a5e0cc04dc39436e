//! Review step rendering

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::CustomRequestScreen;
use crate::flows::custom_request::CustomRequestReview;

impl CustomRequestScreen {
    pub(crate) fn render_review_step(&self, frame: &mut Frame, area: Rect) {
        let review = CustomRequestReview::from_controller(&self.controller);
        let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::Gray));
        let bold = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let mut lines = vec![Line::from(label("Files:"))];
        if review.file_names.is_empty() {
            lines.push(Line::from(Span::styled(
                "  no files chosen",
                Style::default().fg(Color::Yellow),
            )));
        }
        for name in &review.file_names {
            lines.push(Line::from(Span::styled(format!("  {name}"), bold)));
        }
        lines.push(Line::from(""));

        if let Some(mode) = review.mode {
            lines.push(Line::from(vec![
                label("Mode:   "),
                Span::styled(mode.label(), bold),
            ]));
        }
        if let Some(model) = review.model {
            lines.push(Line::from(vec![
                label("Model:  "),
                Span::styled(model.label(), bold),
            ]));
        }
        lines.push(Line::from(label("Prompt:")));
        if review.prompt.trim().is_empty() {
            lines.push(Line::from(Span::styled(
                "  no prompt yet",
                Style::default().fg(Color::Yellow),
            )));
        } else {
            lines.extend(
                review
                    .prompt
                    .lines()
                    .map(|l| Line::from(Span::raw(format!("  {l}")))),
            );
        }

        if let Some(problem) = review.problem {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("{problem}. Go back to step 2 to pick another mode."),
                Style::default().fg(Color::Red),
            )));
        } else if !review.can_submit() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Complete the previous steps before submitting",
                Style::default().fg(Color::Yellow),
            )));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
    }
}
