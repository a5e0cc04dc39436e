//! Review step rendering

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::BuyCreditsScreen;
use crate::flows::buy_credits::BuyCreditsReview;

impl BuyCreditsScreen {
    pub(crate) fn render_review_step(&self, frame: &mut Frame, area: Rect) {
        let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::Gray));
        let value = |text: String| {
            Span::styled(
                text,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        };

        let lines = match BuyCreditsReview::from_controller(&self.controller) {
            Ok(review) => {
                let mut lines = vec![
                    Line::from(vec![label("Credits:  "), value(review.credits.to_string())]),
                    Line::from(vec![label("Card:     "), value(review.card)]),
                    Line::from(vec![label("Name:     "), value(review.name)]),
                ];
                if let Some(price) = review.price {
                    lines.push(Line::from(vec![label("Price:    "), value(price)]));
                }
                lines
            }
            Err(_) => vec![Line::from(Span::styled(
                "Complete the previous steps before purchasing",
                Style::default().fg(Color::Yellow),
            ))],
        };
        frame.render_widget(Paragraph::new(lines), area);
    }
}
