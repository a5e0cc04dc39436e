//! Amount step rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::BuyCreditsScreen;
use crate::flows::buy_credits::AmountChoice;
use crate::ui::form_field::{render_options, render_text_field, TextFieldView};

impl BuyCreditsScreen {
    pub(crate) fn render_amount_step(&self, frame: &mut Frame, area: Rect) {
        let custom = self.amount.choice == Some(AmountChoice::Custom);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(self.amount.option_count() as u16 + 2),
                Constraint::Length(1),
                Constraint::Length(if custom { 2 } else { 0 }),
                Constraint::Min(0),
            ])
            .split(area);

        let mut options: Vec<(String, bool)> = self
            .amount
            .presets
            .iter()
            .map(|p| (format!("{:<10} {:>6} credits  {}", p.title, p.credits, p.price), true))
            .collect();
        options.push(("Custom amount".to_string(), true));

        let choice_error = self.errors.for_field("amount");
        render_options(
            frame,
            chunks[0],
            "Select amount",
            &options,
            self.amount_cursor,
            self.focus == 0,
            choice_error,
        );

        if custom {
            let (min, max) = self.amount.bounds();
            let placeholder = format!("{min} - {max}");
            render_text_field(
                frame,
                chunks[2],
                TextFieldView {
                    label: "Credits",
                    value: &self.amount.custom_amount,
                    placeholder: &placeholder,
                    focused: self.focus == 1,
                    error: self.errors.for_field("custom_amount"),
                    masked: false,
                },
            );
        }

        let hint = Paragraph::new(Line::from(Span::styled(
            "Up/Down to choose, Tab to type a custom amount",
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(hint, chunks[3]);
    }
}
