//! Payment step rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::BuyCreditsScreen;
use crate::ui::form_field::{render_text_field, render_toggle, TextFieldView};

impl BuyCreditsScreen {
    pub(crate) fn render_payment_step(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Balance
                Constraint::Length(1),
                Constraint::Length(2), // Card number
                Constraint::Length(2), // Name
                Constraint::Length(2), // Expiry
                Constraint::Length(2), // CVC
                Constraint::Length(2), // Save card
                Constraint::Min(0),
            ])
            .split(area);

        let balance = Paragraph::new(Line::from(vec![
            Span::styled("Current balance: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} credits", self.payment.balance),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
        frame.render_widget(balance, chunks[0]);

        let fields = [
            ("Card number", &self.payment.card_number, "4242 4242 4242 4242", "card_number", false),
            ("Name on card", &self.payment.name, "Jane Doe", "name", false),
            ("Expiry", &self.payment.expiry, "MM/YY", "expiry", false),
            ("CVC", &self.payment.cvc, "123", "cvc", true),
        ];
        for (i, (label, value, placeholder, key, masked)) in fields.into_iter().enumerate() {
            render_text_field(
                frame,
                chunks[i + 2],
                TextFieldView {
                    label,
                    value,
                    placeholder,
                    focused: self.focus == i,
                    error: self.errors.for_field(key),
                    masked,
                },
            );
        }

        render_toggle(
            frame,
            chunks[6],
            "Save card for later",
            self.payment.save_card,
            self.focus == 4,
        );
    }
}
