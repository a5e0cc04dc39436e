//! Step strip drawn above every wizard

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::wizard::{IndicatorState, StepDefinition, StepId};

pub fn render_step_indicator<K>(
    frame: &mut Frame,
    area: Rect,
    steps: &[(StepDefinition<K>, IndicatorState)],
) {
    let mut spans = Vec::new();
    for (i, (def, state)) in steps.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" ─── ", Style::default().fg(Color::DarkGray)));
        }
        let (marker, style) = match state {
            IndicatorState::Completed => ("✓", Style::default().fg(Color::Green)),
            IndicatorState::Active => (
                "●",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            IndicatorState::Pending => ("○", Style::default().fg(Color::DarkGray)),
        };
        spans.push(Span::styled(
            format!("{marker} F{} {}", def.id, def.label),
            style,
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// F-keys address steps the way clicking an indicator would
pub fn step_for_key(key: KeyCode) -> Option<StepId> {
    match key {
        KeyCode::F(n) if n > 0 => Some(n),
        _ => None,
    }
}
