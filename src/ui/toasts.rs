use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::toast::{ToastKind, Toasts};

const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 3;

/// Stack visible toasts in the bottom-right corner, newest at the bottom
pub fn render_toasts(frame: &mut Frame, toasts: &Toasts) {
    let area = frame.area();
    let width = TOAST_WIDTH.min(area.width);
    let visible: Vec<_> = toasts.visible().collect();

    for (i, toast) in visible.iter().rev().enumerate() {
        let offset = (i as u16 + 1) * TOAST_HEIGHT + 1;
        if offset > area.height {
            break;
        }
        let rect = Rect::new(
            area.x + area.width - width,
            area.y + area.height - offset,
            width,
            TOAST_HEIGHT,
        );
        let color = match toast.kind {
            ToastKind::Info => Color::Green,
            ToastKind::Error => Color::Red,
        };
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(Line::from(Span::raw(toast.message.clone())))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(color)),
                ),
            rect,
        );
    }
}
