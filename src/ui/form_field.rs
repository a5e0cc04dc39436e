//! Input helpers and widgets shared by the wizard forms.
//!
//! Forms own plain values (`String`, `bool`, indices); these helpers edit
//! them from key presses and draw them with a label and an inline error.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use tui_textarea::TextArea;

/// Characters a text field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFilter {
    Any,
    Digits,
    /// Digits and spaces
    CardNumber,
    /// Digits and `/`
    Expiry,
}

impl InputFilter {
    fn accepts(self, c: char) -> bool {
        match self {
            InputFilter::Any => !c.is_control(),
            InputFilter::Digits => c.is_ascii_digit(),
            InputFilter::CardNumber => c.is_ascii_digit() || c == ' ',
            InputFilter::Expiry => c.is_ascii_digit() || c == '/',
        }
    }
}

/// Edit a single-line value; the cursor always sits at the end.
/// Returns true if the key was consumed.
pub fn edit_text(
    value: &mut String,
    key: KeyCode,
    filter: InputFilter,
    max_length: Option<usize>,
) -> bool {
    match key {
        KeyCode::Char(c) if filter.accepts(c) => {
            if max_length.map(|m| value.chars().count() < m).unwrap_or(true) {
                value.push(c);
            }
            true
        }
        KeyCode::Backspace => {
            value.pop();
            true
        }
        _ => false,
    }
}

pub fn edit_toggle(value: &mut bool, key: KeyCode) -> bool {
    match key {
        KeyCode::Char(' ') => {
            *value = !*value;
            true
        }
        KeyCode::Left | KeyCode::Char('n') => {
            *value = false;
            true
        }
        KeyCode::Right | KeyCode::Char('y') => {
            *value = true;
            true
        }
        _ => false,
    }
}

/// Move a list selection with Up/Down, wrapping around
pub fn move_selection(selected: usize, len: usize, key: KeyCode) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match key {
        KeyCode::Up => Some(if selected == 0 { len - 1 } else { selected - 1 }),
        KeyCode::Down => Some((selected + 1) % len),
        _ => None,
    }
}

/// Multi-line editor pre-filled with `text`
pub fn textarea_with(text: &str) -> TextArea<'static> {
    let lines: Vec<String> = if text.is_empty() {
        vec![String::new()]
    } else {
        text.lines().map(str::to_string).collect()
    };
    let mut textarea = TextArea::new(lines);
    textarea.move_cursor(tui_textarea::CursorMove::Bottom);
    textarea.move_cursor(tui_textarea::CursorMove::End);
    textarea
}

pub fn textarea_value(textarea: &TextArea) -> String {
    textarea.lines().join("\n")
}

/// Forward a key to a text area
pub fn edit_textarea(textarea: &mut TextArea, key: KeyCode) -> bool {
    textarea.input(KeyEvent::new(key, KeyModifiers::NONE))
}

fn label_line(label: &str, focused: bool, error: Option<&str>) -> Line<'static> {
    let label_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![Span::styled(label.to_string(), label_style)];
    if let Some(err) = error {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(err.to_string(), Style::default().fg(Color::Red)));
    }
    Line::from(spans)
}

/// A labelled single-line field; needs two rows
pub struct TextFieldView<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub placeholder: &'a str,
    pub focused: bool,
    pub error: Option<&'a str>,
    /// Show bullets instead of the value
    pub masked: bool,
}

pub fn render_text_field(frame: &mut Frame, area: Rect, field: TextFieldView) {
    let mut text = if field.masked {
        "•".repeat(field.value.chars().count())
    } else {
        field.value.to_string()
    };
    let value_line = if text.is_empty() && !field.focused {
        Line::from(Span::styled(
            field.placeholder,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        if field.focused {
            text.push('|');
        }
        Line::from(Span::styled(
            text,
            Style::default().fg(if field.focused {
                Color::White
            } else {
                Color::Gray
            }),
        ))
    };
    let para = Paragraph::new(vec![
        label_line(field.label, field.focused, field.error),
        value_line,
    ]);
    frame.render_widget(para, area);
}

pub fn render_toggle(frame: &mut Frame, area: Rect, label: &str, value: bool, focused: bool) {
    let yes_style = if value {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let no_style = if !value {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let para = Paragraph::new(vec![
        label_line(label, focused, None),
        Line::from(vec![
            Span::styled("[Yes]", yes_style),
            Span::raw(" / "),
            Span::styled("[No]", no_style),
        ]),
    ]);
    frame.render_widget(para, area);
}

/// Option list; disabled options are drawn dimmed and struck through
pub fn render_options(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    options: &[(String, bool)],
    selected: usize,
    focused: bool,
    error: Option<&str>,
) {
    let items: Vec<ListItem> = options
        .iter()
        .map(|(text, enabled)| {
            let style = if *enabled {
                Style::default()
            } else {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            };
            ListItem::new(Span::styled(text.clone(), style))
        })
        .collect();

    let border = if focused { Color::Cyan } else { Color::Gray };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(label_line(label, focused, error)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::REVERSED),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

pub fn render_textarea(
    frame: &mut Frame,
    area: Rect,
    textarea: &mut TextArea<'static>,
    label: &str,
    focused: bool,
    error: Option<&str>,
) {
    let border = if focused { Color::Cyan } else { Color::Gray };
    textarea.set_cursor_line_style(Style::default());
    textarea.set_cursor_style(if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    });
    textarea.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(label_line(label, focused, error)),
    );
    frame.render_widget(&*textarea, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_text_applies_filter_and_limit() {
        let mut cvc = String::new();
        assert!(edit_text(&mut cvc, KeyCode::Char('1'), InputFilter::Digits, Some(4)));
        assert!(!edit_text(&mut cvc, KeyCode::Char('x'), InputFilter::Digits, Some(4)));
        for c in "2345".chars() {
            edit_text(&mut cvc, KeyCode::Char(c), InputFilter::Digits, Some(4));
        }
        assert_eq!(cvc, "1234");

        edit_text(&mut cvc, KeyCode::Backspace, InputFilter::Digits, Some(4));
        assert_eq!(cvc, "123");
    }

    #[test]
    fn test_expiry_filter() {
        let mut exp = String::new();
        for c in "12/3a0".chars() {
            edit_text(&mut exp, KeyCode::Char(c), InputFilter::Expiry, Some(5));
        }
        assert_eq!(exp, "12/30");
    }

    #[test]
    fn test_toggle_keys() {
        let mut value = false;
        assert!(edit_toggle(&mut value, KeyCode::Char(' ')));
        assert!(value);
        edit_toggle(&mut value, KeyCode::Left);
        assert!(!value);
        assert!(!edit_toggle(&mut value, KeyCode::Enter));
    }

    #[test]
    fn test_move_selection_wraps() {
        assert_eq!(move_selection(0, 3, KeyCode::Up), Some(2));
        assert_eq!(move_selection(2, 3, KeyCode::Down), Some(0));
        assert_eq!(move_selection(0, 0, KeyCode::Down), None);
        assert_eq!(move_selection(1, 3, KeyCode::Left), None);
    }

    #[test]
    fn test_textarea_round_trip() {
        let mut area = textarea_with("Summarize the following data.");
        assert_eq!(textarea_value(&area), "Summarize the following data.");
        edit_textarea(&mut area, KeyCode::Char('!'));
        assert_eq!(textarea_value(&area), "Summarize the following data.!");
    }
}
