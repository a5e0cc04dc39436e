//! Customize step rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use super::{CustomRequestScreen, CustomizeField};
use crate::models::{LanguageModel, ScanningMode, PREBUILT_PROMPTS};
use crate::ui::form_field::{
    render_options, render_text_field, render_textarea, render_toggle, TextFieldView,
};

impl CustomRequestScreen {
    pub(crate) fn render_customize_step(&mut self, frame: &mut Frame, area: Rect) {
        let focused = self.focused_field();
        let is = |field: CustomizeField| focused == Some(field);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(ScanningMode::all().len() as u16 + 2),
                Constraint::Length(LanguageModel::all().len() as u16 + 2),
                Constraint::Min(PREBUILT_PROMPTS.len() as u16 + 2),
            ])
            .split(columns[0]);

        // Modes the files do not allow are listed but struck through
        let available = self.customize.available_modes();
        let modes: Vec<(String, bool)> = ScanningMode::all()
            .iter()
            .map(|m| (m.label().to_string(), available.contains(m)))
            .collect();
        let mode_index = ScanningMode::all()
            .iter()
            .position(|m| *m == self.customize.mode)
            .unwrap_or(0);
        render_options(
            frame,
            left[0],
            "Scanning mode",
            &modes,
            mode_index,
            is(CustomizeField::Mode),
            self.errors.for_field("mode"),
        );

        let catalog = self.customize.catalog();
        let models: Vec<(String, bool)> = LanguageModel::all()
            .iter()
            .map(|m| {
                (
                    format!("{} ({} tokens)", m.label(), catalog.context_size(*m)),
                    self.customize.is_model_selectable(*m),
                )
            })
            .collect();
        let model_index = LanguageModel::all()
            .iter()
            .position(|m| *m == self.customize.model)
            .unwrap_or(0);
        render_options(
            frame,
            left[1],
            "Model",
            &models,
            model_index,
            is(CustomizeField::Model),
            self.errors.for_field("model"),
        );

        let prompts: Vec<(String, bool)> = PREBUILT_PROMPTS
            .iter()
            .map(|p| (p.name.to_string(), true))
            .collect();
        render_options(
            frame,
            left[2],
            "Prebuilt prompts (Space to use)",
            &prompts,
            self.prebuilt_cursor,
            is(CustomizeField::PrebuiltPrompts),
            None,
        );

        let has_final = self.customize.include_final_prompt;
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints(match self.customize.mode {
                ScanningMode::Overall => vec![Constraint::Min(6), Constraint::Length(2)],
                ScanningMode::FileOverall => vec![Constraint::Min(6), Constraint::Min(5)],
                ScanningMode::FileInChunks | ScanningMode::FilePerPage => vec![
                    Constraint::Min(6),
                    Constraint::Length(2),
                    Constraint::Length(if has_final { 6 } else { 0 }),
                ],
            })
            .split(columns[1]);

        render_textarea(
            frame,
            right[0],
            &mut self.prompt_area,
            "Prompt",
            is(CustomizeField::Prompt),
            self.errors.for_field("prompt"),
        );

        match self.customize.mode {
            ScanningMode::Overall => {
                let context = format!(
                    "up to {}",
                    self.customize.catalog().context_size(self.customize.model)
                );
                render_text_field(
                    frame,
                    right[1],
                    TextFieldView {
                        label: "Chunk size",
                        value: &self.customize.chunk_size,
                        placeholder: &context,
                        focused: is(CustomizeField::ChunkSize),
                        error: self.errors.for_field("chunk_size"),
                        masked: false,
                    },
                );
            }
            ScanningMode::FileOverall => {
                render_textarea(
                    frame,
                    right[1],
                    &mut self.overall_area,
                    "Overall prompt (optional)",
                    is(CustomizeField::OverallPrompt),
                    None,
                );
            }
            ScanningMode::FileInChunks | ScanningMode::FilePerPage => {
                render_toggle(
                    frame,
                    right[1],
                    "Include final prompt",
                    has_final,
                    is(CustomizeField::IncludeFinalPrompt),
                );
                if has_final {
                    render_textarea(
                        frame,
                        right[2],
                        &mut self.final_area,
                        "Final prompt",
                        is(CustomizeField::FinalPrompt),
                        self.errors.for_field("final_prompt"),
                    );
                }
            }
        }
    }
}
