//! Custom request wizard screen

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_textarea::TextArea;

use super::dialogs::render_dashboard_error;
use super::form_field::{
    edit_text, edit_textarea, edit_toggle, move_selection, textarea_value, textarea_with,
    InputFilter,
};
use super::step_indicator::{render_step_indicator, step_for_key};
use super::WizardAction;
use crate::config::UploadsConfig;
use crate::flows::custom_request::{
    ChosenFiles, CustomRequestFlow, CustomRequestPayload, CustomRequestReview,
    CustomRequestStep, CustomizeForm, FilesForm, CUSTOMIZE_STEP, FILES_STEP,
};
use crate::models::{LanguageModel, ModelCatalog, ScanningMode, PREBUILT_PROMPTS};
use crate::wizard::{ActiveStep, StepController, StepForm, StepId, ValidationErrors};

mod customize;
mod files;
mod review;


/// Focusable parts of the customize step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CustomizeField {
    Mode,
    Model,
    Prompt,
    ChunkSize,
    OverallPrompt,
    IncludeFinalPrompt,
    FinalPrompt,
    PrebuiltPrompts,
}

pub struct CustomRequestScreen {
    pub controller: StepController<CustomRequestFlow>,
    pub(crate) files: FilesForm,
    pub(crate) customize: CustomizeForm,
    pub(crate) prompt_area: TextArea<'static>,
    pub(crate) overall_area: TextArea<'static>,
    pub(crate) final_area: TextArea<'static>,
    /// Highlighted row of the chosen files list
    pub(crate) file_cursor: usize,
    pub(crate) file_error: Option<String>,
    pub(crate) prebuilt_cursor: usize,
    pub(crate) focus: usize,
    pub(crate) errors: ValidationErrors,
    uploads: UploadsConfig,
    catalog: ModelCatalog,
    usage_credits: u64,
    loaded_step: StepId,
}

impl CustomRequestScreen {
    pub fn new(uploads: &UploadsConfig, catalog: &ModelCatalog, usage_credits: u64) -> Self {
        let controller = StepController::new(CustomRequestFlow::new());
        let loaded_step = controller.current_step();
        let customize = CustomizeForm::new(catalog, usage_credits, None, None);
        Self {
            controller,
            files: FilesForm::new(uploads, None),
            prompt_area: textarea_with(&customize.prompt),
            overall_area: textarea_with(&customize.overall_prompt),
            final_area: textarea_with(&customize.final_prompt),
            customize,
            file_cursor: 0,
            file_error: None,
            prebuilt_cursor: 0,
            focus: 0,
            errors: ValidationErrors::new(),
            uploads: uploads.clone(),
            catalog: catalog.clone(),
            usage_credits,
            loaded_step,
        }
    }

    pub fn set_usage_credits(&mut self, usage_credits: u64) {
        self.usage_credits = usage_credits;
        // Keep edits in progress; the next step change picks the new value up
        if self.current_kind() != Some(CustomRequestStep::Customize) {
            self.reload_customize();
        }
    }

    pub(crate) fn uploads_hint(&self) -> String {
        self.uploads.accepted_extensions.join("/")
    }

    fn committed_files(&self) -> Option<&ChosenFiles> {
        match self.controller.payload(FILES_STEP) {
            Some(CustomRequestPayload::Files(files)) => Some(files),
            _ => None,
        }
    }

    fn reload_customize(&mut self) {
        let previous = match self.controller.payload(CUSTOMIZE_STEP) {
            Some(CustomRequestPayload::Customize(c)) => Some(c.clone()),
            _ => None,
        };
        let files = self.committed_files().cloned();
        self.customize = CustomizeForm::new(
            &self.catalog,
            self.usage_credits,
            files.as_ref(),
            previous.as_ref(),
        );
        self.prompt_area = textarea_with(&self.customize.prompt);
        self.overall_area = textarea_with(&self.customize.overall_prompt);
        self.final_area = textarea_with(&self.customize.final_prompt);
    }

    fn sync_forms(&mut self) {
        let current = self.controller.current_step();
        if current == self.loaded_step {
            return;
        }
        self.loaded_step = current;
        self.focus = 0;
        self.errors = ValidationErrors::new();
        self.file_error = None;

        let files = self.committed_files().cloned();
        self.files = FilesForm::new(&self.uploads, files.as_ref());
        self.file_cursor = 0;
        self.reload_customize();
    }

    fn current_kind(&self) -> Option<CustomRequestStep> {
        match self.controller.active_step() {
            ActiveStep::Step(def) => Some(def.kind),
            ActiveStep::Unknown(_) => None,
        }
    }

    /// Fields of the customize step for the selected mode, in focus order
    pub(crate) fn customize_fields(&self) -> Vec<CustomizeField> {
        let mut fields = vec![
            CustomizeField::Mode,
            CustomizeField::Model,
            CustomizeField::Prompt,
        ];
        match self.customize.mode {
            ScanningMode::Overall => fields.push(CustomizeField::ChunkSize),
            ScanningMode::FileOverall => fields.push(CustomizeField::OverallPrompt),
            ScanningMode::FileInChunks | ScanningMode::FilePerPage => {
                fields.push(CustomizeField::IncludeFinalPrompt);
                if self.customize.include_final_prompt {
                    fields.push(CustomizeField::FinalPrompt);
                }
            }
        }
        fields.push(CustomizeField::PrebuiltPrompts);
        fields
    }

    pub(crate) fn focused_field(&self) -> Option<CustomizeField> {
        self.customize_fields().get(self.focus).copied()
    }

    fn field_count(&self) -> usize {
        match self.current_kind() {
            Some(CustomRequestStep::Files) => 2,
            Some(CustomRequestStep::Customize) => self.customize_fields().len(),
            _ => 1,
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> WizardAction {
        if let Some(step) = step_for_key(key) {
            self.controller.go_to_step(step);
            self.sync_forms();
            return WizardAction::None;
        }

        match key {
            KeyCode::Esc => {
                let current = self.controller.current_step();
                if current <= 1 || current > self.controller.last_step_id() {
                    return WizardAction::Leave;
                }
                self.controller.go_to_step(current - 1);
                self.sync_forms();
                WizardAction::None
            }
            KeyCode::Tab => {
                self.focus = (self.focus + 1) % self.field_count();
                WizardAction::None
            }
            KeyCode::BackTab => {
                let count = self.field_count();
                self.focus = (self.focus + count - 1) % count;
                WizardAction::None
            }
            KeyCode::Enter => {
                if self.current_kind() == Some(CustomRequestStep::Files)
                    && self.focus == 0
                    && !self.files.input.trim().is_empty()
                {
                    self.file_error = self.files.add_input().err();
                    return WizardAction::None;
                }
                self.advance()
            }
            _ => {
                self.edit(key);
                WizardAction::None
            }
        }
    }

    fn advance(&mut self) -> WizardAction {
        let result = match self.current_kind() {
            Some(CustomRequestStep::Files) => {
                self.files.validate().map(CustomRequestPayload::Files)
            }
            Some(CustomRequestStep::Customize) => {
                self.customize.validate().map(CustomRequestPayload::Customize)
            }
            Some(CustomRequestStep::Review) => {
                let review = CustomRequestReview::from_controller(&self.controller);
                if self.controller.is_submitting() || !review.can_submit() {
                    return WizardAction::None;
                }
                return WizardAction::Submit;
            }
            None => return WizardAction::None,
        };

        match result {
            Ok(payload) => {
                if let Err(err) = self.controller.commit_and_advance(payload) {
                    tracing::warn!(error = %err, "commit rejected");
                }
                self.sync_forms();
            }
            Err(errors) => self.errors = errors,
        }
        WizardAction::None
    }

    fn edit(&mut self, key: KeyCode) {
        match self.current_kind() {
            Some(CustomRequestStep::Files) => self.edit_files(key),
            Some(CustomRequestStep::Customize) => self.edit_customize(key),
            _ => {}
        }
    }

    fn edit_files(&mut self, key: KeyCode) {
        if self.focus == 0 {
            edit_text(&mut self.files.input, key, InputFilter::Any, None);
            return;
        }
        let len = self.files.files.len();
        if let Some(next) = move_selection(self.file_cursor, len, key) {
            self.file_cursor = next;
        } else if matches!(key, KeyCode::Delete | KeyCode::Backspace) {
            self.files.remove(self.file_cursor);
            self.file_cursor = self.file_cursor.min(self.files.files.len().saturating_sub(1));
        }
    }

    fn next_mode(&self, key: KeyCode) -> Option<ScanningMode> {
        let modes = self.customize.available_modes();
        let pos = modes.iter().position(|m| *m == self.customize.mode).unwrap_or(0);
        move_selection(pos, modes.len(), key).map(|i| modes[i])
    }

    /// Next selectable model in the Up/Down direction
    fn next_model(&self, key: KeyCode) -> Option<LanguageModel> {
        let models = LanguageModel::all();
        let mut pos = models.iter().position(|m| *m == self.customize.model)?;
        for _ in 0..models.len() {
            pos = move_selection(pos, models.len(), key)?;
            if self.customize.is_model_selectable(models[pos]) {
                return Some(models[pos]);
            }
        }
        None
    }

    fn edit_customize(&mut self, key: KeyCode) {
        let Some(field) = self.focused_field() else {
            return;
        };
        match field {
            CustomizeField::Mode => {
                if let Some(mode) = self.next_mode(key) {
                    self.customize.mode = mode;
                }
            }
            CustomizeField::Model => {
                if let Some(model) = self.next_model(key) {
                    self.customize.set_model(model);
                }
            }
            CustomizeField::Prompt => {
                edit_textarea(&mut self.prompt_area, key);
                self.customize.prompt = textarea_value(&self.prompt_area);
            }
            CustomizeField::ChunkSize => {
                edit_text(&mut self.customize.chunk_size, key, InputFilter::Digits, Some(7));
            }
            CustomizeField::OverallPrompt => {
                edit_textarea(&mut self.overall_area, key);
                self.customize.overall_prompt = textarea_value(&self.overall_area);
            }
            CustomizeField::IncludeFinalPrompt => {
                edit_toggle(&mut self.customize.include_final_prompt, key);
            }
            CustomizeField::FinalPrompt => {
                edit_textarea(&mut self.final_area, key);
                self.customize.final_prompt = textarea_value(&self.final_area);
            }
            CustomizeField::PrebuiltPrompts => {
                if let Some(next) =
                    move_selection(self.prebuilt_cursor, PREBUILT_PROMPTS.len(), key)
                {
                    self.prebuilt_cursor = next;
                } else if matches!(key, KeyCode::Char(' ') | KeyCode::Right) {
                    self.customize.apply_prompt(&PREBUILT_PROMPTS[self.prebuilt_cursor]);
                    self.prompt_area = textarea_with(&self.customize.prompt);
                }
            }
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Custom Request ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(10),
                Constraint::Length(1),
            ])
            .split(inner);

        render_step_indicator(frame, chunks[0], &self.controller.indicator());

        match self.controller.active_step() {
            ActiveStep::Step(def) => match def.kind {
                CustomRequestStep::Files => self.render_files_step(frame, chunks[2]),
                CustomRequestStep::Customize => self.render_customize_step(frame, chunks[2]),
                CustomRequestStep::Review => self.render_review_step(frame, chunks[2]),
            },
            ActiveStep::Unknown(_) => render_dashboard_error(frame, chunks[2]),
        }

        let action = if self.controller.is_final_step() {
            if self.controller.is_submitting() {
                " submitting..."
            } else {
                " submit  "
            }
        } else {
            " next  "
        };
        let footer = Paragraph::new(Line::from(vec![
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(action),
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(" field  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" back"),
        ]));
        frame.render_widget(footer, chunks[3]);
    }
}
