//! Custom request wizard: choose files, customize the request, review.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::api::{
    ApiError, CustomRequestCreated, CustomRequestCustomizations, CustomRequestSubmission,
    DashboardApi,
};
use crate::config::UploadsConfig;
use crate::models::{LanguageModel, ModelCatalog, PrebuiltPrompt, ScanningMode};
use crate::routes::Route;
use crate::wizard::{
    StepController, StepDefinition, StepForm, SubmissionTarget, ValidationErrors, WizardError,
    WizardFlow, WizardState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomRequestStep {
    Files,
    Customize,
    Review,
}

pub const FILES_STEP: u8 = 1;
pub const CUSTOMIZE_STEP: u8 = 2;
pub const REVIEW_STEP: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Text,
    Docx,
    Other,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("pdf") => FileKind::Pdf,
            Some("txt") => FileKind::Text,
            Some("docx") => FileKind::Docx,
            _ => FileKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub kind: FileKind,
}

impl ChosenFile {
    /// Check a local file against the upload limits
    pub fn inspect(path: &Path, uploads: &UploadsConfig) -> Result<Self, String> {
        let metadata = std::fs::metadata(path).map_err(|e| format!("{}: {e}", path.display()))?;
        if !metadata.is_file() {
            return Err(format!("{} is not a file", path.display()));
        }
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !uploads
            .accepted_extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(&extension))
        {
            return Err(format!(
                "{} is not an accepted file type ({})",
                path.display(),
                uploads.accepted_extensions.join(", ")
            ));
        }
        if metadata.len() > uploads.max_file_bytes {
            return Err(format!(
                "{} is larger than {} bytes",
                path.display(),
                uploads.max_file_bytes
            ));
        }
        Ok(Self {
            path: path.to_path_buf(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            size: metadata.len(),
            kind: FileKind::from_path(path),
        })
    }
}

pub const PER_PAGE_NEEDS_PDF: &str = "Each Per Page needs every file to be a PDF";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChosenFiles(pub Vec<ChosenFile>);

impl ChosenFiles {
    /// Per-page scanning needs every file to be a PDF
    pub fn all_pdf(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|f| f.kind == FileKind::Pdf)
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|f| f.name.clone()).collect()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.0.iter().map(|f| f.path.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Mode-specific settings; each mode carries only the fields it uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeSettings {
    Overall {
        prompt: String,
        chunk_size: u32,
    },
    FileOverall {
        prompt: String,
        overall_prompt: Option<String>,
    },
    FileInChunks {
        prompt: String,
        final_prompt: Option<String>,
    },
    FilePerPage {
        prompt: String,
        final_prompt: Option<String>,
    },
}

impl ModeSettings {
    pub fn mode(&self) -> ScanningMode {
        match self {
            ModeSettings::Overall { .. } => ScanningMode::Overall,
            ModeSettings::FileOverall { .. } => ScanningMode::FileOverall,
            ModeSettings::FileInChunks { .. } => ScanningMode::FileInChunks,
            ModeSettings::FilePerPage { .. } => ScanningMode::FilePerPage,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            ModeSettings::Overall { prompt, .. }
            | ModeSettings::FileOverall { prompt, .. }
            | ModeSettings::FileInChunks { prompt, .. }
            | ModeSettings::FilePerPage { prompt, .. } => prompt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customizations {
    pub model: LanguageModel,
    pub settings: ModeSettings,
}

impl Customizations {
    pub fn to_wire(&self) -> CustomRequestCustomizations {
        let mut wire = CustomRequestCustomizations {
            mode: self.settings.mode(),
            model: self.model,
            prompt: self.settings.prompt().to_string(),
            final_prompt: None,
            overall_prompt: None,
            include_final_prompt: false,
            chunk_size: None,
        };
        match &self.settings {
            ModeSettings::Overall { chunk_size, .. } => wire.chunk_size = Some(*chunk_size),
            ModeSettings::FileOverall { overall_prompt, .. } => {
                wire.overall_prompt = overall_prompt.clone();
            }
            ModeSettings::FileInChunks { final_prompt, .. }
            | ModeSettings::FilePerPage { final_prompt, .. } => {
                wire.include_final_prompt = final_prompt.is_some();
                wire.final_prompt = final_prompt.clone();
            }
        }
        wire
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomRequestPayload {
    Files(ChosenFiles),
    Customize(Customizations),
}

pub struct CustomRequestFlow {
    steps: [StepDefinition<CustomRequestStep>; 3],
}

impl CustomRequestFlow {
    pub fn new() -> Self {
        Self {
            steps: [
                StepDefinition {
                    id: FILES_STEP,
                    label: "Choose files",
                    kind: CustomRequestStep::Files,
                },
                StepDefinition {
                    id: CUSTOMIZE_STEP,
                    label: "Customize request",
                    kind: CustomRequestStep::Customize,
                },
                StepDefinition {
                    id: REVIEW_STEP,
                    label: "Review",
                    kind: CustomRequestStep::Review,
                },
            ],
        }
    }
}

impl Default for CustomRequestFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn chosen_files(state: &WizardState<CustomRequestPayload>) -> Result<&ChosenFiles, WizardError> {
    match state.require(FILES_STEP)? {
        CustomRequestPayload::Files(files) => Ok(files),
        _ => Err(WizardError::WrongStep(FILES_STEP)),
    }
}

fn customizations(
    state: &WizardState<CustomRequestPayload>,
) -> Result<&Customizations, WizardError> {
    match state.require(CUSTOMIZE_STEP)? {
        CustomRequestPayload::Customize(c) => Ok(c),
        _ => Err(WizardError::WrongStep(CUSTOMIZE_STEP)),
    }
}

impl WizardFlow for CustomRequestFlow {
    type StepKind = CustomRequestStep;
    type Payload = CustomRequestPayload;
    type Submission = CustomRequestSubmission;

    fn steps(&self) -> &[StepDefinition<CustomRequestStep>] {
        &self.steps
    }

    fn step_kind_of(payload: &CustomRequestPayload) -> CustomRequestStep {
        match payload {
            CustomRequestPayload::Files(_) => CustomRequestStep::Files,
            CustomRequestPayload::Customize(_) => CustomRequestStep::Customize,
        }
    }

    fn build_submission(
        &self,
        state: &WizardState<CustomRequestPayload>,
    ) -> Result<CustomRequestSubmission, WizardError> {
        let files = chosen_files(state)?;
        let customizations = customizations(state)?;
        // Files can be re-committed after the mode was chosen
        if customizations.settings.mode() == ScanningMode::FilePerPage && !files.all_pdf() {
            return Err(WizardError::Invalid {
                step: CUSTOMIZE_STEP,
                message: PER_PAGE_NEEDS_PDF.to_string(),
            });
        }
        Ok(CustomRequestSubmission {
            customizations: customizations.to_wire(),
            files: files.paths(),
        })
    }
}

#[async_trait]
impl SubmissionTarget for CustomRequestFlow {
    type Response = CustomRequestCreated;

    async fn send(
        api: &dyn DashboardApi,
        submission: CustomRequestSubmission,
    ) -> Result<CustomRequestCreated, ApiError> {
        api.create_custom_request(&submission).await
    }

    fn success_route() -> Route {
        Route::Queue
    }

    fn success_message(_: &CustomRequestCreated) -> String {
        "Custom request is processing".to_string()
    }
}

/// What the review step shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomRequestReview {
    pub file_names: Vec<String>,
    pub prompt: String,
    pub mode: Option<ScanningMode>,
    pub model: Option<LanguageModel>,
    /// Committed customizations that no longer fit the committed files
    pub problem: Option<&'static str>,
}

impl CustomRequestReview {
    /// Tolerates missing payloads: a forward jump can land here early
    pub fn from_controller(controller: &StepController<CustomRequestFlow>) -> Self {
        let state = controller.state();
        let files = chosen_files(state).ok();
        let custom = customizations(state).ok();
        let per_page_mismatch = matches!(
            (files, custom.map(|c| c.settings.mode())),
            (Some(files), Some(ScanningMode::FilePerPage)) if !files.all_pdf()
        );
        Self {
            file_names: files.map(ChosenFiles::names).unwrap_or_default(),
            problem: per_page_mismatch.then_some(PER_PAGE_NEEDS_PDF),
            prompt: custom
                .map(|c| c.settings.prompt().to_string())
                .unwrap_or_default(),
            mode: custom.map(|c| c.settings.mode()),
            model: custom.map(|c| c.model),
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.file_names.is_empty() && !self.prompt.trim().is_empty() && self.problem.is_none()
    }
}

/// Step 1: collect local files
#[derive(Debug, Clone)]
pub struct FilesForm {
    pub files: Vec<ChosenFile>,
    /// Path being typed
    pub input: String,
    uploads: UploadsConfig,
}

impl FilesForm {
    pub fn new(uploads: &UploadsConfig, previous: Option<&ChosenFiles>) -> Self {
        Self {
            files: previous.map(|p| p.0.clone()).unwrap_or_default(),
            input: String::new(),
            uploads: uploads.clone(),
        }
    }

    /// Add the file at `path`; rejects duplicates and files outside the limits
    pub fn add_path(&mut self, path: &str) -> Result<(), String> {
        let path = path.trim();
        if path.is_empty() {
            return Err("Enter a file path".to_string());
        }
        let chosen = ChosenFile::inspect(Path::new(path), &self.uploads)?;
        if self.files.iter().any(|f| f.path == chosen.path) {
            return Err(format!("{} is already added", chosen.name));
        }
        tracing::debug!(file = %chosen.name, size = chosen.size, "file chosen");
        self.files.push(chosen);
        Ok(())
    }

    /// Add what is in the input line and clear it on success
    pub fn add_input(&mut self) -> Result<(), String> {
        let input = std::mem::take(&mut self.input);
        match self.add_path(&input) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.input = input;
                Err(e)
            }
        }
    }

    pub fn remove(&mut self, index: usize) {
        if index < self.files.len() {
            self.files.remove(index);
        }
    }
}

impl StepForm for FilesForm {
    type Payload = ChosenFiles;

    fn validate(&self) -> Result<ChosenFiles, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.files.is_empty() {
            errors.push("files", "Choose at least one file");
        }
        errors.into_result(|| ChosenFiles(self.files.clone()))
    }
}

/// Step 2: mode, model and prompts
#[derive(Debug, Clone)]
pub struct CustomizeForm {
    pub mode: ScanningMode,
    pub model: LanguageModel,
    pub prompt: String,
    pub overall_prompt: String,
    pub include_final_prompt: bool,
    pub final_prompt: String,
    /// Text of the chunk size field (OVERALL only)
    pub chunk_size: String,
    catalog: ModelCatalog,
    usage_credits: u64,
    has_files: bool,
    all_pdf: bool,
}

impl CustomizeForm {
    pub fn new(
        catalog: &ModelCatalog,
        usage_credits: u64,
        files: Option<&ChosenFiles>,
        previous: Option<&Customizations>,
    ) -> Self {
        let model = previous.map(|c| c.model).unwrap_or_default();
        let mut form = Self {
            mode: ScanningMode::Overall,
            model,
            prompt: String::new(),
            overall_prompt: String::new(),
            include_final_prompt: false,
            final_prompt: String::new(),
            chunk_size: catalog.context_size(model).to_string(),
            catalog: catalog.clone(),
            usage_credits,
            has_files: files.is_some_and(|f| !f.is_empty()),
            all_pdf: files.map(ChosenFiles::all_pdf).unwrap_or(false),
        };
        if let Some(prev) = previous {
            form.mode = prev.settings.mode();
            form.prompt = prev.settings.prompt().to_string();
            match &prev.settings {
                ModeSettings::Overall { chunk_size, .. } => {
                    form.chunk_size = chunk_size.to_string();
                }
                ModeSettings::FileOverall { overall_prompt, .. } => {
                    form.overall_prompt = overall_prompt.clone().unwrap_or_default();
                }
                ModeSettings::FileInChunks { final_prompt, .. }
                | ModeSettings::FilePerPage { final_prompt, .. } => {
                    form.include_final_prompt = final_prompt.is_some();
                    form.final_prompt = final_prompt.clone().unwrap_or_default();
                }
            }
        }
        form
    }

    /// Modes the user can pick for the chosen files
    pub fn available_modes(&self) -> Vec<ScanningMode> {
        ScanningMode::all()
            .iter()
            .copied()
            .filter(|m| *m != ScanningMode::FilePerPage || self.all_pdf)
            .collect()
    }

    pub fn is_model_selectable(&self, model: LanguageModel) -> bool {
        self.catalog.is_selectable(model, self.usage_credits)
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Switch model and keep the chunk size inside its context
    pub fn set_model(&mut self, model: LanguageModel) {
        self.model = model;
        if let Ok(size) = self.chunk_size.trim().parse::<u32>() {
            self.chunk_size = self.catalog.clamp_chunk_size(model, size).to_string();
        }
    }

    pub fn apply_prompt(&mut self, prebuilt: &PrebuiltPrompt) {
        self.prompt = prebuilt.prompt.to_string();
    }

    fn final_prompt(&self, errors: &mut ValidationErrors) -> Option<String> {
        if !self.include_final_prompt {
            return None;
        }
        let text = self.final_prompt.trim();
        if text.is_empty() {
            errors.push("final_prompt", "Final prompt is required when included");
            return None;
        }
        Some(text.to_string())
    }
}

impl StepForm for CustomizeForm {
    type Payload = Customizations;

    fn validate(&self) -> Result<Customizations, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.has_files {
            errors.push("files", "Choose at least one file first");
        }

        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            errors.push("prompt", "Prompt is required");
        }
        if !self.is_model_selectable(self.model) {
            errors.push(
                "model",
                format!("{} is not available for this account", self.model.label()),
            );
        }

        let settings = match self.mode {
            ScanningMode::Overall => match self.chunk_size.trim().parse::<u32>() {
                Ok(size) => ModeSettings::Overall {
                    prompt,
                    chunk_size: self.catalog.clamp_chunk_size(self.model, size),
                },
                Err(_) => {
                    errors.push("chunk_size", "Chunk size must be a whole number");
                    return Err(errors);
                }
            },
            ScanningMode::FileOverall => {
                let overall = self.overall_prompt.trim();
                ModeSettings::FileOverall {
                    prompt,
                    overall_prompt: (!overall.is_empty()).then(|| overall.to_string()),
                }
            }
            ScanningMode::FileInChunks => ModeSettings::FileInChunks {
                final_prompt: self.final_prompt(&mut errors),
                prompt,
            },
            ScanningMode::FilePerPage => {
                if !self.all_pdf {
                    errors.push("mode", PER_PAGE_NEEDS_PDF);
                }
                ModeSettings::FilePerPage {
                    final_prompt: self.final_prompt(&mut errors),
                    prompt,
                }
            }
        };

        errors.into_result(|| Customizations {
            model: self.model,
            settings,
        })
    }
}
