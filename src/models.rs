//! Language models, scanning modes and the limits that bound the request forms.

use serde::{Deserialize, Serialize};

use crate::config::{ModelEntry, ModelsConfig};

/// Models a custom request can run against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageModel {
    #[default]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "claude-3-5-sonnet-20240620")]
    Claude35Sonnet,
    #[serde(rename = "llama-2")]
    Llama2,
}

impl LanguageModel {
    pub fn all() -> &'static [LanguageModel] {
        &[
            LanguageModel::Gpt4oMini,
            LanguageModel::Gpt4o,
            LanguageModel::Claude35Sonnet,
            LanguageModel::Llama2,
        ]
    }

    /// Identifier the backend expects
    pub fn id(&self) -> &'static str {
        match self {
            LanguageModel::Gpt4oMini => "gpt-4o-mini",
            LanguageModel::Gpt4o => "gpt-4o",
            LanguageModel::Claude35Sonnet => "claude-3-5-sonnet-20240620",
            LanguageModel::Llama2 => "llama-2",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LanguageModel::Gpt4oMini => "gpt-4o-mini (128k)",
            LanguageModel::Gpt4o => "gpt-4o (128k)",
            LanguageModel::Claude35Sonnet => "Claude 3.5 Sonnet",
            LanguageModel::Llama2 => "LLaMa 2",
        }
    }
}

/// How the files of a custom request are fed to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanningMode {
    /// All files in one pass
    Overall,
    /// Each file in one pass
    FileOverall,
    /// Each file split into chunks
    FileInChunks,
    /// Each page of each file (PDF only)
    FilePerPage,
}

impl ScanningMode {
    pub fn all() -> &'static [ScanningMode] {
        &[
            ScanningMode::FileOverall,
            ScanningMode::FileInChunks,
            ScanningMode::Overall,
            ScanningMode::FilePerPage,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScanningMode::Overall => "Overall",
            ScanningMode::FileOverall => "Each Overall",
            ScanningMode::FileInChunks => "Each In Chunks",
            ScanningMode::FilePerPage => "Each Per Page",
        }
    }
}

/// Read-only view over the configured model catalog
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    entries: Vec<ModelEntry>,
}

impl ModelCatalog {
    pub fn new(config: &ModelsConfig) -> Self {
        Self {
            entries: config.catalog.clone(),
        }
    }

    fn entry(&self, model: LanguageModel) -> Option<&ModelEntry> {
        self.entries.iter().find(|e| e.model == model)
    }

    /// Context size of the model, 0 when the model is not in the catalog
    pub fn context_size(&self, model: LanguageModel) -> u32 {
        self.entry(model).map(|e| e.context).unwrap_or(0)
    }

    /// Whether an account with `usage_credits` may pick `model`
    pub fn is_selectable(&self, model: LanguageModel, usage_credits: u64) -> bool {
        self.entry(model)
            .map(|e| e.enabled && usage_credits >= e.min_usage_credits)
            .unwrap_or(false)
    }

    pub fn clamp_chunk_size(&self, model: LanguageModel, value: u32) -> u32 {
        value.min(self.context_size(model))
    }

    pub fn models(&self) -> impl Iterator<Item = LanguageModel> + '_ {
        self.entries.iter().map(|e| e.model)
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(&ModelsConfig::default())
    }
}

/// A ready-made prompt offered next to the customize form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrebuiltPrompt {
    pub id: u32,
    pub name: &'static str,
    pub prompt: &'static str,
}

pub const PREBUILT_PROMPTS: &[PrebuiltPrompt] = &[
    PrebuiltPrompt {
        id: 1,
        name: "Summarization",
        prompt: "Summarize the following data.",
    },
    PrebuiltPrompt {
        id: 2,
        name: "Data Extraction",
        prompt: "Extract all numbers and metrics from the following data. Please return the results in JSON format where each result in the list of results contains a 'value' key (containing the found number or value) and a 'reference' key (containing where in the source data the number or metric came from).",
    },
    PrebuiltPrompt {
        id: 3,
        name: "Bullet Points",
        prompt: "Summarize the following data and return the summary as a list of bullet points. Please return the bullet points as a valid JSON formatted array.",
    },
    PrebuiltPrompt {
        id: 4,
        name: "Generate Resolution",
        prompt: "Scan the terms of this escrow agreement and take into account the buyer's and renter's final arguments and generate a fair resolution for this dispute.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_ids_match_serde_names() {
        for model in LanguageModel::all() {
            let json = serde_json::to_string(model).unwrap();
            assert_eq!(json, format!("\"{}\"", model.id()));
        }
    }

    #[test]
    fn test_scanning_mode_wire_names() {
        assert_eq!(
            serde_json::to_string(&ScanningMode::FileInChunks).unwrap(),
            "\"FILE_IN_CHUNKS\""
        );
        assert_eq!(
            serde_json::to_string(&ScanningMode::Overall).unwrap(),
            "\"OVERALL\""
        );
    }

    #[test]
    fn test_paid_model_needs_credits() {
        let catalog = ModelCatalog::default();
        assert!(!catalog.is_selectable(LanguageModel::Gpt4o, 0));
        assert!(catalog.is_selectable(LanguageModel::Gpt4o, 100));
        assert!(catalog.is_selectable(LanguageModel::Gpt4oMini, 0));
    }

    #[test]
    fn test_disabled_model_never_selectable() {
        let catalog = ModelCatalog::default();
        assert!(!catalog.is_selectable(LanguageModel::Llama2, u64::MAX));
    }

    #[test]
    fn test_clamp_chunk_size_to_context() {
        let catalog = ModelCatalog::default();
        assert_eq!(
            catalog.clamp_chunk_size(LanguageModel::Gpt4oMini, 500_000),
            128_000
        );
        assert_eq!(catalog.clamp_chunk_size(LanguageModel::Gpt4oMini, 2000), 2000);
        assert_eq!(
            catalog.clamp_chunk_size(LanguageModel::Claude35Sonnet, 150_000),
            150_000
        );
    }

    #[test]
    fn test_prebuilt_prompts_are_unique() {
        let mut ids: Vec<u32> = PREBUILT_PROMPTS.iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }
}
