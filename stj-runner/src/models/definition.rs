//! Outbound job definition payload

use serde::Serialize;
use uuid::Uuid;

/// Reference to a remote acoustic or language model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ModelIdentity {
    pub id: Uuid,
}

impl ModelIdentity {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProfanityFilterMode {
    None,
    Removed,
    Tags,
    Masked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PunctuationMode {
    None,
    Dictated,
    Automatic,
    DictatedAndAutomatic,
}

/// Service-side processing switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOptions {
    pub profanity_filter_mode: ProfanityFilterMode,
    pub punctuation_mode: PunctuationMode,
    pub add_word_level_timestamps: bool,
}

impl Default for ProcessingOptions {
    /// Masked profanity, dictated and automatic punctuation, word timestamps on
    fn default() -> Self {
        Self {
            profanity_filter_mode: ProfanityFilterMode::Masked,
            punctuation_mode: PunctuationMode::DictatedAndAutomatic,
            add_word_level_timestamps: true,
        }
    }
}

/// Submission payload for one transcription job
///
/// Immutable once built. Model identifiers keep their first-seen order and
/// duplicates are dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDefinition {
    name: String,
    description: String,
    locale: String,
    recordings_url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    models: Vec<ModelIdentity>,
    properties: ProcessingOptions,
}

impl JobDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        locale: impl Into<String>,
        recordings_url: impl Into<String>,
        models: impl IntoIterator<Item = ModelIdentity>,
        properties: ProcessingOptions,
    ) -> Self {
        let mut unique: Vec<ModelIdentity> = Vec::new();
        for model in models {
            if !unique.contains(&model) {
                unique.push(model);
            }
        }

        Self {
            name: name.into(),
            description: description.into(),
            locale: locale.into(),
            recordings_url: recordings_url.into(),
            models: unique,
            properties,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn recordings_url(&self) -> &str {
        &self.recordings_url
    }

    pub fn models(&self) -> &[ModelIdentity] {
        &self.models
    }

    pub fn properties(&self) -> &ProcessingOptions {
        &self.properties
    }
}
