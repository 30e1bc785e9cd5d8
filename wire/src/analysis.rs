//! Request/response bodies for `POST /analysis/analyse`.

use serde::{Deserialize, Serialize};

/// How the backend schedules scoring calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// Queued and scored in provider batches; cheaper, slower.
    #[default]
    Batch,
    /// Scored immediately, one call per channel.
    Direct,
}

impl std::str::FromStr for ProcessingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "batch" => Ok(Self::Batch),
            "direct" => Ok(Self::Direct),
            other => Err(format!("unknown processing mode '{other}' (expected 'batch' or 'direct')")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub max_posts: u32,
    pub detailed: bool,
    pub include_examples: bool,
    pub processing_mode: ProcessingMode,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self { max_posts: 100, detailed: false, include_examples: true, processing_mode: ProcessingMode::Batch }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub channels: Vec<String>,
    pub filter_ids: Vec<String>,
    #[serde(default)]
    pub options: AnalysisOptions,
}

/// Response of `POST /analysis/analyse`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStarted {
    pub task_id: String,
    #[serde(default)]
    pub status: crate::TaskStatus,
    #[serde(default)]
    pub message: Option<String>,
}
