//! Analysis task records as returned by `/tasks`.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a server-side analysis task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Accepted, not yet picked up by a worker.
    #[default]
    Pending,
    /// A worker is scoring channels.
    Processing,
    /// Results are available.
    Completed,
    /// The job stopped with an error.
    Failed,
}

impl TaskStatus {
    /// `true` once the backend will no longer transition the task.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One channel's score against one filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelScore {
    pub channel: String,
    pub filter_id: String,
    #[serde(default)]
    pub filter_name: Option<String>,
    pub score: f64,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// An analysis job as observed by the client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisTask {
    pub id: String,
    #[serde(default)]
    pub status: TaskStatus,
    /// Percentage in `0..=100`.
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub filter_ids: Vec<String>,
    /// Present only on the detailed record once the job completes.
    #[serde(default)]
    pub results: Option<Vec<ChannelScore>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AnalysisTask {
    /// Highest score per channel, for summary views.
    #[must_use]
    pub fn top_scores(&self) -> Vec<(&str, f64)> {
        let mut best: Vec<(&str, f64)> = Vec::new();
        for score in self.results.iter().flatten() {
            match best.iter().position(|(channel, _)| *channel == score.channel) {
                Some(idx) => best[idx].1 = best[idx].1.max(score.score),
                None => best.push((score.channel.as_str(), score.score)),
            }
        }
        best
    }
}

/// Body for `POST /tasks`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub channels: Vec<String>,
    pub filter_ids: Vec<String>,
}
