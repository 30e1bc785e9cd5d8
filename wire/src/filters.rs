//! Filter records for `/filters`.

use serde::{Deserialize, Serialize};

/// A named scoring criterion applied during analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub criteria: String,
    #[serde(default = "default_category")]
    pub category: String,
    /// System filters are provided by the backend and cannot be deleted.
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_category() -> String {
    "general".to_owned()
}

/// Body for `POST /filters`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewFilter {
    pub name: String,
    pub criteria: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}
