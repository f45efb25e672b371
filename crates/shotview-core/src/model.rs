//! Result tree data types.
//!
//! Field names serialize in camelCase so the types decode the run payload
//! produced by the test orchestrator as-is.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::status::Status;

/// A node of the test plan: either a grouping suite with `children`, or a
/// leaf test carrying per-browser `browsers` results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suite {
    pub name: String,
    pub suite_path: Vec<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<Suite>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub browsers: Vec<BrowserResult>,
    /// Stamp of the last event that touched this node or a descendant.
    #[serde(default)]
    pub revision: u64,
}

impl Suite {
    /// Root suite id: the first path segment, falling back to the name.
    #[must_use]
    pub fn id(&self) -> &str {
        self.suite_path.first().map_or(self.name.as_str(), String::as_str)
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status.is_failed()
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Arc<Suite>> {
        self.children.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn browser(&self, name: &str) -> Option<&BrowserResult> {
        self.browsers.iter().find(|b| b.name == name)
    }

    pub fn browser_mut(&mut self, name: &str) -> Option<&mut BrowserResult> {
        self.browsers.iter_mut().find(|b| b.name == name)
    }

    /// Statuses this node's own status is derived from.
    pub(crate) fn child_statuses(&self) -> impl Iterator<Item = Status> + '_ {
        self.children
            .iter()
            .map(|c| c.status)
            .chain(self.browsers.iter().map(|b| b.result.status))
    }
}

/// Outcome of one test in one browser, including its retry history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserResult {
    pub name: String,
    pub result: Outcome,
    /// Earlier attempts, oldest first.
    #[serde(default)]
    pub retries: Vec<Outcome>,
    #[serde(default)]
    pub state: BrowserState,
}

impl BrowserResult {
    /// Number of attempts: every retry plus the current result.
    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.retries.len() + 1
    }

    /// Attempt at `index`, counting retries oldest first and then the
    /// current result.
    #[must_use]
    pub fn attempt(&self, index: usize) -> Option<&Outcome> {
        match index.cmp(&self.retries.len()) {
            std::cmp::Ordering::Less => self.retries.get(index),
            std::cmp::Ordering::Equal => Some(&self.result),
            std::cmp::Ordering::Greater => None,
        }
    }

    pub fn attempt_mut(&mut self, index: usize) -> Option<&mut Outcome> {
        match index.cmp(&self.retries.len()) {
            std::cmp::Ordering::Less => self.retries.get_mut(index),
            std::cmp::Ordering::Equal => Some(&mut self.result),
            std::cmp::Ordering::Greater => None,
        }
    }

    /// All attempts, oldest first.
    pub fn attempts(&self) -> impl Iterator<Item = &Outcome> {
        self.retries.iter().chain(std::iter::once(&self.result))
    }
}

/// Transient view state of a browser result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserState {
    #[serde(default)]
    pub opened: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_index: Option<usize>,
}

/// A single attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub images_info: Vec<ImageInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ErrorDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_info: Option<serde_json::Value>,
}

impl Outcome {
    #[must_use]
    pub fn image(&self, state_name: &str) -> Option<&ImageInfo> {
        self.images_info.iter().find(|i| i.state_name == state_name)
    }
}

/// Comparison record for one named screenshot state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    #[serde(default)]
    pub state_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_img: Option<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_img: Option<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_img: Option<ImageRef>,
    #[serde(default)]
    pub opened: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ImageSize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// A test that was skipped by configuration rather than run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skip {
    pub suite: String,
    pub browser: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStats {
    pub total: u64,
    pub updated: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub retries: u64,
    pub warned: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub all: RunStats,
    pub per_browser: BTreeMap<String, RunStats>,
}
