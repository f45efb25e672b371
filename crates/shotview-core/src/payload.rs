//! Initial run payload produced by the test orchestrator.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{RunStats, Skip, Stats, Suite};
use crate::patterns::ErrorPatternConfig;
use crate::view::{DEFAULT_LAZY_LOAD_OFFSET, ViewMode};

const DATE_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

/// Reporter configuration embedded in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunConfig {
    pub error_patterns: Vec<ErrorPatternConfig>,
    pub scale_images: bool,
    pub lazy_load_offset: u32,
    pub default_view: ViewMode,
    pub base_host: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            error_patterns: Vec::new(),
            scale_images: false,
            lazy_load_offset: DEFAULT_LAZY_LOAD_OFFSET,
            default_view: ViewMode::All,
            base_host: String::new(),
        }
    }
}

/// Run start time: epoch milliseconds or a date string.
///
/// Fractional milliseconds are accepted and truncated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunDate {
    Millis(f64),
    Text(String),
}

impl RunDate {
    /// Local-time display string. Strings that are not RFC 3339 are kept as-is.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_display(&self) -> String {
        match self {
            Self::Millis(ms) => Some(*ms)
                .filter(|ms| ms.is_finite())
                .and_then(|ms| DateTime::from_timestamp_millis(ms.trunc() as i64))
                .map_or_else(
                    || ms.to_string(),
                    |dt| dt.with_timezone(&Local).format(DATE_FORMAT).to_string(),
                ),
            Self::Text(text) => DateTime::parse_from_rfc3339(text).map_or_else(
                |_| text.clone(),
                |dt| dt.with_timezone(&Local).format(DATE_FORMAT).to_string(),
            ),
        }
    }
}

/// Full-run data the store is seeded from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitialPayload {
    pub skips: Vec<Skip>,
    pub suites: Vec<Suite>,
    pub config: RunConfig,
    pub total: u64,
    pub updated: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub warned: u64,
    pub retries: u64,
    pub per_browser: BTreeMap<String, RunStats>,
    pub api_values: serde_json::Value,
    pub gui: bool,
    pub date: Option<RunDate>,
}

impl InitialPayload {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Payload(e.to_string()))
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            all: RunStats {
                total: self.total,
                updated: self.updated,
                passed: self.passed,
                failed: self.failed,
                skipped: self.skipped,
                retries: self.retries,
                warned: self.warned,
            },
            per_browser: self.per_browser.clone(),
        }
    }
}
