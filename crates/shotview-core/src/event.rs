//! Events accepted by the run-state reducer.
//!
//! On the wire an event is `{"type": "TEST_RESULT", "payload": ...}`; unit
//! events may omit `payload`. Type names the reducer does not know decode to
//! [`RunEvent::Unrecognized`] instead of failing, since the producer may be
//! newer than the store.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{BrowserState, Outcome, Skip, Suite};
use crate::status::Status;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunEvent {
    ViewInitial(Box<ViewInitialPayload>),
    RunAllTests(RunAllTestsPayload),
    RunFailedTests,
    RetrySuite,
    RetryTest,
    SuiteBegin(SuiteBeginPayload),
    TestBegin(TestBeginPayload),
    TestsEnd,
    TestResult(OneOrMany<TestResultPayload>),
    UpdateResult(OneOrMany<TestResultPayload>),
    ViewExpandAll,
    ViewExpandErrors,
    ViewExpandRetries,
    ViewCollapseAll,
    ViewShowAll,
    ViewShowFailed,
    ViewToggleSkipped,
    ViewToggleOnlyDiff,
    ViewToggleScaleImages,
    ViewToggleLazyLoadImages,
    ViewUpdateBaseHost(BaseHostPayload),
    ViewUpdateFilterByName(FilterByNamePayload),
    CloseSections(Vec<String>),
    ViewToggleGroupByError,
    ToggleTestResult(ToggleTestResultPayload),
    ToggleStateResult(ToggleStateResultPayload),
    ChangeTestRetry(ChangeTestRetryPayload),
    ToggleLoading(LoadingState),
    ShowModal(ModalState),
    HideModal,
    /// Any event type this reducer does not handle.
    Unrecognized,
}

impl RunEvent {
    /// Wire names of every handled event type.
    pub const KINDS: &'static [&'static str] = &[
        "VIEW_INITIAL",
        "RUN_ALL_TESTS",
        "RUN_FAILED_TESTS",
        "RETRY_SUITE",
        "RETRY_TEST",
        "SUITE_BEGIN",
        "TEST_BEGIN",
        "TESTS_END",
        "TEST_RESULT",
        "UPDATE_RESULT",
        "VIEW_EXPAND_ALL",
        "VIEW_EXPAND_ERRORS",
        "VIEW_EXPAND_RETRIES",
        "VIEW_COLLAPSE_ALL",
        "VIEW_SHOW_ALL",
        "VIEW_SHOW_FAILED",
        "VIEW_TOGGLE_SKIPPED",
        "VIEW_TOGGLE_ONLY_DIFF",
        "VIEW_TOGGLE_SCALE_IMAGES",
        "VIEW_TOGGLE_LAZY_LOAD_IMAGES",
        "VIEW_UPDATE_BASE_HOST",
        "VIEW_UPDATE_FILTER_BY_NAME",
        "CLOSE_SECTIONS",
        "VIEW_TOGGLE_GROUP_BY_ERROR",
        "TOGGLE_TEST_RESULT",
        "TOGGLE_STATE_RESULT",
        "CHANGE_TEST_RETRY",
        "TOGGLE_LOADING",
        "SHOW_MODAL",
        "HIDE_MODAL",
    ];

    /// Wire name of this event.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ViewInitial(_) => "VIEW_INITIAL",
            Self::RunAllTests(_) => "RUN_ALL_TESTS",
            Self::RunFailedTests => "RUN_FAILED_TESTS",
            Self::RetrySuite => "RETRY_SUITE",
            Self::RetryTest => "RETRY_TEST",
            Self::SuiteBegin(_) => "SUITE_BEGIN",
            Self::TestBegin(_) => "TEST_BEGIN",
            Self::TestsEnd => "TESTS_END",
            Self::TestResult(_) => "TEST_RESULT",
            Self::UpdateResult(_) => "UPDATE_RESULT",
            Self::ViewExpandAll => "VIEW_EXPAND_ALL",
            Self::ViewExpandErrors => "VIEW_EXPAND_ERRORS",
            Self::ViewExpandRetries => "VIEW_EXPAND_RETRIES",
            Self::ViewCollapseAll => "VIEW_COLLAPSE_ALL",
            Self::ViewShowAll => "VIEW_SHOW_ALL",
            Self::ViewShowFailed => "VIEW_SHOW_FAILED",
            Self::ViewToggleSkipped => "VIEW_TOGGLE_SKIPPED",
            Self::ViewToggleOnlyDiff => "VIEW_TOGGLE_ONLY_DIFF",
            Self::ViewToggleScaleImages => "VIEW_TOGGLE_SCALE_IMAGES",
            Self::ViewToggleLazyLoadImages => "VIEW_TOGGLE_LAZY_LOAD_IMAGES",
            Self::ViewUpdateBaseHost(_) => "VIEW_UPDATE_BASE_HOST",
            Self::ViewUpdateFilterByName(_) => "VIEW_UPDATE_FILTER_BY_NAME",
            Self::CloseSections(_) => "CLOSE_SECTIONS",
            Self::ViewToggleGroupByError => "VIEW_TOGGLE_GROUP_BY_ERROR",
            Self::ToggleTestResult(_) => "TOGGLE_TEST_RESULT",
            Self::ToggleStateResult(_) => "TOGGLE_STATE_RESULT",
            Self::ChangeTestRetry(_) => "CHANGE_TEST_RETRY",
            Self::ToggleLoading(_) => "TOGGLE_LOADING",
            Self::ShowModal(_) => "SHOW_MODAL",
            Self::HideModal => "HIDE_MODAL",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Decode one event.
    ///
    /// Unknown type names yield `Unrecognized`; a known type with a payload
    /// that does not fit is an error.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        #[derive(Deserialize)]
        struct Envelope {
            #[serde(rename = "type")]
            kind: String,
        }

        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| Error::Event(e.to_string()))?;
        let envelope: Envelope =
            serde_json::from_value(value.clone()).map_err(|e| Error::Event(e.to_string()))?;

        if !Self::KINDS.contains(&envelope.kind.as_str()) {
            tracing::debug!(kind = %envelope.kind, "Ignoring unrecognized event type");
            return Ok(Self::Unrecognized);
        }

        serde_json::from_value(value)
            .map_err(|e| Error::Event(format!("{}: {e}", envelope.kind)))
    }
}

/// Single item or a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(item: T) -> Self {
        Self::One(item)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewInitialPayload {
    pub suites: Vec<Suite>,
    pub skips: Vec<Skip>,
    pub config: ViewConfigFragment,
    pub gui: bool,
    pub auto_run: bool,
    pub api_values: serde_json::Value,
}

/// View settings carried by `VIEW_INITIAL`; absent fields leave the view as is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewConfigFragment {
    pub scale_images: Option<bool>,
    pub lazy_load_offset: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunAllTestsPayload {
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteBeginPayload {
    pub suite_path: Vec<String>,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestBeginPayload {
    pub suite_path: Vec<String>,
    pub status: Status,
    pub browser_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultPayload {
    pub suite_path: Vec<String>,
    pub browser_id: String,
    pub browser_result: BrowserResultUpdate,
}

/// New data for one browser entry.
///
/// Either the full attempt record (`result` plus optional `retries`) or just
/// the latest outcome. The entry's transient view state is kept unless the
/// update carries its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrowserResultUpdate {
    Attempts {
        result: Outcome,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        retries: Option<Vec<Outcome>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<BrowserState>,
    },
    Latest(Outcome),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseHostPayload {
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterByNamePayload {
    pub test_name_filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleTestResultPayload {
    pub suite_path: Vec<String>,
    pub browser_id: String,
    pub opened: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleStateResultPayload {
    pub suite_path: Vec<String>,
    pub browser_id: String,
    /// Image state to toggle; the last one when absent.
    #[serde(default)]
    pub state_name: Option<String>,
    /// Attempt index over retries (oldest first) followed by the result.
    pub retry_index: usize,
    pub opened: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeTestRetryPayload {
    pub suite_path: Vec<String>,
    pub browser_id: String,
    pub retry_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingState {
    pub active: bool,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalState {
    pub id: String,
    #[serde(default)]
    pub data: serde_json::Value,
}
