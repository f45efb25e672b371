//! Run-state snapshot and the pure reducer over it.
//!
//! [`reduce`] maps `(&RunState, RunEvent)` to `(RunState, Vec<Effect>)`. The
//! input snapshot is never touched: the next state is a clone that shares
//! every suite subtree with the input, and tree writes go through
//! [`SuiteTree::update`] which copies only the addressed branch.
//!
//! Nothing here performs I/O. Persisting the base host is returned as an
//! [`Effect`] for the owning [`RunStore`](crate::store::RunStore) to execute.
//!
//! # Revisions
//!
//! `RunState::revision` counts tree writes. An event that resolves its suite
//! path stamps the touched branch with `revision + 1` and commits it; an event
//! whose path or browser does not resolve leaves the counter alone, so a
//! stale event produces a snapshot equal to its input.

use serde::Serialize;

use crate::event::{
    BrowserResultUpdate, LoadingState, ModalState, RunEvent, TestResultPayload,
    ToggleStateResultPayload, ViewInitialPayload,
};
use crate::grouping::{ErrorGroup, GroupingInput, group_errors};
use crate::model::{BrowserResult, Outcome, Skip, Stats, Suite};
use crate::patterns::ErrorPatterns;
use crate::payload::{InitialPayload, RunConfig, RunDate};
use crate::status::Status;
use crate::tree::{SuiteTree, refresh_status};
use crate::view::{ExpandMode, ViewMode, ViewState};

// ---------------------------------------------------------------------------
// Startup configuration
// ---------------------------------------------------------------------------

/// Values read at the boundary before the first snapshot is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupOptions {
    /// Browsers to restrict the report to. Empty means all.
    pub filtered_browsers: Vec<String>,
    /// Base host previously saved by the user, if any.
    pub stored_base_host: Option<String>,
}

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuiteIds {
    pub all: Vec<String>,
    pub failed: Vec<String>,
}

/// One immutable snapshot of the viewer state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub gui: bool,
    pub auto_run: bool,
    pub running: bool,
    pub skips: Vec<Skip>,
    pub suites: SuiteTree,
    pub suite_ids: SuiteIds,
    pub grouped_errors: Vec<ErrorGroup>,
    pub config: RunConfig,
    #[serde(skip)]
    pub error_patterns: ErrorPatterns,
    pub api_values: serde_json::Value,
    pub date: Option<String>,
    pub stats: Stats,
    pub view: ViewState,
    pub close_ids: Vec<String>,
    pub loading: LoadingState,
    pub modal: Option<ModalState>,
    pub revision: u64,
}

impl Default for RunState {
    fn default() -> Self {
        Self::from_payload(InitialPayload::default(), &StartupOptions::default())
    }
}

impl RunState {
    /// Seed a snapshot from the full-run payload.
    ///
    /// The stored base host wins over the configured one when non-empty.
    #[must_use]
    pub fn from_payload(payload: InitialPayload, options: &StartupOptions) -> Self {
        let stats = payload.stats();
        let InitialPayload {
            skips,
            suites,
            config,
            api_values,
            gui,
            date,
            ..
        } = payload;

        let mut view = ViewState {
            view_mode: config.default_view,
            scale_images: config.scale_images,
            lazy_load_offset: config.lazy_load_offset,
            filtered_browsers: options.filtered_browsers.clone(),
            ..ViewState::default()
        };
        let base_host = options
            .stored_base_host
            .as_deref()
            .filter(|host| !host.is_empty())
            .unwrap_or(&config.base_host)
            .to_string();
        view.set_base_host(base_host);

        let mut state = Self {
            gui,
            auto_run: false,
            running: false,
            skips,
            suites: SuiteTree::new(suites),
            suite_ids: SuiteIds::default(),
            grouped_errors: Vec::new(),
            error_patterns: ErrorPatterns::compile(&config.error_patterns),
            config,
            api_values,
            date: date.as_ref().map(RunDate::to_display),
            stats,
            view,
            close_ids: Vec::new(),
            loading: LoadingState::default(),
            modal: None,
            revision: 0,
        };
        state.refresh_suite_ids();
        state.regroup();
        state
    }

    /// Recompute the grouped-errors projection from its inputs.
    pub fn regroup(&mut self) {
        self.grouped_errors = group_errors(&GroupingInput {
            suites: &self.suites,
            view_mode: self.view.view_mode,
            patterns: &self.error_patterns,
            filtered_browsers: &self.view.filtered_browsers,
            test_name_filter: &self.view.test_name_filter,
        });
    }

    fn refresh_suite_ids(&mut self) {
        self.suite_ids = SuiteIds {
            all: self.suites.all_ids(),
            failed: self.suites.failed_ids(),
        };
    }

    /// Refresh every projection that depends on suite statuses.
    fn refresh_derived(&mut self) {
        self.refresh_suite_ids();
        self.regroup();
    }

    /// Write to the node at `path`, committing a new revision on success.
    fn update_node<F>(&mut self, path: &[String], mutate: F) -> bool
    where
        F: FnOnce(&mut Suite),
    {
        let revision = self.revision + 1;
        if self.suites.update(path, revision, mutate) {
            self.revision = revision;
            true
        } else {
            tracing::debug!(?path, "Ignoring event for unknown suite path");
            false
        }
    }

    /// Write to one browser entry of the node at `path`.
    fn update_browser<F>(&mut self, path: &[String], browser_id: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut BrowserResult),
    {
        let known = self
            .suites
            .find(path)
            .is_some_and(|suite| suite.browser(browser_id).is_some());
        if !known {
            tracing::debug!(?path, browser_id, "Ignoring event for unknown browser");
            return false;
        }
        self.update_node(path, |suite| {
            if let Some(browser) = suite.browser_mut(browser_id) {
                mutate(browser);
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// Side effects requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Save the user's base-host override.
    PersistBaseHost(String),
}

// ---------------------------------------------------------------------------
// Reducer
// ---------------------------------------------------------------------------

/// Compute the snapshot following `event`. `state` is left untouched.
#[must_use]
pub fn reduce(state: &RunState, event: RunEvent) -> (RunState, Vec<Effect>) {
    let mut next = state.clone();
    let effects = apply(&mut next, event);
    (next, effects)
}

fn apply(state: &mut RunState, event: RunEvent) -> Vec<Effect> {
    match event {
        // -- run lifecycle --
        RunEvent::ViewInitial(payload) => {
            view_initial(state, *payload);
            vec![]
        }
        RunEvent::RunAllTests(payload) => {
            let revision = state.revision + 1;
            state.suites.set_status_to_all(payload.status, revision);
            state.revision = revision;
            state.running = true;
            state.view.group_by_error = false;
            state.refresh_derived();
            vec![]
        }
        RunEvent::RunFailedTests | RunEvent::RetrySuite | RunEvent::RetryTest => {
            state.running = true;
            state.view.group_by_error = false;
            vec![]
        }
        RunEvent::SuiteBegin(payload) => {
            if state.update_node(&payload.suite_path, |suite| suite.status = payload.status) {
                state.refresh_derived();
            }
            vec![]
        }
        RunEvent::TestBegin(payload) => {
            let status = payload.status;
            let browser_id = payload.browser_id.as_str();
            let updated = state.update_node(&payload.suite_path, |suite| {
                suite.status = status;
                if let Some(browser) = suite.browser_mut(browser_id) {
                    browser.result.status = status;
                }
            });
            if updated {
                state.refresh_derived();
            }
            vec![]
        }
        RunEvent::TestsEnd => {
            state.running = false;
            vec![]
        }
        RunEvent::TestResult(items) | RunEvent::UpdateResult(items) => {
            add_test_results(state, items.into_vec());
            vec![]
        }

        // -- expand / view mode --
        RunEvent::ViewExpandAll => set_expand(state, ExpandMode::All),
        RunEvent::ViewExpandErrors => set_expand(state, ExpandMode::Errors),
        RunEvent::ViewExpandRetries => set_expand(state, ExpandMode::Retries),
        RunEvent::ViewCollapseAll => set_expand(state, ExpandMode::None),
        RunEvent::ViewShowAll => set_view_mode(state, ViewMode::All),
        RunEvent::ViewShowFailed => set_view_mode(state, ViewMode::Failed),

        // -- toggles --
        RunEvent::ViewToggleSkipped => {
            state.view.show_skipped = !state.view.show_skipped;
            vec![]
        }
        RunEvent::ViewToggleOnlyDiff => {
            state.view.show_only_diff = !state.view.show_only_diff;
            vec![]
        }
        RunEvent::ViewToggleScaleImages => {
            state.view.scale_images = !state.view.scale_images;
            vec![]
        }
        RunEvent::ViewToggleLazyLoadImages => {
            state.view.lazy_load_offset = if state.view.lazy_load_offset == 0 {
                state.config.lazy_load_offset
            } else {
                0
            };
            vec![]
        }
        RunEvent::ViewToggleGroupByError => {
            state.view.group_by_error = !state.view.group_by_error;
            vec![]
        }

        // -- filters and host --
        RunEvent::ViewUpdateBaseHost(payload) => {
            state.view.set_base_host(payload.host.clone());
            vec![Effect::PersistBaseHost(payload.host)]
        }
        RunEvent::ViewUpdateFilterByName(payload) => {
            state.view.test_name_filter = payload.test_name_filter;
            state.regroup();
            vec![]
        }
        RunEvent::CloseSections(ids) => {
            state.close_ids = ids;
            vec![]
        }

        // -- per-result UI state --
        RunEvent::ToggleTestResult(payload) => {
            let opened = payload.opened;
            state.update_browser(&payload.suite_path, &payload.browser_id, |browser| {
                browser.state.opened = opened;
            });
            vec![]
        }
        RunEvent::ToggleStateResult(payload) => {
            toggle_state_result(state, &payload);
            vec![]
        }
        RunEvent::ChangeTestRetry(payload) => {
            let retry_index = payload.retry_index;
            state.update_browser(&payload.suite_path, &payload.browser_id, |browser| {
                browser.state.retry_index = Some(retry_index);
            });
            vec![]
        }

        // -- overlays --
        RunEvent::ToggleLoading(loading) => {
            state.loading = loading;
            vec![]
        }
        RunEvent::ShowModal(modal) => {
            state.modal = Some(modal);
            vec![]
        }
        RunEvent::HideModal => {
            state.modal = None;
            vec![]
        }

        RunEvent::Unrecognized => vec![],
    }
}

fn view_initial(state: &mut RunState, payload: ViewInitialPayload) {
    let ViewInitialPayload {
        suites,
        skips,
        config,
        gui,
        auto_run,
        api_values,
    } = payload;

    let revision = state.revision + 1;
    state.suites = SuiteTree::new(suites);
    state.suites.stamp_all(revision);
    state.revision = revision;
    state.skips = skips;
    state.gui = gui;
    state.auto_run = auto_run;
    state.api_values = api_values;
    if let Some(scale_images) = config.scale_images {
        state.view.scale_images = scale_images;
    }
    if let Some(lazy_load_offset) = config.lazy_load_offset {
        state.view.lazy_load_offset = lazy_load_offset;
    }
    state.refresh_derived();
}

fn add_test_results(state: &mut RunState, items: Vec<TestResultPayload>) {
    let mut touched = false;
    for item in items {
        let TestResultPayload {
            suite_path,
            browser_id,
            browser_result,
        } = item;
        let known = state
            .suites
            .find(&suite_path)
            .is_some_and(|suite| suite.browser(&browser_id).is_some());
        if !known {
            tracing::debug!(path = ?suite_path, browser_id, "Ignoring result for unknown browser");
            continue;
        }
        touched |= state.update_node(&suite_path, |suite| {
            if let Some(browser) = suite.browser_mut(&browser_id) {
                merge_browser_result(browser, browser_result);
            }
            refresh_status(suite);
        });
    }
    if touched {
        state.refresh_derived();
    }
}

fn merge_browser_result(browser: &mut BrowserResult, update: BrowserResultUpdate) {
    match update {
        BrowserResultUpdate::Attempts {
            result,
            retries,
            state,
        } => {
            browser.result = result;
            if let Some(retries) = retries {
                browser.retries = retries;
            }
            if let Some(state) = state {
                browser.state = state;
            }
        }
        BrowserResultUpdate::Latest(result) => browser.result = result,
    }
}

fn set_expand(state: &mut RunState, expand: ExpandMode) -> Vec<Effect> {
    state.view.expand = expand;
    vec![]
}

fn set_view_mode(state: &mut RunState, view_mode: ViewMode) -> Vec<Effect> {
    state.view.view_mode = view_mode;
    state.view.expand = ExpandMode::Errors;
    state.regroup();
    vec![]
}

/// Index of the image-state to toggle: by name, or the last one when no name
/// is given.
fn image_index(outcome: &Outcome, state_name: Option<&str>) -> Option<usize> {
    match state_name.filter(|name| !name.is_empty()) {
        Some(name) => outcome
            .images_info
            .iter()
            .position(|image| image.state_name == name),
        None => outcome.images_info.len().checked_sub(1),
    }
}

fn toggle_state_result(state: &mut RunState, payload: &ToggleStateResultPayload) {
    let state_name = payload.state_name.as_deref();
    let target = state
        .suites
        .find(&payload.suite_path)
        .and_then(|suite| suite.browser(&payload.browser_id))
        .and_then(|browser| browser.attempt(payload.retry_index))
        .and_then(|outcome| image_index(outcome, state_name));

    let Some(index) = target else {
        tracing::debug!(
            path = ?payload.suite_path,
            browser_id = %payload.browser_id,
            state_name,
            retry_index = payload.retry_index,
            "Ignoring toggle for unknown image state"
        );
        return;
    };

    let (retry_index, opened) = (payload.retry_index, payload.opened);
    state.update_browser(&payload.suite_path, &payload.browser_id, |browser| {
        if let Some(image) = browser
            .attempt_mut(retry_index)
            .and_then(|outcome| outcome.images_info.get_mut(index))
        {
            image.opened = opened;
        }
    });
}

/// Status of the root suite `id`, for callers that only need the headline.
#[must_use]
pub fn root_status(state: &RunState, id: &str) -> Option<Status> {
    state.suites.get(id).map(|suite| suite.status)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::event::{
        BaseHostPayload, ChangeTestRetryPayload, FilterByNamePayload, OneOrMany, RunAllTestsPayload,
        SuiteBeginPayload, TestBeginPayload, ToggleTestResultPayload, ViewConfigFragment,
    };
    use crate::model::{BrowserState, ErrorDetails, ImageInfo};

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| (*s).to_string()).collect()
    }

    fn outcome(status: Status, states: &[&str]) -> Outcome {
        Outcome {
            status,
            images_info: states
                .iter()
                .map(|name| ImageInfo {
                    state_name: (*name).to_string(),
                    ..ImageInfo::default()
                })
                .collect(),
            ..Outcome::default()
        }
    }

    fn leaf(segments: &[&str], status: Status) -> Suite {
        Suite {
            name: (*segments.last().unwrap()).to_string(),
            suite_path: path(segments),
            status,
            children: Vec::new(),
            browsers: vec![BrowserResult {
                name: "chrome".to_string(),
                result: outcome(status, &["plain", "hover"]),
                retries: vec![outcome(Status::Fail, &["plain"])],
                state: BrowserState::default(),
            }],
            revision: 0,
        }
    }

    fn state() -> RunState {
        let payload = InitialPayload {
            suites: vec![leaf(&["login"], Status::Success), leaf(&["search"], Status::Success)],
            ..InitialPayload::default()
        };
        RunState::from_payload(payload, &StartupOptions::default())
    }

    #[test]
    fn default_state() {
        let state = RunState::default();
        assert!(state.suites.is_empty());
        assert_eq!(state.view.view_mode, ViewMode::All);
        assert_eq!(state.view.expand, ExpandMode::Errors);
        assert_eq!(state.view.lazy_load_offset, 800);
        assert_eq!(state.revision, 0);
        assert!(state.grouped_errors.is_empty());
    }

    #[test]
    fn from_payload_prefers_stored_base_host() {
        let payload = InitialPayload {
            config: RunConfig {
                base_host: "configured.example".to_string(),
                ..RunConfig::default()
            },
            ..InitialPayload::default()
        };
        let stored = StartupOptions {
            stored_base_host: Some("https://stored.example".to_string()),
            ..StartupOptions::default()
        };
        let state = RunState::from_payload(payload.clone(), &stored);
        assert_eq!(state.view.base_host, "https://stored.example");
        assert_eq!(state.view.parsed_host.host, "stored.example");

        let empty = StartupOptions {
            stored_base_host: Some(String::new()),
            ..StartupOptions::default()
        };
        let state = RunState::from_payload(payload, &empty);
        assert_eq!(state.view.base_host, "configured.example");
    }

    #[test]
    fn reduce_leaves_input_untouched() {
        let before = state();
        let snapshot = before.clone();
        let (after, _) = reduce(
            &before,
            RunEvent::SuiteBegin(SuiteBeginPayload {
                suite_path: path(&["login"]),
                status: Status::Running,
            }),
        );
        assert_eq!(before, snapshot);
        assert_eq!(root_status(&after, "login"), Some(Status::Running));
        assert_eq!(after.revision, 1);
        assert!(Arc::ptr_eq(&before.suites.roots()[1], &after.suites.roots()[1]));
    }

    #[test]
    fn unknown_path_is_noop() {
        let before = state();
        let (after, effects) = reduce(
            &before,
            RunEvent::TestBegin(TestBeginPayload {
                suite_path: path(&["nope"]),
                status: Status::Fail,
                browser_id: "chrome".to_string(),
            }),
        );
        assert_eq!(after, before);
        assert!(effects.is_empty());
    }

    #[test]
    fn unrecognized_is_noop() {
        let before = state();
        let (after, effects) = reduce(&before, RunEvent::Unrecognized);
        assert_eq!(after, before);
        assert!(effects.is_empty());
    }

    #[test]
    fn run_all_tests_resets_statuses() {
        let mut before = state();
        before.view.group_by_error = true;
        let (after, _) = reduce(
            &before,
            RunEvent::RunAllTests(RunAllTestsPayload {
                status: Status::Running,
            }),
        );
        assert!(after.running);
        assert!(!after.view.group_by_error);
        after.suites.walk(|suite| assert_eq!(suite.status, Status::Running));

        let (ended, _) = reduce(&after, RunEvent::TestsEnd);
        assert!(!ended.running);
    }

    #[test]
    fn test_result_updates_failed_ids_and_groups() {
        let (after, _) = reduce(
            &state(),
            RunEvent::TestResult(
                TestResultPayload {
                    suite_path: path(&["search"]),
                    browser_id: "chrome".to_string(),
                    browser_result: BrowserResultUpdate::Latest(Outcome {
                        status: Status::Error,
                        reason: Some(ErrorDetails {
                            message: "socket hang up".to_string(),
                            stack: None,
                        }),
                        ..Outcome::default()
                    }),
                }
                .into(),
            ),
        );
        assert_eq!(root_status(&after, "search"), Some(Status::Error));
        assert_eq!(after.suite_ids.failed, vec!["search".to_string()]);
        assert_eq!(after.grouped_errors.len(), 1);
        // Retry history and view state survive a latest-only update.
        let browser = after.suites.get("search").unwrap().browser("chrome").unwrap();
        assert_eq!(browser.retries.len(), 1);
    }

    #[test]
    fn test_result_for_unknown_browser_is_noop() {
        let (running, _) = reduce(
            &state(),
            RunEvent::SuiteBegin(SuiteBeginPayload {
                suite_path: path(&["login"]),
                status: Status::Running,
            }),
        );
        for event in [
            RunEvent::TestResult(
                TestResultPayload {
                    suite_path: path(&["login"]),
                    browser_id: "safari".to_string(),
                    browser_result: BrowserResultUpdate::Latest(outcome(Status::Fail, &[])),
                }
                .into(),
            ),
            RunEvent::UpdateResult(OneOrMany::Many(vec![TestResultPayload {
                suite_path: path(&["login"]),
                browser_id: "safari".to_string(),
                browser_result: BrowserResultUpdate::Latest(outcome(Status::Success, &[])),
            }])),
        ] {
            let (after, effects) = reduce(&running, event);
            assert_eq!(after, running);
            assert!(effects.is_empty());
            assert_eq!(root_status(&after, "login"), Some(Status::Running));
        }
    }

    #[test]
    fn expand_and_view_mode() {
        let (expanded, _) = reduce(&state(), RunEvent::ViewExpandAll);
        assert_eq!(expanded.view.expand, ExpandMode::All);
        let (collapsed, _) = reduce(&expanded, RunEvent::ViewCollapseAll);
        assert_eq!(collapsed.view.expand, ExpandMode::None);
        let (failed, _) = reduce(&collapsed, RunEvent::ViewShowFailed);
        assert_eq!(failed.view.view_mode, ViewMode::Failed);
        assert_eq!(failed.view.expand, ExpandMode::Errors);
    }

    #[test]
    fn expand_errors_and_retries() {
        let (retries, _) = reduce(&state(), RunEvent::ViewExpandRetries);
        assert_eq!(retries.view.expand, ExpandMode::Retries);
        assert_eq!(retries.revision, 0);
        let (errors, _) = reduce(&retries, RunEvent::ViewExpandErrors);
        assert_eq!(errors.view.expand, ExpandMode::Errors);
        assert_eq!(errors.view.view_mode, retries.view.view_mode);
    }

    #[test]
    fn toggle_only_diff_flips_twice() {
        let initial = state();
        assert!(!initial.view.show_only_diff);
        let (on, _) = reduce(&initial, RunEvent::ViewToggleOnlyDiff);
        assert!(on.view.show_only_diff);
        let (off, _) = reduce(&on, RunEvent::ViewToggleOnlyDiff);
        assert_eq!(off, initial);
    }

    #[test]
    fn toggle_scale_images_flips_twice() {
        let initial = state();
        assert!(!initial.view.scale_images);
        let (on, effects) = reduce(&initial, RunEvent::ViewToggleScaleImages);
        assert!(on.view.scale_images);
        assert!(effects.is_empty());
        let (off, _) = reduce(&on, RunEvent::ViewToggleScaleImages);
        assert_eq!(off, initial);
    }

    #[test]
    fn lazy_load_toggles_between_zero_and_configured() {
        let initial = state();
        let (off, _) = reduce(&initial, RunEvent::ViewToggleLazyLoadImages);
        assert_eq!(off.view.lazy_load_offset, 0);
        let (on, _) = reduce(&off, RunEvent::ViewToggleLazyLoadImages);
        assert_eq!(on.view.lazy_load_offset, initial.config.lazy_load_offset);
    }

    #[test]
    fn base_host_update_requests_persistence() {
        let (after, effects) = reduce(
            &state(),
            RunEvent::ViewUpdateBaseHost(BaseHostPayload {
                host: "http://localhost:8080".to_string(),
            }),
        );
        assert_eq!(after.view.parsed_host.host, "localhost:8080");
        assert_eq!(
            effects,
            vec![Effect::PersistBaseHost("http://localhost:8080".to_string())]
        );
    }

    #[test]
    fn filter_by_name_regroups() {
        let (failing, _) = reduce(
            &state(),
            RunEvent::UpdateResult(OneOrMany::Many(vec![
                TestResultPayload {
                    suite_path: path(&["login"]),
                    browser_id: "chrome".to_string(),
                    browser_result: BrowserResultUpdate::Latest(outcome(Status::Fail, &[])),
                },
                TestResultPayload {
                    suite_path: path(&["search"]),
                    browser_id: "chrome".to_string(),
                    browser_result: BrowserResultUpdate::Latest(outcome(Status::Fail, &[])),
                },
            ])),
        );
        assert_eq!(failing.grouped_errors[0].count, 2);

        let (filtered, _) = reduce(
            &failing,
            RunEvent::ViewUpdateFilterByName(FilterByNamePayload {
                test_name_filter: "login".to_string(),
            }),
        );
        assert_eq!(filtered.grouped_errors[0].count, 1);
        assert!(filtered.grouped_errors[0].tests.contains_key("login"));
    }

    #[test]
    fn browser_state_events() {
        let (opened, _) = reduce(
            &state(),
            RunEvent::ToggleTestResult(ToggleTestResultPayload {
                suite_path: path(&["login"]),
                browser_id: "chrome".to_string(),
                opened: true,
            }),
        );
        let (retried, _) = reduce(
            &opened,
            RunEvent::ChangeTestRetry(ChangeTestRetryPayload {
                suite_path: path(&["login"]),
                browser_id: "chrome".to_string(),
                retry_index: 0,
            }),
        );
        let browser = retried.suites.get("login").unwrap().browser("chrome").unwrap();
        assert!(browser.state.opened);
        assert_eq!(browser.state.retry_index, Some(0));
        assert_eq!(retried.revision, 2);
    }

    #[test]
    fn toggle_state_result_defaults_to_last_image() {
        let (after, _) = reduce(
            &state(),
            RunEvent::ToggleStateResult(ToggleStateResultPayload {
                suite_path: path(&["login"]),
                browser_id: "chrome".to_string(),
                state_name: None,
                retry_index: 1,
                opened: true,
            }),
        );
        let browser = after.suites.get("login").unwrap().browser("chrome").unwrap();
        assert!(browser.result.image("hover").unwrap().opened);
        assert!(!browser.result.image("plain").unwrap().opened);
    }

    #[test]
    fn toggle_state_result_unknown_state_is_noop() {
        let before = state();
        for (state_name, retry_index) in [(Some("missing"), 1), (Some("plain"), 5)] {
            let (after, _) = reduce(
                &before,
                RunEvent::ToggleStateResult(ToggleStateResultPayload {
                    suite_path: path(&["login"]),
                    browser_id: "chrome".to_string(),
                    state_name: state_name.map(str::to_string),
                    retry_index,
                    opened: true,
                }),
            );
            assert_eq!(after, before);
        }
    }

    #[test]
    fn view_initial_replaces_suites_and_merges_view() {
        let (after, _) = reduce(
            &state(),
            RunEvent::ViewInitial(Box::new(ViewInitialPayload {
                suites: vec![leaf(&["checkout"], Status::Fail)],
                gui: true,
                auto_run: true,
                config: ViewConfigFragment {
                    scale_images: Some(true),
                    lazy_load_offset: None,
                },
                ..ViewInitialPayload::default()
            })),
        );
        assert!(after.gui && after.auto_run);
        assert_eq!(after.suite_ids.all, vec!["checkout".to_string()]);
        assert_eq!(after.suite_ids.failed, vec!["checkout".to_string()]);
        assert!(after.view.scale_images);
        assert_eq!(after.view.lazy_load_offset, 800);
        assert_eq!(after.grouped_errors.len(), 1);
    }

    #[test]
    fn view_initial_stamps_new_tree() {
        let (touched, _) = reduce(
            &state(),
            RunEvent::SuiteBegin(SuiteBeginPayload {
                suite_path: path(&["login"]),
                status: Status::Running,
            }),
        );
        assert_eq!(touched.revision, 1);

        let (after, _) = reduce(
            &touched,
            RunEvent::ViewInitial(Box::new(ViewInitialPayload {
                suites: vec![leaf(&["login"], Status::Success)],
                ..ViewInitialPayload::default()
            })),
        );
        assert_eq!(after.revision, 2);
        let login = after.suites.get("login").unwrap();
        assert_ne!(login.revision, touched.suites.get("login").unwrap().revision);
        after.suites.walk(|suite| assert_eq!(suite.revision, 2));
    }

    #[test]
    fn overlays() {
        let (loading, _) = reduce(
            &state(),
            RunEvent::ToggleLoading(LoadingState {
                active: true,
                content: "Updating reference".to_string(),
            }),
        );
        assert!(loading.loading.active);
        let (modal, _) = reduce(
            &loading,
            RunEvent::ShowModal(ModalState {
                id: "screenshot-accepter".to_string(),
                data: serde_json::Value::Null,
            }),
        );
        assert_eq!(modal.modal.as_ref().map(|m| m.id.as_str()), Some("screenshot-accepter"));
        let (hidden, _) = reduce(&modal, RunEvent::HideModal);
        assert!(hidden.modal.is_none());
        let (closed, _) = reduce(&hidden, RunEvent::CloseSections(vec!["login".to_string()]));
        assert_eq!(closed.close_ids, vec!["login".to_string()]);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let json = serde_json::to_value(state()).unwrap();
        assert!(json.get("suiteIds").is_some());
        assert!(json.get("groupedErrors").is_some());
        assert!(json.get("errorPatterns").is_none());
        assert_eq!(json["suites"][0]["suitePath"][0], "login");
    }
}
