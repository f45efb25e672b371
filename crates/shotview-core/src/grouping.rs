//! Grouped-errors projection.
//!
//! Failures are bucketed by the first configured error pattern their message
//! matches. The projection is recomputed from scratch whenever one of its
//! inputs changes; nothing here is incremental.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{BrowserResult, Outcome};
use crate::patterns::ErrorPatterns;
use crate::tree::SuiteTree;
use crate::view::ViewMode;

/// Name of the implicit group collecting messages no pattern matched.
pub const NO_PATTERN_GROUP: &str = "No pattern matched";

/// Message recorded for an image state that produced a diff.
pub const IMAGE_COMPARISON_FAILED: &str = "image comparison failed";

/// One bucket of failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorGroup {
    pub name: String,
    /// Source pattern, `None` for [`NO_PATTERN_GROUP`].
    pub pattern: Option<String>,
    /// Test name (path segments joined by a space) to browsers, in
    /// discovery order.
    pub tests: BTreeMap<String, Vec<String>>,
    /// Number of distinct (test, browser) pairs in the group.
    pub count: usize,
}

/// Everything the projection depends on.
#[derive(Debug, Clone, Copy)]
pub struct GroupingInput<'a> {
    pub suites: &'a SuiteTree,
    pub view_mode: ViewMode,
    pub patterns: &'a ErrorPatterns,
    pub filtered_browsers: &'a [String],
    pub test_name_filter: &'a str,
}

/// Bucket every contributing failure message.
///
/// Groups are ordered by `count` descending, then by name.
#[must_use]
pub fn group_errors(input: &GroupingInput<'_>) -> Vec<ErrorGroup> {
    let mut groups: BTreeMap<String, ErrorGroup> = BTreeMap::new();

    input.suites.walk(|suite| {
        if suite.browsers.is_empty() {
            return;
        }
        let test_name = suite.suite_path.join(" ");
        if !input.test_name_filter.is_empty() && !test_name.contains(input.test_name_filter) {
            return;
        }

        for browser in &suite.browsers {
            if !browser_included(browser, input) {
                continue;
            }
            for message in browser_messages(browser) {
                let (name, pattern) = match input.patterns.first_match(&message) {
                    Some(p) => (p.name.clone(), Some(p.pattern.clone())),
                    None => (NO_PATTERN_GROUP.to_string(), None),
                };
                let group = groups.entry(name.clone()).or_insert_with(|| ErrorGroup {
                    name,
                    pattern,
                    tests: BTreeMap::new(),
                    count: 0,
                });
                let browsers = group.tests.entry(test_name.clone()).or_default();
                if !browsers.contains(&browser.name) {
                    browsers.push(browser.name.clone());
                    group.count += 1;
                }
            }
        }
    });

    let mut list: Vec<ErrorGroup> = groups.into_values().collect();
    list.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    list
}

fn browser_included(browser: &BrowserResult, input: &GroupingInput<'_>) -> bool {
    if !input.filtered_browsers.is_empty() && !input.filtered_browsers.contains(&browser.name) {
        return false;
    }
    let status = browser.result.status;
    if status.is_skipped() {
        return false;
    }
    match input.view_mode {
        ViewMode::All => true,
        ViewMode::Failed => status.is_failed(),
    }
}

/// Distinct messages over every attempt, oldest first.
fn browser_messages(browser: &BrowserResult) -> Vec<String> {
    let mut messages: Vec<String> = Vec::new();
    for outcome in browser.attempts() {
        for message in outcome_messages(outcome) {
            if !messages.contains(&message) {
                messages.push(message);
            }
        }
    }
    messages
}

fn outcome_messages(outcome: &Outcome) -> Vec<String> {
    let mut messages = Vec::new();
    if let Some(reason) = &outcome.reason {
        messages.push(reason.message.clone());
    }
    for image in &outcome.images_info {
        if let Some(error) = &image.error {
            messages.push(error.message.clone());
        }
        if image.diff_img.is_some() {
            messages.push(IMAGE_COMPARISON_FAILED.to_string());
        }
    }
    // A failure with nothing to say still has to land somewhere.
    if messages.is_empty() && outcome.status.is_failed() {
        messages.push(String::new());
    }
    messages
}
