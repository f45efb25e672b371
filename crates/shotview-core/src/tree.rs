//! Suite tree with copy-on-write branch updates.
//!
//! Root suites are keyed by the first segment of their path; deeper nodes
//! are addressed by matching each following segment against child names.
//!
//! Every update goes through [`SuiteTree::update`], which:
//!
//! 1. copies each node on the path with `Arc::make_mut` (nodes still shared
//!    with an older snapshot are cloned, untouched siblings stay shared),
//! 2. applies the mutation to the addressed node,
//! 3. recomputes every ancestor's status from its children,
//! 4. stamps the addressed node and all ancestors with the event revision.
//!
//! A view layer can therefore detect changes either by `Arc::ptr_eq` or by
//! comparing `revision` stamps.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::Suite;
use crate::status::Status;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuiteTree {
    roots: Vec<Arc<Suite>>,
}

impl SuiteTree {
    #[must_use]
    pub fn new(suites: Vec<Suite>) -> Self {
        Self {
            roots: suites.into_iter().map(Arc::new).collect(),
        }
    }

    #[must_use]
    pub fn roots(&self) -> &[Arc<Suite>] {
        &self.roots
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Root suite by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<Suite>> {
        self.roots.iter().find(|s| s.id() == id)
    }

    /// Resolve a suite path to a node. Any missing segment yields `None`.
    #[must_use]
    pub fn find(&self, path: &[String]) -> Option<&Suite> {
        let (head, tail) = path.split_first()?;
        let mut node = self.get(head)?;
        for segment in tail {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Ids of every root suite, in payload order.
    #[must_use]
    pub fn all_ids(&self) -> Vec<String> {
        self.roots.iter().map(|s| s.id().to_string()).collect()
    }

    /// Ids of root suites whose status is `fail` or `error`.
    #[must_use]
    pub fn failed_ids(&self) -> Vec<String> {
        self.roots
            .iter()
            .filter(|s| s.is_failed())
            .map(|s| s.id().to_string())
            .collect()
    }

    /// Apply `mutate` to the node at `path` and propagate up the branch.
    ///
    /// Returns `false` without touching the tree when the path does not
    /// resolve.
    pub fn update<F>(&mut self, path: &[String], revision: u64, mutate: F) -> bool
    where
        F: FnOnce(&mut Suite),
    {
        if self.find(path).is_none() {
            return false;
        }
        let Some((head, tail)) = path.split_first() else {
            return false;
        };
        let Some(root) = self.roots.iter_mut().find(|s| s.id() == head.as_str()) else {
            return false;
        };
        update_in(root, tail, revision, mutate);
        true
    }

    /// Set every suite and browser result to `status`.
    pub fn set_status_to_all(&mut self, status: Status, revision: u64) {
        for root in &mut self.roots {
            set_status_recursive(root, status, revision);
        }
    }

    /// Stamp every node with `revision`, e.g. after installing a new tree.
    pub fn stamp_all(&mut self, revision: u64) {
        fn go(node: &mut Arc<Suite>, revision: u64) {
            let suite = Arc::make_mut(node);
            suite.revision = revision;
            for child in &mut suite.children {
                go(child, revision);
            }
        }
        for root in &mut self.roots {
            go(root, revision);
        }
    }

    /// Visit every node depth-first, parents before children.
    pub fn walk<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&'a Suite),
    {
        fn go<'a, F: FnMut(&'a Suite)>(node: &'a Suite, visit: &mut F) {
            visit(node);
            for child in &node.children {
                go(child, visit);
            }
        }
        for root in &self.roots {
            go(root, &mut visit);
        }
    }
}

fn update_in<F>(node: &mut Arc<Suite>, rest: &[String], revision: u64, mutate: F)
where
    F: FnOnce(&mut Suite),
{
    let suite = Arc::make_mut(node);
    match rest.split_first() {
        None => mutate(suite),
        Some((head, tail)) => {
            if let Some(child) = suite.children.iter_mut().find(|c| c.name == *head) {
                update_in(child, tail, revision, mutate);
            }
            refresh_status(suite);
        }
    }
    suite.revision = revision;
}

fn set_status_recursive(node: &mut Arc<Suite>, status: Status, revision: u64) {
    let suite = Arc::make_mut(node);
    suite.status = status;
    for browser in &mut suite.browsers {
        browser.result.status = status;
    }
    for child in &mut suite.children {
        set_status_recursive(child, status, revision);
    }
    suite.revision = revision;
}

/// Recompute a node's status from its children and browser results.
/// Nodes with neither keep their own status.
pub(crate) fn refresh_status(suite: &mut Suite) {
    if let Some(status) = Status::aggregate(suite.child_statuses()) {
        suite.status = status;
    }
}
