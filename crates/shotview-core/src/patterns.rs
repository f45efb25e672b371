//! Error-pattern rules used to bucket failures.
//!
//! Patterns are configured either as a bare string (the string is both the
//! group name and the regex) or as a `{name, pattern}` pair. They are
//! compiled once when the reporter config is installed. A pattern that fails
//! to compile is dropped with a warning and never matches.

use std::fmt;
use std::sync::Arc;

use fancy_regex::Regex;
use serde::{Deserialize, Serialize};

/// Error pattern as written in the reporter config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorPatternConfig {
    Plain(String),
    Named { name: String, pattern: String },
}

impl ErrorPatternConfig {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Plain(pattern) => pattern,
            Self::Named { name, .. } => name,
        }
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            Self::Plain(pattern) | Self::Named { pattern, .. } => pattern,
        }
    }
}

/// A successfully compiled pattern.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub name: String,
    pub pattern: String,
    regex: Regex,
}

impl CompiledPattern {
    /// Unanchored search. Backtracking failures count as no match.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text).unwrap_or(false)
    }
}

/// Ordered set of compiled patterns. Cheap to clone.
#[derive(Clone, Default)]
pub struct ErrorPatterns {
    compiled: Arc<[CompiledPattern]>,
}

impl ErrorPatterns {
    #[must_use]
    pub fn compile(configs: &[ErrorPatternConfig]) -> Self {
        let compiled: Vec<CompiledPattern> = configs
            .iter()
            .filter_map(|cfg| match Regex::new(cfg.pattern()) {
                Ok(regex) => Some(CompiledPattern {
                    name: cfg.name().to_string(),
                    pattern: cfg.pattern().to_string(),
                    regex,
                }),
                Err(e) => {
                    tracing::warn!(
                        name = cfg.name(),
                        pattern = cfg.pattern(),
                        error = %e,
                        "Skipping error pattern with invalid regex"
                    );
                    None
                }
            })
            .collect();
        Self {
            compiled: compiled.into(),
        }
    }

    /// First pattern, in configured order, that matches `message`.
    #[must_use]
    pub fn first_match(&self, message: &str) -> Option<&CompiledPattern> {
        self.compiled.iter().find(|p| p.is_match(message))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledPattern> {
        self.compiled.iter()
    }
}

impl PartialEq for ErrorPatterns {
    fn eq(&self, other: &Self) -> bool {
        self.compiled.len() == other.compiled.len()
            && self
                .compiled
                .iter()
                .zip(other.compiled.iter())
                .all(|(a, b)| a.name == b.name && a.pattern == b.pattern)
    }
}

impl fmt::Debug for ErrorPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.compiled.iter().map(|p| &p.name))
            .finish()
    }
}
