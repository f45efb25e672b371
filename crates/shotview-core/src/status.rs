//! Test status values and branch aggregation.

use serde::{Deserialize, Serialize};

/// Status of a suite, a browser result, or a single outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Running,
    Success,
    Fail,
    Error,
    Skipped,
}

impl Status {
    pub const ALL: &'static [Self] = &[
        Self::Idle,
        Self::Running,
        Self::Success,
        Self::Fail,
        Self::Error,
        Self::Skipped,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Success => "success",
            Self::Fail => "fail",
            Self::Error => "error",
            Self::Skipped => "skipped",
        }
    }

    /// `fail` or `error`.
    #[must_use]
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::Fail | Self::Error)
    }

    #[must_use]
    pub const fn is_skipped(self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// Rank used by [`Status::aggregate`]; lower wins.
    const fn priority(self) -> u8 {
        match self {
            Self::Error => 0,
            Self::Fail => 1,
            Self::Running => 2,
            Self::Success => 3,
            Self::Idle => 4,
            Self::Skipped => 5,
        }
    }

    /// Combine child statuses into the status of their parent.
    ///
    /// Failures dominate: `error` > `fail` > `running` > `success` > `idle` >
    /// `skipped`. A branch is `skipped` only if every child is skipped.
    /// Returns `None` for an empty input so callers can keep the node's own
    /// status.
    pub fn aggregate<I>(statuses: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        statuses.into_iter().min_by_key(|s| s.priority())
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
