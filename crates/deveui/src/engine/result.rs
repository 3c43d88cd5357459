use crate::DevEui;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, hash_set};

/// How a batch run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every slot was resolved: registered, failed or exhausted.
    Completed,
    /// The aggregate deadline fired before every slot was resolved.
    TimedOut,
    /// The caller's cancellation token fired.
    Cancelled,
}

impl RunOutcome {
    /// Returns `true` if the run stopped before resolving every slot.
    pub const fn is_aborted(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::TimedOut => f.write_str("timed out"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Identifiers registered by one batch run.
///
/// Unordered, and holds at most `requested` identifiers. Fewer is a normal
/// outcome: slots whose attempts all conflicted or failed contribute nothing,
/// and an aborted run only reports what was confirmed before it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    requested: usize,
    registered: HashSet<DevEui>,
    outcome: RunOutcome,
}

impl BatchResult {
    pub(crate) const fn new(
        requested: usize,
        registered: HashSet<DevEui>,
        outcome: RunOutcome,
    ) -> Self {
        Self {
            requested,
            registered,
            outcome,
        }
    }

    /// The batch size that was asked for.
    pub const fn requested(&self) -> usize {
        self.requested
    }

    /// How the run ended.
    pub const fn outcome(&self) -> RunOutcome {
        self.outcome
    }

    /// Number of registered identifiers.
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Returns `true` if fewer identifiers than requested were registered.
    pub fn is_partial(&self) -> bool {
        self.len() < self.requested
    }

    pub fn contains(&self, deveui: &DevEui) -> bool {
        self.registered.contains(deveui)
    }

    pub fn iter(&self) -> hash_set::Iter<'_, DevEui> {
        self.registered.iter()
    }

    /// Consumes the result, returning the identifiers sorted ascending.
    pub fn into_sorted_vec(self) -> Vec<DevEui> {
        let mut ids: Vec<_> = self.registered.into_iter().collect();
        ids.sort_unstable();
        ids
    }
}

impl IntoIterator for BatchResult {
    type Item = DevEui;
    type IntoIter = hash_set::IntoIter<DevEui>;

    fn into_iter(self) -> Self::IntoIter {
        self.registered.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a DevEui;
    type IntoIter = hash_set::Iter<'a, DevEui>;

    fn into_iter(self) -> Self::IntoIter {
        self.registered.iter()
    }
}
