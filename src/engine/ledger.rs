//! Failure ledger: concurrent insert-if-absent map from target to reason.

use std::collections::BTreeMap;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::targets::Target;

/// Records the first failure reason seen for each target.
///
/// Only `record_failure` and `snapshot` are exposed; the map itself never
/// leaves this type.
#[derive(Debug, Default)]
pub struct FailureLedger {
    entries: DashMap<String, String>,
}

impl FailureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `reason` for `target` unless a reason is already recorded.
    /// Returns true if this call inserted the entry.
    pub fn record_failure(&self, target: &Target, reason: impl Into<String>) -> bool {
        match self.entries.entry(target.as_str().to_string()) {
            Entry::Occupied(existing) => {
                tracing::debug!(
                    url = %target,
                    kept = %existing.get(),
                    "Failure already recorded, keeping first reason"
                );
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(reason.into());
                true
            }
        }
    }

    /// Copy of every entry, ordered by target.
    ///
    /// Meant for report emission after all writers have finished.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
