//! Mount/change triggering and generation tracking.
//!
//! The controller decides *when* a fetch happens and whether a finished
//! fetch is still allowed to write its result. Cancellation is cooperative:
//! an in-flight request is never aborted at the transport level, its result
//! is simply dropped on arrival when a newer trigger has superseded it.

use std::collections::BTreeSet;

use tracing::debug;

use crate::reactive::store::ChangeSet;

/// Ticket identifying one triggered fetch.
///
/// Captured when the fetch fires; a result may only be applied while its
/// ticket still equals the controller's current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Decides when the fetch pipeline runs for one widget instance.
#[derive(Debug)]
pub struct LifecycleController {
    triggers: BTreeSet<String>,
    generation: u64,
    mounted: bool,
}

impl LifecycleController {
    /// Create a controller with the given trigger attribute names.
    pub fn new<I, S>(triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            triggers: triggers.into_iter().map(Into::into).collect(),
            generation: 0,
            mounted: false,
        }
    }

    /// Mount hook. Fires one fetch unconditionally.
    ///
    /// Must be called exactly once per instance, before any change batch.
    pub fn on_mount(&mut self) -> Generation {
        debug_assert!(!self.mounted, "on_mount called twice");
        self.mounted = true;
        self.fire()
    }

    /// Change-batch hook. Fires at most one fetch for the whole batch:
    /// only when some entry names a trigger attribute and its value
    /// actually differs from the previous one.
    pub fn on_changes(&mut self, changes: &ChangeSet) -> Option<Generation> {
        let triggered = changes
            .iter()
            .any(|(name, change)| self.triggers.contains(name) && change.old != change.new);
        triggered.then(|| self.fire())
    }

    /// Explicit re-fetch (e.g. a reload key), independent of any attribute.
    pub fn refetch(&mut self) -> Generation {
        self.fire()
    }

    /// Whether a result carrying this ticket may still be applied.
    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.generation
    }

    fn fire(&mut self) -> Generation {
        self.generation += 1;
        debug!(generation = self.generation, "fetch triggered");
        Generation(self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::store::{AttrValue, Change, ChangeSet};

    fn changes(entries: &[(&str, AttrValue, AttrValue)]) -> ChangeSet {
        entries
            .iter()
            .map(|(name, old, new)| {
                (
                    (*name).to_string(),
                    Change {
                        old: old.clone(),
                        new: new.clone(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_mount_fires_once() {
        let mut lc = LifecycleController::new(["page"]);
        let generation = lc.on_mount();
        assert!(lc.is_current(generation));
    }

    #[test]
    fn test_batch_with_two_changed_triggers_fires_once() {
        let mut lc = LifecycleController::new(["query", "page"]);
        lc.on_mount();

        let batch = changes(&[
            ("query", AttrValue::text("moon"), AttrValue::text("mars")),
            ("page", AttrValue::Number(3.0), AttrValue::Number(1.0)),
        ]);
        let generation = lc.on_changes(&batch);
        assert!(generation.is_some());
        // One generation step for the whole batch.
        assert!(lc.is_current(generation.unwrap()));
    }

    #[test]
    fn test_non_trigger_change_does_not_fire() {
        let mut lc = LifecycleController::new(["page"]);
        lc.on_mount();

        let batch = changes(&[(
            "images",
            AttrValue::Records(vec![]),
            AttrValue::Records(vec![]),
        )]);
        assert!(lc.on_changes(&batch).is_none());
    }

    #[test]
    fn test_unchanged_trigger_value_does_not_fire() {
        let mut lc = LifecycleController::new(["page"]);
        lc.on_mount();

        let batch = changes(&[("page", AttrValue::Number(1.0), AttrValue::Number(1.0))]);
        assert!(lc.on_changes(&batch).is_none());
    }

    #[test]
    fn test_newer_trigger_supersedes_older_generation() {
        let mut lc = LifecycleController::new(["page"]);
        let first = lc.on_mount();
        let second = lc
            .on_changes(&changes(&[(
                "page",
                AttrValue::Number(1.0),
                AttrValue::Number(2.0),
            )]))
            .unwrap();

        assert!(!lc.is_current(first));
        assert!(lc.is_current(second));
    }
}
