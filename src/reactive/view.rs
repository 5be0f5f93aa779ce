//! The assembled reactive view: store + lifecycle + pipeline plan.
//!
//! A widget owns one [`ReactiveFetchView`] and drives it from its message
//! funnel: `mount()` / `commit()` / `refetch()` hand out [`FetchJob`]s that
//! the widget turns into spawned commands, and `apply()` is the single
//! generation-gated write path for results coming back.

use std::sync::Arc;

use tracing::debug;

use crate::reactive::lifecycle::{Generation, LifecycleController};
use crate::reactive::pipeline::{FetchParams, FetchPipeline, FetchPlan, StoreUpdates};
use crate::reactive::store::{AttrSchema, AttrValue, StateStore, StoreError};

/// One triggered fetch: its generation ticket plus the attribute snapshot
/// the URL is built from.
#[derive(Debug, Clone)]
pub struct FetchJob {
    pub generation: Generation,
    pub params: FetchParams,
}

/// State store, lifecycle controller and fetch plan of one widget instance.
pub struct ReactiveFetchView {
    store: StateStore,
    lifecycle: LifecycleController,
    plan: Arc<dyn FetchPlan>,
    pipeline: FetchPipeline,
}

impl ReactiveFetchView {
    pub fn new<I, S>(
        schema: AttrSchema,
        triggers: I,
        plan: Arc<dyn FetchPlan>,
        pipeline: FetchPipeline,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            store: StateStore::new(schema),
            lifecycle: LifecycleController::new(triggers),
            plan,
            pipeline,
        }
    }

    /// Read access for rendering. Render code must not mutate.
    pub const fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn plan(&self) -> Arc<dyn FetchPlan> {
        Arc::clone(&self.plan)
    }

    pub fn pipeline(&self) -> FetchPipeline {
        self.pipeline.clone()
    }

    /// Seed an initial attribute value before mounting.
    ///
    /// # Errors
    /// [`StoreError`] on an undeclared name or mismatched type.
    pub fn seed(&mut self, name: &str, value: AttrValue) -> Result<(), StoreError> {
        self.store.seed(name, value)
    }

    /// Mount the view, firing the initial fetch.
    pub fn mount(&mut self) -> FetchJob {
        let generation = self.lifecycle.on_mount();
        self.job(generation)
    }

    /// Externally assign an attribute as part of the current batch.
    ///
    /// # Errors
    /// [`StoreError`] on an undeclared name or mismatched type.
    pub fn assign(&mut self, name: &str, value: AttrValue) -> Result<(), StoreError> {
        self.store.set(name, value)
    }

    /// Complete the current mutation batch. Fires at most one fetch no
    /// matter how many trigger attributes the batch touched.
    pub fn commit(&mut self) -> Option<FetchJob> {
        let changes = self.store.take_changes();
        self.lifecycle.on_changes(&changes).map(|g| self.job(g))
    }

    /// Fire a fetch regardless of attribute changes (reload key).
    pub fn refetch(&mut self) -> FetchJob {
        let generation = self.lifecycle.refetch();
        self.job(generation)
    }

    /// Whether a result with this ticket is still the most recent one.
    pub fn is_current(&self, generation: Generation) -> bool {
        self.lifecycle.is_current(generation)
    }

    /// Apply a successful fetch result. Returns `false` when the result
    /// was superseded and dropped without touching the store.
    ///
    /// Pipeline writes complete their own batch and never re-enter the
    /// controller; only external assignments can trigger further fetches.
    ///
    /// # Errors
    /// [`StoreError`] if the plan produced an update for an undeclared or
    /// mismatched attribute. That is a plan defect and fails loudly.
    pub fn apply(
        &mut self,
        generation: Generation,
        updates: StoreUpdates,
    ) -> Result<bool, StoreError> {
        if !self.lifecycle.is_current(generation) {
            debug!(?generation, "dropping superseded fetch result");
            return Ok(false);
        }
        for (name, value) in updates {
            self.store.set(&name, value)?;
        }
        self.store.take_changes();
        Ok(true)
    }

    fn job(&self, generation: Generation) -> FetchJob {
        FetchJob {
            generation,
            params: self.store.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::reactive::http::HttpSource;
    use crate::reactive::pipeline::FetchError;
    use crate::reactive::store::Record;

    struct NoopPlan;

    #[async_trait]
    impl FetchPlan for NoopPlan {
        fn build_url(&self, _params: &FetchParams, _prerequisite: Option<&str>) -> String {
            "https://example.test/".to_string()
        }

        fn map_payload(&self, _payload: &serde_json::Value) -> Result<StoreUpdates, FetchError> {
            Ok(vec![])
        }
    }

    struct UnreachableSource;

    #[async_trait]
    impl HttpSource for UnreachableSource {
        async fn request(&self, url: &str) -> Result<crate::reactive::HttpResponse, FetchError> {
            unreachable!("no request expected to {url}")
        }
    }

    fn view() -> ReactiveFetchView {
        ReactiveFetchView::new(
            AttrSchema::new()
                .text("query")
                .number("page")
                .records("images"),
            ["query", "page"],
            Arc::new(NoopPlan),
            FetchPipeline::new(
                Arc::new(UnreachableSource),
                std::time::Duration::from_secs(1),
            ),
        )
    }

    fn one_record() -> StoreUpdates {
        let record = Record::new()
            .with("title", AttrValue::text("X"))
            .with("image", AttrValue::text("http://i/1.png"))
            .with("description", AttrValue::text("d"))
            .with("creator", AttrValue::text("c"));
        vec![("images".to_string(), AttrValue::Records(vec![record]))]
    }

    #[test]
    fn test_mount_snapshot_carries_seeded_values() {
        let mut view = view();
        view.seed("query", AttrValue::text("moon land")).unwrap();
        view.seed("page", AttrValue::Number(1.0)).unwrap();

        let job = view.mount();
        assert_eq!(job.params.get("query"), Some(&AttrValue::text("moon land")));
        assert_eq!(job.params.get("page"), Some(&AttrValue::Number(1.0)));
    }

    #[test]
    fn test_commit_without_trigger_changes_fires_nothing() {
        let mut view = view();
        view.mount();
        assert!(view.commit().is_none());

        view.assign("images", AttrValue::Records(vec![])).unwrap();
        assert!(view.commit().is_none());
    }

    #[test]
    fn test_batch_changing_two_triggers_fires_one_fetch() {
        let mut view = view();
        view.seed("page", AttrValue::Number(3.0)).unwrap();
        view.mount();

        view.assign("query", AttrValue::text("mars")).unwrap();
        view.assign("page", AttrValue::Number(1.0)).unwrap();
        let job = view.commit().expect("trigger change fires a fetch");
        assert!(view.is_current(job.generation));
        // The one batch produced exactly one job; nothing is left pending.
        assert!(view.commit().is_none());
    }

    #[test]
    fn test_superseded_result_is_dropped() {
        let mut view = view();
        view.seed("page", AttrValue::Number(1.0)).unwrap();
        let job_a = view.mount();

        // Page changes to 2 while fetch A is still in flight.
        view.assign("page", AttrValue::Number(2.0)).unwrap();
        let job_b = view.commit().unwrap();

        // A resolves late: dropped without touching the store.
        assert_eq!(view.apply(job_a.generation, one_record()), Ok(false));
        assert_eq!(
            view.store().get("images").unwrap().as_records(),
            Some(&vec![])
        );

        // B's result is applied.
        assert_eq!(view.apply(job_b.generation, one_record()), Ok(true));
        let records = view.store().get("images").unwrap().as_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("title"), Some("X"));
    }

    #[test]
    fn test_apply_is_idempotent_for_identical_updates() {
        let mut view = view();
        let job = view.mount();

        view.apply(job.generation, one_record()).unwrap();
        let first = view.store().snapshot();
        view.apply(job.generation, one_record()).unwrap();
        assert_eq!(view.store().snapshot(), first);
    }

    #[test]
    fn test_fetch_writes_do_not_retrigger() {
        let mut view = view();
        let job = view.mount();

        // A plan that (unusually) writes a trigger attribute still must
        // not cause a fetch loop.
        view.apply(
            job.generation,
            vec![("page".to_string(), AttrValue::Number(9.0))],
        )
        .unwrap();
        assert!(view.commit().is_none());
    }

    #[test]
    fn test_plan_writing_unknown_attribute_fails_loudly() {
        let mut view = view();
        let job = view.mount();

        let err = view
            .apply(
                job.generation,
                vec![("cards".to_string(), AttrValue::Records(vec![]))],
            )
            .unwrap_err();
        assert_eq!(err, StoreError::UnknownAttribute("cards".to_string()));
    }
}
