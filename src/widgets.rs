//! The data widgets.
//!
//! Each widget pairs a [`crate::reactive::ReactiveFetchView`] with a
//! screen that translates key presses into attribute assignments and a
//! fetch plan for its endpoint. [`FetchCmd`] is the one command both use
//! to run the pipeline off the main loop.

pub mod ip_location;
pub mod nasa_images;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::core::command::Command;
use crate::reactive::{FetchError, FetchJob, FetchPipeline, FetchPlan, StoreUpdates};
use crate::registry::WidgetRegistry;
use std::sync::Arc;

/// Register every built-in widget.
pub fn register_all(registry: &mut WidgetRegistry) {
    registry.register(nasa_images::NasaImagesProvider);
    registry.register(ip_location::IpLocationProvider);
}

/// Completion of one pipeline run, tagged with its generation ticket.
///
/// Failures travel here as data; the widget decides how to surface them.
#[derive(Debug)]
pub struct FetchDone {
    pub job: FetchJob,
    pub result: Result<StoreUpdates, FetchError>,
}

/// Runs the fetch pipeline and reports back on the widget's channel.
///
/// If the widget closed in the meantime the send fails and the result is
/// simply unobservable, which is exactly what a destroyed instance needs.
pub struct FetchCmd<M> {
    label: &'static str,
    pipeline: FetchPipeline,
    plan: Arc<dyn FetchPlan>,
    job: FetchJob,
    tx: UnboundedSender<M>,
}

impl<M> FetchCmd<M> {
    pub fn new(
        label: &'static str,
        pipeline: FetchPipeline,
        plan: Arc<dyn FetchPlan>,
        job: FetchJob,
        tx: UnboundedSender<M>,
    ) -> Self {
        Self {
            label,
            pipeline,
            plan,
            job,
            tx,
        }
    }
}

#[async_trait]
impl<M> Command for FetchCmd<M>
where
    M: From<FetchDone> + Send + 'static,
{
    fn name(&self) -> String {
        self.label.to_string()
    }

    async fn execute(self: Box<Self>) -> color_eyre::Result<()> {
        let result = self.pipeline.run(self.plan.as_ref(), &self.job.params).await;
        if let Err(error) = &result {
            debug!(%error, label = self.label, "fetch failed");
        }
        // Receiver gone means the widget closed; nothing left to notify.
        let _ = self.tx.send(M::from(FetchDone {
            job: self.job,
            result,
        }));
        Ok(())
    }
}
