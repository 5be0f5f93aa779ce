//! The fetch pipeline: prerequisite -> URL -> request -> parse -> map.
//!
//! Each step is a failure point with its own [`FetchError`] variant. A
//! failed pipeline run produces no store updates at all; the widget keeps
//! rendering its last-good data. Non-success responses are never parsed.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::reactive::http::HttpSource;
use crate::reactive::store::AttrValue;

/// Why a fetch produced no result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Transport failure or timeout.
    #[error("network error: {0}")]
    Network(String),
    /// Server-reported failure; the body was not parsed.
    #[error("server returned status {0}")]
    Status(u16),
    /// The success body was not the structure we expect.
    #[error("malformed response: {0}")]
    Parse(String),
}

/// Attribute values captured at trigger time. The pipeline never reads the
/// live store; it works on this snapshot while the store may move on.
pub type FetchParams = BTreeMap<String, AttrValue>;

/// Store writes produced by a successful run, applied in order.
pub type StoreUpdates = Vec<(String, AttrValue)>;

/// Per-widget parameterization of the pipeline.
#[async_trait]
pub trait FetchPlan: Send + Sync {
    /// Resolve an identity the request URL depends on (e.g. the caller's
    /// public IP). Runs before the main request; most plans need nothing.
    ///
    /// # Errors
    /// Any [`FetchError`]; a failed prerequisite fails the whole run.
    async fn prerequisite(&self, http: &dyn HttpSource) -> Result<Option<String>, FetchError> {
        let _ = http;
        Ok(None)
    }

    /// Build the request URL from the parameter snapshot. Pure: no IO, no
    /// clock, fully unit-testable.
    fn build_url(&self, params: &FetchParams, prerequisite: Option<&str>) -> String;

    /// Map the parsed payload into store updates.
    ///
    /// # Errors
    /// [`FetchError::Parse`] when the payload envelope is not usable at
    /// all. Individual malformed items must be skipped, not fatal.
    fn map_payload(&self, payload: &serde_json::Value) -> Result<StoreUpdates, FetchError>;
}

/// Executes [`FetchPlan`]s against an [`HttpSource`] under a timeout.
///
/// Cheap to clone; clones share the underlying source.
#[derive(Clone)]
pub struct FetchPipeline {
    http: Arc<dyn HttpSource>,
    timeout: Duration,
}

impl FetchPipeline {
    pub fn new(http: Arc<dyn HttpSource>, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// Run the pipeline once. Identical params against an unchanged remote
    /// resource yield identical updates.
    ///
    /// # Errors
    /// The first failing step's [`FetchError`]; no partial results.
    pub async fn run(
        &self,
        plan: &dyn FetchPlan,
        params: &FetchParams,
    ) -> Result<StoreUpdates, FetchError> {
        let prerequisite = self
            .bounded(plan.prerequisite(self.http.as_ref()))
            .await??;

        let url = plan.build_url(params, prerequisite.as_deref());
        debug!(%url, "issuing request");

        let response = self.bounded(self.http.request(&url)).await??;
        if !response.is_success() {
            return Err(FetchError::Status(response.status));
        }

        let payload: serde_json::Value =
            serde_json::from_str(&response.body).map_err(|e| FetchError::Parse(e.to_string()))?;

        plan.map_payload(&payload)
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<Result<T, FetchError>, FetchError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| FetchError::Network(format!("timed out after {:?}", self.timeout)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::reactive::http::HttpResponse;

    /// Scripted source: pops one canned response per request, records URLs.
    pub struct ScriptedSource {
        responses: Mutex<Vec<Result<HttpResponse, FetchError>>>,
        pub requested: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        pub fn new(responses: Vec<Result<HttpResponse, FetchError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requested: Mutex::new(Vec::new()),
            }
        }

        pub fn ok(body: &str) -> Result<HttpResponse, FetchError> {
            Ok(HttpResponse {
                status: 200,
                body: body.to_string(),
            })
        }

        pub fn status(status: u16) -> Result<HttpResponse, FetchError> {
            Ok(HttpResponse {
                status,
                body: "{\"should\": \"never be parsed\"".to_string(),
            })
        }
    }

    #[async_trait]
    impl HttpSource for ScriptedSource {
        async fn request(&self, url: &str) -> Result<HttpResponse, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            let mut responses = self.responses.lock().unwrap();
            assert!(!responses.is_empty(), "unexpected request to {url}");
            responses.remove(0)
        }
    }

    /// Source whose requests never complete; exercises the timeout bound.
    struct StalledSource;

    #[async_trait]
    impl HttpSource for StalledSource {
        async fn request(&self, _url: &str) -> Result<HttpResponse, FetchError> {
            std::future::pending().await
        }
    }

    struct EchoPlan;

    #[async_trait]
    impl FetchPlan for EchoPlan {
        fn build_url(&self, params: &FetchParams, _prerequisite: Option<&str>) -> String {
            let page = params
                .get("page")
                .and_then(AttrValue::as_number)
                .unwrap_or(1.0);
            format!("https://example.test/items?page={page}")
        }

        fn map_payload(&self, payload: &serde_json::Value) -> Result<StoreUpdates, FetchError> {
            let value = payload
                .get("value")
                .and_then(serde_json::Value::as_str)
                .ok_or_else(|| FetchError::Parse("missing `value`".to_string()))?;
            Ok(vec![("result".to_string(), AttrValue::text(value))])
        }
    }

    fn pipeline(source: impl HttpSource + 'static) -> FetchPipeline {
        FetchPipeline::new(Arc::new(source), Duration::from_secs(5))
    }

    fn params(page: f64) -> FetchParams {
        FetchParams::from([("page".to_string(), AttrValue::Number(page))])
    }

    #[tokio::test]
    async fn test_success_maps_payload() {
        let pipeline = pipeline(ScriptedSource::new(vec![ScriptedSource::ok(
            r#"{"value": "hello"}"#,
        )]));

        let updates = pipeline.run(&EchoPlan, &params(2.0)).await.unwrap();
        assert_eq!(
            updates,
            vec![("result".to_string(), AttrValue::text("hello"))]
        );
    }

    #[tokio::test]
    async fn test_url_built_from_parameter_snapshot() {
        let source = Arc::new(ScriptedSource::new(vec![ScriptedSource::ok(
            r#"{"value": "x"}"#,
        )]));
        let pipeline = FetchPipeline::new(source.clone(), Duration::from_secs(5));

        pipeline.run(&EchoPlan, &params(7.0)).await.unwrap();
        assert_eq!(
            *source.requested.lock().unwrap(),
            vec!["https://example.test/items?page=7".to_string()]
        );
    }

    #[tokio::test]
    async fn test_non_success_status_stops_before_parsing() {
        // The canned body is invalid JSON; reaching the parser would fail
        // with Parse instead of Status.
        let pipeline = pipeline(ScriptedSource::new(vec![ScriptedSource::status(404)]));

        let err = pipeline.run(&EchoPlan, &params(1.0)).await.unwrap_err();
        assert_eq!(err, FetchError::Status(404));
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_parse_error() {
        let pipeline = pipeline(ScriptedSource::new(vec![ScriptedSource::ok("not json")]));

        let err = pipeline.run(&EchoPlan, &params(1.0)).await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let pipeline = pipeline(ScriptedSource::new(vec![Err(FetchError::Network(
            "connection refused".to_string(),
        ))]));

        let err = pipeline.run(&EchoPlan, &params(1.0)).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_request_times_out_as_network_error() {
        let pipeline = FetchPipeline::new(Arc::new(StalledSource), Duration::from_secs(10));

        let err = pipeline.run(&EchoPlan, &params(1.0)).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(msg) if msg.contains("timed out")));
    }
}
