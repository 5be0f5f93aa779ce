//! Reactive fetch/render core.
//!
//! Every widget in skylens follows the same lifecycle: it holds a small set
//! of typed attributes, fetches a remote JSON resource when it is mounted or
//! when a trigger attribute changes, maps the payload into attribute updates,
//! and renders purely from current attribute values. This module is that
//! lifecycle, independent of any concrete endpoint:
//!
//! - [`store`] - typed attribute storage with change batching
//! - [`lifecycle`] - mount/change triggering and generation tracking
//! - [`http`] - the HTTP collaborator boundary
//! - [`pipeline`] - prerequisite -> URL -> request -> parse -> map
//! - [`view`] - the assembled [`view::ReactiveFetchView`]

pub mod http;
pub mod lifecycle;
pub mod pipeline;
pub mod store;
pub mod view;

pub use http::{HttpResponse, HttpSource, ReqwestSource};
pub use lifecycle::{Generation, LifecycleController};
pub use pipeline::{FetchError, FetchParams, FetchPipeline, FetchPlan, StoreUpdates};
pub use store::{AttrSchema, AttrType, AttrValue, Record, StateStore, StoreError};
pub use view::{FetchJob, ReactiveFetchView};
