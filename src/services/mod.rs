//! Service layer for backend calls
//!
//! `ResourceApi` is the seam to the backend HTTP API; `HttpBackend` implements
//! it with reqwest. `ResourceService` sits on top and keeps the stores in step
//! with what it fetches and the actions it runs.

pub mod api;
pub mod http;
pub mod resource_service;

pub use api::{ResourceAction, ResourceApi};
pub use http::HttpBackend;
pub use resource_service::{PendingAction, ResourceService};
