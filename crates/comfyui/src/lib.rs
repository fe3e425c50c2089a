//! ComfyUI HTTP client library.
//!
//! Provides the REST API wrapper, the typed workflow template and
//! parameter binder, typed history/output models with artifact
//! resolution, and the bounded-retry primitive shared by the readiness
//! probe and the completion poller.

pub mod api;
pub mod history;
pub mod poll;
pub mod retry;
pub mod workflow;
