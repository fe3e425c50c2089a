//! Serverless image-generation worker.
//!
//! Exposes one RPC endpoint (`POST /run`) that turns a text prompt and
//! generation parameters into a base64-encoded rendered image by
//! orchestrating a ComfyUI backend: bind the workflow template, queue
//! the prompt, poll history for completion, fetch the artifact bytes.

pub mod config;
pub mod handler;
pub mod progress;
pub mod routes;
pub mod state;
