//! Domain types and validation for the renderpod image-generation worker.
//!
//! Pure logic only: the generation request model, its validation rules,
//! and the core error taxonomy. All I/O lives in `renderpod-comfyui`
//! and `renderpod-worker`.

pub mod error;
pub mod generation;
