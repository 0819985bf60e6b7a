//! Client library for the BetaFace face-recognition web service.
//!
//! Images are base64-encoded and uploaded over HTTP with XML request bodies
//! rendered from templates; responses are polled until the service finishes
//! its asynchronous processing and parsed into typed results. Successful
//! results of non-polling endpoints can be cached in a pluggable key-value
//! store.

pub mod api;
pub mod cache;
pub mod error;
pub mod models;
pub mod service;

pub use error::{Error, Result};
pub use service::{FaceServiceClient, PollPolicy};
