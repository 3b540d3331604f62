//! ss-probe - Shadowsocks list probe
//!
//! Fetches a proxy list, decodes it when it is base64-encoded, extracts the
//! `ss://` entries and optionally verifies each one against a remote test
//! service.

pub mod error;
pub mod pipeline;
pub mod proxy;

pub use error::ProbeError;
pub use pipeline::{NoopObserver, Pipeline, PipelineConfig, ProbeObserver, ProbeReport};
pub use proxy::*;

/// Library result type
pub type Result<T> = std::result::Result<T, ProbeError>;
