// src/models/mod.rs

//! Data structures shared across the adapter.
//!
//! - `config`: runtime configuration
//! - `event`: host invocation event, typed request and host response
//! - `envelope`: JSON bodies produced by the adapter itself

mod config;
mod envelope;
mod event;

// Re-export all public types
pub use config::{Config, DiagnosticsConfig, FunctionConfig, LoggingConfig};
pub use envelope::{
    DEFAULT_DEGRADED_MESSAGE, DegradedHealth, FailureEnvelope, HealthReport,
    REASON_INIT_FAILED, REASON_ROUTES_INIT_FAILED, Unavailable,
};
pub use event::{
    Body, FunctionEvent, FunctionResponse, HttpDescription, InboundRequest, InvocationContext,
    RequestContext,
};
