// src/lib.rs

//! Function adapter library.
//!
//! Runs an HTTP route table behind a serverless function entry point:
//! the adapter is built lazily on the first invocation, route registration
//! failures degrade to a diagnostic stub, and any other failure becomes a
//! structured 500 response.

pub mod adapter;
pub mod api;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod handler;
pub mod models;
pub mod registrar;
pub mod utils;

pub use adapter::{Adapter, AdapterBuilder, AdapterMode};
pub use handler::FunctionEntry;
pub use registrar::{AppContext, RouteRegistrar};
