//! Health check results, the built-in check engine and the report renderers
//! shared by `linkerd check` and every extension it dispatches to.
//!
//! # Result flow
//!
//! ```text
//! HealthChecker::run_checks ──┐
//!                             ├──> CheckObserver::observe(&CheckResult) ──> Renderer
//! ExtensionExecutor (extern) ─┘                                               │
//!                                                                             ↓
//!                                              table / short / JSON + Verdict
//! ```
//!
//! Producers never buffer: every [`CheckResult`] is handed to the observer as
//! soon as it exists, which keeps the table renderer streaming (its spinner
//! animates retrying checks) while the JSON renderer buffers internally.

// Core modules
pub mod checker;
pub mod config;
pub mod error;
pub mod render;
pub mod result;
pub mod schema;

// Re-export commonly used types
pub use checker::{Category, Checker, HealthChecker};
pub use config::CheckConfig;
pub use error::{HealthcheckError, Result};
pub use render::{OutputFormat, RenderOptions, Renderer};
pub use result::{CheckError, CheckObserver, CheckResult, Verdict};
pub use schema::{CheckOutput, ExtensionMetadata};
