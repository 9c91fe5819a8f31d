//! Sitegen Server - HTTP and command-line surface
//!
//! - [`routes::ai_edit`]: stateless `POST /api/ai-edit`
//! - [`App`]: component wiring from [`SiteGenConfig`](sitegen_core::SiteGenConfig)
//! - [`telemetry::init_tracing`]: subscriber setup for the binary

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod app;
pub mod dto;
pub mod routes;
pub mod telemetry;

pub use app::{App, AppError};
pub use dto::{AiEditRequest, AiEditResponse, ContactInfo, ErrorBody};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
