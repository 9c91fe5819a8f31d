//! Sitegen Model - generative model clients
//!
//! - [`TextModel`] / [`ImageModel`]: capabilities the generator and
//!   merger depend on
//! - [`GeminiClient`]: REST implementation of both
//! - [`RetryPolicy`]: bounded retry for transient text-call failures
//! - [`strip_code_fences`]: clean fenced JSON responses

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod client;
pub mod config;
pub mod error;
pub mod fences;
pub mod gemini;
pub mod retry;

pub use client::{ImageModel, ImageOutput, InlineImage, TextModel, TextRequest};
pub use config::ModelConfig;
pub use error::ModelError;
pub use fences::strip_code_fences;
pub use gemini::GeminiClient;
pub use retry::RetryPolicy;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
