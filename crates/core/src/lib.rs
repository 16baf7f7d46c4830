//! DocChat Core Library
//!
//! Foundational utilities shared by every DocChat crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Application configuration (provider, credentials, logging)

pub mod config;
pub mod error;
pub mod logging;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
