pub mod assets;
pub mod cancel;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod loader;

pub use error::{FragError, Result};
