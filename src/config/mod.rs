//! Configuration module for fragpack
//!
//! Loads config from `$XDG_CONFIG_HOME/fragpack/config.toml` or `~/.config/fragpack/config.toml`.
//! Falls back to embedded defaults if file doesn't exist.
//! Partial configs are merged with defaults using serde's default attributes.
//!
//! # Example
//!
//! ```no_run
//! use fragpack::config::Config;
//!
//! let config = Config::load().expect("Failed to load config");
//! println!("Connect timeout: {}s", config.http.connect_timeout_secs);
//! ```

pub mod schema;

pub use schema::Config;
