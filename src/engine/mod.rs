pub mod sink;

use async_trait::async_trait;
use thiserror::Error;

pub use sink::DirectorySink;

/// Error surfaced by an engine while loading or disposing a model
#[derive(Error, Debug)]
#[error("{0}")]
pub struct EngineError(pub String);

/// Unified interface to the engine that consumes fragment buffers
///
/// The engine owns whatever it builds from a buffer. Callers refer to the
/// result only by the model id they handed in, and observe the engine's
/// live set through `loaded_ids`.
#[async_trait]
pub trait ModelEngine: Send + Sync {
    /// Hand a downloaded fragment buffer to the engine under a stable model id
    async fn load_model(&self, model_id: &str, bytes: Vec<u8>) -> Result<(), EngineError>;

    /// Dispose a previously loaded model and release its resources
    async fn dispose_model(&self, model_id: &str) -> Result<(), EngineError>;

    /// Ids of the models the engine currently holds
    fn loaded_ids(&self) -> Vec<String>;

    /// Get engine name for logging/debugging
    fn engine_name(&self) -> &str;
}
