/// Pipeline stage a progress event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    /// Between fragments, or after clearing
    Idle,
    /// Bytes are being fetched
    Download,
    /// A downloaded buffer is being handed to the engine
    Load,
    /// The whole package finished
    Done,
}

impl LoadStage {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStage::Idle => "idle",
            LoadStage::Download => "download",
            LoadStage::Load => "load",
            LoadStage::Done => "done",
        }
    }
}

impl std::fmt::Display for LoadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress event emitted during a package load.
///
/// Events are ephemeral: they are handed to the callback by reference and
/// never stored by the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadProgress {
    pub stage: LoadStage,
    /// Human-readable description of what is happening
    pub message: String,
    /// Fraction of the whole package in `[0, 1]`, non-decreasing over a load
    pub overall: f64,
    /// Fraction of the current file, or `None` while its size is unknown
    pub file: Option<f64>,
    /// Model id the event concerns, when one fragment is in flight
    pub model_id: Option<String>,
}

/// Callback fed with progress events during `load_package`
pub type ProgressCallback = dyn FnMut(&LoadProgress) + Send;
