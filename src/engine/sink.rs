use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::engine::{EngineError, ModelEngine};

/// Reference engine that writes each model's fragment buffer to a file
/// under a target directory.
///
/// Stands in for a real geometry engine in the CLI and in tests. A loaded
/// model is a `<id>.frag` file; disposal deletes it.
pub struct DirectorySink {
    dir: PathBuf,
    files: Mutex<HashMap<String, PathBuf>>,
}

impl DirectorySink {
    /// Create a sink rooted at `dir`, creating the directory if needed
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| EngineError(format!("failed to create {}: {e}", dir.display())))?;
        Ok(Self {
            dir,
            files: Mutex::new(HashMap::new()),
        })
    }

    /// Directory the sink writes into
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, model_id: &str) -> PathBuf {
        self.dir.join(format!("{}.frag", sanitize(model_id)))
    }

    fn files(&self) -> std::sync::MutexGuard<'_, HashMap<String, PathBuf>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// Model ids come from catalog JSON, so they can't be trusted as file names.
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl ModelEngine for DirectorySink {
    async fn load_model(&self, model_id: &str, bytes: Vec<u8>) -> Result<(), EngineError> {
        let path = self.path_for(model_id);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| EngineError(format!("failed to write {}: {e}", path.display())))?;

        tracing::debug!("Wrote {} byte(s) to {}", bytes.len(), path.display());
        self.files().insert(model_id.to_string(), path);
        Ok(())
    }

    async fn dispose_model(&self, model_id: &str) -> Result<(), EngineError> {
        let path = self
            .files()
            .remove(model_id)
            .ok_or_else(|| EngineError(format!("model \"{model_id}\" is not loaded")))?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Already gone is fine; the model is no longer held either way.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EngineError(format!(
                "failed to remove {}: {e}",
                path.display()
            ))),
        }
    }

    fn loaded_ids(&self) -> Vec<String> {
        self.files().keys().cloned().collect()
    }

    fn engine_name(&self) -> &str {
        "directory-sink"
    }
}
