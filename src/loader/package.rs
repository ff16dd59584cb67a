use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::assets::AssetBase;
use crate::cancel::{CancellationHandle, CancellationToken};
use crate::catalog::Package;
use crate::engine::ModelEngine;
use crate::error::{FragError, Result};
use crate::fetch::FragmentFetcher;
use crate::loader::progress::{LoadProgress, LoadStage, ProgressCallback};
use crate::loader::registry::{LoadedModel, Registry};

/// Slice of each fragment's share of `overall` spent downloading; the
/// remainder covers the engine hand-off.
const DOWNLOAD_SHARE: f64 = 0.9;

/// Orchestrates sequential package loads against the engine.
///
/// At most one load runs at a time: a second `load_package` while one is in
/// flight is rejected with `FragError::Busy` rather than queued. All methods
/// take `&self`; the loader is meant to be shared behind an `Arc`.
pub struct PackageLoader {
    engine: Arc<dyn ModelEngine>,
    fetcher: Arc<dyn FragmentFetcher>,
    assets: AssetBase,
    registry: Mutex<Registry>,
    busy: AtomicBool,
    active_cancel: Mutex<Option<CancellationHandle>>,
}

impl PackageLoader {
    pub fn new(
        engine: Arc<dyn ModelEngine>,
        fetcher: Arc<dyn FragmentFetcher>,
        assets: AssetBase,
    ) -> Self {
        Self {
            engine,
            fetcher,
            assets,
            registry: Mutex::new(Registry::new()),
            busy: AtomicBool::new(false),
            active_cancel: Mutex::new(None),
        }
    }

    /// Loads every fragment of `package` in catalog order, reporting
    /// progress along the way.
    ///
    /// Fragments whose id is already registered are skipped. With
    /// `replace_existing`, everything the engine holds is disposed first.
    /// On success the final event is `Done` with `overall` exactly `1.0`.
    ///
    /// Returns `FragError::Busy` if another load is in flight and
    /// `FragError::Cancelled` if `cancel_active_load` was triggered.
    pub async fn load_package(
        &self,
        package: &Package,
        replace_existing: bool,
        on_progress: &mut ProgressCallback,
    ) -> Result<()> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(FragError::Busy);
        }

        let (token, handle) = CancellationToken::new();
        *self.active_cancel_guard() = Some(handle);

        let result = self
            .run_load(package, replace_existing, &token, on_progress)
            .await;

        *self.active_cancel_guard() = None;
        self.busy.store(false, Ordering::SeqCst);

        match result {
            // A fetcher may surface cancellation as a failed read; the
            // token is the source of truth.
            Err(_) if token.is_cancelled() => {
                tracing::info!("Load of package {} cancelled", package.id);
                Err(FragError::Cancelled)
            }
            other => other,
        }
    }

    async fn run_load(
        &self,
        package: &Package,
        replace_existing: bool,
        token: &CancellationToken,
        on_progress: &mut ProgressCallback,
    ) -> Result<()> {
        tracing::info!(
            "Loading package {} ({} fragment(s))",
            package.id,
            package.fragments.len()
        );

        if replace_existing {
            on_progress(&LoadProgress {
                stage: LoadStage::Idle,
                message: "Clearing loaded models".to_string(),
                overall: 0.0,
                file: None,
                model_id: None,
            });
            self.dispose_all_inner().await?;
        }

        let count = package.fragments.len();
        for (index, fragment) in package.fragments.iter().enumerate() {
            token.check()?;

            if self.registry_guard().contains(&fragment.id) {
                tracing::debug!("Fragment {} already loaded, skipping", fragment.id);
                on_progress(&LoadProgress {
                    stage: LoadStage::Idle,
                    message: format!("{} already loaded, skipping", fragment.id),
                    overall: (index as f64 + 1.0) / count as f64,
                    file: Some(1.0),
                    model_id: Some(fragment.id.clone()),
                });
                continue;
            }

            let url = self.assets.resolve(&fragment.url);

            on_progress(&LoadProgress {
                stage: LoadStage::Download,
                message: format!("Downloading {} ({}/{})", fragment.label, index + 1, count),
                overall: index as f64 / count as f64,
                file: Some(0.0),
                model_id: Some(fragment.id.clone()),
            });

            let bytes = {
                let mut forward = |file: Option<f64>| {
                    let (overall, message) = match file {
                        Some(f) => (
                            (index as f64 + DOWNLOAD_SHARE * f) / count as f64,
                            format!("Downloading {} ({}/{})", fragment.label, index + 1, count),
                        ),
                        None => (
                            index as f64 / count as f64,
                            format!("Downloading {} (size unknown)", fragment.label),
                        ),
                    };
                    on_progress(&LoadProgress {
                        stage: LoadStage::Download,
                        message,
                        overall,
                        file,
                        model_id: Some(fragment.id.clone()),
                    });
                };

                self.fetcher
                    .fetch(&url, &mut forward, token)
                    .await
                    .map_err(|e| match e {
                        FragError::Fetch(msg) => FragError::Fetch(format!(
                            "fragment \"{}\" ({url}): {msg}",
                            fragment.label
                        )),
                        other => other,
                    })?
            };

            token.check()?;

            on_progress(&LoadProgress {
                stage: LoadStage::Load,
                message: format!("Loading {}", fragment.label),
                overall: (index as f64 + DOWNLOAD_SHARE) / count as f64,
                file: Some(1.0),
                model_id: Some(fragment.id.clone()),
            });

            self.engine
                .load_model(&fragment.id, bytes)
                .await
                .map_err(|e| {
                    FragError::Engine(format!("fragment \"{}\" ({url}): {e}", fragment.label))
                })?;

            self.registry_guard().insert(LoadedModel {
                model_id: fragment.id.clone(),
                package_id: package.id.clone(),
                package_label: package.label.clone(),
                fragment_label: fragment.label.clone(),
                url: url.clone(),
            });

            tracing::info!("Loaded fragment {} from {}", fragment.id, url);

            on_progress(&LoadProgress {
                stage: LoadStage::Idle,
                message: format!("Loaded {}", fragment.label),
                overall: (index as f64 + 1.0) / count as f64,
                file: Some(1.0),
                model_id: Some(fragment.id.clone()),
            });
        }

        on_progress(&LoadProgress {
            stage: LoadStage::Done,
            message: format!("Package {} loaded", package.label),
            overall: 1.0,
            file: None,
            model_id: None,
        });

        Ok(())
    }

    /// Disposes one model. Unknown ids are a no-op.
    pub async fn dispose_model(&self, model_id: &str) -> Result<()> {
        if !self.registry_guard().contains(model_id) {
            tracing::debug!("Model {} is not registered, nothing to dispose", model_id);
            return Ok(());
        }

        self.engine
            .dispose_model(model_id)
            .await
            .map_err(|e| FragError::Engine(format!("disposing \"{model_id}\": {e}")))?;

        self.registry_guard().remove(model_id);
        tracing::info!("Disposed model {}", model_id);
        Ok(())
    }

    /// Disposes everything the engine holds and clears the registry.
    pub async fn dispose_all(&self) -> Result<()> {
        self.dispose_all_inner().await
    }

    // Enumerates from the engine rather than the registry so models the
    // engine holds without a registry record still get cleaned up.
    async fn dispose_all_inner(&self) -> Result<()> {
        let ids = self.engine.loaded_ids();
        for id in &ids {
            self.engine
                .dispose_model(id)
                .await
                .map_err(|e| FragError::Engine(format!("disposing \"{id}\": {e}")))?;
        }
        self.registry_guard().clear();
        tracing::info!("Disposed {} model(s)", ids.len());
        Ok(())
    }

    /// Requests cancellation of the load in flight, if any.
    ///
    /// Returns immediately; the load itself winds down at its next
    /// checkpoint and resolves with `FragError::Cancelled`.
    pub fn cancel_active_load(&self) {
        if let Some(handle) = self.active_cancel_guard().as_ref() {
            tracing::info!("Cancelling active load");
            handle.cancel();
        }
    }

    /// Whether a load is currently in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Snapshot of all loaded model records, sorted by model id
    #[must_use]
    pub fn loaded(&self) -> Vec<LoadedModel> {
        self.registry_guard().snapshot()
    }

    /// Record for one loaded model id, if registered
    #[must_use]
    pub fn model_meta(&self, model_id: &str) -> Option<LoadedModel> {
        self.registry_guard().get(model_id).cloned()
    }

    fn registry_guard(&self) -> MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn active_cancel_guard(&self) -> MutexGuard<'_, Option<CancellationHandle>> {
        self.active_cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for PackageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageLoader")
            .field("engine", &self.engine.engine_name())
            .field("assets", &self.assets)
            .field("busy", &self.is_busy())
            .field("loaded", &self.registry_guard().len())
            .finish()
    }
}
