//! Runs a recipe import in the background and applies the result to an
//! [`IngredientStore`] in one step.
//!
//! At most one import is in flight per store, even when several importers
//! share it. A second `start` while one is pending is rejected with
//! [`ImportError::Busy`]. Cancelling the import, dropping the
//! [`ImportHandle`], or dropping a pending `wait` future guarantees the store
//! is never written by that import.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::builder::RecipeImporterBuilder;
use crate::error::ImportError;
use crate::importers::{validate, ExtractedRecipe, RecipeExtractor, SourceRef};
use crate::model::IngredientId;
use crate::store::IngredientStore;

/// What a successful import changed
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub source: String,
    pub extractor: String,
    pub ingredient_ids: Vec<IngredientId>,
    pub base_portions: f64,
}

impl ImportOutcome {
    pub fn ingredient_count(&self) -> usize {
        self.ingredient_ids.len()
    }
}

struct Shared {
    store: Arc<IngredientStore>,
    extractor: Arc<dyn RecipeExtractor>,
    timeout: Duration,
}

impl Shared {
    // The store's slot lock is held across replace_all so a concurrent cancel
    // either happens before the write (and wins) or after it.
    fn finish(
        &self,
        generation: u64,
        source: &SourceRef,
        extracted: Result<ExtractedRecipe, ImportError>,
    ) -> Result<ImportOutcome, ImportError> {
        let applied = self.store.finish_import(
            generation,
            |store| -> Result<(Vec<IngredientId>, f64), ImportError> {
                let recipe = validate(extracted?)?;
                let base_portions = recipe.base_portions;
                Ok((store.replace_all(recipe.ingredients, base_portions), base_portions))
            },
        );
        let Some(applied) = applied else {
            debug!("Discarding result of abandoned import {}", generation);
            return Err(ImportError::Cancelled);
        };
        let (ingredient_ids, base_portions) = applied?;

        Ok(ImportOutcome {
            source: source.to_string(),
            extractor: self.extractor.name().to_string(),
            ingredient_ids,
            base_portions,
        })
    }
}

async fn run_import(
    shared: Arc<Shared>,
    generation: u64,
    source: SourceRef,
) -> Result<ImportOutcome, ImportError> {
    let extracted = match timeout(shared.timeout, shared.extractor.extract(&source)).await {
        Ok(result) => result,
        Err(_) => Err(ImportError::Timeout(shared.timeout)),
    };

    let outcome = shared.finish(generation, &source, extracted);
    match &outcome {
        Ok(outcome) => info!(
            "Imported {} ingredients for {} portions from {}",
            outcome.ingredient_count(),
            outcome.base_portions,
            outcome.source
        ),
        Err(ImportError::Cancelled) => {}
        Err(e) => warn!("Import from {} failed: {}", source, e),
    }
    outcome
}

/// Imports recipes into a shared store using a pluggable extractor
pub struct RecipeImporter {
    shared: Arc<Shared>,
}

impl RecipeImporter {
    /// Creates a new builder for configuring an importer
    ///
    /// # Example
    /// ```
    /// use recipe_scaler::RecipeImporter;
    /// use std::time::Duration;
    ///
    /// let importer = RecipeImporter::builder()
    ///     .simulated(Duration::from_millis(10))
    ///     .build()
    ///     .unwrap();
    /// assert!(!importer.is_busy());
    /// ```
    pub fn builder() -> RecipeImporterBuilder {
        RecipeImporterBuilder::default()
    }

    pub(crate) fn new(
        store: Arc<IngredientStore>,
        extractor: Arc<dyn RecipeExtractor>,
        timeout: Duration,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                extractor,
                timeout,
            }),
        }
    }

    /// The store imports are applied to
    pub fn store(&self) -> &Arc<IngredientStore> {
        &self.shared.store
    }

    pub fn extractor_name(&self) -> &str {
        self.shared.extractor.name()
    }

    pub fn timeout(&self) -> Duration {
        self.shared.timeout
    }

    /// Whether an import into this importer's store is currently pending
    pub fn is_busy(&self) -> bool {
        self.shared.store.is_importing()
    }

    /// Validate `source` and start extracting it in the background.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// - [`ImportError::InvalidSource`] if `source` is not an http(s) URL;
    ///   no extraction is attempted
    /// - [`ImportError::Busy`] if another import into the same store is still
    ///   pending
    pub fn start(&self, source: &str) -> Result<ImportHandle, ImportError> {
        let source = SourceRef::parse(source).inspect_err(|e| {
            warn!("Rejected import source: {}", e);
        })?;

        let runtime = Handle::try_current()
            .map_err(|e| ImportError::TaskFailed(format!("no async runtime: {}", e)))?;

        let Some(generation) = self.shared.store.begin_import() else {
            warn!("Import of {} rejected: another import is in progress", source);
            return Err(ImportError::Busy);
        };

        info!(
            "Starting import {} from {} using {}",
            generation,
            source,
            self.shared.extractor.name()
        );
        let task = runtime.spawn(run_import(self.shared.clone(), generation, source));

        Ok(ImportHandle {
            generation,
            shared: self.shared.clone(),
            task: Some(task),
        })
    }

    /// Start an import and wait for it to finish
    pub async fn import(&self, source: &str) -> Result<ImportOutcome, ImportError> {
        self.start(source)?.wait().await
    }
}

/// A pending import. Dropping it cancels the import.
pub struct ImportHandle {
    generation: u64,
    shared: Arc<Shared>,
    task: Option<JoinHandle<Result<ImportOutcome, ImportError>>>,
}

impl std::fmt::Debug for ImportHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportHandle")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl ImportHandle {
    /// Wait for the import to complete.
    ///
    /// On any error the store is left exactly as it was. Dropping the returned
    /// future before it completes abandons the import like dropping the handle.
    pub async fn wait(mut self) -> Result<ImportOutcome, ImportError> {
        let Some(task) = self.task.as_mut() else {
            return Err(ImportError::Cancelled);
        };
        // The task stays in `self` until joined so Drop can still abort it
        let joined = task.await;
        self.task = None;

        match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(ImportError::Cancelled),
            Err(e) => {
                self.shared.store.end_import(self.generation);
                Err(ImportError::TaskFailed(e.to_string()))
            }
        }
    }

    /// Abandon the import. Returns false if it had already finished.
    pub fn cancel(mut self) -> bool {
        self.abandon()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    fn abandon(&mut self) -> bool {
        let Some(task) = self.task.take() else {
            return false;
        };
        let released = self.shared.store.end_import(self.generation);
        task.abort();
        if released {
            info!("Import {} cancelled", self.generation);
        }
        released
    }
}

impl Drop for ImportHandle {
    fn drop(&mut self) {
        self.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importers::{RawIngredient, SimulatedExtractor};
    use async_trait::async_trait;

    struct FailingExtractor;

    #[async_trait]
    impl RecipeExtractor for FailingExtractor {
        fn name(&self) -> &str {
            "failing"
        }

        async fn extract(&self, _source: &SourceRef) -> Result<ExtractedRecipe, ImportError> {
            Err(ImportError::ParseError("nothing here".to_string()))
        }
    }

    struct MalformedExtractor;

    #[async_trait]
    impl RecipeExtractor for MalformedExtractor {
        fn name(&self) -> &str {
            "malformed"
        }

        async fn extract(&self, _source: &SourceRef) -> Result<ExtractedRecipe, ImportError> {
            Ok(ExtractedRecipe {
                ingredients: vec![
                    RawIngredient::new("Eggs", 3.0, "unit"),
                    RawIngredient {
                        name: None,
                        quantity: Some(1.0),
                        unit: Some("g".to_string()),
                    },
                ],
                base_portions: Some(2.0),
            })
        }
    }

    fn importer_with(extractor: Arc<dyn RecipeExtractor>) -> RecipeImporter {
        RecipeImporter::new(
            Arc::new(IngredientStore::seeded()),
            extractor,
            Duration::from_secs(30),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_import_replaces_store() {
        let importer = importer_with(Arc::new(SimulatedExtractor::new(Duration::from_secs(2))));
        let outcome = importer.import("https://example.com/cake").await.unwrap();

        assert_eq!(outcome.ingredient_count(), 5);
        assert_eq!(outcome.base_portions, 8.0);
        assert_eq!(outcome.extractor, "simulated");
        assert_eq!(importer.store().ids(), outcome.ingredient_ids);
        assert!(!importer.is_busy());
    }

    #[tokio::test]
    async fn test_extraction_failure_leaves_store_untouched() {
        let importer = importer_with(Arc::new(FailingExtractor));
        let before = importer.store().snapshot();

        let err = importer.import("https://example.com/cake").await.unwrap_err();
        assert!(err.is_extraction());
        assert_eq!(importer.store().snapshot(), before);
        assert!(!importer.is_busy());
    }

    #[tokio::test]
    async fn test_malformed_record_rejects_whole_import() {
        let importer = importer_with(Arc::new(MalformedExtractor));
        let before = importer.store().snapshot();

        let err = importer.import("https://example.com/cake").await.unwrap_err();
        assert!(matches!(err, ImportError::MalformedIngredient { index: 1, .. }));
        assert_eq!(importer.store().snapshot(), before);
    }

    #[tokio::test]
    async fn test_invalid_source_is_rejected_before_extraction() {
        let importer = importer_with(Arc::new(FailingExtractor));
        let err = importer.start("not a link").unwrap_err();
        assert!(err.is_validation());
        assert!(!importer.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_import_is_busy() {
        let importer = importer_with(Arc::new(SimulatedExtractor::new(Duration::from_secs(2))));
        let first = importer.start("https://example.com/one").unwrap();

        assert!(importer.is_busy());
        assert!(matches!(
            importer.start("https://example.com/two"),
            Err(ImportError::Busy)
        ));

        first.wait().await.unwrap();
        assert!(importer.start("https://example.com/three").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let store = Arc::new(IngredientStore::seeded());
        let importer = RecipeImporter::new(
            store.clone(),
            Arc::new(SimulatedExtractor::new(Duration::from_secs(10))),
            Duration::from_secs(1),
        );
        let before = store.snapshot();

        let err = importer.import("https://example.com/slow").await.unwrap_err();
        assert!(matches!(err, ImportError::Timeout(d) if d == Duration::from_secs(1)));
        assert_eq!(store.snapshot(), before);
        assert!(!importer.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_result() {
        let importer = importer_with(Arc::new(SimulatedExtractor::new(Duration::from_secs(2))));
        let before = importer.store().snapshot();

        let handle = importer.start("https://example.com/cake").unwrap();
        assert!(handle.cancel());
        assert!(!importer.is_busy());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(importer.store().snapshot(), before);
    }

    #[test]
    fn test_start_outside_runtime_fails_cleanly() {
        let importer = importer_with(Arc::new(FailingExtractor));
        let err = importer.start("https://example.com/cake").unwrap_err();
        assert!(matches!(err, ImportError::TaskFailed(_)));
        assert!(!importer.is_busy());
    }
}
