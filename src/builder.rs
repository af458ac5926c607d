use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ScalerConfig;
use crate::importer::RecipeImporter;
use crate::importers::{JsonLdExtractor, RecipeExtractor, SimulatedExtractor};
use crate::store::IngredientStore;
use crate::ImportError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which extractor the importer should use
#[derive(Clone)]
pub enum ExtractorChoice {
    /// Fixed sample recipe after an artificial delay
    Simulated(Duration),
    /// Fetch the page and read its schema.org JSON-LD
    JsonLd,
    /// Any other implementation of the extraction contract
    Custom(Arc<dyn RecipeExtractor>),
}

impl fmt::Debug for ExtractorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractorChoice::Simulated(delay) => f.debug_tuple("Simulated").field(delay).finish(),
            ExtractorChoice::JsonLd => f.write_str("JsonLd"),
            ExtractorChoice::Custom(extractor) => {
                f.debug_tuple("Custom").field(&extractor.name()).finish()
            }
        }
    }
}

impl Default for ExtractorChoice {
    fn default() -> Self {
        ExtractorChoice::Simulated(Duration::from_secs(2))
    }
}

/// Builder for configuring a [`RecipeImporter`]
#[derive(Debug, Default)]
pub struct RecipeImporterBuilder {
    store: Option<Arc<IngredientStore>>,
    extractor: ExtractorChoice,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl RecipeImporterBuilder {
    /// Apply imports to this store instead of a fresh seeded one
    pub fn store(mut self, store: Arc<IngredientStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use the simulated extractor with the given latency
    ///
    /// # Example
    /// ```
    /// use recipe_scaler::RecipeImporter;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeImporter::builder()
    ///     .simulated(Duration::from_millis(500));
    /// ```
    pub fn simulated(mut self, delay: Duration) -> Self {
        self.extractor = ExtractorChoice::Simulated(delay);
        self
    }

    /// Fetch recipe pages over HTTP and read their JSON-LD
    pub fn json_ld(mut self) -> Self {
        self.extractor = ExtractorChoice::JsonLd;
        self
    }

    /// Use a custom extractor
    pub fn extractor(mut self, extractor: impl RecipeExtractor + 'static) -> Self {
        self.extractor = ExtractorChoice::Custom(Arc::new(extractor));
        self
    }

    /// Set a timeout for the whole extraction
    ///
    /// # Example
    /// ```
    /// use recipe_scaler::RecipeImporter;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeImporter::builder()
    ///     .json_ld()
    ///     .timeout(Duration::from_secs(10));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// User agent sent when fetching recipe pages
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Take extractor, timeout and user agent from configuration
    pub fn from_config(mut self, config: &ScalerConfig) -> Result<Self, ImportError> {
        let import = &config.import;
        self.extractor = match import.extractor.as_str() {
            "simulated" => {
                ExtractorChoice::Simulated(Duration::from_millis(import.simulated_delay_ms))
            }
            "json_ld" => ExtractorChoice::JsonLd,
            other => {
                return Err(ImportError::ConfigError(::config::ConfigError::Message(
                    format!("Unknown extractor: {}", other),
                )))
            }
        };
        self.timeout = Some(Duration::from_secs(import.timeout_secs));
        self.user_agent = Some(import.user_agent.clone());
        Ok(self)
    }

    /// Build the importer
    ///
    /// # Errors
    /// Returns `ImportError` if the HTTP client for the JSON-LD extractor
    /// cannot be created.
    pub fn build(self) -> Result<RecipeImporter, ImportError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let extractor: Arc<dyn RecipeExtractor> = match self.extractor {
            ExtractorChoice::Simulated(delay) => Arc::new(SimulatedExtractor::new(delay)),
            ExtractorChoice::JsonLd => Arc::new(JsonLdExtractor::new(
                Some(timeout),
                self.user_agent.as_deref(),
            )?),
            ExtractorChoice::Custom(extractor) => extractor,
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(IngredientStore::seeded()));

        Ok(RecipeImporter::new(store, extractor, timeout))
    }
}
