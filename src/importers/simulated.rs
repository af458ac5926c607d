use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::time::sleep;

use super::{ExtractedRecipe, RawIngredient, RecipeExtractor, SourceRef};
use crate::error::ImportError;

/// Stand-in for a real extraction service. Waits for `delay` and then
/// returns the same cake recipe for every source.
pub struct SimulatedExtractor {
    delay: Duration,
}

impl SimulatedExtractor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// The payload every simulated extraction produces
    pub fn sample_recipe() -> ExtractedRecipe {
        ExtractedRecipe {
            ingredients: vec![
                RawIngredient::new("Wheat flour", 500.0, "g"),
                RawIngredient::new("Eggs", 3.0, "unit"),
                RawIngredient::new("Milk", 250.0, "ml"),
                RawIngredient::new("Sugar", 200.0, "g"),
                RawIngredient::new("Baking powder", 1.0, "tbsp"),
            ],
            base_portions: Some(8.0),
        }
    }
}

impl Default for SimulatedExtractor {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

#[async_trait]
impl RecipeExtractor for SimulatedExtractor {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn extract(&self, source: &SourceRef) -> Result<ExtractedRecipe, ImportError> {
        debug!("Simulating extraction of {} ({:?})", source, self.delay);
        sleep(self.delay).await;
        Ok(Self::sample_recipe())
    }
}
