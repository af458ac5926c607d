//! Scale recipe ingredient quantities from the portion count a recipe was
//! written for to the portion count you want to cook.
//!
//! ```
//! use recipe_scaler::{format_quantity, IngredientDraft, IngredientStore, Unit};
//!
//! let store = IngredientStore::new();
//! store.replace_all(vec![IngredientDraft::new("Flour", 500.0, Unit::Gram)], 4.0);
//! store.set_desired_portions(6.0);
//!
//! let result = store.snapshot().scale().unwrap();
//! assert_eq!(format_quantity(result.items[0].adjusted_quantity), "750");
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod format;
pub mod importer;
pub mod importers;
pub mod model;
pub mod scaling;
pub mod store;

pub use builder::{ExtractorChoice, RecipeImporterBuilder};
pub use config::ScalerConfig;
pub use error::{FieldError, ImportError, ScaleError};
pub use format::{format_multiplier, format_quantity};
pub use importer::{ImportHandle, ImportOutcome, RecipeImporter};
pub use importers::{ExtractedRecipe, RawIngredient, RecipeExtractor, SourceRef};
pub use model::{Ingredient, IngredientDraft, IngredientField, IngredientId, PortionContext, Unit};
pub use scaling::{scale, ScaledIngredient, ScaledResult};
pub use store::{IngredientStore, Snapshot};
