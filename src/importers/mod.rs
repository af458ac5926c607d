mod fetcher;
pub mod ingredient_line;
mod json_ld;
mod simulated;

pub use fetcher::RequestFetcher;
pub use json_ld::JsonLdExtractor;
pub use simulated::SimulatedExtractor;

use std::fmt;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::error::ImportError;
use crate::model::{IngredientDraft, Unit};

/// A recipe location that passed boundary validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    url: Url,
}

impl SourceRef {
    /// Accept only http(s) URLs with a host. Anything else is rejected before
    /// an extractor ever sees it.
    pub fn parse(raw: &str) -> Result<Self, ImportError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ImportError::InvalidSource("empty source".to_string()));
        }

        let url = Url::parse(trimmed)
            .map_err(|e| ImportError::InvalidSource(format!("{}: {}", trimmed, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ImportError::InvalidSource(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(ImportError::InvalidSource(format!("{} has no host", trimmed)));
        }

        Ok(Self { url })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Ingredient record as delivered by an extractor, before validation
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawIngredient {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

impl RawIngredient {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            quantity: Some(quantity),
            unit: Some(unit.into()),
        }
    }
}

/// Payload returned by an extractor
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtractedRecipe {
    pub ingredients: Vec<RawIngredient>,
    #[serde(rename = "basePortions")]
    pub base_portions: Option<f64>,
}

/// A recipe that is safe to hand to `IngredientStore::replace_all`
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecipe {
    pub ingredients: Vec<IngredientDraft>,
    pub base_portions: f64,
}

/// Source of recipe data. Implementations may fetch over the network, read a
/// fixture or simulate latency; they only have to honour this contract.
#[async_trait]
pub trait RecipeExtractor: Send + Sync {
    /// Get the extractor name (e.g., "simulated", "json_ld")
    fn name(&self) -> &str;

    /// Pull the ingredient list and base portions out of `source`
    async fn extract(&self, source: &SourceRef) -> Result<ExtractedRecipe, ImportError>;
}

/// Check every extracted record and the portion count.
///
/// Malformed records are rejected here so they never reach the store.
pub fn validate(extracted: ExtractedRecipe) -> Result<ValidatedRecipe, ImportError> {
    if extracted.ingredients.is_empty() {
        return Err(ImportError::NoIngredientsFound);
    }

    let base_portions = match extracted.base_portions {
        Some(portions) if portions.is_finite() && portions > 0.0 => portions,
        Some(portions) => return Err(ImportError::InvalidBasePortions(portions.to_string())),
        None => return Err(ImportError::InvalidBasePortions("missing".to_string())),
    };

    let ingredients = extracted
        .ingredients
        .into_iter()
        .enumerate()
        .map(|(index, raw)| validate_ingredient(index, raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidatedRecipe {
        ingredients,
        base_portions,
    })
}

fn validate_ingredient(index: usize, raw: RawIngredient) -> Result<IngredientDraft, ImportError> {
    let malformed = |reason: String| ImportError::MalformedIngredient { index, reason };

    let name = raw.name.ok_or_else(|| malformed("missing name".to_string()))?;
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(malformed("empty name".to_string()));
    }

    let quantity = raw
        .quantity
        .ok_or_else(|| malformed("missing quantity".to_string()))?;
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(malformed(format!("unusable quantity {}", quantity)));
    }

    let unit_label = raw.unit.ok_or_else(|| malformed("missing unit".to_string()))?;
    let unit = unit_label
        .parse::<Unit>()
        .map_err(|e| malformed(e.to_string()))?;

    Ok(IngredientDraft::new(name, quantity, unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_ref_accepts_http_urls() {
        let source = SourceRef::parse("  https://example.com/recipes/cake  ").unwrap();
        assert_eq!(source.as_str(), "https://example.com/recipes/cake");
        assert!(SourceRef::parse("http://localhost:8080/r").is_ok());
    }

    #[test]
    fn test_source_ref_rejects_non_locators() {
        for raw in [
            "",
            "   ",
            "chocolate cake",
            "ftp://example.com/cake",
            "file:///etc/passwd",
            "mailto:chef@example.com",
            "http://",
        ] {
            let err = SourceRef::parse(raw).unwrap_err();
            assert!(err.is_validation(), "{:?} should be a validation error", raw);
        }
    }

    #[test]
    fn test_validate_accepts_complete_records() {
        let extracted = ExtractedRecipe {
            ingredients: vec![
                RawIngredient::new(" Eggs ", 3.0, "unit"),
                RawIngredient::new("Milk", 250.0, "ml"),
            ],
            base_portions: Some(8.0),
        };

        let recipe = validate(extracted).unwrap();
        assert_eq!(recipe.base_portions, 8.0);
        assert_eq!(
            recipe.ingredients,
            vec![
                IngredientDraft::new("Eggs", 3.0, Unit::Piece),
                IngredientDraft::new("Milk", 250.0, Unit::Milliliter),
            ]
        );
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let extracted = ExtractedRecipe {
            ingredients: vec![
                RawIngredient::new("Eggs", 3.0, "unit"),
                RawIngredient {
                    name: Some("Milk".to_string()),
                    quantity: Some(250.0),
                    unit: None,
                },
            ],
            base_portions: Some(4.0),
        };

        match validate(extracted) {
            Err(ImportError::MalformedIngredient { index, reason }) => {
                assert_eq!(index, 1);
                assert_eq!(reason, "missing unit");
            }
            other => panic!("Expected MalformedIngredient, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let negative = ExtractedRecipe {
            ingredients: vec![RawIngredient::new("Salt", -1.0, "pinch")],
            base_portions: Some(4.0),
        };
        assert!(matches!(
            validate(negative),
            Err(ImportError::MalformedIngredient { .. })
        ));

        let unknown_unit = ExtractedRecipe {
            ingredients: vec![RawIngredient::new("Salt", 1.0, "bushel")],
            base_portions: Some(4.0),
        };
        assert!(matches!(
            validate(unknown_unit),
            Err(ImportError::MalformedIngredient { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_list_and_bad_portions() {
        let empty = ExtractedRecipe {
            ingredients: vec![],
            base_portions: Some(4.0),
        };
        assert!(matches!(validate(empty), Err(ImportError::NoIngredientsFound)));

        let zero = ExtractedRecipe {
            ingredients: vec![RawIngredient::new("Salt", 1.0, "pinch")],
            base_portions: Some(0.0),
        };
        assert!(matches!(
            validate(zero),
            Err(ImportError::InvalidBasePortions(_))
        ));

        let missing = ExtractedRecipe {
            ingredients: vec![RawIngredient::new("Salt", 1.0, "pinch")],
            base_portions: None,
        };
        assert!(matches!(
            validate(missing),
            Err(ImportError::InvalidBasePortions(_))
        ));
    }

    #[test]
    fn test_extracted_recipe_from_json() {
        let json = r#"{
            "ingredients": [
                {"name": "Flour", "quantity": 500, "unit": "g"},
                {"name": "Eggs", "quantity": 3}
            ],
            "basePortions": 8
        }"#;
        let extracted: ExtractedRecipe = serde_json::from_str(json).unwrap();
        assert_eq!(extracted.base_portions, Some(8.0));
        assert_eq!(extracted.ingredients[1].unit, None);
        assert!(validate(extracted).is_err());
    }
}
