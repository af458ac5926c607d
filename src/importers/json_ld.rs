use std::time::Duration;

use async_trait::async_trait;
use html_escape::decode_html_entities;
use log::debug;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;

use super::fetcher::RequestFetcher;
use super::ingredient_line::parse_line;
use super::{ExtractedRecipe, RawIngredient, RecipeExtractor, SourceRef};
use crate::error::ImportError;

/// Extracts ingredients and servings from schema.org `Recipe` JSON-LD blocks
pub struct JsonLdExtractor {
    fetcher: RequestFetcher,
}

impl JsonLdExtractor {
    pub fn new(timeout: Option<Duration>, user_agent: Option<&str>) -> Result<Self, ImportError> {
        Ok(Self {
            fetcher: RequestFetcher::new(timeout, user_agent)?,
        })
    }

    /// Parse an already fetched page
    pub fn extract_from_html(html: &str) -> Result<ExtractedRecipe, ImportError> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("script[type='application/ld+json']")
            .map_err(|e| ImportError::ParseError(format!("{:?}", e)))?;

        let scripts: Vec<_> = document.select(&selector).collect();
        debug!("JsonLdExtractor: Found {} JSON-LD script tags", scripts.len());

        // Try each script element until we find a valid recipe
        for (index, script) in scripts.iter().enumerate() {
            let raw_json = script.inner_html();
            let json_ld = match serde_json::from_str::<Value>(raw_json.trim()) {
                Ok(json_ld) => json_ld,
                Err(e) => {
                    debug!("JsonLdExtractor: Failed to parse JSON-LD {}: {}", index, e);
                    continue;
                }
            };

            let Some(recipe_json) = find_recipe(&json_ld) else {
                debug!("JsonLdExtractor: No recipe found in JSON-LD {}", index);
                continue;
            };

            match serde_json::from_value::<JsonLdRecipe>(recipe_json.clone()) {
                Ok(recipe) => return Ok(convert_to_extracted(recipe)),
                Err(e) => {
                    debug!("JsonLdExtractor: Failed to convert to JsonLdRecipe: {}", e);
                }
            }
        }

        Err(ImportError::ParseError(
            "No valid recipe found in any JSON-LD script".to_string(),
        ))
    }
}

#[async_trait]
impl RecipeExtractor for JsonLdExtractor {
    fn name(&self) -> &str {
        "json_ld"
    }

    async fn extract(&self, source: &SourceRef) -> Result<ExtractedRecipe, ImportError> {
        let html = self.fetcher.fetch(source.as_str()).await?;
        Self::extract_from_html(&html)
    }
}

fn find_recipe(json_ld: &Value) -> Option<&Value> {
    if let Some(items) = json_ld.as_array() {
        items.iter().find(|item| is_recipe_type(item))
    } else if is_recipe_type(json_ld) {
        Some(json_ld)
    } else {
        json_ld
            .get("@graph")
            .and_then(Value::as_array)
            .and_then(|items| items.iter().find(|item| is_recipe_type(item)))
    }
}

fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(kind)) => kind.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .any(|kind| kind.eq_ignore_ascii_case("recipe")),
        _ => false,
    }
}

fn convert_to_extracted(recipe: JsonLdRecipe) -> ExtractedRecipe {
    let ingredients: Vec<RawIngredient> = match recipe.recipe_ingredient {
        Some(RecipeIngredients::Strings(lines)) => lines
            .iter()
            .map(|line| decode_html_symbols(line))
            .filter(|line| !line.trim().is_empty())
            .map(|line| parse_line(&line))
            .collect(),
        Some(RecipeIngredients::Objects(objects)) => objects
            .into_iter()
            .filter(|object| !object.name.trim().is_empty())
            .map(|object| {
                let name = decode_html_symbols(&object.name);
                let amount = object.amount.as_deref().unwrap_or("").trim();
                if amount.is_empty() {
                    parse_line(&name)
                } else {
                    parse_line(&format!("{amount} {name}"))
                }
            })
            .collect(),
        None => Vec::new(),
    };

    let base_portions = recipe.recipe_yield.as_ref().and_then(portions_from_yield);
    debug!(
        "JsonLdExtractor: {} ingredients, base portions {:?}",
        ingredients.len(),
        base_portions
    );

    ExtractedRecipe {
        ingredients,
        base_portions,
    }
}

fn portions_from_yield(recipe_yield: &RecipeYield) -> Option<f64> {
    match recipe_yield {
        RecipeYield::Number(n) => Some(*n),
        RecipeYield::String(s) => leading_number(s),
        RecipeYield::Array(values) => values.iter().find_map(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => leading_number(s),
            _ => None,
        }),
    }
}

// First number appearing in text like "8 portions", "Serves 4" or "4-6"
fn leading_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let mut seen_dot = false;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| match c {
            '.' if !seen_dot => {
                seen_dot = true;
                true
            }
            c => c.is_ascii_digit(),
        })
        .collect();
    digits.trim_end_matches('.').parse().ok()
}

fn decode_html_symbols(text: &str) -> String {
    // for some reason need to decode twice to get the correct string
    decode_html_entities(&decode_html_entities(text)).into_owned()
}

#[derive(Debug, Deserialize)]
struct JsonLdRecipe {
    #[serde(rename = "recipeIngredient")]
    recipe_ingredient: Option<RecipeIngredients>,
    #[serde(rename = "recipeYield")]
    recipe_yield: Option<RecipeYield>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeIngredients {
    Strings(Vec<String>),
    Objects(Vec<IngredientObject>),
}

#[derive(Debug, Deserialize)]
struct IngredientObject {
    name: String,
    amount: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeYield {
    Number(f64),
    String(String),
    Array(Vec<Value>),
}
