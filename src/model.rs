use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, ScaleError};

/// Identifier of an ingredient, unique within one store and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IngredientId(pub u64);

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unit label attached to a quantity.
///
/// Units are opaque: quantities are never converted between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "ml")]
    Milliliter,
    #[serde(rename = "l")]
    Liter,
    #[serde(rename = "cup")]
    Cup,
    #[serde(rename = "tbsp")]
    Tablespoon,
    #[serde(rename = "tsp")]
    Teaspoon,
    #[serde(rename = "unit")]
    Piece,
    #[serde(rename = "clove")]
    Clove,
    #[serde(rename = "pinch")]
    Pinch,
}

impl Unit {
    pub const ALL: [Unit; 10] = [
        Unit::Gram,
        Unit::Kilogram,
        Unit::Milliliter,
        Unit::Liter,
        Unit::Cup,
        Unit::Tablespoon,
        Unit::Teaspoon,
        Unit::Piece,
        Unit::Clove,
        Unit::Pinch,
    ];

    /// Canonical short label
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Milliliter => "ml",
            Unit::Liter => "l",
            Unit::Cup => "cup",
            Unit::Tablespoon => "tbsp",
            Unit::Teaspoon => "tsp",
            Unit::Piece => "unit",
            Unit::Clove => "clove",
            Unit::Pinch => "pinch",
        }
    }

    /// Human readable description for unit pickers
    pub fn description(&self) -> &'static str {
        match self {
            Unit::Gram => "grams (g)",
            Unit::Kilogram => "kilograms (kg)",
            Unit::Milliliter => "milliliters (ml)",
            Unit::Liter => "liters (l)",
            Unit::Cup => "cup(s)",
            Unit::Tablespoon => "tablespoon(s)",
            Unit::Teaspoon => "teaspoon(s)",
            Unit::Piece => "unit(s)",
            Unit::Clove => "clove(s)",
            Unit::Pinch => "pinch(es)",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Unit {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let unit = match normalized.trim_end_matches('.') {
            "g" | "gr" | "gram" | "grams" | "gramme" | "grammes" | "gramas" => Unit::Gram,
            "kg" | "kilo" | "kilos" | "kilogram" | "kilograms" => Unit::Kilogram,
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Unit::Milliliter
            }
            "l" | "liter" | "liters" | "litre" | "litres" | "litros" => Unit::Liter,
            "cup" | "cups" | "c" | "xícara" | "xicara" => Unit::Cup,
            "tbsp" | "tbs" | "tablespoon" | "tablespoons" | "colher sopa" => Unit::Tablespoon,
            "tsp" | "teaspoon" | "teaspoons" | "colher chá" | "colher cha" => Unit::Teaspoon,
            "unit" | "units" | "unidade" | "piece" | "pieces" | "pc" | "pcs" => Unit::Piece,
            "clove" | "cloves" | "dente" => Unit::Clove,
            "pinch" | "pinches" | "pitada" => Unit::Pinch,
            _ => return Err(FieldError::UnknownUnit(s.to_string())),
        };
        Ok(unit)
    }
}

/// One line of the ingredient list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
}

impl Ingredient {
    /// An ingredient takes part in scaling only once it has a name and a
    /// strictly positive quantity.
    pub fn is_eligible(&self) -> bool {
        !self.name.trim().is_empty() && self.quantity > 0.0
    }

    pub(crate) fn apply(&mut self, field: IngredientField) {
        match field {
            IngredientField::Name(name) => self.name = name,
            IngredientField::Quantity(quantity) => self.quantity = sanitize_quantity(quantity),
            IngredientField::Unit(unit) => self.unit = unit,
        }
    }
}

/// An ingredient record that has not been given an id yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientDraft {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
}

impl IngredientDraft {
    pub fn new(name: impl Into<String>, quantity: f64, unit: Unit) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit,
        }
    }

    pub(crate) fn into_ingredient(self, id: IngredientId) -> Ingredient {
        Ingredient {
            id,
            name: self.name,
            quantity: sanitize_quantity(self.quantity),
            unit: self.unit,
        }
    }
}

/// The closed set of fields that can be edited on an ingredient
#[derive(Debug, Clone, PartialEq)]
pub enum IngredientField {
    Name(String),
    Quantity(f64),
    Unit(Unit),
}

impl IngredientField {
    /// Convert raw form input into a typed field update.
    ///
    /// Quantity text that is empty or only a sign is treated as 0 so that a
    /// half-typed number leaves the row incomplete instead of failing.
    pub fn parse(field: &str, raw: &str) -> Result<Self, FieldError> {
        match field {
            "name" => Ok(IngredientField::Name(raw.to_string())),
            "quantity" => {
                let text = raw.trim();
                if matches!(text, "" | "-" | "+" | "." | "-." | "+.") {
                    return Ok(IngredientField::Quantity(0.0));
                }
                text.replace(',', ".")
                    .parse::<f64>()
                    .map(IngredientField::Quantity)
                    .map_err(|_| FieldError::InvalidQuantity(raw.to_string()))
            }
            "unit" => raw.parse::<Unit>().map(IngredientField::Unit),
            other => Err(FieldError::UnknownField(other.to_string())),
        }
    }
}

/// Portion counts the list is measured for and scaled to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortionContext {
    pub base_portions: f64,
    pub desired_portions: f64,
}

impl Default for PortionContext {
    fn default() -> Self {
        Self {
            base_portions: 4.0,
            desired_portions: 6.0,
        }
    }
}

impl PortionContext {
    pub fn new(base_portions: f64, desired_portions: f64) -> Self {
        Self {
            base_portions,
            desired_portions,
        }
    }

    /// `desired / base`, defined only when both counts are positive
    pub fn multiplier(&self) -> Result<f64, ScaleError> {
        if !(self.base_portions.is_finite() && self.base_portions > 0.0) {
            return Err(ScaleError::InvalidPortionBase(self.base_portions));
        }
        if !(self.desired_portions.is_finite() && self.desired_portions > 0.0) {
            return Err(ScaleError::InvalidDesiredPortions(self.desired_portions));
        }
        Ok(self.desired_portions / self.base_portions)
    }
}

fn sanitize_quantity(quantity: f64) -> f64 {
    if quantity.is_finite() {
        quantity
    } else {
        0.0
    }
}
