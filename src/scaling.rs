use serde::Serialize;

use crate::error::ScaleError;
use crate::format::format_quantity;
use crate::model::{Ingredient, IngredientId, PortionContext, Unit};

/// One eligible ingredient with its quantity scaled to the desired portions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledIngredient {
    pub id: IngredientId,
    pub name: String,
    pub unit: Unit,
    pub original_quantity: f64,
    pub adjusted_quantity: f64,
}

impl ScaledIngredient {
    /// e.g. "Flour: 750 g (original: 500 g)"
    pub fn display_line(&self) -> String {
        format!(
            "{}: {} {} (original: {} {})",
            self.name,
            format_quantity(self.adjusted_quantity),
            self.unit,
            format_quantity(self.original_quantity),
            self.unit
        )
    }
}

/// Derived, read-only outcome of a scaling request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledResult {
    pub base_portions: f64,
    pub desired_portions: f64,
    pub multiplier: f64,
    pub items: Vec<ScaledIngredient>,
}

impl ScaledResult {
    /// No eligible ingredients yet. Not a failure.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScaledIngredient> {
        self.items.iter()
    }
}

/// Scale every eligible ingredient by `desired / base`.
///
/// Ingredients without a name or with a non-positive quantity are skipped.
/// Units are carried through untouched.
pub fn scale(
    ingredients: &[Ingredient],
    base_portions: f64,
    desired_portions: f64,
) -> Result<ScaledResult, ScaleError> {
    let multiplier = PortionContext::new(base_portions, desired_portions).multiplier()?;

    let items = ingredients
        .iter()
        .filter(|ingredient| ingredient.is_eligible())
        .map(|ingredient| ScaledIngredient {
            id: ingredient.id,
            name: ingredient.name.clone(),
            unit: ingredient.unit,
            original_quantity: ingredient.quantity,
            adjusted_quantity: ingredient.quantity * multiplier,
        })
        .collect();

    Ok(ScaledResult {
        base_portions,
        desired_portions,
        multiplier,
        items,
    })
}
