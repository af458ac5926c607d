use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while computing scaled quantities
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ScaleError {
    /// Base portion count is zero, negative or not a number
    #[error("Invalid base portion count: {0}")]
    InvalidPortionBase(f64),

    /// Desired portion count is zero, negative or not a number
    #[error("Invalid desired portion count: {0}")]
    InvalidDesiredPortions(f64),
}

impl ScaleError {
    /// Message suitable for showing to the user
    pub fn user_message(&self) -> &'static str {
        "Cannot compute: invalid portion count"
    }
}

/// Errors that can occur during recipe import operations
#[derive(Error, Debug)]
pub enum ImportError {
    /// Source reference is not a fetchable http(s) URL
    #[error("Invalid recipe source: {0}")]
    InvalidSource(String),

    /// Another import is still running for this store
    #[error("An import is already in progress")]
    Busy,

    /// The import was abandoned before it completed
    #[error("Import was cancelled")]
    Cancelled,

    /// Extraction did not finish within the configured timeout
    #[error("Extraction timed out after {0:?}")]
    Timeout(Duration),

    /// Failed to fetch the recipe page
    #[error("Failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),

    /// The page answered with a non-success status
    #[error("Recipe page returned HTTP {0}")]
    HttpStatus(u16),

    /// The page could not be parsed into a recipe
    #[error("Failed to parse recipe: {0}")]
    ParseError(String),

    /// Extraction succeeded but produced no ingredients
    #[error("No ingredients found in recipe")]
    NoIngredientsFound,

    /// An extracted record is missing a field or carries an unusable value
    #[error("Malformed ingredient at position {index}: {reason}")]
    MalformedIngredient { index: usize, reason: String },

    /// The extracted base portion count is missing or not positive
    #[error("Invalid base portion count in recipe: {0}")]
    InvalidBasePortions(String),

    /// The background import task stopped unexpectedly
    #[error("Import task failed: {0}")]
    TaskFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl ImportError {
    /// True when the source was rejected before any extraction attempt
    pub fn is_validation(&self) -> bool {
        matches!(self, ImportError::InvalidSource(_))
    }

    /// True when extraction was attempted but failed or yielded nothing usable
    pub fn is_extraction(&self) -> bool {
        matches!(
            self,
            ImportError::Timeout(_)
                | ImportError::FetchError(_)
                | ImportError::HttpStatus(_)
                | ImportError::ParseError(_)
                | ImportError::NoIngredientsFound
                | ImportError::MalformedIngredient { .. }
                | ImportError::InvalidBasePortions(_)
                | ImportError::TaskFailed(_)
        )
    }

    /// Message suitable for showing to the user. The current ingredient list
    /// is always left as it was.
    pub fn user_message(&self) -> String {
        match self {
            ImportError::InvalidSource(_) => {
                "Please paste a valid recipe link (it must start with http:// or https://)."
                    .to_string()
            }
            ImportError::Busy => {
                "A recipe is already being imported. Please wait for it to finish.".to_string()
            }
            ImportError::Cancelled => "The import was cancelled.".to_string(),
            ImportError::ConfigError(e) => format!("The importer is misconfigured: {}", e),
            _ => concat!(
                "Could not extract the recipe from this site. ",
                "Try another link or add the ingredients manually."
            )
            .to_string(),
        }
    }
}

/// Errors raised when loosely-typed input is converted into an ingredient field
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("Unknown ingredient field: {0}")]
    UnknownField(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),
}
