use log::{debug, error};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use recipe_scaler::{format_multiplier, IngredientStore, RecipeImporter, ScalerConfig};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    env_logger::init();

    // Get the URL and optional portion count from command-line arguments
    let args: Vec<String> = env::args().collect();
    let url = args
        .get(1)
        .ok_or("Usage: recipe-scaler <recipe-url> [desired-portions]")?;

    let config = ScalerConfig::load()?;
    debug!("{:#?}", config);

    let desired = match args.get(2) {
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|e| format!("Invalid desired portions '{}': {}", raw, e))?,
        None => config.portions.desired,
    };

    let store = Arc::new(IngredientStore::seeded());
    store.set_base_portions(config.portions.base);
    store.set_desired_portions(desired);

    let importer = RecipeImporter::builder()
        .from_config(&config)?
        .store(store.clone())
        .build()?;

    if let Err(e) = importer.import(url).await {
        error!("Import failed: {}", e);
        eprintln!("{}", e.user_message());
        return Ok(ExitCode::FAILURE);
    }

    let result = match store.snapshot().scale() {
        Ok(result) => result,
        Err(e) => {
            error!("Scaling failed: {}", e);
            eprintln!("{}", e.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };

    println!(
        "{} -> {} portions ({})",
        result.base_portions,
        result.desired_portions,
        format_multiplier(result.multiplier)
    );
    if result.is_empty() {
        println!("Add ingredients with a name and quantity to see the results.");
    }
    for item in result.iter() {
        println!("  {}", item.display_line());
    }

    Ok(ExitCode::SUCCESS)
}
