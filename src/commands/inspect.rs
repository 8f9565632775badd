// src/commands/inspect.rs

//! Inspect and validate commands

use super::load_recipe;
use anyhow::{Context, Result};
use larder::recipe::validate_recipe;
use std::path::Path;

/// Print recipe metadata and its declared requirements
pub fn cmd_inspect(recipe_path: &str, json: bool) -> Result<()> {
    let recipe = load_recipe(Path::new(recipe_path))?;
    let requirements = recipe.all_requirements()?;

    if json {
        let value = serde_json::json!({
            "package": recipe.package,
            "build": recipe.build,
            "layout": recipe.layout,
            "requirements": requirements,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let package = &recipe.package;
    println!("Package: {}", package.name);
    println!("License: {}", package.license);
    if !package.description.is_empty() {
        println!("Description: {}", package.description);
    }
    if !package.topics.is_empty() {
        println!("Topics: {}", package.topics.join(", "));
    }
    println!("Minimum standard: C++{}", recipe.min_standard()?);
    println!("Settings: {}", recipe.build.settings.join(", "));
    println!("Generators: {}", recipe.build.generators.join(", "));
    println!("Layout: {}", recipe.layout_policy()?);
    if let Some(target) = &recipe.build.aux_target {
        println!("Auxiliary target: {}", target);
    }

    if requirements.is_empty() {
        println!("\nNo requirements");
    } else {
        println!("\nRequirements:");
        for req in &requirements {
            println!("  [{}] {}", req.kind, req.reference());
        }
    }

    Ok(())
}

/// Validate a recipe, printing every warning
pub fn cmd_validate(recipe_path: &str) -> Result<()> {
    let recipe = load_recipe(Path::new(recipe_path))?;
    let warnings = validate_recipe(&recipe).with_context(|| "Recipe validation failed")?;

    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    if warnings.is_empty() {
        println!("[OK] {}: no issues found", recipe.package.name);
    } else {
        println!("[OK] {}: {} warning(s)", recipe.package.name, warnings.len());
    }

    Ok(())
}
