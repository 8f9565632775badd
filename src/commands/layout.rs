// src/commands/layout.rs

//! Layout command - show where a recipe would build

use super::{load_profile, load_recipe, source_root};
use anyhow::{Context, Result};
use larder::recipe::layout::{is_multi_config, resolve_layout};
use std::path::Path;

pub fn cmd_layout(
    recipe_path: &str,
    profile_path: &str,
    root: Option<&str>,
    cmake_generator: Option<String>,
) -> Result<()> {
    let recipe_path = Path::new(recipe_path);
    let recipe = load_recipe(recipe_path)?;
    let profile = load_profile(Path::new(profile_path))?;
    let root = source_root(recipe_path, root);

    let multi_config = is_multi_config(cmake_generator.as_deref(), &profile);
    let layout = resolve_layout(
        recipe.layout_policy()?,
        &root,
        &profile,
        &recipe.build_folder_vars()?,
        multi_config,
    )
    .with_context(|| format!("Failed to resolve layout for {}", recipe.package.name))?;

    println!("Policy:      {}", layout.policy);
    println!("Source:      {}", layout.source_folder.display());
    println!("Build:       {}", layout.build_folder.display());
    println!("Generators:  {}", layout.generators_folder.display());
    for dir in &layout.include_dirs {
        println!("Include:     {}", dir.display());
    }
    println!(
        "Build type:  {}{}",
        layout.build_type,
        if layout.multi_config { " (multi-config)" } else { "" }
    );

    Ok(())
}
