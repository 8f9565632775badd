// src/commands/cook.rs

//! Cook command - build packages from recipes

use super::{load_profile, load_recipe, source_root};
use anyhow::{Context, Result};
use larder::recipe::{DependencyGraph, Kitchen, KitchenConfig};
use std::path::Path;
use tracing::info;

/// Arguments for `larder cook`
pub struct CookArgs<'a> {
    pub recipe_path: &'a str,
    pub profile_path: &'a str,
    /// Source root (None = recipe directory)
    pub root: Option<&'a str>,
    /// Resolved dependency graph (None = no dependencies resolved)
    pub deps_path: Option<&'a str>,
    pub with_tests: bool,
    /// Parallel build jobs (None = auto)
    pub jobs: Option<u32>,
    pub cmake_generator: Option<String>,
    pub keep_log: bool,
}

/// Cook a package from a recipe
pub fn cmd_cook(args: CookArgs<'_>) -> Result<()> {
    let recipe_path = Path::new(args.recipe_path);

    println!("Reading recipe: {}", recipe_path.display());
    let recipe = load_recipe(recipe_path)?;
    let profile = load_profile(Path::new(args.profile_path))?;

    let graph = match args.deps_path {
        Some(path) => DependencyGraph::load(Path::new(path))
            .with_context(|| format!("Failed to load dependency graph: {}", path))?,
        None => DependencyGraph::new(),
    };

    // Command-line flags override the environment
    let mut config = KitchenConfig::from_env();
    if let Some(j) = args.jobs {
        config.jobs = j;
    }
    if args.cmake_generator.is_some() {
        config.cmake_generator = args.cmake_generator;
    }
    config.with_tests |= args.with_tests;
    config.keep_log |= args.keep_log;

    let root = source_root(recipe_path, args.root);
    println!(
        "Cooking {} with {} parallel jobs{}...",
        recipe.package.name,
        config.jobs,
        if config.with_tests { " (with tests)" } else { "" }
    );

    let kitchen = Kitchen::new(config);
    let result = kitchen
        .cook(&recipe, &profile, &root, &graph)
        .with_context(|| format!("Failed to cook {}", recipe.package.name))?;

    println!("\n[COMPLETE] Cooked: {}", recipe.package.name);
    println!("  Package id: {}", result.package_id);
    println!("  Build folder: {}", result.layout.build_folder.display());
    if !result.generated.is_empty() {
        println!("  Generated:");
        for file in &result.generated {
            println!("    - {}", file.display());
        }
    }
    if let Some(log) = &result.log_path {
        println!("  Build log: {}", log.display());
    }

    if !result.warnings.is_empty() {
        println!("\nBuild warnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    info!(
        "Successfully cooked {} in {}",
        recipe.package.name,
        result.layout.build_folder.display()
    );

    Ok(())
}
