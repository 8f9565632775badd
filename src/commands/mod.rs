// src/commands/mod.rs
//! Command handlers for the larder CLI

mod cook;
mod inspect;
mod layout;
mod profile;

pub use cook::{cmd_cook, CookArgs};
pub use inspect::{cmd_inspect, cmd_validate};
pub use layout::cmd_layout;
pub use profile::cmd_detect_profile;

use anyhow::{Context, Result};
use larder::recipe::{parse_recipe_file, Profile, Recipe};
use std::path::{Path, PathBuf};

/// Parse a recipe file, naming it in any error
fn load_recipe(path: &Path) -> Result<Recipe> {
    parse_recipe_file(path).with_context(|| format!("Failed to parse recipe: {}", path.display()))
}

fn load_profile(path: &Path) -> Result<Profile> {
    Profile::load(path).with_context(|| format!("Failed to load profile: {}", path.display()))
}

/// Source root: explicit, or the directory holding the recipe
fn source_root(recipe_path: &Path, root: Option<&str>) -> PathBuf {
    match root {
        Some(r) => PathBuf::from(r),
        None => match recipe_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        },
    }
}
