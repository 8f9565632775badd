// src/recipe/parser.rs

//! Recipe file parsing and validation

use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use crate::recipe::toolchain::GeneratorKind;
use semver::Version;
use std::collections::BTreeMap;
use std::path::Path;

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read recipe file: {}", e)))?;

    parse_recipe(&content)
}

/// Validate a recipe for completeness and correctness
///
/// Hard errors reject the recipe before any build step runs; soft issues
/// are returned as warnings.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();
    let package = &recipe.package;

    if package.name.trim().is_empty() {
        return Err(Error::InvalidRecipe("Recipe package name cannot be empty".to_string()));
    }
    if package.license.trim().is_empty() {
        return Err(Error::InvalidRecipe("Recipe license cannot be empty".to_string()));
    }
    if package.min_language_standard.trim().is_empty() {
        return Err(Error::InvalidRecipe(
            "Recipe min_language_standard cannot be empty".to_string(),
        ));
    }
    recipe.min_standard()?;

    let axes = recipe.setting_axes()?;
    let mut unique_axes = axes.clone();
    unique_axes.sort();
    unique_axes.dedup();
    if unique_axes.len() != axes.len() {
        warnings.push("Duplicate entries in build.settings".to_string());
    }

    for var in recipe.build_folder_vars()? {
        if !axes.contains(&var) {
            return Err(Error::InvalidRecipe(format!(
                "build_folder_vars entry '{}' is not a declared setting",
                var
            )));
        }
    }
    recipe.layout_policy()?;

    let generators = recipe.generator_kinds()?;
    if generators.is_empty() {
        warnings.push("No generators declared".to_string());
    }
    if recipe.build.aux_target.is_some() && !generators.contains(&GeneratorKind::CMakeToolchain) {
        warnings.push("aux_target is set but CMakeToolchain is not generated".to_string());
    }

    // Parses every constraint; a malformed one is a ConstraintError
    let all = recipe.all_requirements()?;

    let mut seen: BTreeMap<(&str, String), &str> = BTreeMap::new();
    for req in &all {
        let key = (req.name.as_str(), req.constraint.canonical());
        if let Some(previous) = seen.insert(key, req.kind.as_str()) {
            return Err(Error::InvalidRecipe(format!(
                "{} is declared as both a {} and a {} requirement",
                req.reference(),
                previous,
                req.kind
            )));
        }
    }

    if let Some(constraint) = recipe.kitchen_constraint()? {
        let ours = Version::parse(env!("CARGO_PKG_VERSION"))
            .map_err(|e| Error::ParseError(e.to_string()))?;
        if !constraint.matches(&ours) {
            return Err(Error::InvalidRecipe(format!(
                "Recipe requires larder {}, this is {}",
                constraint, ours
            )));
        }
    }

    if package.description.trim().is_empty() {
        warnings.push("Missing package description".to_string());
    }
    if package.topics.is_empty() {
        warnings.push("No topics declared".to_string());
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
[package]
name = "safe"
license = "Apache-2.0"
description = "Peripheral abstractions"
topics = ["toolchain"]
min_language_standard = "23"

[build]
generators = ["CMakeToolchain", "CMakeDeps"]

[requires]
"tl-function-ref" = "1.0.0"

[tool_requires]
cmake = "[^3.27.1]"
"#;

    #[test]
    fn test_parse_valid_recipe() {
        let recipe = parse_recipe(VALID).unwrap();
        assert_eq!(recipe.package.name, "safe");
        assert!(validate_recipe(&recipe).unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_recipe() {
        assert!(parse_recipe("this is not valid toml at all {}").is_err());

        // license is mandatory
        let missing = "[package]\nname = \"safe\"\nmin_language_standard = \"23\"\n";
        assert!(matches!(parse_recipe(missing), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_validate_empty_fields() {
        for (field, value) in [("name", ""), ("license", " "), ("min_language_standard", "")] {
            let mut recipe = parse_recipe(VALID).unwrap();
            match field {
                "name" => recipe.package.name = value.to_string(),
                "license" => recipe.package.license = value.to_string(),
                _ => recipe.package.min_language_standard = value.to_string(),
            }
            assert!(
                matches!(validate_recipe(&recipe), Err(Error::InvalidRecipe(_))),
                "empty {} should be rejected",
                field
            );
        }
    }

    #[test]
    fn test_validate_malformed_constraint() {
        let mut recipe = parse_recipe(VALID).unwrap();
        recipe
            .tool_requires
            .insert("ninja".to_string(), "^^1".to_string());
        assert!(matches!(
            validate_recipe(&recipe),
            Err(Error::ConstraintError { .. })
        ));
    }

    #[test]
    fn test_validate_duplicate_category() {
        let mut recipe = parse_recipe(VALID).unwrap();
        recipe
            .test_requires
            .insert("tl-function-ref".to_string(), "1.0.0".to_string());
        let err = validate_recipe(&recipe).unwrap_err();
        assert!(err.to_string().contains("tl-function-ref/1.0.0"));

        // Different spellings of the same pin are the same declaration
        let mut recipe = parse_recipe(VALID).unwrap();
        recipe
            .requires
            .insert("tl-function-ref".to_string(), "1.0".to_string());
        recipe
            .test_requires
            .insert("tl-function-ref".to_string(), "1.0.0".to_string());
        assert!(matches!(validate_recipe(&recipe), Err(Error::InvalidRecipe(_))));

        let mut recipe = parse_recipe(VALID).unwrap();
        recipe
            .test_requires
            .insert("cmake".to_string(), "^3.27.1".to_string());
        assert!(matches!(validate_recipe(&recipe), Err(Error::InvalidRecipe(_))));

        // Same name at a different version is a distinct declaration
        let mut recipe = parse_recipe(VALID).unwrap();
        recipe
            .test_requires
            .insert("tl-function-ref".to_string(), "1.1.0".to_string());
        assert!(validate_recipe(&recipe).is_ok());
    }

    #[test]
    fn test_validate_unknown_generator() {
        let mut recipe = parse_recipe(VALID).unwrap();
        recipe.build.generators.push("MSBuildDeps".to_string());
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_build_folder_vars() {
        let mut recipe = parse_recipe(VALID).unwrap();
        recipe.build.settings = vec!["compiler".to_string(), "build_type".to_string()];
        recipe.layout.build_folder_vars = vec!["arch".to_string()];
        assert!(matches!(validate_recipe(&recipe), Err(Error::InvalidRecipe(_))));
    }

    #[test]
    fn test_validate_kitchen_version() {
        let mut recipe = parse_recipe(VALID).unwrap();
        recipe.package.required_kitchen_version = Some(">=0.0.1".to_string());
        assert!(validate_recipe(&recipe).is_ok());

        recipe.package.required_kitchen_version = Some(">=99.0".to_string());
        assert!(matches!(validate_recipe(&recipe), Err(Error::InvalidRecipe(_))));
    }

    #[test]
    fn test_validate_warnings() {
        let content = r#"
[package]
name = "safe"
license = "Apache-2.0"
min_language_standard = "23"

[build]
aux_target = "copy_compile_commands"
"#;
        let recipe = parse_recipe(content).unwrap();
        let warnings = validate_recipe(&recipe).unwrap();
        assert!(warnings.iter().any(|w| w.contains("description")));
        assert!(warnings.iter().any(|w| w.contains("topics")));
        assert!(warnings.iter().any(|w| w.contains("generators")));
        assert!(warnings.iter().any(|w| w.contains("aux_target")));
    }
}
