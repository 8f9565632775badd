// src/recipe/kitchen/mod.rs

//! Kitchen: drives recipes through their lifecycle hooks
//!
//! The Kitchen validates a recipe against the active profile and hands out
//! one-shot [`Cook`] sessions. Each session exposes the five hooks:
//! - `declare_requirements`
//! - `declare_build_requirements`
//! - `resolve_layout`
//! - `generate_toolchain_files`
//! - `perform_build`
//!
//! Compilation itself is delegated to a [`NativeBuild`] implementation.

mod config;
mod cook;
pub mod native;

pub use config::{CookResult, KitchenConfig};
pub use cook::Cook;
pub use native::{BuildInvocation, BuildOutput, CMakeBuild, NativeBuild};

use crate::error::Result;
use crate::recipe::format::Recipe;
use crate::recipe::parser::validate_recipe;
use crate::recipe::settings::Profile;
use crate::recipe::toolchain::DependencyGraph;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
    native: Arc<dyn NativeBuild>,
}

impl Kitchen {
    /// Create a new Kitchen building with CMake
    pub fn new(config: KitchenConfig) -> Self {
        let native = Arc::new(CMakeBuild::new(config.cmake.clone()));
        Self { config, native }
    }

    /// Create a new Kitchen with a custom native build system
    pub fn with_native(config: KitchenConfig, native: Arc<dyn NativeBuild>) -> Self {
        Self { config, native }
    }

    /// Create a Kitchen with default configuration
    pub fn with_defaults() -> Self {
        Self::new(KitchenConfig::default())
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    /// Validate a recipe against a profile and open a cook session
    ///
    /// Malformed constraints, unknown axes or generators, and profiles missing
    /// a declared axis are all rejected here, before any hook runs.
    pub fn prepare<'a>(&'a self, recipe: &'a Recipe, profile: &'a Profile) -> Result<Cook<'a>> {
        let warnings = validate_recipe(recipe)?;
        for warning in &warnings {
            warn!("{}: {}", recipe.package.name, warning);
        }

        profile.require_axes(&recipe.setting_axes()?)?;

        Ok(Cook::new(self, recipe, profile, warnings))
    }

    /// Run the full hook sequence for a recipe
    ///
    /// Any failure aborts the remaining hooks and is returned unchanged.
    pub fn cook(
        &self,
        recipe: &Recipe,
        profile: &Profile,
        root: &Path,
        graph: &DependencyGraph,
    ) -> Result<CookResult> {
        info!("Cooking {} in {}", recipe.package.name, root.display());

        let mut cook = self.prepare(recipe, profile)?;

        info!("Declaring requirements...");
        cook.declare_requirements()?;
        cook.declare_build_requirements()?;

        info!("Resolving layout...");
        cook.resolve_layout(root)?;

        info!("Generating toolchain files...");
        cook.generate_toolchain_files(graph)?;

        info!("Building...");
        cook.perform_build()?;

        let result = cook.finish()?;
        info!(
            "Cooked {} ({}, package id {:.12})",
            recipe.package.name,
            result.layout.build_type,
            result.package_id
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::recipe::parser::parse_recipe;
    use crate::recipe::phase::Phase;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records every step instead of running CMake
    #[derive(Default)]
    struct RecordingBuild {
        steps: Mutex<Vec<String>>,
        fail_compile: bool,
    }

    impl NativeBuild for RecordingBuild {
        fn configure(&self, _invocation: &BuildInvocation<'_>) -> Result<BuildOutput> {
            self.steps.lock().unwrap().push("configure".to_string());
            Ok(BuildOutput::ok())
        }

        fn compile(&self, invocation: &BuildInvocation<'_>) -> Result<BuildOutput> {
            let step = match invocation.target {
                Some(t) => format!("compile {}", t),
                None => "compile".to_string(),
            };
            self.steps.lock().unwrap().push(step);
            if self.fail_compile {
                return Ok(BuildOutput {
                    success: false,
                    exit_code: Some(2),
                    stdout: String::new(),
                    stderr: "undefined reference to `main'".to_string(),
                });
            }
            Ok(BuildOutput::ok())
        }
    }

    const RECIPE: &str = r#"
[package]
name = "safe"
license = "Apache-2.0"
description = "Header-only safety checks"
topics = ["cpp"]
min_language_standard = "23"

[build]
generators = ["CMakeToolchain", "CMakeDeps"]
aux_target = "copy_compile_commands"

[tool_requires]
cmake = "^3.27.1"
"#;

    const PROFILE: &str = r#"
[settings]
os = "Linux"
arch = "x86_64"
build_type = "Release"
compiler = "gcc"
"compiler.version" = "13"
"#;

    const GRAPH: &str = r#"
[[package]]
name = "cmake"
version = "3.28.1"
kind = "tool"
package_folder = "/opt/tools/cmake"
"#;

    fn kitchen(native: Arc<RecordingBuild>) -> Kitchen {
        Kitchen::with_native(KitchenConfig::default(), native)
    }

    #[test]
    fn test_cook_runs_all_hooks() {
        let dir = TempDir::new().unwrap();
        let native = Arc::new(RecordingBuild::default());
        let kitchen = kitchen(native.clone());
        let recipe = parse_recipe(RECIPE).unwrap();
        let profile = Profile::parse(PROFILE).unwrap();
        let graph = DependencyGraph::parse(GRAPH).unwrap();

        let result = kitchen.cook(&recipe, &profile, dir.path(), &graph).unwrap();

        assert_eq!(result.phases, Phase::ALL.to_vec());
        assert!(result.generated.iter().all(|p| p.exists()));
        assert_eq!(
            *native.steps.lock().unwrap(),
            vec!["configure", "compile copy_compile_commands", "configure", "compile"]
        );
    }

    #[test]
    fn test_prepare_rejects_profile_missing_axis() {
        let kitchen = kitchen(Arc::new(RecordingBuild::default()));
        let recipe = parse_recipe(RECIPE).unwrap();
        let profile = Profile::parse(
            r#"
[settings]
os = "Linux"
compiler = "gcc"
"compiler.version" = "13"
"#,
        )
        .unwrap();

        let err = kitchen.prepare(&recipe, &profile).err().unwrap();
        assert!(matches!(err, Error::MissingSetting(_)));
    }

    #[test]
    fn test_compile_failure_is_surfaced() {
        let dir = TempDir::new().unwrap();
        let native = Arc::new(RecordingBuild {
            fail_compile: true,
            ..Default::default()
        });
        let kitchen = kitchen(native);
        let recipe = parse_recipe(RECIPE).unwrap();
        let profile = Profile::parse(PROFILE).unwrap();
        let graph = DependencyGraph::parse(GRAPH).unwrap();

        let err = kitchen.cook(&recipe, &profile, dir.path(), &graph).unwrap_err();
        match err {
            Error::CompileFailure { phase, message } => {
                assert_eq!(phase, Phase::GenerateToolchain);
                assert!(message.contains("undefined reference"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
