// src/recipe/mod.rs

//! Recipe system for building C and C++ packages
//!
//! A recipe declares what a package needs and how it is built:
//! - Runtime, tool and test dependencies with version constraints
//! - The settings axes each build varies over
//! - The minimum C++ standard the compiler must provide
//! - Descriptor generators and the folder layout
//!
//! # Culinary Terminology
//!
//! - **Recipe**: The declarative build description
//! - **Kitchen**: Validates recipes and hands out cook sessions
//! - **Cook**: One pass through the lifecycle hooks
//!
//! # Example Recipe
//!
//! ```toml
//! [package]
//! name = "safe"
//! license = "Apache-2.0"
//! min_language_standard = "23"
//!
//! [build]
//! generators = ["CMakeToolchain", "CMakeDeps", "VirtualBuildEnv"]
//! aux_target = "copy_compile_commands"
//!
//! [requires]
//! "tl-function-ref" = "1.0.0"
//!
//! [tool_requires]
//! cmake = "^3.27.1"
//!
//! [test_requires]
//! "boost-ext-ut" = "2.1.0"
//! ```

pub mod constraint;
mod format;
pub mod kitchen;
pub mod layout;
pub mod parser;
pub mod phase;
pub mod settings;
pub mod toolchain;

pub use constraint::{Requirement, RequirementKind, VersionConstraint};
pub use format::{BuildRequirements, BuildSection, LayoutSection, PackageSection, Recipe};
pub use kitchen::{Cook, CookResult, Kitchen, KitchenConfig};
pub use layout::{Layout, LayoutPolicy};
pub use parser::{parse_recipe, parse_recipe_file, validate_recipe};
pub use phase::{Phase, PhaseTracker};
pub use settings::{Compiler, CompilerKind, LanguageStandard, Profile, SettingAxis};
pub use toolchain::{DependencyGraph, GeneratorKind, ResolvedPackage};
