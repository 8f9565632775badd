// src/recipe/format.rs

//! Recipe file format definitions
//!
//! Recipes are TOML files describing what a package needs and how it is
//! built. Dependency tables map a package name to a version constraint.

use crate::error::{Error, Result};
use crate::recipe::constraint::{Requirement, RequirementKind, VersionConstraint};
use crate::recipe::layout::LayoutPolicy;
use crate::recipe::settings::{LanguageStandard, Profile, SettingAxis};
use crate::recipe::toolchain::GeneratorKind;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A complete recipe for building a package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Package metadata
    pub package: PackageSection,

    /// Settings axes, generators and build options
    #[serde(default)]
    pub build: BuildSection,

    /// Folder layout convention
    #[serde(default)]
    pub layout: LayoutSection,

    /// Dependencies linked into the artifact
    ///
    /// Format: `"tl-function-ref" = "1.0.0"`
    #[serde(default)]
    pub requires: BTreeMap<String, String>,

    /// Tools needed only to perform the build
    ///
    /// Format: `cmake = "^3.27.1"`
    #[serde(default)]
    pub tool_requires: BTreeMap<String, String>,

    /// Dependencies needed only for the package's own tests
    #[serde(default)]
    pub test_requires: BTreeMap<String, String>,
}

/// Package metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,

    /// License identifier (SPDX)
    pub license: String,

    /// Full description
    #[serde(default)]
    pub description: String,

    /// Classification tags
    #[serde(default)]
    pub topics: Vec<String>,

    /// Minimum C++ standard the selected compiler must provide
    pub min_language_standard: String,

    /// Constraint on the kitchen itself (e.g. `">=0.1.0"`)
    #[serde(default)]
    pub required_kitchen_version: Option<String>,
}

/// Build section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    /// Axes each distinct build varies over
    #[serde(default = "default_settings")]
    pub settings: Vec<String>,

    /// Descriptor generators, run in order before configuring
    #[serde(default)]
    pub generators: Vec<String>,

    /// Native build target triggered after generators run
    ///
    /// Example: `copy_compile_commands`
    #[serde(default)]
    pub aux_target: Option<String>,

    /// Report the compiler setting in the build log
    #[serde(default)]
    pub report_compiler: bool,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            settings: default_settings(),
            generators: Vec::new(),
            aux_target: None,
            report_compiler: false,
        }
    }
}

fn default_settings() -> Vec<String> {
    ["compiler", "build_type", "os", "arch"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Layout section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSection {
    /// Layout policy name (`cmake` or `basic`)
    #[serde(default = "default_policy")]
    pub policy: String,

    /// Settings axes folded into the build folder name
    #[serde(default)]
    pub build_folder_vars: Vec<String>,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            build_folder_vars: Vec::new(),
        }
    }
}

fn default_policy() -> String {
    "cmake".to_string()
}

/// Tool and test requirements as declared by one recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildRequirements {
    pub tool: Vec<Requirement>,
    pub test: Vec<Requirement>,
    /// Whether test requirements participate in this build
    pub tests_active: bool,
}

impl BuildRequirements {
    /// Requirements that participate in this build
    pub fn active(&self) -> impl Iterator<Item = &Requirement> {
        let test: &[Requirement] = if self.tests_active { &self.test } else { &[] };
        self.tool.iter().chain(test.iter())
    }
}

impl Recipe {
    /// Runtime and link-time requirements
    pub fn requirements(&self) -> Result<Vec<Requirement>> {
        to_requirements(&self.requires, RequirementKind::Host)
    }

    /// Tool requirements, plus test requirements when tests are requested
    pub fn build_requirements(&self, with_tests: bool) -> Result<BuildRequirements> {
        Ok(BuildRequirements {
            tool: to_requirements(&self.tool_requires, RequirementKind::Tool)?,
            test: to_requirements(&self.test_requires, RequirementKind::Test)?,
            tests_active: with_tests,
        })
    }

    /// Every declared requirement across the three categories
    pub fn all_requirements(&self) -> Result<Vec<Requirement>> {
        let mut all = self.requirements()?;
        let build = self.build_requirements(true)?;
        all.extend(build.tool);
        all.extend(build.test);
        Ok(all)
    }

    pub fn min_standard(&self) -> Result<LanguageStandard> {
        LanguageStandard::from_str(&self.package.min_language_standard).map_err(|_| {
            Error::InvalidRecipe(format!(
                "Unknown min_language_standard '{}'",
                self.package.min_language_standard
            ))
        })
    }

    /// Declared settings axes, in declaration order
    pub fn setting_axes(&self) -> Result<Vec<SettingAxis>> {
        self.build
            .settings
            .iter()
            .map(|s| SettingAxis::from_str(s))
            .collect()
    }

    /// Declared generators, in invocation order
    pub fn generator_kinds(&self) -> Result<Vec<GeneratorKind>> {
        self.build
            .generators
            .iter()
            .map(|g| GeneratorKind::from_str(g))
            .collect()
    }

    pub fn layout_policy(&self) -> Result<LayoutPolicy> {
        LayoutPolicy::from_str(&self.layout.policy)
    }

    /// Axes folded into the build folder name
    pub fn build_folder_vars(&self) -> Result<Vec<SettingAxis>> {
        self.layout
            .build_folder_vars
            .iter()
            .map(|s| SettingAxis::from_str(s))
            .collect()
    }

    /// Constraint on the kitchen version, if any
    pub fn kitchen_constraint(&self) -> Result<Option<VersionConstraint>> {
        self.package
            .required_kitchen_version
            .as_deref()
            .map(|c| VersionConstraint::parse("larder", c))
            .transpose()
    }

    /// Identity of one build of this recipe under a profile
    ///
    /// Hashes name, license and minimum standard, the value of every declared
    /// axis in sorted axis order, and the runtime requirements. Tool and test
    /// requirements do not affect the id.
    pub fn package_id(&self, profile: &Profile) -> Result<String> {
        let mut axes = self.setting_axes()?;
        axes.sort();
        axes.dedup();

        let mut data = format!(
            "name:{}\nlicense:{}\ncppstd:{}\n",
            self.package.name, self.package.license, self.package.min_language_standard
        );
        for axis in axes {
            let value = profile
                .value(axis)
                .ok_or_else(|| Error::MissingSetting(axis.as_str().to_string()))?;
            data.push_str(&format!("{}:{}\n", axis, value));
        }
        for req in self.requirements()? {
            data.push_str(&format!("requires:{}\n", req.reference()));
        }

        Ok(hex::encode(Sha256::digest(data.as_bytes())))
    }
}

fn to_requirements(
    table: &BTreeMap<String, String>,
    kind: RequirementKind,
) -> Result<Vec<Requirement>> {
    table
        .iter()
        .map(|(name, constraint)| Requirement::new(name, constraint, kind))
        .collect()
}
