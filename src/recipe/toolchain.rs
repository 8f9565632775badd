// src/recipe/toolchain.rs

//! Toolchain and dependency descriptor generators
//!
//! Generators translate the recipe, the active profile and the resolved
//! dependency graph into files the native build reads at configure time.
//! They run in declared order; the first failure stops the rest.

use crate::error::{Error, Result};
use crate::recipe::constraint::{Requirement, RequirementKind};
use crate::recipe::format::Recipe;
use crate::recipe::layout::Layout;
use crate::recipe::settings::{LanguageStandard, Profile};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// A known descriptor generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    /// CMake toolchain file and presets
    CMakeToolchain,
    /// `find_package` config files for each linked dependency
    CMakeDeps,
    /// Shell environment exposing build tools
    VirtualBuildEnv,
}

impl GeneratorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorKind::CMakeToolchain => "CMakeToolchain",
            GeneratorKind::CMakeDeps => "CMakeDeps",
            GeneratorKind::VirtualBuildEnv => "VirtualBuildEnv",
        }
    }
}

impl FromStr for GeneratorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CMakeToolchain" => Ok(GeneratorKind::CMakeToolchain),
            "CMakeDeps" => Ok(GeneratorKind::CMakeDeps),
            "VirtualBuildEnv" => Ok(GeneratorKind::VirtualBuildEnv),
            other => Err(Error::InvalidRecipe(format!("Unknown generator '{}'", other))),
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One package of the externally resolved dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPackage {
    pub name: String,
    /// Exact resolved version
    pub version: String,
    pub kind: RequirementKind,
    /// Installed package root
    pub package_folder: PathBuf,
    /// Relative to `package_folder`
    #[serde(default = "default_include_dirs")]
    pub include_dirs: Vec<PathBuf>,
    #[serde(default = "default_lib_dirs")]
    pub lib_dirs: Vec<PathBuf>,
    #[serde(default = "default_bin_dirs")]
    pub bin_dirs: Vec<PathBuf>,
    /// Library names to link
    #[serde(default)]
    pub libs: Vec<String>,
}

fn default_include_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("include")]
}

fn default_lib_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("lib")]
}

fn default_bin_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("bin")]
}

impl ResolvedPackage {
    fn absolute(&self, dirs: &[PathBuf]) -> Vec<PathBuf> {
        dirs.iter().map(|d| self.package_folder.join(d)).collect()
    }
}

/// Dependency graph handed over by the external resolver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    #[serde(default, rename = "package")]
    pub packages: Vec<ResolvedPackage>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a graph from TOML (`[[package]]` entries)
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::ParseError(format!("Invalid dependency graph: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read dependency graph {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn find(&self, name: &str, kind: RequirementKind) -> Option<&ResolvedPackage> {
        self.packages
            .iter()
            .find(|p| p.name == name && p.kind == kind)
    }

    /// Match every requirement to a resolved package satisfying its constraint
    pub fn satisfy<'g, 'r>(
        &'g self,
        requirements: impl IntoIterator<Item = &'r Requirement>,
    ) -> Result<Vec<&'g ResolvedPackage>> {
        let mut matched = Vec::new();

        for req in requirements {
            let fail = |reason: String| Error::ConstraintError {
                package: req.name.clone(),
                constraint: req.constraint.to_string(),
                reason,
            };

            let package = self
                .find(&req.name, req.kind)
                .ok_or_else(|| fail(format!("no {} package in the resolved graph", req.kind)))?;

            let version = Version::parse(&package.version)
                .map_err(|e| fail(format!("resolved version '{}' is invalid: {}", package.version, e)))?;

            if !req.constraint.matches(&version) {
                return Err(fail(format!(
                    "resolved version {} does not satisfy the constraint",
                    version
                )));
            }

            matched.push(package);
        }

        Ok(matched)
    }
}

/// Everything a generator may read
pub struct GenerateContext<'a> {
    pub recipe: &'a Recipe,
    pub profile: &'a Profile,
    pub layout: &'a Layout,
    /// Standard the build will be configured with
    pub standard: LanguageStandard,
    /// Linked and test packages
    pub host: Vec<&'a ResolvedPackage>,
    /// Build tools
    pub tools: Vec<&'a ResolvedPackage>,
    pub cmake_generator: Option<&'a str>,
}

/// Run one generator, returning the files it wrote
pub fn run_generator(kind: GeneratorKind, ctx: &GenerateContext<'_>) -> Result<Vec<PathBuf>> {
    info!("Running generator {}", kind);
    let files = match kind {
        GeneratorKind::CMakeToolchain => cmake_toolchain(ctx)?,
        GeneratorKind::CMakeDeps => cmake_deps(ctx)?,
        GeneratorKind::VirtualBuildEnv => virtual_build_env(ctx)?,
    };
    debug!("{} wrote {} file(s)", kind, files.len());
    Ok(files)
}

fn cmake_toolchain(ctx: &GenerateContext<'_>) -> Result<Vec<PathBuf>> {
    let kind = GeneratorKind::CMakeToolchain;
    let layout = ctx.layout;
    let generators = cmake_path(&layout.generators_folder);

    let mut out = String::new();
    out.push_str(&format!(
        "# Generated by larder for {} ({})\n\n",
        ctx.recipe.package.name, layout.build_type
    ));

    if !layout.multi_config {
        out.push_str(&format!(
            "set(CMAKE_BUILD_TYPE \"{}\" CACHE STRING \"Build type\" FORCE)\n",
            layout.build_type
        ));
    }

    out.push_str(&format!("set(CMAKE_CXX_STANDARD {})\n", ctx.standard));
    out.push_str("set(CMAKE_CXX_STANDARD_REQUIRED ON)\n");
    let extensions = if ctx.profile.gnu_extensions() { "ON" } else { "OFF" };
    out.push_str(&format!("set(CMAKE_CXX_EXTENSIONS {})\n", extensions));
    out.push_str("set(CMAKE_EXPORT_COMPILE_COMMANDS ON)\n\n");

    if let Some(cc) = &ctx.profile.buildenv.cc {
        out.push_str(&format!("set(CMAKE_C_COMPILER \"{}\")\n", cmake_path(cc)));
    }
    if let Some(cxx) = &ctx.profile.buildenv.cxx {
        out.push_str(&format!("set(CMAKE_CXX_COMPILER \"{}\")\n", cmake_path(cxx)));
    }

    out.push_str(&format!("list(PREPEND CMAKE_PREFIX_PATH \"{}\")\n", generators));
    out.push_str(&format!("list(PREPEND CMAKE_MODULE_PATH \"{}\")\n", generators));

    let tool_bins: Vec<String> = ctx
        .tools
        .iter()
        .flat_map(|t| t.absolute(&t.bin_dirs))
        .map(|p| cmake_path(&p))
        .collect();
    if !tool_bins.is_empty() {
        out.push_str(&format!(
            "list(PREPEND CMAKE_PROGRAM_PATH \"{}\")\n",
            tool_bins.join(";")
        ));
    }

    let toolchain = layout.toolchain_file();
    write_file(kind, &toolchain, &out)?;

    let preset_name = format!("larder-{}", layout.build_type.to_lowercase());
    let mut configure = serde_json::json!({
        "name": preset_name,
        "displayName": format!("{} ({})", ctx.recipe.package.name, layout.build_type),
        "binaryDir": cmake_path(&layout.build_folder),
        "toolchainFile": cmake_path(&toolchain),
        "cacheVariables": {
            "CMAKE_BUILD_TYPE": layout.build_type,
        },
    });
    if let Some(generator) = ctx.cmake_generator {
        configure["generator"] = serde_json::Value::String(generator.to_string());
    }

    let mut build = serde_json::json!({
        "name": preset_name,
        "configurePreset": preset_name,
    });
    if layout.multi_config {
        build["configuration"] = serde_json::Value::String(layout.build_type.clone());
    }

    let presets = serde_json::json!({
        "version": 3,
        "configurePresets": [configure],
        "buildPresets": [build],
    });
    let text = serde_json::to_string_pretty(&presets).map_err(|e| Error::GeneratorFailure {
        generator: kind.to_string(),
        reason: e.to_string(),
    })?;
    let presets_path = layout.generators_folder.join("CMakePresets.json");
    write_file(kind, &presets_path, &text)?;

    Ok(vec![toolchain, presets_path])
}

fn cmake_deps(ctx: &GenerateContext<'_>) -> Result<Vec<PathBuf>> {
    let kind = GeneratorKind::CMakeDeps;
    let mut written = Vec::new();

    for package in &ctx.host {
        let name = &package.name;
        let target = format!("{}::{}", name, name);
        let join = |dirs: Vec<PathBuf>| -> String {
            dirs.iter().map(|d| cmake_path(d)).collect::<Vec<_>>().join(";")
        };

        let mut config = format!(
            "# Generated by larder: {} {}\n\n\
             if(TARGET {})\n  return()\nendif()\n\n\
             add_library({} INTERFACE IMPORTED)\n\
             set_target_properties({} PROPERTIES\n  \
             INTERFACE_INCLUDE_DIRECTORIES \"{}\"\n",
            name,
            package.version,
            target,
            target,
            target,
            join(package.absolute(&package.include_dirs)),
        );
        if !package.libs.is_empty() {
            config.push_str(&format!(
                "  INTERFACE_LINK_DIRECTORIES \"{}\"\n  INTERFACE_LINK_LIBRARIES \"{}\"\n",
                join(package.absolute(&package.lib_dirs)),
                package.libs.join(";")
            ));
        }
        config.push_str(")\n\n");
        config.push_str(&format!("set({}_FOUND TRUE)\n", name));
        config.push_str(&format!("set({}_VERSION \"{}\")\n", name, package.version));

        let config_path = ctx.layout.generators_folder.join(format!("{}-config.cmake", name));
        write_file(kind, &config_path, &config)?;
        written.push(config_path);

        let version = format!(
            "set(PACKAGE_VERSION \"{v}\")\n\n\
             if(PACKAGE_FIND_VERSION VERSION_GREATER PACKAGE_VERSION)\n  \
             set(PACKAGE_VERSION_COMPATIBLE FALSE)\n\
             else()\n  \
             set(PACKAGE_VERSION_COMPATIBLE TRUE)\n  \
             if(PACKAGE_FIND_VERSION STREQUAL PACKAGE_VERSION)\n    \
             set(PACKAGE_VERSION_EXACT TRUE)\n  \
             endif()\n\
             endif()\n",
            v = package.version
        );
        let version_path = ctx
            .layout
            .generators_folder
            .join(format!("{}-config-version.cmake", name));
        write_file(kind, &version_path, &version)?;
        written.push(version_path);
    }

    Ok(written)
}

fn virtual_build_env(ctx: &GenerateContext<'_>) -> Result<Vec<PathBuf>> {
    let kind = GeneratorKind::VirtualBuildEnv;

    let mut script = format!(
        "#!/bin/sh\n# Generated by larder: build environment for {}\n",
        ctx.recipe.package.name
    );

    let bins: Vec<String> = ctx
        .tools
        .iter()
        .flat_map(|t| t.absolute(&t.bin_dirs))
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    if !bins.is_empty() {
        script.push_str(&format!("export PATH=\"{}:$PATH\"\n", bins.join(":")));
    }

    let path = ctx.layout.generators_folder.join("larder_buildenv.sh");
    write_file(kind, &path, &script)?;
    Ok(vec![path])
}

fn write_file(kind: GeneratorKind, path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| Error::GeneratorFailure {
        generator: kind.to_string(),
        reason: format!("failed to write {}: {}", path.display(), e),
    })
}

/// CMake wants forward slashes on every platform
fn cmake_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
