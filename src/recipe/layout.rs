// src/recipe/layout.rs

//! Folder layout policies
//!
//! A layout maps a source root and a settings combination to the folders the
//! native build reads from and writes to. Resolution is a pure function of
//! its inputs and never touches the filesystem beyond checking the root.

use crate::error::{Error, Result};
use crate::recipe::settings::{Profile, SettingAxis};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Named folder convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPolicy {
    /// `build/<BuildType>` with generators beneath it
    CMake,
    /// `build-<buildtype>` next to the sources
    Basic,
}

impl LayoutPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutPolicy::CMake => "cmake",
            LayoutPolicy::Basic => "basic",
        }
    }
}

impl FromStr for LayoutPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cmake" => Ok(LayoutPolicy::CMake),
            "basic" => Ok(LayoutPolicy::Basic),
            other => Err(Error::InvalidRecipe(format!("Unknown layout policy '{}'", other))),
        }
    }
}

impl fmt::Display for LayoutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolved folder mapping for one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub policy: &'static str,
    pub source_folder: PathBuf,
    pub build_folder: PathBuf,
    pub generators_folder: PathBuf,
    pub include_dirs: Vec<PathBuf>,
    pub build_type: String,
    /// Build type is chosen at build time rather than configure time
    pub multi_config: bool,
}

impl Layout {
    /// Path of the generated CMake toolchain file
    pub fn toolchain_file(&self) -> PathBuf {
        self.generators_folder.join("larder_toolchain.cmake")
    }
}

/// Whether a CMake generator name selects a multi-config build
///
/// Without an explicit generator, MSVC defaults to Visual Studio.
pub fn is_multi_config(cmake_generator: Option<&str>, profile: &Profile) -> bool {
    match cmake_generator {
        Some(g) => g.contains("Visual Studio") || g == "Xcode" || g.contains("Multi-Config"),
        None => profile.is_msvc(),
    }
}

/// Resolve the folder mapping for a root and settings combination
pub fn resolve_layout(
    policy: LayoutPolicy,
    root: &Path,
    profile: &Profile,
    folder_vars: &[SettingAxis],
    multi_config: bool,
) -> Result<Layout> {
    let metadata = std::fs::metadata(root).map_err(|e| {
        Error::LayoutError(format!("Root {} is inaccessible: {}", root.display(), e))
    })?;
    if !metadata.is_dir() {
        return Err(Error::LayoutError(format!(
            "Root {} is not a directory",
            root.display()
        )));
    }
    let root = std::fs::canonicalize(root).map_err(|e| {
        Error::LayoutError(format!("Failed to resolve root {}: {}", root.display(), e))
    })?;

    let build_type = profile.build_type().to_string();
    let suffix = folder_suffix(profile, folder_vars)?;

    let (build_folder, generators_folder) = match policy {
        LayoutPolicy::CMake => {
            let mut base = root.join("build");
            if let Some(suffix) = &suffix {
                base.push(suffix);
            }
            let build = if multi_config {
                base
            } else {
                base.join(&build_type)
            };
            let generators = build.join("generators");
            (build, generators)
        }
        LayoutPolicy::Basic => {
            let name = match &suffix {
                Some(suffix) => format!("build-{}-{}", suffix, build_type.to_lowercase()),
                None => format!("build-{}", build_type.to_lowercase()),
            };
            let build = root.join(name);
            let generators = build.join("larder");
            (build, generators)
        }
    };

    debug!(
        "Resolved {} layout: build={} generators={}",
        policy,
        build_folder.display(),
        generators_folder.display()
    );

    Ok(Layout {
        policy: policy.as_str(),
        include_dirs: vec![root.join("include")],
        source_folder: root,
        build_folder,
        generators_folder,
        build_type,
        multi_config,
    })
}

/// Lowercased axis values joined by `-`, or `None` when no vars are set
fn folder_suffix(profile: &Profile, folder_vars: &[SettingAxis]) -> Result<Option<String>> {
    if folder_vars.is_empty() {
        return Ok(None);
    }

    let mut parts = Vec::with_capacity(folder_vars.len());
    for axis in folder_vars {
        let value = profile
            .value(*axis)
            .ok_or_else(|| Error::MissingSetting(axis.as_str().to_string()))?;
        let clean: String = value
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        parts.push(clean);
    }

    Ok(Some(parts.join("-")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn profile(build_type: &str) -> Profile {
        Profile::parse(&format!(
            r#"
[settings]
os = "Linux"
arch = "x86_64"
build_type = "{}"
compiler = "gcc"
"compiler.version" = "13"
"#,
            build_type
        ))
        .unwrap()
    }

    #[test]
    fn test_cmake_single_config() {
        let root = TempDir::new().unwrap();
        let layout =
            resolve_layout(LayoutPolicy::CMake, root.path(), &profile("Release"), &[], false)
                .unwrap();

        let base = std::fs::canonicalize(root.path()).unwrap();
        assert_eq!(layout.source_folder, base);
        assert_eq!(layout.build_folder, base.join("build/Release"));
        assert_eq!(layout.generators_folder, base.join("build/Release/generators"));
        assert_eq!(layout.include_dirs, vec![base.join("include")]);
        assert_eq!(
            layout.toolchain_file(),
            base.join("build/Release/generators/larder_toolchain.cmake")
        );
    }

    #[test]
    fn test_cmake_multi_config() {
        let root = TempDir::new().unwrap();
        let layout =
            resolve_layout(LayoutPolicy::CMake, root.path(), &profile("Debug"), &[], true).unwrap();
        let base = std::fs::canonicalize(root.path()).unwrap();
        assert_eq!(layout.build_folder, base.join("build"));
        assert_eq!(layout.generators_folder, base.join("build/generators"));
        assert!(layout.multi_config);
    }

    #[test]
    fn test_basic_layout() {
        let root = TempDir::new().unwrap();
        let layout =
            resolve_layout(LayoutPolicy::Basic, root.path(), &profile("Debug"), &[], false)
                .unwrap();
        let base = std::fs::canonicalize(root.path()).unwrap();
        assert_eq!(layout.build_folder, base.join("build-debug"));
        assert_eq!(layout.generators_folder, base.join("build-debug/larder"));
    }

    #[test]
    fn test_build_folder_vars() {
        let root = TempDir::new().unwrap();
        let vars = [SettingAxis::Compiler, SettingAxis::Arch];
        let layout =
            resolve_layout(LayoutPolicy::CMake, root.path(), &profile("Release"), &vars, false)
                .unwrap();
        let base = std::fs::canonicalize(root.path()).unwrap();
        assert_eq!(layout.build_folder, base.join("build/gcc-13-x86_64/Release"));
    }

    #[test]
    fn test_deterministic() {
        let root = TempDir::new().unwrap();
        let p = profile("Release");
        let a = resolve_layout(LayoutPolicy::CMake, root.path(), &p, &[], false).unwrap();
        let b = resolve_layout(LayoutPolicy::CMake, root.path(), &p, &[], false).unwrap();
        assert_eq!(a, b);
        // Resolution writes nothing
        assert!(!a.build_folder.exists());
    }

    #[test]
    fn test_inaccessible_root() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("does-not-exist");
        let err = resolve_layout(LayoutPolicy::CMake, &missing, &profile("Release"), &[], false)
            .unwrap_err();
        assert!(matches!(err, Error::LayoutError(_)));

        let file = root.path().join("file");
        std::fs::write(&file, "x").unwrap();
        assert!(resolve_layout(LayoutPolicy::CMake, &file, &profile("Release"), &[], false).is_err());
    }

    #[test]
    fn test_multi_config_detection() {
        let p = profile("Release");
        assert!(is_multi_config(Some("Ninja Multi-Config"), &p));
        assert!(is_multi_config(Some("Visual Studio 17 2022"), &p));
        assert!(!is_multi_config(Some("Ninja"), &p));
        assert!(!is_multi_config(None, &p));
    }
}
