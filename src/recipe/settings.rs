// src/recipe/settings.rs

//! Settings axes, compiler capabilities and build profiles
//!
//! A profile supplies the value of every settings axis for one build:
//! operating system, architecture, build type, and compiler identity. The
//! recipe only gates on the C++ standard the selected compiler provides.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use tracing::debug;

/// An axis a recipe's builds vary over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingAxis {
    Compiler,
    BuildType,
    Os,
    Arch,
}

impl SettingAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingAxis::Compiler => "compiler",
            SettingAxis::BuildType => "build_type",
            SettingAxis::Os => "os",
            SettingAxis::Arch => "arch",
        }
    }
}

impl FromStr for SettingAxis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "compiler" => Ok(SettingAxis::Compiler),
            "build_type" => Ok(SettingAxis::BuildType),
            "os" => Ok(SettingAxis::Os),
            "arch" => Ok(SettingAxis::Arch),
            other => Err(Error::InvalidRecipe(format!("Unknown settings axis '{}'", other))),
        }
    }
}

impl fmt::Display for SettingAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A C++ language standard, ordered by age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LanguageStandard {
    Cpp98,
    Cpp11,
    Cpp14,
    Cpp17,
    Cpp20,
    Cpp23,
    Cpp26,
}

impl LanguageStandard {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageStandard::Cpp98 => "98",
            LanguageStandard::Cpp11 => "11",
            LanguageStandard::Cpp14 => "14",
            LanguageStandard::Cpp17 => "17",
            LanguageStandard::Cpp20 => "20",
            LanguageStandard::Cpp23 => "23",
            LanguageStandard::Cpp26 => "26",
        }
    }
}

impl FromStr for LanguageStandard {
    type Err = Error;

    /// Accepts `23`, `gnu23` and `c++23` spellings
    fn from_str(s: &str) -> Result<Self> {
        let number = s
            .trim()
            .trim_start_matches("gnu")
            .trim_start_matches("c++");
        match number {
            "98" | "03" => Ok(LanguageStandard::Cpp98),
            "11" => Ok(LanguageStandard::Cpp11),
            "14" => Ok(LanguageStandard::Cpp14),
            "17" => Ok(LanguageStandard::Cpp17),
            "20" => Ok(LanguageStandard::Cpp20),
            "23" => Ok(LanguageStandard::Cpp23),
            "26" => Ok(LanguageStandard::Cpp26),
            _ => Err(Error::ParseError(format!("Unknown C++ standard '{}'", s))),
        }
    }
}

impl fmt::Display for LanguageStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compiler family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompilerKind {
    Gcc,
    Clang,
    AppleClang,
    Msvc,
}

impl CompilerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerKind::Gcc => "gcc",
            CompilerKind::Clang => "clang",
            CompilerKind::AppleClang => "apple-clang",
            CompilerKind::Msvc => "msvc",
        }
    }
}

impl FromStr for CompilerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gcc" => Ok(CompilerKind::Gcc),
            "clang" => Ok(CompilerKind::Clang),
            "apple-clang" => Ok(CompilerKind::AppleClang),
            "msvc" => Ok(CompilerKind::Msvc),
            other => Err(Error::InvalidProfile(format!("Unknown compiler '{}'", other))),
        }
    }
}

impl fmt::Display for CompilerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A compiler identity with its numeric version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
    pub kind: CompilerKind,
    pub major: u32,
    pub minor: u32,
}

impl Compiler {
    /// Build from profile strings: `("gcc", "13")`, `("clang", "17.0.6")`, `("msvc", "193")`
    pub fn new(kind: &str, version: &str) -> Result<Self> {
        let kind = CompilerKind::from_str(kind)?;
        let mut parts = version.trim().split('.');
        let parse = |part: Option<&str>| -> Result<u32> {
            match part {
                None => Ok(0),
                Some(p) => p.parse::<u32>().map_err(|_| {
                    Error::InvalidProfile(format!("Invalid compiler version '{}'", version))
                }),
            }
        };
        let major = parse(parts.next())?;
        let minor = parse(parts.next())?;

        Ok(Self { kind, major, minor })
    }

    /// Newest C++ standard this compiler version can compile
    pub fn max_standard(&self) -> LanguageStandard {
        use LanguageStandard::*;
        let v = (self.major, self.minor);
        match self.kind {
            CompilerKind::Gcc => match v {
                v if v < (4, 3) => Cpp98,
                v if v < (4, 8) => Cpp11,
                v if v < (5, 0) => Cpp14,
                v if v < (8, 0) => Cpp17,
                v if v < (11, 0) => Cpp20,
                v if v < (14, 0) => Cpp23,
                _ => Cpp26,
            },
            CompilerKind::Clang => match v {
                v if v < (3, 4) => Cpp11,
                v if v < (3, 5) => Cpp14,
                v if v < (6, 0) => Cpp17,
                v if v < (12, 0) => Cpp20,
                v if v < (17, 0) => Cpp23,
                _ => Cpp26,
            },
            CompilerKind::AppleClang => match v {
                v if v < (5, 1) => Cpp11,
                v if v < (6, 1) => Cpp14,
                v if v < (10, 0) => Cpp17,
                v if v < (13, 0) => Cpp20,
                v if v < (16, 0) => Cpp23,
                _ => Cpp26,
            },
            CompilerKind::Msvc => match self.major {
                m if m < 190 => Cpp98,
                m if m < 191 => Cpp14,
                m if m < 193 => Cpp20,
                _ => Cpp23,
            },
        }
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minor > 0 {
            write!(f, "{} {}.{}", self.kind, self.major, self.minor)
        } else {
            write!(f, "{} {}", self.kind, self.major)
        }
    }
}

/// `[settings]` table of a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,

    #[serde(
        default,
        rename = "compiler.version",
        skip_serializing_if = "Option::is_none"
    )]
    pub compiler_version: Option<String>,

    /// Explicit standard; when absent the compiler's newest standard is assumed
    #[serde(
        default,
        rename = "compiler.cppstd",
        skip_serializing_if = "Option::is_none"
    )]
    pub compiler_cppstd: Option<String>,
}

/// `[buildenv]` table: explicit compiler executables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEnv {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cxx: Option<PathBuf>,
}

/// The orchestrator's active build profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub settings: ProfileSettings,

    #[serde(default)]
    pub buildenv: BuildEnv,
}

impl Profile {
    /// Parse a profile from TOML
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid profile: {}", e)))
    }

    /// Load a profile file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read profile {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Serialize back to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::ParseError(format!("Failed to serialize profile: {}", e)))
    }

    /// Value of an axis as it participates in build identity
    ///
    /// The compiler axis folds in version and explicit standard.
    pub fn value(&self, axis: SettingAxis) -> Option<String> {
        let s = &self.settings;
        match axis {
            SettingAxis::Os => s.os.clone(),
            SettingAxis::Arch => s.arch.clone(),
            SettingAxis::BuildType => s.build_type.clone(),
            SettingAxis::Compiler => {
                let name = s.compiler.as_ref()?;
                let mut value = name.clone();
                if let Some(version) = &s.compiler_version {
                    value.push('-');
                    value.push_str(version);
                }
                if let Some(std) = &s.compiler_cppstd {
                    value.push_str("-std");
                    value.push_str(std);
                }
                Some(value)
            }
        }
    }

    /// Ensure every axis has a value
    pub fn require_axes(&self, axes: &[SettingAxis]) -> Result<()> {
        for axis in axes {
            if self.value(*axis).is_none() {
                return Err(Error::MissingSetting(axis.as_str().to_string()));
            }
            if *axis == SettingAxis::Compiler && self.settings.compiler_version.is_none() {
                return Err(Error::MissingSetting("compiler.version".to_string()));
            }
        }
        Ok(())
    }

    /// Build type, defaulting to Release
    pub fn build_type(&self) -> &str {
        self.settings.build_type.as_deref().unwrap_or("Release")
    }

    /// The selected compiler
    pub fn compiler(&self) -> Result<Compiler> {
        let name = self
            .settings
            .compiler
            .as_deref()
            .ok_or_else(|| Error::MissingSetting("compiler".to_string()))?;
        let version = self
            .settings
            .compiler_version
            .as_deref()
            .ok_or_else(|| Error::MissingSetting("compiler.version".to_string()))?;
        Compiler::new(name, version)
    }

    /// Standard the selected compiler will build with
    ///
    /// An explicit `compiler.cppstd` wins but may not exceed the compiler's
    /// capability.
    pub fn effective_standard(&self) -> Result<LanguageStandard> {
        let compiler = self.compiler()?;
        let max = compiler.max_standard();

        match &self.settings.compiler_cppstd {
            Some(std) => {
                let explicit = LanguageStandard::from_str(std)
                    .map_err(|e| Error::InvalidProfile(e.to_string()))?;
                if explicit > max {
                    return Err(Error::InvalidProfile(format!(
                        "compiler.cppstd={} is not supported by {} (newest is C++{})",
                        std, compiler, max
                    )));
                }
                Ok(explicit)
            }
            None => Ok(max),
        }
    }

    /// Whether GNU extensions were requested (`compiler.cppstd=gnu23`)
    pub fn gnu_extensions(&self) -> bool {
        self.settings
            .compiler_cppstd
            .as_deref()
            .is_some_and(|s| s.starts_with("gnu"))
    }

    pub fn is_msvc(&self) -> bool {
        self.settings.compiler.as_deref() == Some("msvc")
    }

    /// Detect a profile from the host C++ compiler on PATH
    pub fn detect() -> Result<Self> {
        let cxx = ["g++", "clang++", "c++"]
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| Error::NotFound("No C++ compiler found in PATH".to_string()))?;

        let output = Command::new(&cxx)
            .arg("--version")
            .output()
            .map_err(|e| Error::IoError(format!("Failed to run {} --version: {}", cxx.display(), e)))?;

        let text = String::from_utf8_lossy(&output.stdout);
        let (kind, version) = parse_compiler_version(&text)?;
        debug!("Detected {} {} at {}", kind, version, cxx.display());

        let cc = match kind {
            CompilerKind::Gcc => which::which("gcc").ok(),
            _ => which::which("clang").ok(),
        };

        Ok(Self {
            settings: ProfileSettings {
                os: Some(host_os().to_string()),
                arch: Some(host_arch().to_string()),
                build_type: Some("Release".to_string()),
                compiler: Some(kind.as_str().to_string()),
                compiler_version: Some(version),
                compiler_cppstd: None,
            },
            buildenv: BuildEnv {
                cc,
                cxx: Some(cxx),
            },
        })
    }
}

/// Identify a compiler from its `--version` banner
///
/// Returns the family and the version in profile form (major only for gcc
/// and clang, `major.minor` for apple-clang).
pub fn parse_compiler_version(banner: &str) -> Result<(CompilerKind, String)> {
    let first = banner
        .lines()
        .next()
        .ok_or_else(|| Error::ParseError("Empty compiler version output".to_string()))?;

    let kind = if first.contains("Apple clang") {
        CompilerKind::AppleClang
    } else if first.contains("clang") {
        CompilerKind::Clang
    } else if first.contains("gcc") || first.contains("g++") || first.contains("GCC") {
        CompilerKind::Gcc
    } else {
        return Err(Error::ParseError(format!("Unrecognized compiler: {}", first)));
    };

    let re = Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?")
        .map_err(|e| Error::ParseError(e.to_string()))?;
    let caps = re
        .captures(first)
        .ok_or_else(|| Error::ParseError(format!("No version in compiler banner: {}", first)))?;

    let version = match kind {
        CompilerKind::AppleClang => format!("{}.{}", &caps[1], &caps[2]),
        _ => caps[1].to_string(),
    };

    Ok((kind, version))
}

fn host_os() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Macos",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        other => other,
    }
}

fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "aarch64" => "armv8",
        "x86" => "x86",
        other => other,
    }
}
