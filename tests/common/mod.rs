// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use larder::recipe::kitchen::{BuildInvocation, BuildOutput, NativeBuild};
use larder::recipe::{parse_recipe, DependencyGraph, Profile, Recipe};
use larder::Result;
use std::path::PathBuf;
use std::sync::Mutex;

/// Recipe with every dependency category populated
pub const FULL_RECIPE: &str = r#"
[package]
name = "safe"
license = "Apache-2.0"
description = "Safety-critical building blocks for embedded C++"
topics = ["safety", "embedded", "libhal"]
min_language_standard = "23"

[build]
settings = ["compiler", "build_type", "os", "arch"]
generators = ["CMakeToolchain", "CMakeDeps", "VirtualBuildEnv"]
aux_target = "copy_compile_commands"

[requires]
"tl-function-ref" = "1.0.0"

[tool_requires]
cmake = "^3.27.1"
"libhal-cmake-util" = "^4.0.5"

[test_requires]
"boost-ext-ut" = "2.1.0"
"#;

/// Recipe with no runtime requirements
pub const EMPTY_REQUIREMENTS_RECIPE: &str = r#"
[package]
name = "safe"
license = "Apache-2.0"
description = "Safety-critical building blocks for embedded C++"
topics = ["safety"]
min_language_standard = "23"

[build]
generators = ["CMakeToolchain", "CMakeDeps", "VirtualBuildEnv"]
report_compiler = true

[tool_requires]
cmake = "^3.27.1"
"libhal-cmake-util" = "^4.0.5"

[test_requires]
"boost-ext-ut" = "2.1.0"
"#;

/// gcc 13, which supports C++23
pub const GCC13_PROFILE: &str = r#"
[settings]
os = "Linux"
arch = "x86_64"
build_type = "Release"
compiler = "gcc"
"compiler.version" = "13"

[buildenv]
cc = "/usr/bin/gcc-13"
cxx = "/usr/bin/g++-13"
"#;

/// gcc 10, which stops at C++20
pub const GCC10_PROFILE: &str = r#"
[settings]
os = "Linux"
arch = "x86_64"
build_type = "Release"
compiler = "gcc"
"compiler.version" = "10"
"#;

pub const GRAPH: &str = r#"
[[package]]
name = "tl-function-ref"
version = "1.0.0"
kind = "host"
package_folder = "/opt/larder/tl-function-ref"

[[package]]
name = "cmake"
version = "3.28.1"
kind = "tool"
package_folder = "/opt/larder/cmake"

[[package]]
name = "libhal-cmake-util"
version = "4.1.0"
kind = "tool"
package_folder = "/opt/larder/libhal-cmake-util"

[[package]]
name = "boost-ext-ut"
version = "2.1.0"
kind = "test"
package_folder = "/opt/larder/boost-ext-ut"
"#;

pub fn full_recipe() -> Recipe {
    parse_recipe(FULL_RECIPE).unwrap()
}

pub fn gcc13() -> Profile {
    Profile::parse(GCC13_PROFILE).unwrap()
}

pub fn gcc10() -> Profile {
    Profile::parse(GCC10_PROFILE).unwrap()
}

pub fn graph() -> DependencyGraph {
    DependencyGraph::parse(GRAPH).unwrap()
}

/// One recorded native build step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub action: &'static str,
    pub build_folder: PathBuf,
    pub target: Option<String>,
    pub jobs: u32,
}

/// NativeBuild double that records every step
#[derive(Default)]
pub struct RecordingBuild {
    pub steps: Mutex<Vec<Step>>,
    pub fail_configure: bool,
    pub fail_compile: bool,
}

impl RecordingBuild {
    pub fn failing_configure() -> Self {
        Self {
            fail_configure: true,
            ..Self::default()
        }
    }

    pub fn failing_compile() -> Self {
        Self {
            fail_compile: true,
            ..Self::default()
        }
    }

    pub fn steps(&self) -> Vec<Step> {
        self.steps.lock().unwrap().clone()
    }

    fn record(&self, action: &'static str, invocation: &BuildInvocation<'_>, fail: bool) -> BuildOutput {
        self.steps.lock().unwrap().push(Step {
            action,
            build_folder: invocation.layout.build_folder.clone(),
            target: invocation.target.map(str::to_string),
            jobs: invocation.jobs,
        });

        if fail {
            BuildOutput {
                success: false,
                exit_code: Some(1),
                stdout: String::new(),
                stderr: format!("{} exploded", action),
            }
        } else {
            BuildOutput {
                stdout: format!("{} ok", action),
                ..BuildOutput::ok()
            }
        }
    }
}

impl NativeBuild for RecordingBuild {
    fn configure(&self, invocation: &BuildInvocation<'_>) -> Result<BuildOutput> {
        Ok(self.record("configure", invocation, self.fail_configure))
    }

    fn compile(&self, invocation: &BuildInvocation<'_>) -> Result<BuildOutput> {
        Ok(self.record("compile", invocation, self.fail_compile))
    }
}
