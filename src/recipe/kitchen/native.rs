// src/recipe/kitchen/native.rs

//! Native build system seam
//!
//! The kitchen never compiles anything itself. Configure and compile are
//! delegated to an implementation of [`NativeBuild`]; the default one runs
//! CMake.

use crate::error::{Error, Result};
use crate::recipe::layout::Layout;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Inputs for one native build step
#[derive(Debug, Clone)]
pub struct BuildInvocation<'a> {
    pub layout: &'a Layout,
    pub jobs: u32,
    pub cmake_generator: Option<&'a str>,
    /// Specific target to build instead of the default
    pub target: Option<&'a str>,
}

/// Captured outcome of a native build step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl BuildOutput {
    /// A successful step with no output
    pub fn ok() -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            ..Self::default()
        }
    }
}

/// Trait for the external native build system
///
/// A step that ran but failed is reported as `Ok` with `success == false`;
/// `Err` means the step could not be launched at all.
pub trait NativeBuild: Send + Sync {
    /// Configure the build tree
    fn configure(&self, invocation: &BuildInvocation<'_>) -> Result<BuildOutput>;

    /// Compile the configured tree (or one target of it)
    fn compile(&self, invocation: &BuildInvocation<'_>) -> Result<BuildOutput>;
}

/// Native build driven by the `cmake` command line
#[derive(Debug, Clone, Default)]
pub struct CMakeBuild {
    cmake: Option<PathBuf>,
}

impl CMakeBuild {
    /// Use `cmake` at an explicit path, or from PATH when `None`
    pub fn new(cmake: Option<PathBuf>) -> Self {
        Self { cmake }
    }

    fn program(&self) -> Result<PathBuf> {
        match &self.cmake {
            Some(path) => Ok(path.clone()),
            None => which::which("cmake")
                .map_err(|e| Error::NotFound(format!("cmake not found in PATH: {}", e))),
        }
    }

    /// Arguments for `cmake` configure
    pub fn configure_args(invocation: &BuildInvocation<'_>) -> Vec<String> {
        let layout = invocation.layout;
        let mut args = vec![
            "-S".to_string(),
            display(&layout.source_folder),
            "-B".to_string(),
            display(&layout.build_folder),
        ];
        if let Some(generator) = invocation.cmake_generator {
            args.push("-G".to_string());
            args.push(generator.to_string());
        }
        args.push(format!("-DCMAKE_TOOLCHAIN_FILE={}", display(&layout.toolchain_file())));
        if !layout.multi_config {
            args.push(format!("-DCMAKE_BUILD_TYPE={}", layout.build_type));
        }
        args
    }

    /// Arguments for `cmake --build`
    pub fn compile_args(invocation: &BuildInvocation<'_>) -> Vec<String> {
        let layout = invocation.layout;
        let mut args = vec!["--build".to_string(), display(&layout.build_folder)];
        if layout.multi_config {
            args.push("--config".to_string());
            args.push(layout.build_type.clone());
        }
        if let Some(target) = invocation.target {
            args.push("--target".to_string());
            args.push(target.to_string());
        }
        args.push("--parallel".to_string());
        args.push(invocation.jobs.to_string());
        args
    }

    fn run(&self, args: &[String], workdir: &Path) -> Result<BuildOutput> {
        let program = self.program()?;
        debug!("Command: {} {}", program.display(), args.join(" "));

        let output = Command::new(&program)
            .args(args)
            .current_dir(workdir)
            .output()
            .map_err(|e| Error::IoError(format!("Failed to run {}: {}", program.display(), e)))?;

        Ok(BuildOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl NativeBuild for CMakeBuild {
    fn configure(&self, invocation: &BuildInvocation<'_>) -> Result<BuildOutput> {
        self.run(&Self::configure_args(invocation), &invocation.layout.source_folder)
    }

    fn compile(&self, invocation: &BuildInvocation<'_>) -> Result<BuildOutput> {
        self.run(&Self::compile_args(invocation), &invocation.layout.source_folder)
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
