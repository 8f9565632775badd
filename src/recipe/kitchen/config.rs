// src/recipe/kitchen/config.rs

//! Kitchen configuration and cook results

use crate::recipe::layout::Layout;
use crate::recipe::phase::Phase;
use std::path::PathBuf;
use tracing::warn;

/// Configuration for the Kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Number of parallel compile jobs
    pub jobs: u32,
    /// CMake generator name (`Ninja`, `Unix Makefiles`, ...); CMake's default if unset
    pub cmake_generator: Option<String>,
    /// Activate test requirements and the package's own tests
    pub with_tests: bool,
    /// Explicit path to the `cmake` executable; looked up in PATH otherwise
    pub cmake: Option<PathBuf>,
    /// Write the build log next to the build folder after cooking
    pub keep_log: bool,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        Self {
            jobs,
            cmake_generator: None,
            with_tests: false,
            cmake: None,
            keep_log: false,
        }
    }
}

impl KitchenConfig {
    /// Defaults overridden by `LARDER_JOBS`, `LARDER_CMAKE_GENERATOR`,
    /// `LARDER_WITH_TESTS` and `LARDER_CMAKE`
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(jobs) = get("LARDER_JOBS") {
            match jobs.parse::<u32>() {
                Ok(n) if n > 0 => config.jobs = n,
                _ => warn!("Ignoring invalid LARDER_JOBS={}", jobs),
            }
        }
        if let Some(generator) = get("LARDER_CMAKE_GENERATOR").filter(|g| !g.is_empty()) {
            config.cmake_generator = Some(generator);
        }
        if let Some(flag) = get("LARDER_WITH_TESTS") {
            config.with_tests = matches!(flag.as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(cmake) = get("LARDER_CMAKE").filter(|c| !c.is_empty()) {
            config.cmake = Some(PathBuf::from(cmake));
        }

        config
    }

    /// Configuration that also builds the package's tests
    pub fn with_tests() -> Self {
        Self {
            with_tests: true,
            ..Self::default()
        }
    }
}

/// Result of cooking a recipe
#[derive(Debug)]
pub struct CookResult {
    /// Identity of this settings combination
    pub package_id: String,
    /// Folder mapping the build used
    pub layout: Layout,
    /// Descriptor files written by the generators
    pub generated: Vec<PathBuf>,
    /// Hooks that completed, in order
    pub phases: Vec<Phase>,
    /// Build log
    pub log: String,
    /// Warnings generated during validation and build
    pub warnings: Vec<String>,
    /// Where the log was written, if `keep_log` was set
    pub log_path: Option<PathBuf>,
}
