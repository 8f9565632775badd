// src/cli.rs
//! CLI definitions for larder
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "larder")]
#[command(author = "Larder Contributors")]
#[command(version)]
#[command(about = "Recipe-driven build orchestration for C and C++ packages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show recipe metadata and declared dependencies
    Inspect {
        /// Path to the recipe file
        recipe: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a recipe and print any warnings
    Validate {
        /// Path to the recipe file
        recipe: String,
    },

    /// Show the folder layout a recipe resolves to
    Layout {
        /// Path to the recipe file
        recipe: String,

        /// Profile with the active settings
        #[arg(short, long)]
        profile: String,

        /// Source root (defaults to the recipe's directory)
        #[arg(short, long)]
        root: Option<String>,

        /// CMake generator, used to detect multi-config builds
        #[arg(long)]
        cmake_generator: Option<String>,
    },

    /// Print a profile for the compiler found on PATH
    DetectProfile,

    /// Run a recipe through every build hook
    Cook {
        /// Path to the recipe file
        recipe: String,

        /// Profile with the active settings
        #[arg(short, long)]
        profile: String,

        /// Source root (defaults to the recipe's directory)
        #[arg(short, long)]
        root: Option<String>,

        /// Resolved dependency graph
        #[arg(short, long)]
        deps: Option<String>,

        /// Activate test requirements
        #[arg(long)]
        with_tests: bool,

        /// Number of parallel jobs (default: number of CPUs)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        jobs: Option<u32>,

        /// CMake generator (e.g. Ninja)
        #[arg(long)]
        cmake_generator: Option<String>,

        /// Write the build log into the build folder
        #[arg(long)]
        keep_log: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
