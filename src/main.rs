// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Inspect { recipe, json }) => commands::cmd_inspect(&recipe, json),

        Some(Commands::Validate { recipe }) => commands::cmd_validate(&recipe),

        Some(Commands::Layout {
            recipe,
            profile,
            root,
            cmake_generator,
        }) => commands::cmd_layout(&recipe, &profile, root.as_deref(), cmake_generator),

        Some(Commands::DetectProfile) => commands::cmd_detect_profile(),

        Some(Commands::Cook {
            recipe,
            profile,
            root,
            deps,
            with_tests,
            jobs,
            cmake_generator,
            keep_log,
        }) => commands::cmd_cook(commands::CookArgs {
            recipe_path: &recipe,
            profile_path: &profile,
            root: root.as_deref(),
            deps_path: deps.as_deref(),
            with_tests,
            jobs,
            cmake_generator,
            keep_log,
        }),

        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "larder", &mut std::io::stdout());
            Ok(())
        }

        None => {
            println!("larder {}", env!("CARGO_PKG_VERSION"));
            println!("Run 'larder --help' for usage information");
            Ok(())
        }
    }
}
