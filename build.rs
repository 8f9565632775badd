// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: recipe file
fn recipe_arg() -> Arg {
    Arg::new("recipe").required(true).help("Path to the recipe file")
}

/// Common argument: profile file
fn profile_arg() -> Arg {
    Arg::new("profile")
        .short('p')
        .long("profile")
        .required(true)
        .value_name("FILE")
        .help("Profile with the active settings")
}

/// Common argument: source root
fn root_arg() -> Arg {
    Arg::new("root")
        .short('r')
        .long("root")
        .value_name("DIR")
        .help("Source root (defaults to the recipe's directory)")
}

fn cmake_generator_arg() -> Arg {
    Arg::new("cmake_generator")
        .long("cmake-generator")
        .value_name("NAME")
        .help("CMake generator (e.g. Ninja)")
}

fn build_cli() -> Command {
    Command::new("larder")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Larder Contributors")
        .about("Recipe-driven build orchestration for C and C++ packages")
        .subcommand_required(false)
        .subcommand(
            Command::new("inspect")
                .about("Show recipe metadata and declared dependencies")
                .arg(recipe_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print as JSON"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a recipe and print any warnings")
                .arg(recipe_arg()),
        )
        .subcommand(
            Command::new("layout")
                .about("Show the folder layout a recipe resolves to")
                .arg(recipe_arg())
                .arg(profile_arg())
                .arg(root_arg())
                .arg(cmake_generator_arg()),
        )
        .subcommand(
            Command::new("detect-profile").about("Print a profile for the compiler found on PATH"),
        )
        .subcommand(
            Command::new("cook")
                .about("Run a recipe through every build hook")
                .arg(recipe_arg())
                .arg(profile_arg())
                .arg(root_arg())
                .arg(
                    Arg::new("deps")
                        .short('d')
                        .long("deps")
                        .value_name("FILE")
                        .help("Resolved dependency graph"),
                )
                .arg(
                    Arg::new("with_tests")
                        .long("with-tests")
                        .action(ArgAction::SetTrue)
                        .help("Activate test requirements"),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .value_name("N")
                        .value_parser(clap::value_parser!(u32).range(1..))
                        .help("Number of parallel jobs (default: number of CPUs)"),
                )
                .arg(cmake_generator_arg())
                .arg(
                    Arg::new("keep_log")
                        .long("keep-log")
                        .action(ArgAction::SetTrue)
                        .help("Write the build log into the build folder"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("larder.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
