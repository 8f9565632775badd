// src/lib.rs

//! Larder
//!
//! Recipe-driven build orchestration for C and C++ packages.
//!
//! # Architecture
//!
//! - Declarative recipes: TOML files naming dependencies, settings axes,
//!   generators and the minimum C++ standard
//! - Guarded lifecycle: hooks run in a fixed order, each at most once
//! - Delegated builds: configure and compile are handed to CMake

mod error;
pub mod recipe;

pub use error::{Error, Result};
pub use recipe::{
    parse_recipe, parse_recipe_file, validate_recipe, Cook, CookResult, DependencyGraph, Kitchen,
    KitchenConfig, LanguageStandard, Phase, Profile, Recipe,
};
