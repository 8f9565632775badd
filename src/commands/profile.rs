// src/commands/profile.rs

//! Detect-profile command

use anyhow::{Context, Result};
use larder::recipe::Profile;

/// Print a profile for the host compiler
pub fn cmd_detect_profile() -> Result<()> {
    let profile = Profile::detect().with_context(|| "Failed to detect a host compiler")?;
    print!("{}", profile.to_toml()?);
    Ok(())
}
