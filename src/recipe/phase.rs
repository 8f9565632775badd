// src/recipe/phase.rs

//! Lifecycle hooks and their ordering guard
//!
//! A cook session walks a recipe through five hooks. Both declaration hooks
//! must succeed before the layout is resolved, the layout before toolchain
//! generation, and toolchain generation before the build. Each hook runs at
//! most once per session; a failed hook still counts as attempted.

use crate::error::{Error, Result};
use std::fmt;

/// A named lifecycle hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    DeclareRequirements,
    DeclareBuildRequirements,
    ResolveLayout,
    GenerateToolchain,
    PerformBuild,
}

impl Phase {
    /// All hooks in canonical order
    pub const ALL: [Phase; 5] = [
        Phase::DeclareRequirements,
        Phase::DeclareBuildRequirements,
        Phase::ResolveLayout,
        Phase::GenerateToolchain,
        Phase::PerformBuild,
    ];

    /// Hook name as exposed to callers and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::DeclareRequirements => "declare_requirements",
            Phase::DeclareBuildRequirements => "declare_build_requirements",
            Phase::ResolveLayout => "resolve_layout",
            Phase::GenerateToolchain => "generate_toolchain_files",
            Phase::PerformBuild => "perform_build",
        }
    }

    /// Hooks that must have completed successfully before this one may start
    pub fn prerequisites(&self) -> &'static [Phase] {
        match self {
            Phase::DeclareRequirements | Phase::DeclareBuildRequirements => &[],
            Phase::ResolveLayout => &[Phase::DeclareRequirements, Phase::DeclareBuildRequirements],
            Phase::GenerateToolchain => &[Phase::ResolveLayout],
            Phase::PerformBuild => &[Phase::GenerateToolchain],
        }
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks which hooks have been attempted and completed in one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTracker {
    attempted: u8,
    completed: u8,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a hook as started, rejecting repeats and missing prerequisites
    pub fn begin(&mut self, phase: Phase) -> Result<()> {
        if self.attempted & phase.bit() != 0 {
            return Err(Error::PhaseOrder {
                phase,
                reason: "hook already invoked in this session".to_string(),
            });
        }

        let missing: Vec<&str> = phase
            .prerequisites()
            .iter()
            .filter(|p| !self.is_completed(**p))
            .map(|p| p.as_str())
            .collect();

        if !missing.is_empty() {
            return Err(Error::PhaseOrder {
                phase,
                reason: format!("requires {} to complete first", missing.join(" and ")),
            });
        }

        self.attempted |= phase.bit();
        Ok(())
    }

    /// Mark a started hook as successfully completed
    pub fn complete(&mut self, phase: Phase) {
        debug_assert!(self.attempted & phase.bit() != 0);
        self.completed |= phase.bit();
    }

    pub fn is_completed(&self, phase: Phase) -> bool {
        self.completed & phase.bit() != 0
    }

    pub fn is_attempted(&self, phase: Phase) -> bool {
        self.attempted & phase.bit() != 0
    }

    /// Completed hooks in canonical order
    pub fn completed(&self) -> Vec<Phase> {
        Phase::ALL
            .into_iter()
            .filter(|p| self.is_completed(*p))
            .collect()
    }

    /// Forget all progress so the whole sequence can run again
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
