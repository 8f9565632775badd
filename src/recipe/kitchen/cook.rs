// src/recipe/kitchen/cook.rs

//! Cook: one guarded pass of a recipe through its lifecycle hooks

use crate::error::{Error, Result};
use crate::recipe::constraint::Requirement;
use crate::recipe::format::{BuildRequirements, Recipe};
use crate::recipe::layout::{is_multi_config, resolve_layout, Layout};
use crate::recipe::phase::{Phase, PhaseTracker};
use crate::recipe::settings::Profile;
use crate::recipe::toolchain::{run_generator, DependencyGraph, GenerateContext};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::config::CookResult;
use super::native::{BuildInvocation, BuildOutput};
use super::Kitchen;

/// A single cook session
///
/// Hooks must be called in lifecycle order and each at most once; use
/// [`Cook::restart`] to run the whole sequence again.
pub struct Cook<'a> {
    pub(super) kitchen: &'a Kitchen,
    pub(super) recipe: &'a Recipe,
    pub(super) profile: &'a Profile,
    tracker: PhaseTracker,
    requirements: Vec<Requirement>,
    build_requirements: Option<BuildRequirements>,
    layout: Option<Layout>,
    generated: Vec<PathBuf>,
    /// Build log accumulator
    log: String,
    warnings: Vec<String>,
}

impl<'a> Cook<'a> {
    pub(super) fn new(
        kitchen: &'a Kitchen,
        recipe: &'a Recipe,
        profile: &'a Profile,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            kitchen,
            recipe,
            profile,
            tracker: PhaseTracker::new(),
            requirements: Vec::new(),
            build_requirements: None,
            layout: None,
            generated: Vec::new(),
            log: String::new(),
            warnings,
        }
    }

    /// Hook 1: runtime and link-time requirements
    pub fn declare_requirements(&mut self) -> Result<Vec<Requirement>> {
        self.tracker.begin(Phase::DeclareRequirements)?;

        let requirements = self.recipe.requirements()?;
        for req in &requirements {
            self.log_line(&format!("requires {}", req.reference()));
        }
        self.requirements = requirements;

        self.tracker.complete(Phase::DeclareRequirements);
        Ok(self.requirements.clone())
    }

    /// Hook 2: tool requirements, and test requirements when tests are requested
    pub fn declare_build_requirements(&mut self) -> Result<BuildRequirements> {
        self.tracker.begin(Phase::DeclareBuildRequirements)?;

        let declared = self
            .recipe
            .build_requirements(self.kitchen.config.with_tests)?;
        for req in &declared.tool {
            self.log_line(&format!("tool_requires {}", req.reference()));
        }
        if declared.tests_active {
            for req in &declared.test {
                self.log_line(&format!("test_requires {}", req.reference()));
            }
        } else if !declared.test.is_empty() {
            debug!("Tests not requested, skipping {} test requirement(s)", declared.test.len());
        }

        self.build_requirements = Some(declared.clone());
        self.tracker.complete(Phase::DeclareBuildRequirements);
        Ok(declared)
    }

    /// Hook 3: map the root to the recipe's folder convention
    pub fn resolve_layout(&mut self, root: &Path) -> Result<Layout> {
        self.tracker.begin(Phase::ResolveLayout)?;

        let multi_config = is_multi_config(
            self.kitchen.config.cmake_generator.as_deref(),
            self.profile,
        );
        let layout = resolve_layout(
            self.recipe.layout_policy()?,
            root,
            self.profile,
            &self.recipe.build_folder_vars()?,
            multi_config,
        )?;
        self.log_line(&format!("layout: build folder {}", layout.build_folder.display()));

        self.layout = Some(layout.clone());
        self.tracker.complete(Phase::ResolveLayout);
        Ok(layout)
    }

    /// Hook 4: check the compiler standard, write descriptors, run the aux target
    ///
    /// Nothing is written when the standard check or the dependency graph
    /// check fails.
    pub fn generate_toolchain_files(&mut self, graph: &DependencyGraph) -> Result<Vec<PathBuf>> {
        let phase = Phase::GenerateToolchain;
        let kitchen = self.kitchen;
        let recipe = self.recipe;
        self.tracker.begin(phase)?;

        let required = self.recipe.min_standard()?;
        let compiler = self.profile.compiler()?;
        let capability = compiler.max_standard();
        if capability < required {
            warn!(
                "{} supports up to C++{} but {} requires C++{}",
                compiler,
                capability,
                self.recipe.package.name,
                required
            );
            return Err(Error::StandardTooOld {
                phase,
                required,
                detected: capability,
            });
        }

        // An explicit compiler.cppstd may still select an older standard
        let detected = self.profile.effective_standard()?;
        if detected < required {
            warn!(
                "Compiler provides C++{} but {} requires C++{}",
                detected, self.recipe.package.name, required
            );
            return Err(Error::StandardTooOld {
                phase,
                required,
                detected,
            });
        }
        // An explicit profile standard is honored, otherwise build at the minimum
        let standard = if self.profile.settings.compiler_cppstd.is_some() {
            detected
        } else {
            required
        };

        let layout = self.layout.clone().ok_or_else(|| missing_state(phase, "layout"))?;
        let build_reqs = self
            .build_requirements
            .clone()
            .ok_or_else(|| missing_state(phase, "build requirements"))?;

        let mut host = graph.satisfy(&self.requirements)?;
        if build_reqs.tests_active {
            host.extend(graph.satisfy(&build_reqs.test)?);
        }
        let tools = graph.satisfy(&build_reqs.tool)?;

        let generators = self.recipe.generator_kinds()?;

        fs::create_dir_all(&layout.generators_folder).map_err(|e| {
            Error::IoError(format!(
                "Failed to create generators folder {}: {}",
                layout.generators_folder.display(),
                e
            ))
        })?;

        let ctx = GenerateContext {
            recipe: self.recipe,
            profile: self.profile,
            layout: &layout,
            standard,
            host,
            tools,
            cmake_generator: kitchen.config.cmake_generator.as_deref(),
        };

        for kind in generators {
            let files = run_generator(kind, &ctx)?;
            for file in &files {
                self.log_line(&format!("{}: wrote {}", kind, file.display()));
            }
            self.generated.extend(files);
        }

        if let Some(target) = &recipe.build.aux_target {
            info!("Building auxiliary target {}", target);
            self.configure(phase, &layout)?;
            self.compile(phase, &layout, Some(target))?;
        }

        self.tracker.complete(phase);
        Ok(self.generated.clone())
    }

    /// Hook 5: configure, then compile
    pub fn perform_build(&mut self) -> Result<()> {
        let phase = Phase::PerformBuild;
        self.tracker.begin(phase)?;

        let layout = self.layout.clone().ok_or_else(|| missing_state(phase, "layout"))?;

        if self.recipe.build.report_compiler {
            let compiler = self.profile.compiler()?;
            info!("Compiler: {}", compiler);
            self.log_line(&format!("compiler: {}", compiler));
        }

        self.configure(phase, &layout)?;
        self.compile(phase, &layout, None)?;

        self.tracker.complete(phase);
        Ok(())
    }

    /// Discard all progress so the sequence can start over
    pub fn restart(&mut self) {
        info!("Restarting cook of {}", self.recipe.package.name);
        self.tracker.reset();
        self.requirements.clear();
        self.build_requirements = None;
        self.layout = None;
        self.generated.clear();
        self.log_line("=== restart ===");
    }

    /// Hooks completed so far
    pub fn completed(&self) -> Vec<Phase> {
        self.tracker.completed()
    }

    /// End the session and collect its outputs
    pub fn finish(mut self) -> Result<CookResult> {
        let layout = self
            .layout
            .take()
            .ok_or_else(|| missing_state(Phase::ResolveLayout, "layout"))?;
        let package_id = self.recipe.package_id(self.profile)?;

        let log_path = if self.kitchen.config.keep_log {
            let path = layout.build_folder.join("larder-build.log");
            fs::create_dir_all(&layout.build_folder)?;
            fs::write(&path, &self.log)?;
            Some(path)
        } else {
            None
        };

        Ok(CookResult {
            package_id,
            layout,
            generated: self.generated,
            phases: self.tracker.completed(),
            log: self.log,
            warnings: self.warnings,
            log_path,
        })
    }

    fn invocation<'b>(&'b self, layout: &'b Layout, target: Option<&'b str>) -> BuildInvocation<'b> {
        BuildInvocation {
            layout,
            jobs: self.kitchen.config.jobs,
            cmake_generator: self.kitchen.config.cmake_generator.as_deref(),
            target,
        }
    }

    fn configure(&mut self, phase: Phase, layout: &Layout) -> Result<()> {
        info!("Running configure ({})", phase);
        let result = self.kitchen.native.configure(&self.invocation(layout, None));
        let output = self.check_step(phase, "configure", result).map_err(|message| {
            Error::ConfigureFailure { phase, message }
        })?;
        debug!("configure finished with {:?}", output.exit_code);
        Ok(())
    }

    fn compile(&mut self, phase: Phase, layout: &Layout, target: Option<&str>) -> Result<()> {
        let step = match target {
            Some(t) => format!("compile {}", t),
            None => "compile".to_string(),
        };
        info!("Running {} ({})", step, phase);
        let result = self.kitchen.native.compile(&self.invocation(layout, target));
        let output = self.check_step(phase, &step, result).map_err(|message| {
            Error::CompileFailure { phase, message }
        })?;
        debug!("{} finished with {:?}", step, output.exit_code);
        Ok(())
    }

    /// Log a step's output and turn a failure into its message
    fn check_step(
        &mut self,
        phase: Phase,
        step: &str,
        result: Result<BuildOutput>,
    ) -> std::result::Result<BuildOutput, String> {
        let output = result.map_err(|e| e.to_string())?;
        self.log_build_output(&format!("{} / {}", phase, step), &output.stdout, &output.stderr);

        if !output.success {
            return Err(format!(
                "{} failed with exit code {:?}\nstderr: {}",
                step, output.exit_code, output.stderr
            ));
        }
        Ok(output)
    }

    fn log_line(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }

    /// Log build step output (stdout/stderr) with a header
    fn log_build_output(&mut self, header: &str, stdout: &str, stderr: &str) {
        self.log_line(&format!("=== {} ===", header));
        if !stdout.is_empty() {
            self.log.push_str(stdout);
            self.log.push('\n');
        }
        if !stderr.is_empty() {
            self.log.push_str(stderr);
            self.log.push('\n');
        }
    }
}

fn missing_state(phase: Phase, what: &str) -> Error {
    Error::PhaseOrder {
        phase,
        reason: format!("{} has not been resolved", what),
    }
}
