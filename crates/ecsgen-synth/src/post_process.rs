//! Post-process pipeline.
//!
//! [`PostProcessor`] is the entry point a host calls once per compiled
//! assembly. A pass runs in a fixed order:
//!
//! 1. resolve the target's references and snapshot the index
//! 2. authoring field synthesis
//! 3. companion passes (drawers, optional inspector editors, bakers), each
//!    followed by attaching its marker attribute to what it injected
//! 4. snapshot again, diff, and write the activity log
//!
//! The processor owns the [`AssemblyCache`] so reference images decoded for
//! one pass are reused by the next. Nothing else survives a pass.

use crate::attributes::attach;
use crate::config::PostProcessConfig;
use crate::error::PostProcessError;
use crate::fields::{SynthesizedField, synthesize_fields};
use crate::index::{AssemblyIndex, TypeDiff};
use crate::log::ActivityLog;
use crate::synthesis::synthesize;
use ecsgen_common::names::contains_ignore_case;
use ecsgen_model::{AssemblyCache, AssemblyImage, AssemblyResolver, ImageBytes, TypeContext};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// A freshly compiled assembly handed over by the host (push model).
#[derive(Clone, Debug, Default)]
pub struct CompiledAssembly {
    pub name: String,
    pub pe: Vec<u8>,
    pub pdb: Option<Vec<u8>>,
    pub references: Vec<PathBuf>,
}

/// Serialized result of a push-model pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessedAssembly {
    pub pe: Vec<u8>,
    pub pdb: Vec<u8>,
}

impl From<ImageBytes> for ProcessedAssembly {
    fn from(bytes: ImageBytes) -> Self {
        Self {
            pe: bytes.pe,
            pdb: bytes.pdb,
        }
    }
}

/// Types injected by one companion pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjectedTypes {
    pub suffix: String,
    /// Full names in injection order.
    pub types: Vec<String>,
}

/// Everything a pass produced.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub image: AssemblyImage,
    pub fields: Vec<SynthesizedField>,
    pub injected: Vec<InjectedTypes>,
    pub diff: TypeDiff,
    pub log: ActivityLog,
}

impl ProcessOutcome {
    /// Whether the pass mutated the image.
    pub fn changed(&self) -> bool {
        !self.fields.is_empty() || self.injected.iter().any(|pass| !pass.types.is_empty())
    }
}

/// Runs post-process passes, reusing decoded references across passes.
pub struct PostProcessor {
    config: PostProcessConfig,
    cache: AssemblyCache,
}

impl PostProcessor {
    pub fn new(config: PostProcessConfig) -> Self {
        Self::with_cache(config, AssemblyCache::new())
    }

    /// Processor over a cache pre-seeded with host-loaded assemblies.
    pub fn with_cache(config: PostProcessConfig, cache: AssemblyCache) -> Self {
        Self { config, cache }
    }

    pub fn config(&self) -> &PostProcessConfig {
        &self.config
    }

    pub fn cache(&self) -> &AssemblyCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut AssemblyCache {
        &mut self.cache
    }

    /// False when `assembly_name` contains any ignored fragment,
    /// case-insensitively.
    pub fn should_process(&self, assembly_name: &str) -> bool {
        !self
            .config
            .ignored_assemblies
            .iter()
            .any(|fragment| contains_ignore_case(assembly_name, fragment))
    }

    /// Run a pass over an already decoded image.
    #[instrument(skip_all, fields(assembly = %image.identity()))]
    pub fn run(
        &mut self,
        image: AssemblyImage,
        references: &[PathBuf],
    ) -> Result<ProcessOutcome, PostProcessError> {
        let mut log = ActivityLog::new();
        log.line(format!("Processing assembly {}", image.identity()));

        let mut ctx = {
            let mut resolver =
                AssemblyResolver::new(&mut self.cache, references, self.config.resolve_additional)?;
            TypeContext::build(image, &mut resolver)
        };

        let before = AssemblyIndex::build(ctx.target());
        let mut index = before.clone();
        let contracts = &self.config.contracts;

        let fields = synthesize_fields(
            &mut ctx,
            &index,
            &contracts.authoring_template_refs(),
            &contracts.component_rules(),
            &mut log,
        );

        let mut injected = Vec::new();
        for pass in contracts.companion_passes(self.config.inject_inspector_editors) {
            let ids = synthesize(&mut ctx, &mut index, &pass.request, &mut log)?;
            if let Some(attribute) = &pass.attribute {
                for &id in &ids {
                    let inspected = ctx.target()[id]
                        .base
                        .as_ref()
                        .and_then(|base| base.arguments().first())
                        .cloned();
                    if let Some(inspected) = inspected {
                        log.line(format!(
                            "- Custom Attribute {} - {attribute} {inspected}",
                            ctx.target().full_name(id)
                        ));
                        attach(&mut ctx, id, attribute, &[inspected])?;
                    }
                }
            }
            injected.push(InjectedTypes {
                suffix: pass.request.suffix.clone(),
                types: ids.iter().map(|&id| ctx.target().full_name(id)).collect(),
            });
        }

        for pass in injected.iter().filter(|pass| !pass.types.is_empty()) {
            log.section(format_args!("Injected {}", pass.suffix));
            for name in &pass.types {
                log.line(format!("Injecting type {name}"));
            }
        }

        let after = AssemblyIndex::build(ctx.target());
        let diff = AssemblyIndex::diff(&before, &after);
        log.section("Assembly Diff Added");
        for name in &diff.added {
            log.line(name.clone());
        }
        log.section("Assembly Diff Removed");
        for name in &diff.removed {
            log.line(name.clone());
        }
        log.line("");
        log.list("Assembly References", ctx.target().references());

        info!(
            fields = fields.len(),
            added = diff.added.len(),
            "post-process pass finished"
        );
        self.write_log(&log);

        Ok(ProcessOutcome {
            image: ctx.into_target(),
            fields,
            injected,
            diff,
            log,
        })
    }

    /// Decode `pe`/`pdb` and run a pass over the result.
    pub fn run_bytes(
        &mut self,
        pe: &[u8],
        pdb: Option<&[u8]>,
        references: &[PathBuf],
    ) -> Result<ProcessOutcome, PostProcessError> {
        let image = AssemblyImage::read(pe, pdb)?;
        self.run(image, references)
    }

    /// Push model: process an in-memory assembly and serialize the result.
    ///
    /// Ignored assemblies yield `Ok(None)`.
    pub fn process(
        &mut self,
        assembly: &CompiledAssembly,
    ) -> Result<Option<ProcessedAssembly>, PostProcessError> {
        if !self.should_process(&assembly.name) {
            debug!(assembly = %assembly.name, "ignored");
            return Ok(None);
        }
        let outcome = self.run_bytes(&assembly.pe, assembly.pdb.as_deref(), &assembly.references)?;
        Ok(Some(outcome.image.write()?.into()))
    }

    /// Pull model: process the image at `path` (and its sibling `.pdb`),
    /// rewriting both in place when the pass changed anything.
    ///
    /// Returns whether the files were rewritten.
    pub fn process_path(
        &mut self,
        path: &Path,
        references: &[PathBuf],
    ) -> Result<bool, PostProcessError> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !self.should_process(&name) {
            debug!(assembly = %name, "ignored");
            return Ok(false);
        }

        let image = AssemblyImage::load(path)?;
        let outcome = self.run(image, references)?;
        if !outcome.changed() {
            return Ok(false);
        }
        outcome.image.save(path)?;
        info!(path = %path.display(), "rewrote assembly");
        Ok(true)
    }

    fn write_log(&self, log: &ActivityLog) {
        let Some(path) = &self.config.log_path else {
            return;
        };
        if let Err(err) = log.append_to(path) {
            warn!(path = %path.display(), error = %err, "failed to write activity log");
        }
    }
}

#[cfg(test)]
#[path = "../tests/post_process_tests.rs"]
mod tests;
