//! Subcommand implementations.

use crate::args::{InspectArgs, ProcessArgs};
use anyhow::{Context, Result};
use ecsgen_common::names::SYMBOLS_EXTENSION;
use ecsgen_model::{AssemblyCache, AssemblyImage, AssemblyResolver, TypeContext, TypeRelations};
use ecsgen_synth::config::discover_config;
use ecsgen_synth::{AssemblyIndex, PostProcessConfig, PostProcessor, load_config};
use std::path::{Path, PathBuf};
use tracing::info;

/// What `process` did with the assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessStatus {
    /// The assembly name matched the ignore list.
    Ignored,
    /// Nothing to synthesize; the file was left alone.
    Unchanged,
    /// The image (and its symbols) were written to this path.
    Written(PathBuf),
}

/// Simple assembly name of an image path (its file stem).
pub fn assembly_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Explicit `--config` file, or `ecsgen.json` next to the assembly.
pub fn resolve_config(args: &ProcessArgs) -> Result<PostProcessConfig> {
    match &args.config {
        Some(path) => load_config(path),
        None => {
            let dir = args.assembly.parent().unwrap_or(Path::new("."));
            discover_config(dir)
        }
    }
}

pub fn process(args: &ProcessArgs) -> Result<ProcessStatus> {
    let config = resolve_config(args)?;
    let mut processor = PostProcessor::new(config);

    let name = assembly_name(&args.assembly);
    if !processor.should_process(&name) {
        info!(assembly = %name, "assembly is on the ignore list");
        return Ok(ProcessStatus::Ignored);
    }

    let Some(out) = &args.out else {
        let rewritten = processor
            .process_path(&args.assembly, &args.references)
            .with_context(|| format!("failed to process {}", args.assembly.display()))?;
        return Ok(if rewritten {
            ProcessStatus::Written(args.assembly.clone())
        } else {
            ProcessStatus::Unchanged
        });
    };

    let image = AssemblyImage::load(&args.assembly)
        .with_context(|| format!("failed to read assembly: {}", args.assembly.display()))?;
    let outcome = processor
        .run(image, &args.references)
        .with_context(|| format!("failed to process {}", args.assembly.display()))?;
    outcome
        .image
        .save(out)
        .with_context(|| format!("failed to write {}", out.display()))?;
    info!(
        path = %out.display(),
        symbols = %out.with_extension(SYMBOLS_EXTENSION).display(),
        changed = outcome.changed(),
        "wrote processed assembly"
    );
    Ok(ProcessStatus::Written(out.clone()))
}

/// One line per indexed type: its identity, then its base chain.
pub fn inspect(args: &InspectArgs) -> Result<Vec<String>> {
    let image = AssemblyImage::load(&args.assembly)
        .with_context(|| format!("failed to read assembly: {}", args.assembly.display()))?;

    let mut cache = AssemblyCache::new();
    let ctx = {
        let mut resolver = AssemblyResolver::new(&mut cache, &args.references, true)
            .context("failed to load reference assemblies")?;
        TypeContext::build(image, &mut resolver)
    };

    let index = AssemblyIndex::build(ctx.target());
    let relations = TypeRelations::new(&ctx);
    let lines = index
        .types()
        .map(|id| {
            let identity = ctx.target().unique_name(id);
            let chain: Vec<String> = relations
                .base_chain(&ctx.target().reference_to(id))
                .map(|base| base.to_string())
                .collect();
            if chain.is_empty() {
                identity
            } else {
                format!("{identity} : {}", chain.join(" -> "))
            }
        })
        .collect();
    Ok(lines)
}

#[cfg(test)]
#[path = "../tests/driver_tests.rs"]
mod tests;
