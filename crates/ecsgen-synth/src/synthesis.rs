//! Companion type synthesis.
//!
//! One [`synthesize`] call is one pass for one companion shape. It finds the
//! target's types that satisfy any of the request's marker contracts, drops
//! the ones that already have a companion (any indexed base chain that
//! instantiates the template or a recognized template with that type), and
//! injects a nested companion into each remaining type:
//!
//! ```text
//! public struct Health : IComponentData {
//!     public class HealthCustomDrawer : GenericDrawer<Health> {
//!         public HealthCustomDrawer() : base() { }
//!     }
//! }
//! ```
//!
//! Because previously synthesized companions are themselves indexed, a second
//! pass over the same image finds nothing left to do.

use crate::error::SynthesisError;
use crate::index::AssemblyIndex;
use crate::log::ActivityLog;
use ecsgen_common::names::nest;
use ecsgen_model::{
    MethodDef, TypeAttributes, TypeContext, TypeDef, TypeDefId, TypeRef, TypeRelations,
    definition_name,
};
use rustc_hash::FxHashSet;
use tracing::{debug, instrument, warn};

/// What one companion pass searches for and what it builds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SynthesisRequest {
    /// Appended to the source type's name to name the companion.
    pub suffix: String,
    /// Marker contracts; a type satisfying any of them is a source type.
    pub source_contracts: Vec<TypeRef>,
    /// Generic companion template (a single-parameter definition).
    pub template: TypeRef,
    /// Other templates whose single-argument instantiations also count as
    /// an existing companion.
    pub recognized_templates: Vec<TypeRef>,
}

impl SynthesisRequest {
    pub fn new(suffix: impl Into<String>, template: TypeRef) -> Self {
        Self {
            suffix: suffix.into(),
            source_contracts: Vec::new(),
            template,
            recognized_templates: Vec::new(),
        }
    }

    pub fn with_contracts(mut self, contracts: Vec<TypeRef>) -> Self {
        self.source_contracts = contracts;
        self
    }

    pub fn with_recognized(mut self, templates: Vec<TypeRef>) -> Self {
        self.recognized_templates = templates;
        self
    }
}

/// Run one companion pass over the context's target image.
///
/// Returns the ids of the injected companions in injection order; an empty
/// result is not an error.
#[instrument(skip_all, fields(suffix = %request.suffix, template = %request.template))]
pub fn synthesize(
    ctx: &mut TypeContext,
    index: &mut AssemblyIndex,
    request: &SynthesisRequest,
    log: &mut ActivityLog,
) -> Result<Vec<TypeDefId>, SynthesisError> {
    log.section(format_args!("Injecting {}", request.suffix));
    log.list("Searching for types deriving from", &request.source_contracts);

    let unused = {
        let relations = TypeRelations::new(ctx);
        let target = ctx.target();

        let found: Vec<(TypeDefId, TypeRef)> = index
            .types()
            .map(|id| (id, target.reference_to(id)))
            .filter(|(_, ty)| {
                request
                    .source_contracts
                    .iter()
                    .any(|contract| relations.is_assignable(ty, contract))
            })
            .collect();

        log.line("");
        log.list("Found", found.iter().map(|(_, ty)| ty));
        if found.is_empty() {
            return Ok(Vec::new());
        }

        let templates: FxHashSet<String> = request
            .recognized_templates
            .iter()
            .chain(std::iter::once(&request.template))
            .map(definition_name)
            .collect();
        let used: FxHashSet<String> = index
            .generic_base_references(ctx)
            .iter()
            .filter(|base| {
                base.arguments().len() == 1 && templates.contains(&definition_name(base))
            })
            .map(|base| base.arguments()[0].unique_name())
            .collect();

        found
            .into_iter()
            .filter(|(_, ty)| !used.contains(&ty.unique_name()))
            .collect::<Vec<_>>()
    };

    log.line("");
    log.list(
        &format!("Types that need injection on {}", request.suffix),
        unused.iter().map(|(_, ty)| ty),
    );
    if unused.is_empty() {
        return Ok(Vec::new());
    }

    let (base_constructor, template_assembly) = {
        let template = ctx
            .resolve(&request.template)
            .ok_or_else(|| SynthesisError::UnresolvedType {
                ty: request.template.to_string(),
                role: "companion template",
            })?;
        let constructor = template
            .def
            .constructors()
            .find(|ctor| ctor.parameters.is_empty())
            .cloned()
            .ok_or_else(|| SynthesisError::MissingConstructor {
                ty: request.template.to_string(),
            })?;
        (constructor, template.image.identity().clone())
    };
    ctx.target_mut().add_reference(template_assembly);

    let mut injected = Vec::with_capacity(unused.len());
    for (source_id, source) in unused {
        let base = TypeRef::generic(request.template.clone(), vec![source]);
        let name = format!("{}{}", ctx.target()[source_id].name, request.suffix);

        let full_name = nest(&ctx.target().full_name(source_id), &name);
        if ctx.target().find(&full_name).is_some() {
            warn!(%full_name, "nested type already exists, skipping companion");
            continue;
        }

        let constructor = MethodDef::default_constructor(
            base_constructor.reference(base.clone()),
            base_constructor.return_type.clone(),
        );
        let companion = TypeDef::class("", name)
            .with_base(base)
            .with_attributes(TypeAttributes::PUBLIC | TypeAttributes::NESTED_PUBLIC)
            .with_method(constructor);

        let id = ctx.target_mut().add_nested_type(source_id, companion);
        index.add_type(ctx.target(), id);
        debug!(%full_name, "injected companion");
        log.line(format!("Injecting type {full_name}"));
        injected.push(id);
    }
    Ok(injected)
}

#[cfg(test)]
#[path = "../tests/synthesis_tests.rs"]
mod tests;
