//! Structural type relations.
//!
//! This is the facade the synthesis passes reason through. It answers three
//! questions about [`TypeRef`]s without any live reflection over the code
//! being analyzed:
//!
//! - **identity**: [`TypeRef::unique_name`], `Full.Name/Assembly`
//! - **ancestry**: [`BaseChain`], the immediate base up to the root, resolved
//!   one link at a time with generic parameters substituted
//! - **assignability**: [`TypeRelations::is_assignable`]
//!
//! ## Assignability rules
//!
//! `candidate` is assignable to `target` when, in order:
//!
//! 1. both have the same unique name;
//! 2. both instantiate the same generic element with the same arity and
//!    every argument pair is itself assignable (`G<A>` to `G<B>` iff `A` to
//!    `B`, recursively, positionally);
//! 3. the candidate's base type is assignable to the target;
//! 4. one of the candidate's declared interfaces is assignable to the target.
//!
//! Rules 3 and 4 are applied as a worklist walk over the candidate's
//! ancestors and interfaces, so a match anywhere up a base chain of any length
//! is found. Each unique name is visited once; a cyclic input ends the walk
//! and is reported as not assignable. Only generic nesting is depth-bounded
//! (`MAX_GENERIC_DEPTH`).

use crate::context::TypeContext;
use crate::type_ref::TypeRef;
use ecsgen_common::limits::MAX_GENERIC_DEPTH;
use rustc_hash::FxHashSet;
use tracing::{trace, warn};

// =============================================================================
// BaseChain
// =============================================================================

/// Lazy iterator over a type's ancestors, immediate base first.
///
/// Each step resolves the current link, reads its declared base and
/// substitutes the current link's generic arguments into it, so the chain of
/// `GenericBaker<Health>` yields `Baker<Health>`, not `Baker<T>`. The walk
/// stops at the first unresolvable link, or at the first declaration seen
/// twice.
pub struct BaseChain<'a> {
    ctx: &'a TypeContext,
    current: Option<TypeRef>,
    seen: FxHashSet<String>,
}

impl Iterator for BaseChain<'_> {
    type Item = TypeRef;

    fn next(&mut self) -> Option<TypeRef> {
        let current = self.current.take()?;
        let resolved = self.ctx.resolve(&current)?;
        let base = resolved.def.base.as_ref()?.substitute(current.arguments());
        if !self.seen.insert(definition_name(&base)) {
            warn!(ty = %current, base = %base, "cyclic base chain");
            return None;
        }
        self.current = Some(base.clone());
        Some(base)
    }
}

// =============================================================================
// TypeRelations
// =============================================================================

/// Relation queries over one [`TypeContext`].
#[derive(Clone, Copy)]
pub struct TypeRelations<'a> {
    ctx: &'a TypeContext,
}

impl<'a> TypeRelations<'a> {
    pub fn new(ctx: &'a TypeContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &'a TypeContext {
        self.ctx
    }

    /// Ancestors of `ty` from immediate base to root; empty when `ty` has no
    /// base or does not resolve.
    pub fn base_chain(&self, ty: &TypeRef) -> BaseChain<'a> {
        let mut seen = FxHashSet::default();
        seen.insert(definition_name(ty));
        BaseChain {
            ctx: self.ctx,
            current: Some(ty.clone()),
            seen,
        }
    }

    /// First ancestor of `ty` that instantiates the same generic element as
    /// `template`.
    pub fn find_base_instance(&self, ty: &TypeRef, template: &TypeRef) -> Option<TypeRef> {
        let wanted = definition_name(template);
        self.base_chain(ty)
            .find(|base| base.is_generic_instance() && definition_name(base) == wanted)
    }

    /// Whether a value of `candidate` can be used where `target` is expected.
    pub fn is_assignable(&self, candidate: &TypeRef, target: &TypeRef) -> bool {
        let result = self.check(candidate, target, 0);
        trace!(%candidate, %target, result, "is_assignable");
        result
    }

    /// `depth` counts generic-argument nesting only; base and interface
    /// steps are walked iteratively.
    fn check(&self, candidate: &TypeRef, target: &TypeRef, depth: u32) -> bool {
        if depth > MAX_GENERIC_DEPTH {
            warn!(%candidate, %target, "generic nesting too deep");
            return false;
        }

        let mut visited = FxHashSet::default();
        let mut pending = vec![candidate.clone()];
        while let Some(ty) = pending.pop() {
            if !visited.insert(ty.unique_name()) {
                continue;
            }
            if ty.unique_name() == target.unique_name()
                || self.generic_arguments_match(&ty, target, depth)
            {
                return true;
            }
            let Some(resolved) = self.ctx.resolve(&ty) else {
                continue;
            };
            let arguments = ty.arguments();
            // Interfaces go on first so the base is popped next.
            for iface in resolved.def.interfaces.iter().rev() {
                push_bounded(&mut pending, iface.substitute(arguments));
            }
            if let Some(base) = &resolved.def.base {
                push_bounded(&mut pending, base.substitute(arguments));
            }
        }
        false
    }

    /// Both sides instantiate the same element with equal arity and every
    /// argument pair is assignable.
    fn generic_arguments_match(&self, candidate: &TypeRef, target: &TypeRef, depth: u32) -> bool {
        let (
            TypeRef::Generic {
                element: candidate_element,
                arguments: candidate_args,
            },
            TypeRef::Generic {
                element: target_element,
                arguments: target_args,
            },
        ) = (candidate, target)
        else {
            return false;
        };

        !candidate_args.is_empty()
            && candidate_args.len() == target_args.len()
            && candidate_element.unique_name() == target_element.unique_name()
            && candidate_args
                .iter()
                .zip(target_args)
                .all(|(c, t)| self.check(c, t, depth + 1))
    }
}

/// Queues `ty` unless substitution has nested it past `MAX_GENERIC_DEPTH`,
/// which only a self-expanding generic hierarchy can do.
fn push_bounded(pending: &mut Vec<TypeRef>, ty: TypeRef) {
    if generic_nesting(&ty) > MAX_GENERIC_DEPTH {
        warn!(%ty, "generic nesting too deep");
        return;
    }
    pending.push(ty);
}

fn generic_nesting(ty: &TypeRef) -> u32 {
    match ty {
        TypeRef::Generic { arguments, .. } => {
            1 + arguments.iter().map(generic_nesting).max().unwrap_or(0)
        }
        TypeRef::Array { element } => generic_nesting(element),
        TypeRef::Named { .. } | TypeRef::GenericParam { .. } => 0,
    }
}

/// Identity of the declaration behind `ty`: the element's unique name for an
/// instantiation, the unique name itself otherwise.
pub fn definition_name(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Generic { element, .. } => element.unique_name(),
        other => other.unique_name(),
    }
}

/// Convenience wrapper over [`TypeRelations::is_assignable`].
pub fn is_assignable(ctx: &TypeContext, candidate: &TypeRef, target: &TypeRef) -> bool {
    TypeRelations::new(ctx).is_assignable(candidate, target)
}

/// Convenience wrapper over [`TypeRelations::base_chain`].
pub fn base_chain<'a>(ctx: &'a TypeContext, ty: &TypeRef) -> BaseChain<'a> {
    TypeRelations::new(ctx).base_chain(ty)
}
