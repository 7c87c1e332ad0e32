//! Type contexts.
//!
//! A `TypeContext` is the world a pass reasons about: the target image it is
//! allowed to mutate plus the reference images its types point into. Every
//! [`TypeRef`] is resolved here by looking up its assembly scope first and
//! its full name second.

use crate::image::AssemblyImage;
use crate::resolver::AssemblyResolver;
use crate::type_def::{TypeDef, TypeDefId};
use crate::type_ref::TypeRef;
use ecsgen_common::limits::MAX_REFERENCE_CLOSURE;
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// A resolved type node together with the image that owns it.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedType<'a> {
    pub image: &'a AssemblyImage,
    pub id: TypeDefId,
    pub def: &'a TypeDef,
}

impl ResolvedType<'_> {
    /// Whether the node belongs to the context's target image.
    pub fn is_in(&self, image: &AssemblyImage) -> bool {
        std::ptr::eq(self.image, image)
    }

    pub fn full_name(&self) -> String {
        self.image.full_name(self.id)
    }
}

/// Target image plus its resolved references.
pub struct TypeContext {
    target: AssemblyImage,
    /// Simple name -> reference image.
    references: IndexMap<String, Arc<AssemblyImage>>,
}

impl TypeContext {
    /// Context over `target` with an explicit reference set.
    pub fn new(target: AssemblyImage, references: Vec<Arc<AssemblyImage>>) -> Self {
        let mut ctx = Self {
            target,
            references: IndexMap::new(),
        };
        for image in references {
            ctx.add_reference_image(image);
        }
        ctx
    }

    /// Context over `target` whose references are the transitive closure of
    /// the target's reference list, as far as `resolver` can resolve it.
    ///
    /// Unresolvable references are skipped; types that point into them will
    /// simply fail to resolve.
    pub fn build(target: AssemblyImage, resolver: &mut AssemblyResolver<'_>) -> Self {
        let mut ctx = Self::new(target, Vec::new());
        let mut queue: VecDeque<_> = ctx.target.references().iter().cloned().collect();

        while let Some(identity) = queue.pop_front() {
            if ctx.references.contains_key(&identity.name) || identity.name == ctx.target.name() {
                continue;
            }
            if ctx.references.len() >= MAX_REFERENCE_CLOSURE {
                warn!(
                    assembly = %ctx.target.identity(),
                    limit = MAX_REFERENCE_CLOSURE,
                    "reference closure limit reached"
                );
                break;
            }
            match resolver.resolve(&identity) {
                Some(image) => {
                    queue.extend(image.references().iter().cloned());
                    ctx.add_reference_image(image);
                }
                None => warn!(assembly = %identity, "unresolved assembly reference"),
            }
        }

        debug!(
            assembly = %ctx.target.identity(),
            references = ctx.references.len(),
            "built type context"
        );
        ctx
    }

    fn add_reference_image(&mut self, image: Arc<AssemblyImage>) {
        self.references
            .entry(image.name().to_string())
            .or_insert(image);
    }

    pub fn target(&self) -> &AssemblyImage {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut AssemblyImage {
        &mut self.target
    }

    /// Release the target image, dropping the reference set.
    pub fn into_target(self) -> AssemblyImage {
        self.target
    }

    /// Reference images in resolution order.
    pub fn references(&self) -> impl Iterator<Item = &Arc<AssemblyImage>> {
        self.references.values()
    }

    /// Image whose simple name is `scope`.
    pub fn assembly(&self, scope: &str) -> Option<&AssemblyImage> {
        if scope == self.target.name() {
            Some(&self.target)
        } else {
            self.references.get(scope).map(|image| &**image)
        }
    }

    /// Resolve a reference to its declaring node.
    ///
    /// Instantiations resolve to their element's node. Arrays and generic
    /// parameters have no node and resolve to `None`.
    pub fn resolve(&self, ty: &TypeRef) -> Option<ResolvedType<'_>> {
        match ty {
            TypeRef::Named { scope, full_name } => {
                let image = self.assembly(scope)?;
                let id = image.find(full_name)?;
                Some(ResolvedType {
                    image,
                    id,
                    def: &image[id],
                })
            }
            TypeRef::Generic { element, .. } => self.resolve(element),
            TypeRef::Array { .. } | TypeRef::GenericParam { .. } => None,
        }
    }

    /// Whether `ty` is declared by the target image.
    pub fn is_declared_in_target(&self, ty: &TypeRef) -> bool {
        matches!(ty, TypeRef::Named { .. })
            && self
                .resolve(ty)
                .is_some_and(|resolved| resolved.is_in(&self.target))
    }
}
