//! Authoring field synthesis.
//!
//! An authoring type derives, somewhere up its base chain, from one of the
//! generic authoring templates (one per arity) bound to its component shapes:
//!
//! ```text
//! class ShipAuthoring : GenericComponentAuthoring<Health, Thruster> { }
//! ```
//!
//! Each bound shape becomes a public field on the authoring type so the host
//! UI can edit it and the baker can read it back. Fields are named by
//! ordinal (`Value`, `Value2`, `Value3`, ...) after grouping equal shapes
//! together in first-seen order. A shape's storage comes from the component
//! dispatch table: buffer elements are stored as arrays, everything else as
//! a single value.
//!
//! Serialized-property paths follow one dotted scheme throughout:
//! `Value` for the field, `Value.Array.data[2]` for a sequence element and
//! `Value.Array.data[2].Target` for a member inside it.

use crate::contracts::{ContractRule, FieldStorage};
use crate::index::AssemblyIndex;
use crate::log::ActivityLog;
use ecsgen_model::{
    FieldDef, TypeAttributes, TypeContext, TypeDefId, TypeRef, TypeRelations, definition_name,
};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::{instrument, warn};

/// Name of the first synthesized field.
pub const FIELD_NAME: &str = "Value";

/// A field added to an authoring type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SynthesizedField {
    pub owner: TypeDefId,
    pub name: String,
    /// The bound component shape.
    pub component: TypeRef,
    pub storage: FieldStorage,
}

impl SynthesizedField {
    /// Declared type of the field.
    pub fn field_type(&self) -> TypeRef {
        match self.storage {
            FieldStorage::Single => self.component.clone(),
            FieldStorage::Sequence => TypeRef::array(self.component.clone()),
        }
    }

    /// Serialized-property path of the field.
    pub fn property_path(&self) -> &str {
        &self.name
    }

    /// Path of the `index`-th element of a sequence field; `None` for a
    /// single-value field.
    pub fn element_path(&self, index: usize) -> Option<String> {
        match self.storage {
            FieldStorage::Single => None,
            FieldStorage::Sequence => Some(format!("{}.Array.data[{index}]", self.name)),
        }
    }
}

/// Path of `member` inside the value at `path`.
pub fn member_path(path: &str, member: &str) -> String {
    format!("{path}.{member}")
}

/// Ordinal field name: `Value` for the first, `Value{n}` after that.
pub fn field_name(ordinal: usize) -> String {
    if ordinal == 0 {
        FIELD_NAME.to_string()
    } else {
        format!("{FIELD_NAME}{}", ordinal + 1)
    }
}

/// Storage of `component` per the dispatch table; `None` when no rule applies.
pub fn classify(
    relations: &TypeRelations<'_>,
    rules: &[ContractRule],
    component: &TypeRef,
) -> Option<FieldStorage> {
    rules
        .iter()
        .find(|rule| relations.is_assignable(component, rule.predicate()))
        .map(|rule| rule.storage)
}

/// Order bound arguments so equal shapes sit together, groups in first-seen
/// order.
fn group_arguments(arguments: &[TypeRef]) -> Vec<TypeRef> {
    let mut groups: IndexMap<String, Vec<&TypeRef>> = IndexMap::new();
    for arg in arguments {
        groups.entry(arg.unique_name()).or_default().push(arg);
    }
    groups.into_values().flatten().cloned().collect()
}

/// First base of `ty` that instantiates one of `templates` (given as
/// definition names).
fn authoring_instance(
    relations: &TypeRelations<'_>,
    templates: &FxHashSet<String>,
    ty: &TypeRef,
) -> Option<TypeRef> {
    relations
        .base_chain(ty)
        .find(|base| base.is_generic_instance() && templates.contains(&definition_name(base)))
}

/// Add one public field per bound component shape to every authoring type
/// in `index`.
///
/// A field whose name already exists on the authoring type is left alone,
/// so running the pass again adds nothing. Component shapes declared by the
/// target image are flagged serializable.
#[instrument(skip_all)]
pub fn synthesize_fields(
    ctx: &mut TypeContext,
    index: &AssemblyIndex,
    authoring_templates: &[TypeRef],
    rules: &[ContractRule],
    log: &mut ActivityLog,
) -> Vec<SynthesizedField> {
    let planned: Vec<SynthesizedField> = {
        let relations = TypeRelations::new(ctx);
        let target = ctx.target();
        let templates: FxHashSet<String> =
            authoring_templates.iter().map(definition_name).collect();

        let authoring: Vec<(TypeDefId, TypeRef)> = index
            .types()
            .filter_map(|id| {
                authoring_instance(&relations, &templates, &target.reference_to(id))
                    .map(|instance| (id, instance))
            })
            .collect();

        log.line("");
        log.list(
            "Found authoring types",
            authoring
                .iter()
                .map(|(id, instance)| format!("{} : {instance}", target.full_name(*id))),
        );

        authoring
            .into_iter()
            .flat_map(|(owner, instance)| {
                group_arguments(instance.arguments())
                    .into_iter()
                    .enumerate()
                    .map(move |(ordinal, component)| (owner, ordinal, component))
            })
            .map(|(owner, ordinal, component)| {
                let storage = classify(&relations, rules, &component).unwrap_or_else(|| {
                    warn!(%component, "component shape matches no dispatch rule, storing as a single value");
                    FieldStorage::Single
                });
                SynthesizedField {
                    owner,
                    name: field_name(ordinal),
                    component,
                    storage,
                }
            })
            .collect()
    };

    let mut added = Vec::with_capacity(planned.len());
    for field in planned {
        mark_serializable(ctx, &field.component);

        let image = ctx.target_mut();
        let Some(owner) = image.get_mut(field.owner) else {
            continue;
        };
        if owner.field(&field.name).is_some() {
            continue;
        }
        owner.fields.push(FieldDef::public(field.name.clone(), field.field_type()));
        log.line(format!(
            "- Added {} {} to authoring component {}",
            field.field_type(),
            field.property_path(),
            owner.name
        ));
        added.push(field);
    }
    added
}

fn mark_serializable(ctx: &mut TypeContext, component: &TypeRef) {
    if !ctx.is_declared_in_target(component) {
        return;
    }
    let image = ctx.target_mut();
    let id = component.full_name().and_then(|name| image.find(name));
    if let Some(def) = id.and_then(|id| image.get_mut(id)) {
        def.attributes |= TypeAttributes::SERIALIZABLE;
    }
}

#[cfg(test)]
#[path = "../tests/fields_tests.rs"]
mod tests;
