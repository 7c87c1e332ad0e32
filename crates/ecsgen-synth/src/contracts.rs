//! Host contracts.
//!
//! The generator never hard-codes where the host's marker interfaces,
//! companion templates and marker attributes live. Each is a [`HostType`]
//! (owning assembly plus full name) collected in [`HostContracts`], which
//! the configuration file can override field by field. From those names this
//! module derives the two tables the passes run on:
//!
//! - the component dispatch table ([`HostContracts::component_rules`]): how a
//!   bound component shape is stored on an authoring type
//! - the companion passes ([`HostContracts::companion_passes`]): which
//!   companions to synthesize, in order, and which attribute marks them

use crate::synthesis::SynthesisRequest;
use ecsgen_model::TypeRef;
use serde::{Deserialize, Serialize};

/// A type declared by a host assembly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostType {
    /// Simple name of the declaring assembly.
    pub assembly: String,
    /// Full name, generic definitions with their arity suffix.
    pub full_name: String,
}

impl HostType {
    pub fn new(assembly: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            assembly: assembly.into(),
            full_name: full_name.into(),
        }
    }

    pub fn to_ref(&self) -> TypeRef {
        TypeRef::named(self.assembly.clone(), self.full_name.clone())
    }
}

// =============================================================================
// Component dispatch
// =============================================================================

/// How a component shape is stored on an authoring type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldStorage {
    /// One value of the shape.
    Single,
    /// An array of the shape (dynamic buffer elements).
    Sequence,
}

/// One row of the component dispatch table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractRule {
    /// The contract as the host declares it, e.g. `IEnumerable<IBufferElementData>`.
    pub contract: TypeRef,
    pub storage: FieldStorage,
}

impl ContractRule {
    pub fn new(contract: TypeRef, storage: FieldStorage) -> Self {
        Self { contract, storage }
    }

    /// The type a component shape must be assignable to for this rule to
    /// apply: the first argument of a generic contract, the contract itself
    /// otherwise.
    pub fn predicate(&self) -> &TypeRef {
        self.contract.arguments().first().unwrap_or(&self.contract)
    }
}

// =============================================================================
// Companion passes
// =============================================================================

/// One companion synthesis pass plus the attribute that marks its output.
#[derive(Clone, Debug)]
pub struct CompanionPass {
    pub request: SynthesisRequest,
    /// Marker attribute attached to every synthesized companion, bound to
    /// the companion's source type.
    pub attribute: Option<TypeRef>,
}

// =============================================================================
// HostContracts
// =============================================================================

/// Names of every host type the generator reasons about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostContracts {
    /// Marker interface of single-value runtime components.
    pub component_data: HostType,
    /// Marker interface of dynamic buffer elements.
    pub buffer_element_data: HostType,
    /// Generic sequence interface wrapping buffer elements (`IEnumerable`1`).
    pub enumerable: HostType,
    /// Marker interface implemented by every authoring component.
    pub authoring_interface: HostType,
    /// Non-generic authoring base, the search contract for inspector editors.
    pub authoring_base: HostType,
    /// Generic authoring bases, one per arity; their arguments become
    /// authoring fields.
    pub authoring_templates: Vec<HostType>,
    /// Host baker base; user-authored bakers derive from it directly.
    pub baker: HostType,
    pub generic_baker: HostType,
    pub generic_drawer: HostType,
    pub generic_inspector_editor: HostType,
    pub property_drawer_attribute: HostType,
    pub custom_editor_attribute: HostType,
}

impl Default for HostContracts {
    fn default() -> Self {
        const ENTITIES: &str = "Unity.Entities";
        const EDITOR: &str = "UnityEditor.CoreModule";
        const AUTHORING: &str = "Ecs.Authoring";
        const AUTHORING_EDITOR: &str = "Ecs.Authoring.Editor";

        Self {
            component_data: HostType::new(ENTITIES, "Unity.Entities.IComponentData"),
            buffer_element_data: HostType::new(ENTITIES, "Unity.Entities.IBufferElementData"),
            enumerable: HostType::new("netstandard", "System.Collections.Generic.IEnumerable`1"),
            authoring_interface: HostType::new(
                AUTHORING,
                "Ecs.Authoring.IGenericComponentAuthoring",
            ),
            authoring_base: HostType::new(AUTHORING, "Ecs.Authoring.GenericComponentAuthoring"),
            authoring_templates: (1..=3)
                .map(|arity| {
                    HostType::new(
                        AUTHORING,
                        format!("Ecs.Authoring.GenericComponentAuthoring`{arity}"),
                    )
                })
                .collect(),
            baker: HostType::new(ENTITIES, "Unity.Entities.Baker`1"),
            generic_baker: HostType::new(AUTHORING, "Ecs.Authoring.GenericBaker`1"),
            generic_drawer: HostType::new(AUTHORING_EDITOR, "Ecs.Authoring.Editor.GenericDrawer`1"),
            generic_inspector_editor: HostType::new(
                AUTHORING_EDITOR,
                "Ecs.Authoring.Editor.GenericInspectorEditor`1",
            ),
            property_drawer_attribute: HostType::new(EDITOR, "UnityEditor.CustomPropertyDrawer"),
            custom_editor_attribute: HostType::new(EDITOR, "UnityEditor.CustomEditor"),
        }
    }
}

impl HostContracts {
    pub fn authoring_template_refs(&self) -> Vec<TypeRef> {
        self.authoring_templates.iter().map(HostType::to_ref).collect()
    }

    /// Component dispatch table, checked in order, first match wins.
    pub fn component_rules(&self) -> Vec<ContractRule> {
        vec![
            ContractRule::new(self.component_data.to_ref(), FieldStorage::Single),
            ContractRule::new(
                TypeRef::generic(
                    self.enumerable.to_ref(),
                    vec![self.buffer_element_data.to_ref()],
                ),
                FieldStorage::Sequence,
            ),
        ]
    }

    /// Companion passes in execution order: drawers, inspector editors when
    /// enabled, bakers.
    pub fn companion_passes(&self, inspector_editors: bool) -> Vec<CompanionPass> {
        let mut passes = vec![CompanionPass {
            request: SynthesisRequest::new("CustomDrawer", self.generic_drawer.to_ref())
                .with_contracts(vec![
                    self.component_data.to_ref(),
                    self.buffer_element_data.to_ref(),
                ]),
            attribute: Some(self.property_drawer_attribute.to_ref()),
        }];

        if inspector_editors {
            passes.push(CompanionPass {
                request: SynthesisRequest::new(
                    "AuthoringEditor",
                    self.generic_inspector_editor.to_ref(),
                )
                .with_contracts(vec![self.authoring_base.to_ref()]),
                attribute: Some(self.custom_editor_attribute.to_ref()),
            });
        }

        passes.push(CompanionPass {
            request: SynthesisRequest::new("Baker", self.generic_baker.to_ref())
                .with_contracts(vec![self.authoring_interface.to_ref()])
                .with_recognized(vec![self.baker.to_ref()]),
            attribute: None,
        });
        passes
    }
}

#[cfg(test)]
#[path = "../tests/contracts_tests.rs"]
mod tests;
