//! Attribute synthesis.

use crate::error::SynthesisError;
use ecsgen_common::names::TYPE_DESCRIPTOR;
use ecsgen_model::{
    AttributeArgument, AttributeValue, CustomAttribute, MethodDef, TypeContext, TypeDefId, TypeRef,
    TypeRelations,
};
use tracing::debug;

/// Attach an instance of `attribute` to `target`, constructed with one
/// type-valued argument per entry of `arguments`.
///
/// The first constructor of the attribute type whose parameters accept the
/// arguments is used. A parameter typed as the type descriptor
/// (`System.Type`) accepts any argument; any other parameter requires the
/// argument to be assignable to it.
///
/// Fails without touching the image when `target` is not a node of the
/// target image.
pub fn attach(
    ctx: &mut TypeContext,
    target: TypeDefId,
    attribute: &TypeRef,
    arguments: &[TypeRef],
) -> Result<(), SynthesisError> {
    let (constructor, attribute_assembly) = {
        let resolved = ctx
            .resolve(attribute)
            .ok_or_else(|| SynthesisError::UnresolvedType {
                ty: attribute.to_string(),
                role: "attribute type",
            })?;
        let relations = TypeRelations::new(ctx);
        let constructor = resolved
            .def
            .constructors()
            .find(|ctor| parameters_match(&relations, ctor, arguments))
            .ok_or_else(|| SynthesisError::NoMatchingConstructor {
                attribute: attribute.to_string(),
                arguments: arguments.iter().map(ToString::to_string).collect(),
            })?;
        (constructor.clone(), resolved.image.identity().clone())
    };

    let instance = CustomAttribute {
        constructor: constructor.reference(attribute.clone()),
        arguments: constructor
            .parameters
            .iter()
            .zip(arguments)
            .map(|(param, arg)| AttributeArgument {
                arg_type: param.param_type.clone(),
                value: AttributeValue::Type(arg.clone()),
            })
            .collect(),
    };

    let image = ctx.target_mut();
    let Some(def) = image.get_mut(target) else {
        return Err(SynthesisError::UnresolvedType {
            ty: format!("#{}", target.0),
            role: "attribute owner",
        });
    };
    debug!(%attribute, owner = %def.name, "attached attribute");
    def.custom_attributes.push(instance);
    image.add_reference(attribute_assembly);
    Ok(())
}

fn parameters_match(relations: &TypeRelations<'_>, ctor: &MethodDef, arguments: &[TypeRef]) -> bool {
    ctor.parameters.len() == arguments.len()
        && ctor.parameters.iter().zip(arguments).all(|(param, arg)| {
            param.param_type.full_name() == Some(TYPE_DESCRIPTOR)
                || relations.is_assignable(arg, &param.param_type)
        })
}

#[cfg(test)]
#[path = "../tests/attributes_tests.rs"]
mod tests;
