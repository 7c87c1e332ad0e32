//! Structural assignability and base-chain tests over a small three-assembly
//! world: a core library, an engine library and a target sample assembly.

use ecsgen_common::AssemblyIdentity;
use ecsgen_model::{AssemblyImage, TypeContext, TypeDef, TypeRef, TypeRelations};
use std::sync::Arc;

const CORE: &str = "System.Core";
const ENGINE: &str = "Engine";
const SAMPLES: &str = "Samples";

fn core(name: &str) -> TypeRef {
    TypeRef::named(CORE, name)
}

fn engine(name: &str) -> TypeRef {
    TypeRef::named(ENGINE, name)
}

fn sample(name: &str) -> TypeRef {
    TypeRef::named(SAMPLES, format!("Samples.{name}"))
}

fn generic(element: TypeRef, arguments: Vec<TypeRef>) -> TypeRef {
    TypeRef::generic(element, arguments)
}

fn core_image() -> AssemblyImage {
    let mut image = AssemblyImage::new(AssemblyIdentity::new(CORE));
    image.add_type(TypeDef::class("System", "Object"));
    image.add_type(TypeDef::structure("System", "ValueType").with_base(core("System.Object")));
    image
}

fn engine_image() -> AssemblyImage {
    let mut image = AssemblyImage::new(AssemblyIdentity::new(ENGINE));
    image.add_reference(AssemblyIdentity::new(CORE));
    image.add_type(TypeDef::class("Engine", "Object").with_base(core("System.Object")));
    image.add_type(TypeDef::class("Engine", "Component").with_base(engine("Engine.Object")));
    image.add_type(TypeDef::class("Engine", "MonoBehaviour").with_base(engine("Engine.Component")));
    image.add_type(TypeDef::interface("Engine", "IGenericComponentAuthoring"));
    image.add_type(
        TypeDef::class("Engine", "GenericComponentAuthoring")
            .with_base(engine("Engine.MonoBehaviour"))
            .with_interfaces(vec![engine("Engine.IGenericComponentAuthoring")]),
    );
    image.add_type(
        TypeDef::class("Engine", "GenericComponentAuthoring`1")
            .with_generic_params(["T"])
            .with_base(engine("Engine.GenericComponentAuthoring")),
    );
    image.add_type(
        TypeDef::class("Engine", "Baker`1")
            .with_generic_params(["T"])
            .with_base(core("System.Object")),
    );
    image.add_type(
        TypeDef::class("Engine", "GenericBaker`1")
            .with_generic_params(["T"])
            .with_base(generic(engine("Engine.Baker`1"), vec![TypeRef::param(0, "T")])),
    );
    image
}

fn samples_image() -> AssemblyImage {
    let mut image = AssemblyImage::new(AssemblyIdentity::new(SAMPLES));
    image.add_reference(AssemblyIdentity::new(CORE));
    image.add_reference(AssemblyIdentity::new(ENGINE));

    let value_type = core("System.ValueType");
    image.add_type(TypeDef::interface("Samples", "ISample01"));
    image.add_type(TypeDef::interface("Samples", "ISample02"));
    image.add_type(TypeDef::interface("Samples", "IGeneric`1").with_generic_params(["T"]));
    image.add_type(TypeDef::interface("Samples", "IAnotherGeneric`1").with_generic_params(["T"]));
    image.add_type(TypeDef::interface("Samples", "IGeneric`2").with_generic_params(["T1", "T2"]));
    image.add_type(
        TypeDef::structure("Samples", "Sample01")
            .with_base(value_type.clone())
            .with_interfaces(vec![sample("ISample01")]),
    );
    image.add_type(
        TypeDef::structure("Samples", "Sample02")
            .with_base(value_type.clone())
            .with_interfaces(vec![sample("ISample02")]),
    );
    image.add_type(
        TypeDef::structure("Samples", "AnotherSample")
            .with_base(value_type.clone())
            .with_interfaces(vec![generic(sample("IGeneric`1"), vec![sample("Sample01")])]),
    );
    image.add_type(
        TypeDef::structure("Samples", "YetAnotherSample")
            .with_base(value_type)
            .with_interfaces(vec![generic(
                sample("IGeneric`2"),
                vec![sample("Sample01"), sample("Sample02")],
            )]),
    );
    image.add_type(
        TypeDef::class("Samples", "MyClass01")
            .with_base(core("System.Object"))
            .with_interfaces(vec![sample("ISample01")]),
    );
    image.add_type(TypeDef::class("Samples", "MyClass02").with_base(sample("MyClass01")));
    image.add_type(TypeDef::class("Samples", "Authoring").with_base(generic(
        engine("Engine.GenericComponentAuthoring`1"),
        vec![sample("Sample01")],
    )));
    image
}

fn world() -> TypeContext {
    TypeContext::new(
        samples_image(),
        vec![Arc::new(core_image()), Arc::new(engine_image())],
    )
}

// =============================================================================
// Identity
// =============================================================================

#[test]
fn test_unique_name_combines_full_name_and_assembly() {
    assert_eq!(sample("Sample01").unique_name(), "Samples.Sample01/Samples");
    assert_eq!(
        generic(sample("IGeneric`1"), vec![sample("Sample01")]).unique_name(),
        "Samples.IGeneric`1[[Samples.Sample01/Samples]]/Samples"
    );
    assert_eq!(
        TypeRef::array(sample("Sample01")).unique_name(),
        "Samples.Sample01/Samples[]"
    );
}

#[test]
fn test_unique_name_is_stable_across_resolution() {
    let ctx = world();
    let resolved = ctx.resolve(&sample("Sample01")).expect("resolves");
    assert_eq!(
        resolved.image.unique_name(resolved.id),
        sample("Sample01").unique_name()
    );
}

// =============================================================================
// Assignability
// =============================================================================

#[test]
fn test_assignability_is_reflexive() {
    let ctx = world();
    let relations = TypeRelations::new(&ctx);
    for ty in [
        sample("Sample01"),
        sample("ISample02"),
        generic(sample("IGeneric`1"), vec![sample("Sample02")]),
        TypeRef::array(sample("Sample01")),
        engine("Engine.MonoBehaviour"),
        sample("Unknown"),
    ] {
        assert!(relations.is_assignable(&ty, &ty), "{ty} should be assignable to itself");
    }
}

#[test]
fn test_assignable_to_directly_implemented_interface() {
    let ctx = world();
    let relations = TypeRelations::new(&ctx);
    assert!(relations.is_assignable(&sample("Sample01"), &sample("ISample01")));
    assert!(!relations.is_assignable(&sample("Sample01"), &sample("ISample02")));
}

#[test]
fn test_generic_interface_matches_argument_wise() {
    let ctx = world();
    let relations = TypeRelations::new(&ctx);
    let candidate = sample("AnotherSample");

    assert!(relations.is_assignable(
        &candidate,
        &generic(sample("IGeneric`1"), vec![sample("ISample01")])
    ));
    assert!(relations.is_assignable(
        &candidate,
        &generic(sample("IGeneric`1"), vec![sample("Sample01")])
    ));
    assert!(!relations.is_assignable(
        &candidate,
        &generic(sample("IGeneric`1"), vec![sample("ISample02")])
    ));
}

#[test]
fn test_single_argument_generic_follows_argument_assignability() {
    let ctx = world();
    let relations = TypeRelations::new(&ctx);
    let of = |arg: &str| generic(sample("IGeneric`1"), vec![sample(arg)]);

    assert!(relations.is_assignable(&of("Sample01"), &of("ISample01")));
    assert!(!relations.is_assignable(&of("ISample01"), &of("Sample01")));
    assert!(!relations.is_assignable(&of("Sample01"), &of("Sample02")));
}

#[test]
fn test_nested_generic_arguments_recurse() {
    let ctx = world();
    let relations = TypeRelations::new(&ctx);
    let nested = |arg: &str| {
        generic(
            sample("IGeneric`1"),
            vec![generic(sample("IGeneric`1"), vec![sample(arg)])],
        )
    };
    assert!(relations.is_assignable(&nested("Sample01"), &nested("ISample01")));
    assert!(!relations.is_assignable(&nested("Sample01"), &nested("ISample02")));
}

#[test]
fn test_multi_argument_generic_requires_positional_match() {
    let ctx = world();
    let relations = TypeRelations::new(&ctx);
    let candidate = sample("YetAnotherSample");

    assert!(relations.is_assignable(
        &candidate,
        &generic(
            sample("IGeneric`2"),
            vec![sample("ISample01"), sample("ISample02")]
        )
    ));
    assert!(!relations.is_assignable(
        &candidate,
        &generic(
            sample("IGeneric`2"),
            vec![sample("ISample02"), sample("ISample01")]
        )
    ));

    let pair = generic(
        sample("IGeneric`2"),
        vec![sample("Sample01"), sample("Sample02")],
    );
    let swapped = generic(
        sample("IGeneric`2"),
        vec![sample("Sample02"), sample("Sample01")],
    );
    assert!(relations.is_assignable(&pair, &pair));
    assert!(!relations.is_assignable(&pair, &swapped));
}

#[test]
fn test_unrelated_generic_contracts_do_not_match() {
    let ctx = world();
    let relations = TypeRelations::new(&ctx);
    assert!(!relations.is_assignable(
        &sample("AnotherSample"),
        &generic(sample("IAnotherGeneric`1"), vec![sample("Sample01")])
    ));
    assert!(!relations.is_assignable(
        &generic(sample("IGeneric`1"), vec![sample("Sample01")]),
        &generic(sample("IAnotherGeneric`1"), vec![sample("Sample01")])
    ));
}

#[test]
fn test_different_arity_does_not_match() {
    let ctx = world();
    let relations = TypeRelations::new(&ctx);
    assert!(!relations.is_assignable(
        &sample("YetAnotherSample"),
        &generic(sample("IGeneric`1"), vec![sample("Sample01")])
    ));
}

#[test]
fn test_interface_inherited_through_base_class() {
    let ctx = world();
    let relations = TypeRelations::new(&ctx);
    assert!(relations.is_assignable(&sample("MyClass02"), &sample("ISample01")));
    assert!(!relations.is_assignable(&sample("MyClass02"), &sample("ISample02")));
}

#[test]
fn test_authoring_reaches_interface_through_generic_base() {
    let ctx = world();
    let relations = TypeRelations::new(&ctx);
    assert!(relations.is_assignable(
        &sample("Authoring"),
        &engine("Engine.IGenericComponentAuthoring")
    ));
    assert!(!relations.is_assignable(&sample("Authoring"), &sample("ISample02")));
}

#[test]
fn test_base_in_referenced_assembly() {
    let ctx = world();
    let relations = TypeRelations::new(&ctx);
    assert!(relations.is_assignable(&sample("Authoring"), &engine("Engine.MonoBehaviour")));
    assert!(relations.is_assignable(&sample("Authoring"), &core("System.Object")));
}

#[test]
fn test_unresolved_candidate_is_only_assignable_to_itself() {
    let ctx = world();
    let relations = TypeRelations::new(&ctx);
    let missing = TypeRef::named("Missing", "Missing.Type");
    assert!(!relations.is_assignable(&missing, &core("System.Object")));
}

#[test]
fn test_deep_inheritance_is_transitive() {
    let mut target = AssemblyImage::new(AssemblyIdentity::new(SAMPLES));
    target.add_type(TypeDef::class("Samples", "Level0").with_interfaces(vec![sample("ISample01")]));
    target.add_type(TypeDef::interface("Samples", "ISample01"));
    for level in 1..64 {
        target.add_type(
            TypeDef::class("Samples", format!("Level{level}"))
                .with_base(sample(&format!("Level{}", level - 1))),
        );
    }
    let ctx = TypeContext::new(target, Vec::new());
    let relations = TypeRelations::new(&ctx);

    assert!(relations.is_assignable(&sample("Level63"), &sample("Level0")));
    assert!(relations.is_assignable(&sample("Level63"), &sample("ISample01")));
    assert!(!relations.is_assignable(&sample("Level0"), &sample("Level63")));
}

#[test]
fn test_cyclic_base_chain_terminates() {
    let mut target = AssemblyImage::new(AssemblyIdentity::new(SAMPLES));
    target.add_type(TypeDef::class("Samples", "A").with_base(sample("B")));
    target.add_type(TypeDef::class("Samples", "B").with_base(sample("A")));
    target.add_type(TypeDef::interface("Samples", "ISample01"));
    let ctx = TypeContext::new(target, Vec::new());
    let relations = TypeRelations::new(&ctx);

    assert!(!relations.is_assignable(&sample("A"), &sample("ISample01")));
    assert!(relations.is_assignable(&sample("A"), &sample("B")));
    let chain: Vec<TypeRef> = relations.base_chain(&sample("A")).collect();
    assert_eq!(chain, vec![sample("B")]);
}

#[test]
fn test_long_base_chain_has_no_length_limit() {
    let mut target = AssemblyImage::new(AssemblyIdentity::new(SAMPLES));
    target.add_type(TypeDef::interface("Samples", "ISample01"));
    target.add_type(TypeDef::class("Samples", "Level0").with_interfaces(vec![sample("ISample01")]));
    for level in 1..400 {
        target.add_type(
            TypeDef::class("Samples", format!("Level{level}"))
                .with_base(sample(&format!("Level{}", level - 1))),
        );
    }
    let ctx = TypeContext::new(target, Vec::new());
    let relations = TypeRelations::new(&ctx);

    assert!(relations.is_assignable(&sample("Level399"), &sample("Level0")));
    assert!(relations.is_assignable(&sample("Level399"), &sample("ISample01")));
    assert_eq!(relations.base_chain(&sample("Level399")).count(), 399);
    assert_eq!(
        relations.base_chain(&sample("Level399")).last(),
        Some(sample("Level0"))
    );
}

#[test]
fn test_self_expanding_generic_base_terminates() {
    let mut target = AssemblyImage::new(AssemblyIdentity::new(SAMPLES));
    target.add_type(TypeDef::interface("Samples", "ISample01"));
    target.add_type(TypeDef::class("Samples", "Box`1").with_generic_params(["T"]));
    target.add_type(
        TypeDef::class("Samples", "Node`1")
            .with_generic_params(["T"])
            .with_base(generic(
                sample("Node`1"),
                vec![generic(sample("Box`1"), vec![TypeRef::param(0, "T")])],
            )),
    );
    let ctx = TypeContext::new(target, Vec::new());
    let relations = TypeRelations::new(&ctx);

    let node = generic(sample("Node`1"), vec![sample("ISample01")]);
    assert!(!relations.is_assignable(&node, &sample("ISample01")));
    assert_eq!(relations.base_chain(&node).count(), 0);
}

// =============================================================================
// Base chains
// =============================================================================

#[test]
fn test_base_chain_substitutes_generic_arguments() {
    let ctx = world();
    let relations = TypeRelations::new(&ctx);
    let chain: Vec<String> = relations
        .base_chain(&sample("Authoring"))
        .map(|t| t.to_string())
        .collect();
    assert_eq!(
        chain,
        vec![
            "Engine.GenericComponentAuthoring`1<Samples.Sample01>",
            "Engine.GenericComponentAuthoring",
            "Engine.MonoBehaviour",
            "Engine.Component",
            "Engine.Object",
            "System.Object",
        ]
    );

    let baker = generic(engine("Engine.GenericBaker`1"), vec![sample("Sample01")]);
    let first = relations.base_chain(&baker).next().expect("has a base");
    assert_eq!(first, generic(engine("Engine.Baker`1"), vec![sample("Sample01")]));
}

#[test]
fn test_base_chain_of_root_or_unresolved_is_empty() {
    let ctx = world();
    let relations = TypeRelations::new(&ctx);
    assert_eq!(relations.base_chain(&core("System.Object")).count(), 0);
    assert_eq!(relations.base_chain(&sample("Missing")).count(), 0);
}

#[test]
fn test_find_base_instance_returns_bound_template() {
    let ctx = world();
    let relations = TypeRelations::new(&ctx);
    let template = engine("Engine.GenericComponentAuthoring`1");

    let found = relations
        .find_base_instance(&sample("Authoring"), &template)
        .expect("authoring derives from the template");
    assert_eq!(found.arguments(), &[sample("Sample01")]);
    assert!(relations.find_base_instance(&sample("MyClass02"), &template).is_none());
}
