use super::*;
use crate::members::{FieldDef, Instruction, MethodDef, MethodRef};
use crate::symbols::SourceLocation;

fn void() -> TypeRef {
    TypeRef::named("System", "System.Void")
}

fn sample_image() -> AssemblyImage {
    let mut image = AssemblyImage::new(AssemblyIdentity::new("Game").with_version([1, 2, 0, 0]));
    image.add_reference(AssemblyIdentity::new("System"));
    let health = image.add_type(
        TypeDef::structure("Game.Components", "Health")
            .with_field(FieldDef::public("Current", TypeRef::named("System", "System.Single")))
            .with_source(SourceLocation::new("Assets/Health.cs", 4)),
    );
    image.add_nested_type(
        health,
        TypeDef::class("", "Baker").with_base(TypeRef::named("System", "System.Object")),
    );
    image
}

#[test]
fn test_nested_full_name_uses_slash() {
    let image = sample_image();
    let health = image.find("Game.Components.Health").expect("top-level type");
    let baker = image.find("Game.Components.Health/Baker").expect("nested type");

    assert_eq!(image[baker].declaring, Some(health));
    assert_eq!(image[health].nested, vec![baker]);
    assert_eq!(
        image.unique_name(baker),
        "Game.Components.Health/Baker/Game"
    );
}

#[test]
fn test_type_ids_are_depth_first() {
    let mut image = sample_image();
    image.add_type(TypeDef::structure("Game.Components", "Speed"));
    let names: Vec<String> = image
        .type_ids()
        .into_iter()
        .map(|id| image.full_name(id))
        .collect();
    assert_eq!(
        names,
        vec![
            "Game.Components.Health",
            "Game.Components.Health/Baker",
            "Game.Components.Speed",
        ]
    );
}

#[test]
fn test_add_reference_deduplicates_and_skips_self() {
    let mut image = sample_image();
    image.add_reference(AssemblyIdentity::new("System").with_version([4, 0, 0, 0]));
    image.add_reference(AssemblyIdentity::new("Game"));
    assert_eq!(image.references().len(), 1);
}

#[test]
fn test_write_then_read_preserves_graph_and_symbols() {
    let image = sample_image();
    let bytes = image.write().expect("valid image");
    let decoded = AssemblyImage::read(&bytes.pe, Some(bytes.pdb.as_slice())).expect("decodes");

    assert_eq!(decoded.identity(), image.identity());
    assert_eq!(decoded.len(), 2);
    let health = decoded.find("Game.Components.Health").expect("lookup rebuilt");
    assert_eq!(
        decoded[health].source,
        Some(SourceLocation::new("Assets/Health.cs", 4))
    );
    assert!(decoded.find("Game.Components.Health/Baker").is_some());
}

#[test]
fn test_read_without_symbols_leaves_sources_empty() {
    let bytes = sample_image().write().expect("valid image");
    let decoded = AssemblyImage::read(&bytes.pe, None).expect("decodes");
    assert!(decoded.type_ids().iter().all(|&id| decoded[id].source.is_none()));
}

#[test]
fn test_symbols_mark_generated_types_hidden() {
    let symbols = sample_image().symbols();
    assert_eq!(symbols.entries.len(), 2);
    assert_eq!(symbols.hidden_count(), 1);
    assert_eq!(
        symbols.location_of("Game.Components.Health"),
        Some(&SourceLocation::new("Assets/Health.cs", 4))
    );
}

#[test]
fn test_read_rejects_foreign_format() {
    let pe = br#"{"format":"something-else","version":1,"assembly":{"identity":{"name":"X"}}}"#;
    match AssemblyImage::read(pe, None) {
        Err(ImageError::UnsupportedFormat { format, version }) => {
            assert_eq!(format, "something-else");
            assert_eq!(version, 1);
        }
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
}

#[test]
fn test_read_rejects_garbage() {
    assert!(matches!(
        AssemblyImage::read(b"MZ\x90\x00", None),
        Err(ImageError::Decode(_))
    ));
}

#[test]
fn test_write_rejects_duplicate_field_names() {
    let mut image = sample_image();
    image.add_type(
        TypeDef::class("Game", "Twice")
            .with_field(FieldDef::public("Value", TypeRef::named("Game", "Game.A")))
            .with_field(FieldDef::public("Value", TypeRef::named("Game", "Game.B"))),
    );
    let err = image.write().expect_err("duplicate fields");
    assert!(err.to_string().contains("duplicate field 'Value'"), "{err}");
}

#[test]
fn test_write_rejects_constructor_without_return() {
    let mut image = sample_image();
    let mut ctor = MethodDef::default_constructor(
        MethodRef {
            declaring_type: TypeRef::named("System", "System.Object"),
            name: ".ctor".to_string(),
            parameters: Vec::new(),
            return_type: void(),
        },
        void(),
    );
    ctor.body.retain(|i| *i != Instruction::Return);
    image.add_type(TypeDef::class("Game", "Broken").with_method(ctor));
    assert!(matches!(image.write(), Err(ImageError::Malformed { .. })));
}

fn with_root(pe: &[u8], root: u32) -> Vec<u8> {
    let mut encoded: serde_json::Value = serde_json::from_slice(pe).expect("json");
    encoded["assembly"]["roots"]
        .as_array_mut()
        .expect("roots")
        .push(serde_json::json!(root));
    serde_json::to_vec(&encoded).expect("encode")
}

#[test]
fn test_read_rejects_dangling_root() {
    let bytes = sample_image().write().expect("write");
    match AssemblyImage::read(&with_root(&bytes.pe, 99), Some(bytes.pdb.as_slice())) {
        Err(ImageError::Malformed { reason, .. }) => {
            assert!(reason.contains("dangling root type id 99"), "{reason}");
        }
        other => panic!("expected Malformed, got {other:?}"),
    }
}

#[test]
fn test_read_rejects_nested_type_as_root() {
    let bytes = sample_image().write().expect("write");
    // Node 1 is the nested Baker.
    let err = AssemblyImage::read(&with_root(&bytes.pe, 1), None).expect_err("nested root");
    assert!(err.to_string().contains("nested type 'Baker' listed as a root"), "{err}");
}

#[test]
fn test_save_and_load_use_sibling_pdb() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("Game.dll");
    sample_image().save(&path).expect("save");

    assert!(dir.path().join("Game.pdb").is_file());
    let loaded = AssemblyImage::load(&path).expect("load");
    let health = loaded.find("Game.Components.Health").expect("type");
    assert!(loaded[health].source.is_some());
}

#[test]
fn test_load_missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("Missing.dll");
    let err = AssemblyImage::load(&path).expect_err("missing");
    assert!(matches!(err, ImageError::Io { .. }));
    assert!(err.to_string().contains("Missing.dll"));
}
