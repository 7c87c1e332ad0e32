use super::*;
use crate::error::SynthesisError;
use crate::test_fixtures::*;
use ecsgen_model::{AttributeValue, ImageError};
use tempfile::TempDir;

fn processor() -> PostProcessor {
    PostProcessor::with_cache(test_config(), host_cache())
}

fn injected(outcome: &ProcessOutcome, suffix: &str) -> Vec<String> {
    outcome
        .injected
        .iter()
        .find(|pass| pass.suffix == suffix)
        .map(|pass| pass.types.clone())
        .unwrap_or_default()
}

#[test]
fn test_should_process_filters_ignored_fragments() {
    let processor = PostProcessor::new(test_config());
    assert!(processor.should_process("Game"));
    assert!(processor.should_process("Game.Components"));
    assert!(!processor.should_process("Unity.Physics"));
    assert!(!processor.should_process("MyGame.codegen.Tests"));
    assert!(!processor.should_process("UniRx.Async"));
    assert!(!processor.should_process("Ecs.Authoring.Editor"));
}

#[test]
fn test_full_pass() {
    let mut processor = processor();
    let outcome = processor.run(ship_image(), &[]).expect("pass succeeds");

    assert!(outcome.changed());
    let fields: Vec<&str> = outcome.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, vec!["Value", "Value2"]);
    assert_eq!(
        injected(&outcome, "CustomDrawer"),
        vec![
            "Game.Health/HealthCustomDrawer",
            "Game.Thruster/ThrusterCustomDrawer"
        ]
    );
    assert_eq!(
        injected(&outcome, "Baker"),
        vec!["Game.ShipAuthoring/ShipAuthoringBaker"]
    );
    assert!(injected(&outcome, "AuthoringEditor").is_empty());

    assert_eq!(
        outcome.diff.added.iter().map(String::as_str).collect::<Vec<_>>(),
        vec![
            "Game.Health/HealthCustomDrawer/Game",
            "Game.ShipAuthoring/ShipAuthoringBaker/Game",
            "Game.Thruster/ThrusterCustomDrawer/Game",
        ]
    );
    assert!(outcome.diff.removed.is_empty());
}

#[test]
fn test_drawers_carry_their_attribute() {
    let mut processor = processor();
    let outcome = processor.run(ship_image(), &[]).expect("pass succeeds");

    let drawer = outcome
        .image
        .find("Game.Health/HealthCustomDrawer")
        .expect("drawer injected");
    let attributes = &outcome.image[drawer].custom_attributes;
    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes[0].attribute_type(), &editor("CustomPropertyDrawer"));
    assert_eq!(
        attributes[0].arguments[0].value,
        AttributeValue::Type(game("Health"))
    );

    let baker = outcome
        .image
        .find("Game.ShipAuthoring/ShipAuthoringBaker")
        .expect("baker injected");
    assert!(outcome.image[baker].custom_attributes.is_empty());
}

#[test]
fn test_second_pass_is_a_no_op() {
    let mut processor = processor();
    let first = processor.run(ship_image(), &[]).expect("first pass");
    let second = processor.run(first.image, &[]).expect("second pass");

    assert!(!second.changed());
    assert!(second.fields.is_empty());
    assert!(second.diff.is_empty());
    assert!(second.injected.iter().all(|pass| pass.types.is_empty()));
}

#[test]
fn test_inspector_editors_when_enabled() {
    let config = PostProcessConfig {
        inject_inspector_editors: true,
        ..test_config()
    };
    let mut processor = PostProcessor::with_cache(config, host_cache());
    let outcome = processor.run(ship_image(), &[]).expect("pass succeeds");

    let suffixes: Vec<&str> = outcome.injected.iter().map(|p| p.suffix.as_str()).collect();
    assert_eq!(suffixes, vec!["CustomDrawer", "AuthoringEditor", "Baker"]);
    assert_eq!(
        injected(&outcome, "AuthoringEditor"),
        vec!["Game.ShipAuthoring/ShipAuthoringAuthoringEditor"]
    );
    assert_eq!(
        injected(&outcome, "Baker"),
        vec!["Game.ShipAuthoring/ShipAuthoringBaker"]
    );

    let editor_id = outcome
        .image
        .find("Game.ShipAuthoring/ShipAuthoringAuthoringEditor")
        .expect("editor injected");
    let attribute = &outcome.image[editor_id].custom_attributes[0];
    assert_eq!(attribute.attribute_type(), &editor("CustomEditor"));
    assert_eq!(
        attribute.arguments[0].value,
        AttributeValue::Type(game("ShipAuthoring"))
    );
}

#[test]
fn test_unresolved_references_fail_the_pass() {
    let config = PostProcessConfig {
        resolve_additional: false,
        ..test_config()
    };
    let mut processor = PostProcessor::with_cache(config, host_cache());

    let err = processor.run(ship_image(), &[]).unwrap_err();
    assert!(matches!(
        err,
        PostProcessError::Synthesis(SynthesisError::UnresolvedType { .. })
    ));
}

#[test]
fn test_log_sections() {
    let mut processor = processor();
    let outcome = processor.run(ship_image(), &[]).expect("pass succeeds");
    let lines = outcome.log.lines();

    assert_eq!(lines[0], "Processing assembly Game, Version=0.0.0.0");
    for expected in [
        "--== Injecting CustomDrawer ==--",
        "--== Injecting Baker ==--",
        "--== Injected CustomDrawer ==--",
        "--== Injected Baker ==--",
        "--== Assembly Diff Added ==--",
        "--== Assembly Diff Removed ==--",
        "**Assembly References**",
        "Game.ShipAuthoring/ShipAuthoringBaker/Game",
        "- Custom Attribute Game.Health/HealthCustomDrawer - UnityEditor.CustomPropertyDrawer Game.Health",
    ] {
        assert!(
            lines.iter().any(|line| line == expected),
            "missing log line: {expected}"
        );
    }
}

#[test]
fn test_log_file_is_appended() {
    let dir = TempDir::new().expect("temp dir");
    let log_path = dir.path().join("Logs").join("PostProcess.log");
    let config = PostProcessConfig {
        log_path: Some(log_path.clone()),
        ..test_config()
    };
    let mut processor = PostProcessor::with_cache(config, host_cache());

    let first = processor.run(ship_image(), &[]).expect("first pass");
    processor.run(first.image, &[]).expect("second pass");

    let written = std::fs::read_to_string(&log_path).expect("log written");
    assert_eq!(written.matches("Processing assembly Game").count(), 2);
    assert!(written.contains("Injecting type Game.Health/HealthCustomDrawer"));
}

#[test]
fn test_process_in_memory_assembly() {
    let bytes = ship_image().write().expect("encode");
    let assembly = CompiledAssembly {
        name: GAME.to_string(),
        pe: bytes.pe,
        pdb: Some(bytes.pdb),
        references: Vec::new(),
    };
    let mut processor = processor();

    let processed = processor
        .process(&assembly)
        .expect("pass succeeds")
        .expect("not ignored");
    let image = AssemblyImage::read(&processed.pe, Some(&processed.pdb)).expect("decode");
    assert!(image.find("Game.Thruster/ThrusterCustomDrawer").is_some());
}

#[test]
fn test_ignored_assembly_is_not_processed() {
    let assembly = CompiledAssembly {
        name: "Unity.Collections".to_string(),
        pe: b"not an image".to_vec(),
        ..CompiledAssembly::default()
    };
    let mut processor = processor();
    assert_eq!(processor.process(&assembly).expect("ignored"), None);
}

#[test]
fn test_process_path_rewrites_once() {
    let dir = TempDir::new().expect("temp dir");
    let references = write_host_images(dir.path());
    let path = dir.path().join("Game.dll");
    ship_image().save(&path).expect("save target");

    let mut processor = PostProcessor::new(test_config());
    assert!(processor.process_path(&path, &references).expect("first pass"));
    assert!(path.with_extension("pdb").is_file());

    let rewritten = AssemblyImage::load(&path).expect("reload");
    assert!(rewritten.find("Game.ShipAuthoring/ShipAuthoringBaker").is_some());
    let ship = rewritten.find("Game.ShipAuthoring").expect("declared");
    assert!(rewritten[ship].field("Value2").is_some());

    let before = std::fs::read(&path).expect("read");
    assert!(!processor.process_path(&path, &references).expect("second pass"));
    assert_eq!(std::fs::read(&path).expect("read"), before);
}

#[test]
fn test_process_path_resolves_through_search_directory() {
    let dir = TempDir::new().expect("temp dir");
    let references = write_host_images(dir.path());
    let path = dir.path().join("Game.dll");
    ship_image().save(&path).expect("save target");

    // Only seed one reference; the rest are probed next to it.
    let config = PostProcessConfig {
        resolve_additional: false,
        ..test_config()
    };
    let mut processor = PostProcessor::new(config);
    assert!(processor.process_path(&path, &references[..1]).expect("pass succeeds"));
}

#[test]
fn test_process_path_missing_file() {
    let dir = TempDir::new().expect("temp dir");
    let mut processor = processor();

    let err = processor
        .process_path(&dir.path().join("Game.dll"), &[])
        .unwrap_err();
    assert!(matches!(err, PostProcessError::Image(ImageError::Io { .. })));

    let ignored = dir.path().join("UniRx.dll");
    assert!(!processor.process_path(&ignored, &[]).expect("ignored"));
}
