//! Incremental import scenarios

use std::sync::Arc;

use void_ir::{Definition, DefinitionReader, DefinitionSource, EventStream, FileSource, MemorySource, ReadEvent};
use void_scene::prelude::*;
use void_scene::{ImportState, CHILDREN_BLOCK, COMPONENTS_BLOCK};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scene_with_objects(count: usize) -> Definition {
    let mut children = Definition::new(CHILDREN_BLOCK);
    for i in 0..count {
        children.add_object(Definition::new("GameObject").with("name", format!("Barrel_{}", i)));
    }
    let zone = Definition::new("Zone").with("name", "Depot").with_object(children);
    Definition::new("Scene")
        .with("name", "Warehouse")
        .with_object(Definition::new(CHILDREN_BLOCK).with_object(zone))
}

/// Serves the first `keep` events of a definition
struct CutSource {
    events: Vec<ReadEvent>,
}

impl DefinitionSource for CutSource {
    fn open(&self, _path: &str) -> void_ir::Result<Box<dyn DefinitionReader>> {
        Ok(Box::new(EventStream::new(self.events.clone())))
    }

    fn save(&mut self, _path: &str, _definition: &Definition) -> void_ir::Result<()> {
        Ok(())
    }
}

#[test]
fn test_hydration_is_bounded_per_call() {
    init_logging();
    let mut source = MemorySource::new();
    source.insert("warehouse.scene", scene_with_objects(5));

    let config = SceneConfig {
        load_step: 2,
        ..SceneConfig::default()
    };
    let mut scene = Scene::with_config("Empty", Arc::new(ComponentRegistry::with_builtin()), config);
    let mut session = ImportSession::new();
    session.begin_import_scene(&mut scene, &source, "warehouse.scene").unwrap();
    assert_eq!(session.total_objects(), 6);
    let skeleton = session.objects();

    let mut progress = Vec::new();
    loop {
        let done = session.update_load(&mut scene);
        progress.push(session.loaded_objects());
        if done {
            break;
        }
        assert_eq!(session.state(), ImportState::Hydrating);
        // Nothing joins the zone before the import completes
        assert!(scene.children(scene.zone(0).unwrap()).is_empty());
    }

    assert_eq!(progress, vec![2, 4, 6]);
    assert_eq!(session.objects(), skeleton);
    assert_eq!(scene.name(), "Warehouse");

    let zone = scene.zone(0).unwrap();
    let names: Vec<_> = scene
        .children(zone)
        .into_iter()
        .map(|c| scene.node(c).unwrap().name().to_string())
        .collect();
    assert_eq!(names, (0..5).map(|i| format!("Barrel_{}", i)).collect::<Vec<_>>());
}

#[test]
fn test_truncated_stream_stalls() {
    init_logging();
    let mut events = scene_with_objects(3).to_events();
    let third = events
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, ReadEvent::BeginObject { name } if name == "GameObject"))
        .nth(2)
        .map(|(i, _)| i)
        .unwrap();
    events.truncate(third + 2);
    let source = CutSource { events };

    let mut scene = Scene::new("Empty", Arc::new(ComponentRegistry::with_builtin()));
    let mut session = ImportSession::new();
    session.begin_import_scene(&mut scene, &source, "cut.scene").unwrap();
    assert_eq!(session.total_objects(), 4);

    assert!(!session.update_load(&mut scene));
    assert!(session.is_stalled());
    assert_eq!(session.loaded_objects(), 3);
    assert!(!session.update_load(&mut scene));
    assert_eq!(session.loaded_objects(), 3);

    // What was built so far stays in place
    assert_eq!(scene.node_count(), 4);
}

#[test]
fn test_missing_stream_creates_nothing() {
    init_logging();
    let mut scene = Scene::new("Empty", Arc::new(ComponentRegistry::with_builtin()));
    let mut session = ImportSession::new();

    let result = session.begin_import_scene(&mut scene, &MemorySource::new(), "absent.scene");
    assert!(matches!(result, Err(SceneError::MissingStream(_))));
    assert_eq!(session.state(), ImportState::Idle);
    assert_eq!(scene.node_count(), 0);
    assert_eq!(scene.zone_count(), 0);

    let zone = scene.create_zone();
    let result = ImportSession::import_template(&mut scene, zone, &MemorySource::new(), "absent.json");
    assert!(matches!(result, Err(SceneError::MissingStream(_))));
    assert_eq!(scene.node_count(), 1);
}

#[test]
fn test_unknown_components_survive_file_round_trip() {
    init_logging();
    let root = std::env::temp_dir().join(format!("void_scene_{}", void_core::generate_object_id()));
    let mut source = FileSource::new(&root);

    let water = Definition::new("Water")
        .with("depth", 2.5)
        .with("tint", void_ir::Value::Color([0.1, 0.3, 0.8, 1.0]))
        .with_object(Definition::new("Waves").with("height", 0.4).with("count", 3));
    let pond = Definition::new("GameObject").with("id", "pond").with_object(
        Definition::new(COMPONENTS_BLOCK)
            .with_object(Definition::new("TransformEuler").with("position", [1.0f32, 0.0, 2.0]))
            .with_object(water.clone()),
    );
    let zone = Definition::new("Zone").with_object(Definition::new(CHILDREN_BLOCK).with_object(pond));
    let level = Definition::new("Scene")
        .with("name", "Garden")
        .with_object(Definition::new(CHILDREN_BLOCK).with_object(zone));
    source.save("garden.json", &level).unwrap();

    let mut scene = Scene::new("Empty", Arc::new(ComponentRegistry::with_builtin()));
    let mut session = ImportSession::new();
    session.begin_import_scene(&mut scene, &source, "garden.json").unwrap();
    while !session.update_load(&mut scene) {}

    let pond = scene.search_object_by_id("pond").unwrap();
    assert!(scene.get_component_by_type_name(pond, "Water").unwrap().is_placeholder());

    source.save("garden_saved.json", &scene.export_scene()).unwrap();
    let saved = source.load("garden_saved.json").unwrap();
    let saved_pond = saved
        .object(CHILDREN_BLOCK)
        .and_then(|zones| zones.object("Zone"))
        .and_then(|zone| zone.object(CHILDREN_BLOCK))
        .and_then(|children| children.object("GameObject"))
        .unwrap();
    assert_eq!(saved_pond.get_str("id"), Some("pond"));
    assert_eq!(
        saved_pond.object(COMPONENTS_BLOCK).and_then(|c| c.object("Water")),
        Some(&water)
    );

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn test_removal_during_traversal_is_deferred() {
    init_logging();
    let mut source = MemorySource::new();
    source.insert("warehouse.scene", scene_with_objects(4));
    let mut scene = Scene::new("Empty", Arc::new(ComponentRegistry::with_builtin()));
    let mut session = ImportSession::new();
    session.begin_import_scene(&mut scene, &source, "warehouse.scene").unwrap();
    while !session.update_load(&mut scene) {}
    let zone = scene.zone(0).unwrap();

    let mut added = Vec::new();
    for child in scene.children(zone) {
        assert!(scene.remove(child));
        assert!(!scene.children(zone).contains(&child));
        added.push(scene.create_empty_object(zone).unwrap());
    }
    assert!(scene.children(zone).is_empty());

    scene.update();
    assert_eq!(scene.children(zone), added);
    assert!(!scene.update_add_remove_object(zone, false));
    assert_eq!(scene.node_count(), 5);
}
