//! Integration tests for definition streams

use void_ir::*;

fn zone_with_children(count: usize) -> Definition {
    let mut children = Definition::new("Children");
    for i in 0..count {
        children.add_object(
            Definition::new("GameObject")
                .with("name", format!("Object_{}", i))
                .with("templateObjectId", format!("T{}", i)),
        );
    }
    Definition::new("Zone").with("name", "Zone_1").with_object(children)
}

#[test]
fn test_stream_walks_children_one_by_one() {
    let zone = zone_with_children(3);
    let mut stream = EventStream::from_definition(&zone);

    assert!(matches!(stream.next_event(), Some(ReadEvent::BeginObject { .. })));
    let (head, stop) = Definition::parse_until(&mut stream, "Zone", Some("Children")).unwrap();
    assert_eq!(stop, ParseStop::AtBlock);
    assert_eq!(head.get_str("name"), Some("Zone_1"));

    let mut keys = Vec::new();
    while let Some(child) = Definition::parse(&mut stream).unwrap() {
        keys.push(child.get_str("templateObjectId").unwrap_or_default().to_string());
    }
    assert_eq!(keys, vec!["T0", "T1", "T2"]);
}

#[test]
fn test_memory_source_rewind_sees_same_events() {
    let mut source = MemorySource::new();
    source.insert("level.scene", zone_with_children(2));

    let mut reader = source.open("level.scene").unwrap();
    let mut first = Vec::new();
    while let Some(event) = reader.next_event() {
        first.push(event);
    }

    reader.rewind();
    let mut second = Vec::new();
    while let Some(event) = reader.next_event() {
        second.push(event);
    }
    assert_eq!(first, second);
}

#[test]
fn test_json_document_keeps_property_order() {
    let def = Definition::new("Components")
        .with_object(Definition::new("TransformEuler").with("position", [1.0f32, 2.0, 3.0]))
        .with_object(Definition::new("Mesh"))
        .with_object(Definition::new("Collider"));

    let json = serde_json::to_string(&def).unwrap();
    let back: Definition = serde_json::from_str(&json).unwrap();

    let names: Vec<_> = back.objects().map(|o| o.name.clone()).collect();
    assert_eq!(names, vec!["TransformEuler", "Mesh", "Collider"]);
    assert_eq!(back, def);
}
