// Integration tests for session-aware name resolution
//
// Exercises the registry the way discovery feeds it: sessions arriving out of
// order, restarts, logical node overrides and configured fallback strings.

use overlay_core::{
    InstanceId, InstanceSessionId, NameFallback, NamingSettings, NodeId, NodeNameRegistry,
    SessionScoped,
};

fn sessions_of(instance: &InstanceId) -> [InstanceSessionId; 3] {
    ["0000000001", "0000000002", "0000000003"]
        .map(|part| InstanceSessionId::from_parts(instance, part).unwrap())
}

#[test]
fn test_out_of_order_session_announcements() {
    let instance = InstanceId::generate();
    let [s1, s2, s3] = sessions_of(&instance);
    let names = NodeNameRegistry::default();

    assert!(names.associate_display_name(&s1, "A"));
    assert!(names.associate_display_name(&s3, "C"));
    assert!(!names.associate_display_name(&s2, "B"));

    let current = names.current_session(&instance).unwrap();
    assert!(current.is_same_session_as(&s3));
    assert_eq!(
        names.resolve(&NodeId::from(s3.clone()), NameFallback::Absent),
        Some("C".to_string())
    );
    // s2 is older than the current session
    assert_eq!(
        names.resolve(&NodeId::from(s2), NameFallback::Absent),
        Some("C <outdated session>".to_string())
    );

    println!("✓ Late announcement of an older session is ignored");
}

#[test]
fn test_restart_with_custom_settings() {
    let settings = NamingSettings {
        unknown_name_placeholder: "???".to_string(),
        outdated_session_marker: "(stale)".to_string(),
    };
    settings.validate().unwrap();
    let names = NodeNameRegistry::new(settings);

    let instance = InstanceId::generate();
    let [s1, s2, _] = sessions_of(&instance);

    names.associate_display_name(&s1, "Before");
    names.observe_session(&s2);

    // name was session-scoped; the new session has none yet
    assert_eq!(names.display_name_of(s2.clone()), "???");
    assert_eq!(names.display_name_of(instance.clone()), "???");

    names.associate_display_name(&s2, "After");
    assert_eq!(names.display_name_of(s1), "After (stale)");
    assert_eq!(names.display_name_of(instance), "After");

    println!("✓ Restarts reset names and outdated sessions are marked");
}

#[test]
fn test_logical_nodes_across_sessions() {
    let instance = InstanceId::generate();
    let [s1, s2, _] = sessions_of(&instance);
    let names = NodeNameRegistry::default();
    names.associate_display_name(&s1, "Host");

    let worker = instance.logical_node("f00d").unwrap();
    let worker_s1 = worker.combine_with_session(&s1).unwrap();
    assert!(names.associate_logical_node_name(&worker_s1, Some("Worker")));

    // the session-less id resolves while no override is stored for the default part
    let default_node: NodeId = instance.default_logical_node().into();
    assert_eq!(
        names.resolve(&default_node, NameFallback::Absent),
        Some("Host".to_string())
    );

    names.associate_display_name(&s2, "Host v2");
    let worker_s2 = worker.combine_with_session(&s2).unwrap();
    assert_eq!(
        names.resolve(&worker_s2.into(), NameFallback::Absent),
        Some("Worker".to_string())
    );
    assert_eq!(
        names.resolve(&worker_s1.clone().into(), NameFallback::Absent),
        Some("Worker <outdated session>".to_string())
    );

    // stale write through the old session is rejected
    assert!(!names.associate_logical_node_name(&worker_s1, None));

    let dump = names.format_all_name_associations();
    assert!(dump.contains("\"Host v2\""));
    assert!(dump.contains("[f00d] -> \"Worker\""));

    println!("✓ Logical node overrides survive session replacement");
}

#[test]
fn test_many_instances_dump_is_sorted() {
    let names = NodeNameRegistry::default();
    let mut expected = Vec::new();
    for _ in 0..20 {
        let session = InstanceSessionId::new_session(&InstanceId::generate());
        names.associate_display_name(&session, session.instance_part()[..6].to_string());
        expected.push(session.to_string());
    }
    expected.sort();

    let dump = names.format_all_name_associations();
    let listed: Vec<_> = dump
        .lines()
        .filter_map(|line| line.split(" -> ").next())
        .map(str::to_string)
        .collect();
    assert_eq!(listed, expected);
    assert_eq!(names.len(), 20);

    println!("✓ Name dump lists {} instances in id order", names.len());
}
