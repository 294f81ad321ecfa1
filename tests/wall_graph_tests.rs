//! Integrationstests für die Wand-Graph-Engine:
//! - Raum zeichnen, Innenwand quer durchziehen
//! - Snapshot als JSON für Exporter/Loader
//! - Listener-Verhalten (Reihenfolge, Re-Entrancy)

use floorplan_wall_editor::core::GraphSnapshot;
use floorplan_wall_editor::{GraphChangeKind, GraphOptions, WallGraph};
use glam::Vec2;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Rechteckiger Raum 0..40 × 0..30 aus vier Wänden, Ecken im Uhrzeigersinn.
fn rectangular_room() -> (WallGraph, [u64; 4]) {
    let mut graph = WallGraph::new();
    let corners = [
        graph.create_node(Vec2::new(0.0, 0.0)),
        graph.create_node(Vec2::new(40.0, 0.0)),
        graph.create_node(Vec2::new(40.0, 30.0)),
        graph.create_node(Vec2::new(0.0, 30.0)),
    ];
    for i in 0..4 {
        graph
            .connect_nodes_default(corners[i], corners[(i + 1) % 4])
            .expect("Raumwand erwartet");
    }
    (graph, corners)
}

#[test]
fn test_raum_hat_vier_ecken() {
    let (graph, corners) = rectangular_room();

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.wall_count(), 4);
    for id in corners {
        let meta = graph.node(id).expect("Ecke erwartet").metadata();
        assert!(meta.is_corner, "Node {id} sollte eine Ecke sein");
        assert!(!meta.is_endpoint);
        assert!(!meta.is_intersection);
    }
    assert!(graph.check_invariants().is_ok());
}

#[test]
fn test_innenwand_ueber_den_raum_teilt_beide_aussenwaende() {
    let (mut graph, _) = rectangular_room();
    let outside_bottom = graph.create_node(Vec2::new(20.0, -10.0));
    let outside_top = graph.create_node(Vec2::new(20.0, 40.0));

    let outcome = graph
        .connect_nodes_default(outside_bottom, outside_top)
        .expect("Pfad erwartet");

    assert_eq!(outcome.split_node_ids.len(), 2);
    assert_eq!(outcome.split_walls.len(), 2);
    assert_eq!(outcome.wall_ids.len(), 3);
    // 4 Raumwände, 2 davon geteilt (+2), plus 3 Pfadwände
    assert_eq!(graph.wall_count(), 9);

    for id in &outcome.split_node_ids {
        let node = graph.node(*id).expect("Split-Node erwartet");
        assert!(node.metadata().is_intersection);
        assert_eq!(node.degree(), 4);
    }
    assert!(graph.check_invariants().is_ok());
}

#[test]
fn test_innenwand_ohne_kreuzung() {
    let (mut graph, [a, b, _, _]) = rectangular_room();
    let bottom = graph.create_node(Vec2::new(20.0, 5.0));
    let top = graph.create_node(Vec2::new(20.0, 25.0));
    let outcome = graph.connect_nodes_default(bottom, top).expect("Wand erwartet");

    assert!(outcome.wall_id().is_some());
    assert!(graph.are_connected(a, b));
    assert!(graph.node(bottom).expect("Node").metadata().is_endpoint);
}

#[test]
fn test_raum_verschieben_und_loeschen() {
    let (mut graph, corners) = rectangular_room();
    let lamp = graph.create_node(Vec2::new(100.0, 100.0));

    assert!(graph.move_node(corners[2], Vec2::new(50.0, 40.0)));
    assert_eq!(graph.node(corners[0]).expect("Ecke").position, Vec2::new(10.0, 10.0));
    assert_eq!(graph.node(lamp).expect("Lampe").position, Vec2::new(100.0, 100.0));

    assert!(graph.remove_node(corners[0]));
    assert_eq!(graph.wall_count(), 2);
    assert!(graph.node(corners[1]).expect("Ecke").metadata().is_endpoint);
    assert!(graph.node(corners[2]).expect("Ecke").metadata().is_corner);
    assert!(graph.node(corners[3]).expect("Ecke").metadata().is_endpoint);
}

#[test]
fn test_snapshot_json_roundtrip() {
    let (mut graph, corners) = rectangular_room();
    let wall_id = graph
        .find_wall_between(corners[0], corners[1])
        .expect("Wand erwartet");
    graph.set_wall_property(wall_id, "fenster", "2");

    let json = serde_json::to_string(&graph.snapshot()).expect("Serialisierung erwartet");
    let parsed: GraphSnapshot = serde_json::from_str(&json).expect("Deserialisierung erwartet");
    let restored =
        WallGraph::from_snapshot(&parsed, GraphOptions::default()).expect("Snapshot gültig");

    assert_eq!(restored.snapshot(), graph.snapshot());
    assert_eq!(
        restored
            .wall(wall_id)
            .and_then(|w| w.properties.get("fenster"))
            .map(String::as_str),
        Some("2")
    );
}

#[test]
fn test_snapshot_aus_handgeschriebenem_json() {
    let json = r#"{
        "nodes": [
            { "id": 3, "position": [0.0, 0.0] },
            { "id": 8, "position": [10.0, 0.0] },
            { "id": 9, "position": [10.0, 10.0] }
        ],
        "walls": [
            { "id": 4, "start_node_id": 3, "end_node_id": 8, "thickness": 12.0, "height": 250.0 },
            { "id": 5, "start_node_id": 8, "end_node_id": 9, "thickness": 12.0, "height": 250.0 }
        ]
    }"#;
    let snapshot: GraphSnapshot = serde_json::from_str(json).expect("JSON gültig");
    let mut graph =
        WallGraph::from_snapshot(&snapshot, GraphOptions::default()).expect("Snapshot gültig");

    // Winkel und Metadaten werden beim Laden berechnet
    assert!(graph.node(8).expect("Node 8").metadata().is_corner);
    assert!(graph.node(3).expect("Node 3").metadata().is_endpoint);
    assert!(graph.check_invariants().is_ok());

    let next = graph.create_node(Vec2::new(50.0, 50.0));
    assert_eq!(next, 10);
    let far = graph.create_node(Vec2::new(60.0, 50.0));
    let wall = graph
        .connect_nodes_default(next, far)
        .expect("Wand erwartet")
        .wall_id()
        .expect("eine Wand erwartet");
    assert_eq!(wall, 6);
}

/// `true` wenn der Graph gerade mutabel geliehen ist.
fn reentry_blocked(graph: &Weak<RefCell<WallGraph>>) -> bool {
    let Some(graph) = graph.upgrade() else {
        return false;
    };
    let blocked = graph.try_borrow_mut().is_err();
    blocked
}

#[test]
fn test_listener_kann_engine_nicht_reentrant_mutieren() {
    let shared = Rc::new(RefCell::new(WallGraph::new()));
    let blocked = Rc::new(RefCell::new(Vec::new()));

    let weak: Weak<RefCell<WallGraph>> = Rc::downgrade(&shared);
    let sink = Rc::clone(&blocked);
    shared.borrow_mut().subscribe(move |change| {
        sink.borrow_mut().push((change.kind, reentry_blocked(&weak)));
    });

    shared.borrow_mut().create_node(Vec2::ZERO);

    assert_eq!(*blocked.borrow(), vec![(GraphChangeKind::NodeAdded, true)]);
}

#[test]
fn test_optionen_beeinflussen_snap_schwelle() {
    let options = GraphOptions {
        snap_threshold: 5.0,
        ..GraphOptions::default()
    };
    let mut graph = WallGraph::with_options(options);
    let a = graph.create_node(Vec2::new(0.0, 0.0));
    assert_eq!(graph.create_node(Vec2::new(3.0, 4.0) * 0.9), a);
    assert_ne!(graph.create_node(Vec2::new(3.0, 4.0)), a);
    assert_eq!(graph.options().snap_threshold, 5.0);
}
