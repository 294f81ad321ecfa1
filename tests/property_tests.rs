//! Property-Tests: zufällige Editier-Sequenzen erhalten die Graph-Invarianten.

use floorplan_wall_editor::core::geometry::segment_intersection;
use floorplan_wall_editor::{GraphOptions, WallGraph};
use glam::Vec2;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    CreateNode { x: u8, y: u8 },
    Connect { a: u16, b: u16 },
    MoveNode { idx: u16, dx: i8, dy: i8 },
    RepositionNode { idx: u16, dx: i8, dy: i8 },
    RemoveNode { idx: u16 },
    RemoveWall { idx: u16 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => ((0u8..=20), (0u8..=20)).prop_map(|(x, y)| Op::CreateNode { x, y }),
        3 => (any::<u16>(), any::<u16>()).prop_map(|(a, b)| Op::Connect { a, b }),
        1 => (any::<u16>(), (-4i8..=4), (-4i8..=4))
            .prop_map(|(idx, dx, dy)| Op::MoveNode { idx, dx, dy }),
        1 => (any::<u16>(), (-4i8..=4), (-4i8..=4))
            .prop_map(|(idx, dx, dy)| Op::RepositionNode { idx, dx, dy }),
        1 => any::<u16>().prop_map(|idx| Op::RemoveNode { idx }),
        1 => any::<u16>().prop_map(|idx| Op::RemoveWall { idx }),
    ]
}

fn sorted_node_ids(graph: &WallGraph) -> Vec<u64> {
    let mut ids: Vec<u64> = graph.nodes_iter().map(|n| n.id).collect();
    ids.sort_unstable();
    ids
}

fn sorted_wall_ids(graph: &WallGraph) -> Vec<u64> {
    let mut ids: Vec<u64> = graph.walls_iter().map(|w| w.id).collect();
    ids.sort_unstable();
    ids
}

fn pick(ids: &[u64], idx: u16) -> Option<u64> {
    if ids.is_empty() {
        return None;
    }
    Some(ids[idx as usize % ids.len()])
}

fn apply_op(graph: &mut WallGraph, op: &Op) {
    let nodes = sorted_node_ids(graph);
    match *op {
        Op::CreateNode { x, y } => {
            graph.create_node(Vec2::new(x as f32 * 5.0, y as f32 * 5.0));
        }
        Op::Connect { a, b } => {
            if let (Some(a), Some(b)) = (pick(&nodes, a), pick(&nodes, b)) {
                let _ = graph.connect_nodes_default(a, b);
            }
        }
        Op::MoveNode { idx, dx, dy } => {
            if let Some(id) = pick(&nodes, idx) {
                let pos = graph.node(id).map(|n| n.position).unwrap_or_default();
                graph.move_node(id, pos + Vec2::new(dx as f32 * 5.0, dy as f32 * 5.0));
            }
        }
        Op::RepositionNode { idx, dx, dy } => {
            if let Some(id) = pick(&nodes, idx) {
                let pos = graph.node(id).map(|n| n.position).unwrap_or_default();
                graph.reposition_node(id, pos + Vec2::new(dx as f32 * 5.0, dy as f32 * 5.0));
            }
        }
        Op::RemoveNode { idx } => {
            if let Some(id) = pick(&nodes, idx) {
                graph.remove_node(id);
            }
        }
        Op::RemoveWall { idx } => {
            if let Some(id) = pick(&sorted_wall_ids(graph), idx) {
                graph.remove_wall(id);
            }
        }
    }
}

fn build(seq: &[Op]) -> WallGraph {
    let mut graph = WallGraph::new();
    for op in seq {
        apply_op(&mut graph, op);
    }
    graph
}

fn sequence_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 5..40)
}

/// Nur Anlegen und Verbinden auf einem engen 3er-Raster, damit sich viele
/// Wände kreuzen und Schnittpunkte häufig auf bestehende Nodes snappen.
fn drawing_strategy() -> impl Strategy<Value = Vec<(bool, u16, u16)>> {
    prop::collection::vec((any::<bool>(), any::<u16>(), any::<u16>()), 5..40)
}

fn draw(seq: &[(bool, u16, u16)]) -> WallGraph {
    let mut graph = WallGraph::new();
    for &(create, a, b) in seq {
        if create {
            let x = (a % 11) as f32 * 3.0;
            let y = (b % 11) as f32 * 3.0;
            graph.create_node(Vec2::new(x, y));
        } else {
            let nodes = sorted_node_ids(&graph);
            if let (Some(a), Some(b)) = (pick(&nodes, a), pick(&nodes, b)) {
                let _ = graph.connect_nodes_default(a, b);
            }
        }
    }
    graph
}

/// Paare von Wänden ohne gemeinsamen Node, die sich trotzdem schneiden.
fn hidden_crossings(graph: &WallGraph) -> Vec<(u64, u64)> {
    let mut walls: Vec<_> = graph.walls_iter().collect();
    walls.sort_by_key(|w| w.id);
    let pos = |id: u64| graph.node(id).map(|n| n.position).unwrap_or_default();

    let mut found = Vec::new();
    for (i, later) in walls.iter().enumerate() {
        for earlier in &walls[..i] {
            if later.touches(earlier.start_node_id) || later.touches(earlier.end_node_id) {
                continue;
            }
            let hit = segment_intersection(
                pos(later.start_node_id),
                pos(later.end_node_id),
                pos(earlier.start_node_id),
                pos(earlier.end_node_id),
            );
            if hit.is_some() {
                found.push((later.id, earlier.id));
            }
        }
    }
    found
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    #[test]
    fn editier_sequenz_erhaelt_invarianten(seq in sequence_strategy()) {
        let graph = build(&seq);
        prop_assert_eq!(graph.check_invariants(), Ok(()));

        for wall in graph.walls_iter() {
            prop_assert!(graph.node(wall.start_node_id).is_some());
            prop_assert!(graph.node(wall.end_node_id).is_some());
            prop_assert_eq!(
                graph.find_wall_between(wall.end_node_id, wall.start_node_id),
                Some(wall.id)
            );
        }
    }

    #[test]
    fn remove_node_hinterlaesst_keine_referenzen(seq in sequence_strategy(), idx in any::<u16>()) {
        let mut graph = build(&seq);
        let Some(victim) = pick(&sorted_node_ids(&graph), idx) else {
            return Ok(());
        };

        prop_assert!(graph.remove_node(victim));

        prop_assert!(graph.node(victim).is_none());
        prop_assert!(graph.walls_iter().all(|w| !w.touches(victim)));
        prop_assert!(graph
            .nodes_iter()
            .all(|n| n.connection_to(victim).is_none()));
        prop_assert_eq!(graph.check_invariants(), Ok(()));
    }

    #[test]
    fn move_node_ist_starr_oder_wirkungslos(
        seq in sequence_strategy(),
        idx in any::<u16>(),
        dx in -6i8..=6,
        dy in -6i8..=6,
    ) {
        let mut graph = build(&seq);
        let Some(id) = pick(&sorted_node_ids(&graph), idx) else {
            return Ok(());
        };
        let before = graph.snapshot();
        let delta = Vec2::new(dx as f32 * 5.0, dy as f32 * 5.0);
        let target = graph.node(id).map(|n| n.position).unwrap_or_default() + delta;
        let component = graph.connected_component(id);

        if graph.move_node(id, target) {
            for old in &before.nodes {
                let new = graph.node(old.id).map(|n| n.position).unwrap_or_default();
                let expected = if component.contains(&old.id) { old.position + delta } else { old.position };
                prop_assert!((new - expected).length() < 1e-3);
            }
            prop_assert_eq!(graph.wall_count(), before.walls.len());
        } else {
            prop_assert_eq!(graph.snapshot(), before);
        }
        prop_assert_eq!(graph.check_invariants(), Ok(()));
    }

    #[test]
    fn verbinden_hinterlaesst_keine_verdeckten_kreuzungen(seq in drawing_strategy()) {
        let graph = draw(&seq);
        prop_assert_eq!(hidden_crossings(&graph), Vec::<(u64, u64)>::new());
        prop_assert_eq!(graph.check_invariants(), Ok(()));
    }

    #[test]
    fn snapshot_wiederherstellung_ist_verlustfrei(seq in sequence_strategy()) {
        let graph = build(&seq);
        let snapshot = graph.snapshot();
        let restored = WallGraph::from_snapshot(&snapshot, GraphOptions::default());
        prop_assert!(restored.is_ok());
        if let Ok(restored) = restored {
            prop_assert_eq!(restored.snapshot(), snapshot);
        }
    }
}
