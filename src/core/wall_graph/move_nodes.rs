//! Verschieben von Nodes: starre Gruppen-Verschiebung und Einzel-Drag.

use super::WallGraph;
use crate::core::events::GraphChangeKind;
use crate::core::geometry;
use glam::Vec2;
use std::collections::{HashSet, VecDeque};

impl WallGraph {
    /// Verschiebt einen Node samt seiner gesamten Zusammenhangskomponente.
    ///
    /// Alle transitiv verbundenen Nodes bewegen sich um denselben Offset, relative
    /// Lagen und Winkel bleiben erhalten. Kollidiert irgendeine Zielposition mit
    /// einem Node außerhalb der Komponente, wird nichts verschoben. Nicht-endliche
    /// Zielpositionen werden ebenfalls abgelehnt.
    pub fn move_node(&mut self, node_id: u64, new_position: Vec2) -> bool {
        if !new_position.is_finite() {
            log::warn!("Verschieben von Node {} abgelehnt: Zielposition nicht endlich", node_id);
            return false;
        }
        let Some(node) = self.nodes.get(&node_id) else {
            log::warn!("Verschieben abgelehnt: Node {} existiert nicht", node_id);
            return false;
        };

        let delta = new_position - node.position;
        if delta == Vec2::ZERO {
            return true;
        }

        if let Some(blocker) = self.find_snap_node(new_position, |id| id == node_id) {
            log::warn!(
                "Verschieben von Node {} abgelehnt: Zielposition von Node {} belegt",
                node_id,
                blocker
            );
            return false;
        }

        let component = self.connected_component(node_id);
        let members: HashSet<u64> = component.iter().copied().collect();

        for &member in &component {
            let target = self.nodes[&member].position + delta;
            if let Some(blocker) = self.find_snap_node(target, |id| members.contains(&id)) {
                log::warn!(
                    "Gruppen-Verschiebung abgelehnt: Node {} würde mit Node {} kollidieren",
                    member,
                    blocker
                );
                return false;
            }
        }

        for &member in &component {
            if let Some(node) = self.nodes.get_mut(&member) {
                node.position += delta;
            }
        }

        let wall_ids = self.incident_walls(&component);
        self.refresh_connection_angles(&wall_ids);
        self.refresh_metadata(&component);
        self.rebuild_spatial_index();

        let mut moved = component;
        moved.sort_unstable();
        log::info!(
            "{} Node(s) um ({:.2}, {:.2}) verschoben",
            moved.len(),
            delta.x,
            delta.y
        );
        self.emit(GraphChangeKind::NodeMoved, moved, wall_ids);
        self.debug_check_invariants();
        true
    }

    /// Verschiebt genau einen Node (Eck-Drag); angeschlossene Wände folgen.
    pub fn reposition_node(&mut self, node_id: u64, new_position: Vec2) -> bool {
        if !new_position.is_finite() {
            log::warn!("Verschieben von Node {} abgelehnt: Zielposition nicht endlich", node_id);
            return false;
        }
        let Some(node) = self.nodes.get(&node_id) else {
            log::warn!("Verschieben abgelehnt: Node {} existiert nicht", node_id);
            return false;
        };
        if node.position == new_position {
            return true;
        }

        if let Some(blocker) = self.find_snap_node(new_position, |id| id == node_id) {
            log::warn!(
                "Verschieben von Node {} abgelehnt: Zielposition von Node {} belegt",
                node_id,
                blocker
            );
            return false;
        }

        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.position = new_position;
        }

        let wall_ids = self.incident_walls(&[node_id]);
        self.refresh_connection_angles(&wall_ids);
        let mut affected = self.connected_nodes(node_id);
        affected.push(node_id);
        self.refresh_metadata(&affected);
        self.rebuild_spatial_index();

        self.emit(GraphChangeKind::NodeMoved, vec![node_id], wall_ids);
        self.debug_check_invariants();
        true
    }

    /// Alle über Verbindungen erreichbaren Nodes (inkl. Start), in BFS-Reihenfolge.
    pub fn connected_component(&self, node_id: u64) -> Vec<u64> {
        if !self.nodes.contains_key(&node_id) {
            return Vec::new();
        }

        let mut visited: HashSet<u64> = HashSet::from([node_id]);
        let mut order = vec![node_id];
        let mut queue = VecDeque::from([node_id]);

        while let Some(current) = queue.pop_front() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            for &neighbor in node.connections.keys() {
                if visited.insert(neighbor) {
                    order.push(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }
        order
    }

    /// Sortierte, eindeutige Wand-IDs an den angegebenen Nodes
    fn incident_walls(&self, node_ids: &[u64]) -> Vec<u64> {
        let mut wall_ids: Vec<u64> = node_ids
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .flat_map(|node| node.wall_ids())
            .collect();
        wall_ids.sort_unstable();
        wall_ids.dedup();
        wall_ids
    }

    /// Berechnet die Winkel beider Verbindungsrichtungen der angegebenen Wände neu.
    fn refresh_connection_angles(&mut self, wall_ids: &[u64]) {
        for wall_id in wall_ids {
            let Some(wall) = self.walls.get(wall_id) else {
                continue;
            };
            let (start_id, end_id) = (wall.start_node_id, wall.end_node_id);
            let (Some(start), Some(end)) = (self.nodes.get(&start_id), self.nodes.get(&end_id))
            else {
                continue;
            };
            let angle = geometry::angle_between(start.position, end.position);

            if let Some(conn) = self
                .nodes
                .get_mut(&start_id)
                .and_then(|n| n.connections.get_mut(&end_id))
            {
                conn.angle = angle;
            }
            if let Some(conn) = self
                .nodes
                .get_mut(&end_id)
                .and_then(|n| n.connections.get_mut(&start_id))
            {
                conn.angle = geometry::opposite_angle(angle);
            }
        }
    }
}
