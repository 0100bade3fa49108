// Scene cache - the derived snapshot the rendering layer reads every
// frame, memoized on a cheap key so an unchanged store costs nothing
// to re-query.

use std::collections::HashSet;

use euclid::default::Point2D;

use crate::model::{Connection, Node, OutcomeGroup, connection_anchors};
use crate::outcomes::outcome_groups;
use crate::store::{CursorHint, Store};

/// Single-slot memo: recompute only when the key changes.
pub struct Memo<K, V> {
    slot: Option<(K, V)>,
}

impl<K: PartialEq, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<K: PartialEq, V> Memo<K, V> {
    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce() -> V) -> &V {
        let stale = match &self.slot {
            Some((cached, _)) => *cached != key,
            None => true,
        };
        if stale {
            self.slot = Some((key, compute()));
        }
        &self.slot.as_ref().expect("slot filled above").1
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}

// ------------------------------------------------------------------
// Scene
// ------------------------------------------------------------------

/// A visible node plus the transient flags the renderer styles it by.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub node: Node,
    pub hovered: bool,
    pub selected: bool,
    pub clicks: u64,
    /// This node is the armed source of a connect gesture.
    pub connection_source: bool,
    /// Render on the top layer for the duration of the drag.
    pub dragging: bool,
}

/// A visible connection plus its arrow segment endpoints on the node
/// shape borders.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConnection {
    pub connection: Connection,
    pub start: Point2D<f64>,
    pub end: Point2D<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub connections: Vec<SceneConnection>,
    pub groups: Vec<OutcomeGroup>,
    pub cursor: CursorHint,
    pub selected_outcome: Option<String>,
    /// Id of the skill waiting to be placed, for the hint label.
    pub pending_placement: Option<String>,
}

/// Everything the scene depends on, folded into a comparable key.
/// Floats go in as bit patterns; they are compared, never ordered.
#[derive(Debug, Clone, PartialEq)]
struct SceneKey {
    revision: u64,
    pan: (u64, u64),
    scale: u64,
    size: (u64, u64),
    selected_node: Option<String>,
    selected_connection: Option<String>,
    selected_outcome: Option<String>,
    connecting_from: Option<String>,
    hovered_node: Option<String>,
    dragging_node: Option<String>,
    pending_placement: Option<String>,
    total_clicks: u64,
}

impl SceneKey {
    fn of(store: &Store) -> Self {
        Self {
            revision: store.graph.revision(),
            pan: (store.viewport.pan.x.to_bits(), store.viewport.pan.y.to_bits()),
            scale: store.viewport.scale.to_bits(),
            size: (
                store.viewport.width.to_bits(),
                store.viewport.height.to_bits(),
            ),
            selected_node: store.selected_node.clone(),
            selected_connection: store.selected_connection.clone(),
            selected_outcome: store.selected_outcome.clone(),
            connecting_from: store.connecting_from.clone(),
            hovered_node: store.hovered_node.clone(),
            dragging_node: store.dragging_node.clone(),
            pending_placement: store.placement_label().map(str::to_string),
            total_clicks: store.click_counts.values().sum(),
        }
    }
}

pub fn build_scene(store: &Store) -> Scene {
    let forced = store.forced_visible_ids();
    let visible = store.viewport.visible_nodes(&store.graph, &forced);
    let visible_ids: HashSet<&str> = visible.iter().map(|node| node.id.as_str()).collect();

    let nodes = visible
        .iter()
        .map(|node| SceneNode {
            node: (*node).clone(),
            hovered: store.hovered_node.as_deref() == Some(node.id.as_str()),
            selected: store.selected_node.as_deref() == Some(node.id.as_str()),
            clicks: store.click_counts.get(&node.id).copied().unwrap_or(0),
            connection_source: store.connecting_from.as_deref() == Some(node.id.as_str()),
            dragging: store.dragging_node.as_deref() == Some(node.id.as_str()),
        })
        .collect();

    let connections = store
        .viewport
        .visible_connections(store.graph.connections(), &visible_ids)
        .into_iter()
        .filter_map(|conn| {
            let from = store.graph.node(&conn.from)?;
            let to = store.graph.node(&conn.to)?;
            let (start, end) = connection_anchors(from, to);
            Some(SceneConnection {
                connection: conn.clone(),
                start,
                end,
            })
        })
        .collect();

    let groups = outcome_groups(&visible);

    Scene {
        nodes,
        connections,
        groups,
        cursor: store.cursor(),
        selected_outcome: store.selected_outcome.clone(),
        pending_placement: store.placement_label().map(str::to_string),
    }
}

#[derive(Default)]
pub struct Cache {
    scene: Memo<SceneKey, Scene>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&mut self, store: &Store) -> &Scene {
        self.scene
            .get_or_compute(SceneKey::of(store), || build_scene(store))
    }

    pub fn invalidate(&mut self) {
        self.scene.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SkillDetails;
    use pretty_assertions::assert_eq;

    fn store_with_linked_pair() -> Store {
        let mut store = Store::new();
        store.graph.upsert_skill(SkillDetails {
            id: Some("a".to_string()),
            x: Some(0.0),
            y: Some(0.0),
            ..SkillDetails::default()
        });
        store.graph.upsert_skill(SkillDetails {
            id: Some("b".to_string()),
            x: Some(400.0),
            y: Some(0.0),
            ..SkillDetails::default()
        });
        store.graph.link("a", "b");
        store
    }

    #[test]
    fn memo_recomputes_only_on_key_change() {
        let mut memo: Memo<u32, u32> = Memo::default();
        let mut calls = 0;
        for key in [1, 1, 1, 2, 2, 1] {
            memo.get_or_compute(key, || {
                calls += 1;
                key * 10
            });
        }
        // Two distinct runs of key 1 plus one of key 2.
        assert_eq!(calls, 3);
    }

    #[test]
    fn scene_carries_flags_and_anchor_segments() {
        let mut store = store_with_linked_pair();
        store.select_node("a");
        store.record_click("a");
        store.hovered_node = Some("b".to_string());

        let scene = build_scene(&store);
        assert_eq!(scene.nodes.len(), 2);
        let a = scene.nodes.iter().find(|n| n.node.id == "a").unwrap();
        assert!(a.selected);
        assert_eq!(a.clicks, 1);
        let b = scene.nodes.iter().find(|n| n.node.id == "b").unwrap();
        assert!(b.hovered);

        assert_eq!(scene.connections.len(), 1);
        let conn = &scene.connections[0];
        assert_eq!(conn.connection.id, "conn-a-->b");
        // Horizontal neighbors: anchors leave the rect borders inset by 8.
        assert!((conn.start.x - 122.0).abs() < 1e-9);
        assert!((conn.end.x - 278.0).abs() < 1e-9);
    }

    #[test]
    fn cached_scene_is_reused_until_the_store_changes() {
        let mut store = store_with_linked_pair();
        let mut cache = Cache::new();
        let first = cache.scene(&store).clone();
        let second = cache.scene(&store).clone();
        assert_eq!(first, second);

        store.graph.set_position("a", 10.0, 0.0);
        let third = cache.scene(&store);
        let a = third.nodes.iter().find(|n| n.node.id == "a").unwrap();
        assert_eq!(a.node.x, 10.0);
    }

    #[test]
    fn scene_reports_cursor_and_pending_label() {
        let mut store = store_with_linked_pair();
        store.begin_placement(
            SkillDetails {
                id: Some("next".to_string()),
                ..SkillDetails::default()
            },
            None,
        );
        let scene = build_scene(&store);
        assert_eq!(scene.cursor, CursorHint::Copy);
        assert_eq!(scene.pending_placement.as_deref(), Some("next"));
    }
}
