// Graph store - canonical node collection plus the derived connection
// list. Every mutating operation re-derives dependents and
// connections before returning, so observers never see stale derived
// state. Invalid operations (unknown ids, self-loops) are silent
// no-ops; callers that care inspect the returned `bool`.

use std::collections::HashMap;

use euclid::default::{Point2D, Vector2D};
use indexmap::IndexMap;
use rand::Rng;

use crate::model::{
    Connection, ContentEntry, Node, NodeId, NodeKind, OutcomeData, SkillData, connection_id,
    DEFAULT_OUTCOME_POSITION, DEFAULT_SKILL_POSITION, DEFAULT_SKILL_WIDTH, UNKNOWN_OUTCOME_CODE,
};
use crate::sanitize::{
    dedupe_strings, merge_content_entries, resolve_outcome_description, sanitize_content_entries,
};

/// Horizontal gap inserted between a new skill and the previously
/// touched one when no explicit coordinate is given.
const PLACEMENT_SPACING: f64 = 80.0;

fn generated_id(prefix: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..8)
        .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
        .collect();
    format!("{prefix}-{}", suffix.to_lowercase())
}

// ------------------------------------------------------------------
// Operation inputs
// ------------------------------------------------------------------

/// Candidate skill fed into `upsert_skill`, typically from the catalog
/// or the placement workflow. Unset fields fall back to creation
/// defaults, or to the existing node's values when merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillDetails {
    pub id: Option<NodeId>,
    pub skill: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub outcome_code: Option<String>,
    pub outcome_description: Option<String>,
    pub draggable: Option<bool>,
    pub prerequisites: Vec<NodeId>,
    pub instructional_content: Vec<ContentEntry>,
    pub practice_questions: Vec<ContentEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeDetails {
    pub id: Option<NodeId>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub radius: Option<f64>,
    pub color: Option<String>,
    pub text: Option<String>,
    pub shape: Option<String>,
    pub draggable: Option<bool>,
}

/// Field-level patch for `update_skill`. Callers build it from the
/// current node inside the update closure, which is what makes
/// append-to-list edits atomic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub skill: Option<String>,
    pub outcome_code: Option<String>,
    pub outcome_description: Option<String>,
    pub draggable: Option<bool>,
    pub prerequisites: Option<Vec<NodeId>>,
    pub instructional_content: Option<Vec<ContentEntry>>,
    pub practice_questions: Option<Vec<ContentEntry>>,
}

// ------------------------------------------------------------------
// Pure derivation
// ------------------------------------------------------------------

/// Rebuild the connection list from scratch: one connection per
/// `(prerequisite, node)` pair where both endpoints are live. UI flags
/// survive by `(from, to)` key match against the previous list. Single
/// pass over all nodes, so cyclic prerequisites cannot loop.
pub fn derive_connections(
    nodes: &IndexMap<NodeId, Node>,
    previous: &[Connection],
) -> Vec<Connection> {
    let previous_by_key: HashMap<&str, &Connection> = previous
        .iter()
        .map(|conn| (conn.id.as_str(), conn))
        .collect();

    let mut connections = Vec::new();
    for node in nodes.values() {
        for prereq in &node.prerequisites {
            if !nodes.contains_key(prereq) {
                continue;
            }
            let key = connection_id(prereq, &node.id);
            let existing = previous_by_key.get(key.as_str());
            connections.push(Connection {
                id: key,
                from: prereq.clone(),
                to: node.id.clone(),
                hovered: existing.is_some_and(|c| c.hovered),
                selected: existing.is_some_and(|c| c.selected),
            });
        }
    }
    connections
}

// ------------------------------------------------------------------
// Store
// ------------------------------------------------------------------

pub struct SkillGraph {
    nodes: IndexMap<NodeId, Node>,
    connections: Vec<Connection>,
    /// Most recently created or merged skill; anchors the placement
    /// heuristic for the next skill without an explicit coordinate.
    last_skill: Option<NodeId>,
    revision: u64,
}

impl Default for SkillGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillGraph {
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            connections: Vec::new(),
            last_skill: None,
            revision: 0,
        }
    }

    /// Build a graph from already-normalized nodes, using
    /// `connection_hints` only to restore transient connection flags.
    pub fn from_nodes(nodes: Vec<Node>, connection_hints: &[Connection]) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.nodes.insert(node.id.clone(), node);
        }
        graph.last_skill = graph
            .nodes
            .values()
            .rev()
            .find(|node| node.is_skill())
            .map(|node| node.id.clone());
        graph.connections = connection_hints.to_vec();
        graph.rederive();
        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|conn| conn.id == id)
    }

    /// Bumped on every observable change; keys the derived-scene cache.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn last_skill(&self) -> Option<&str> {
        self.last_skill.as_deref()
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    // --------------------------------------------------------------
    // Node creation and updates
    // --------------------------------------------------------------

    /// Create a skill node, or merge `details` into the node with the
    /// same id. Merging unions prerequisites and content entries; a
    /// missing coordinate triggers the next-to-last-skill placement
    /// heuristic. Returns the id of the touched node.
    pub fn upsert_skill(&mut self, details: SkillDetails) -> NodeId {
        let id = details
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| generated_id("skill"));

        let outcome_code = details
            .outcome_code
            .clone()
            .unwrap_or_else(|| UNKNOWN_OUTCOME_CODE.to_string());
        let prerequisites = dedupe_strings(&details.prerequisites);
        let instructional = sanitize_content_entries(&details.instructional_content);
        let practice = sanitize_content_entries(&details.practice_questions);
        let provided_description = details.outcome_description.clone();

        if let Some(node) = self.nodes.get_mut(&id) {
            if let Some(x) = details.x {
                node.x = x;
            }
            if let Some(y) = details.y {
                node.y = y;
            }
            if let Some(draggable) = details.draggable {
                node.draggable = draggable;
            }
            node.prerequisites = dedupe_strings(
                node.prerequisites
                    .iter()
                    .cloned()
                    .chain(prerequisites.iter().cloned()),
            );
            if let Some(data) = node.skill_data_mut() {
                if let Some(width) = details.width {
                    data.width = width;
                }
                if let Some(height) = details.height {
                    data.height = height;
                }
                if let Some(skill) = details.skill {
                    data.skill = skill;
                }
                let existing_description = data.outcome_description.take();
                let hint = provided_description
                    .or(existing_description)
                    .map(serde_json::Value::String);
                data.outcome_description =
                    resolve_outcome_description(hint.as_ref(), &outcome_code);
                data.outcome_code = outcome_code;
                data.instructional_content =
                    merge_content_entries(&data.instructional_content, &instructional);
                data.practice_questions =
                    merge_content_entries(&data.practice_questions, &practice);
            }
        } else {
            let width = details.width.unwrap_or(DEFAULT_SKILL_WIDTH);
            let (x, y) = self.placement_position(&details, width);
            let hint = provided_description.map(serde_json::Value::String);
            let description = resolve_outcome_description(hint.as_ref(), &outcome_code);

            let node = Node {
                id: id.clone(),
                x,
                y,
                draggable: details.draggable.unwrap_or(true),
                prerequisites,
                dependents: Vec::new(),
                kind: NodeKind::Skill(SkillData {
                    skill: details.skill.unwrap_or_else(|| "New Skill".to_string()),
                    width,
                    height: details.height.unwrap_or(crate::model::DEFAULT_SKILL_HEIGHT),
                    outcome_code,
                    outcome_description: description,
                    instructional_content: instructional,
                    practice_questions: practice,
                }),
            };
            self.nodes.insert(id.clone(), node);
        }

        self.last_skill = Some(id.clone());
        self.rederive();
        id
    }

    /// Where a new skill lands when `details` carries no x: to the
    /// right of the last touched skill, vertically aligned with it.
    fn placement_position(&self, details: &SkillDetails, width: f64) -> (f64, f64) {
        if let Some(x) = details.x {
            return (x, details.y.unwrap_or(DEFAULT_SKILL_POSITION.1));
        }

        let previous = self
            .last_skill
            .as_deref()
            .and_then(|id| self.nodes.get(id))
            .filter(|node| node.is_skill());
        match previous {
            Some(node) => {
                let prev_width = node
                    .skill_data()
                    .map(|data| data.width)
                    .unwrap_or(DEFAULT_SKILL_WIDTH);
                let x = node.x + prev_width / 2.0 + PLACEMENT_SPACING + width / 2.0;
                (x, details.y.unwrap_or(node.y))
            }
            None => (
                DEFAULT_SKILL_POSITION.0,
                details.y.unwrap_or(DEFAULT_SKILL_POSITION.1),
            ),
        }
    }

    /// Create an outcome node, or reset the fields of the node with
    /// the same id (prerequisites are kept).
    pub fn upsert_outcome(&mut self, details: OutcomeDetails) -> NodeId {
        let id = details
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| generated_id("outcome"));

        let kind = NodeKind::Outcome(OutcomeData {
            radius: details
                .radius
                .unwrap_or(crate::model::DEFAULT_OUTCOME_RADIUS),
            color: details
                .color
                .unwrap_or_else(|| crate::model::DEFAULT_OUTCOME_COLOR.to_string()),
            text: details
                .text
                .unwrap_or_else(|| crate::model::DEFAULT_OUTCOME_TEXT.to_string()),
            shape: details
                .shape
                .unwrap_or_else(|| crate::model::DEFAULT_OUTCOME_SHAPE.to_string()),
        });
        let x = details.x.unwrap_or(DEFAULT_OUTCOME_POSITION.0);
        let y = details.y.unwrap_or(DEFAULT_OUTCOME_POSITION.1);
        let draggable = details.draggable.unwrap_or(true);

        if let Some(node) = self.nodes.get_mut(&id) {
            node.x = x;
            node.y = y;
            node.draggable = draggable;
            node.kind = kind;
        } else {
            self.nodes.insert(
                id.clone(),
                Node {
                    id: id.clone(),
                    x,
                    y,
                    draggable,
                    prerequisites: Vec::new(),
                    dependents: Vec::new(),
                    kind,
                },
            );
        }

        self.rederive();
        id
    }

    /// Apply a patch computed from the current node. Only skill nodes
    /// are eligible; the patch's list fields are re-sanitized on the
    /// way in. Returns whether a node was updated.
    pub fn update_skill<F>(&mut self, id: &str, changes: F) -> bool
    where
        F: FnOnce(&Node) -> SkillPatch,
    {
        let Some(node) = self.nodes.get(id).filter(|node| node.is_skill()) else {
            log::debug!("update_skill ignored: {id} is not a live skill node");
            return false;
        };
        let patch = changes(node);

        let node = self.nodes.get_mut(id).expect("checked above");
        if let Some(x) = patch.x {
            node.x = x;
        }
        if let Some(y) = patch.y {
            node.y = y;
        }
        if let Some(draggable) = patch.draggable {
            node.draggable = draggable;
        }
        if let Some(prerequisites) = patch.prerequisites {
            node.prerequisites = dedupe_strings(&prerequisites);
        }
        if let Some(data) = node.skill_data_mut() {
            if let Some(width) = patch.width {
                data.width = width;
            }
            if let Some(height) = patch.height {
                data.height = height;
            }
            if let Some(skill) = patch.skill {
                data.skill = skill;
            }
            if let Some(code) = patch.outcome_code {
                data.outcome_code = code;
            }
            if let Some(description) = patch.outcome_description {
                data.outcome_description = Some(description);
            }
            if let Some(entries) = patch.instructional_content {
                data.instructional_content = sanitize_content_entries(&entries);
            }
            if let Some(entries) = patch.practice_questions {
                data.practice_questions = sanitize_content_entries(&entries);
            }
        }

        self.rederive();
        true
    }

    /// Commit a dragged node's final position. Positions do not affect
    /// derivation, so no re-derive happens here.
    pub fn set_position(&mut self, id: &str, x: f64, y: f64) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.x = x;
                node.y = y;
                self.bump();
                true
            }
            None => false,
        }
    }

    /// Group drag: place every snapshotted skill at its pre-drag
    /// position plus `delta`. Applying from the snapshot (instead of
    /// incrementally) keeps members from drifting apart under pointer
    /// jitter.
    pub fn move_skills_from_snapshot(
        &mut self,
        snapshot: &HashMap<NodeId, Point2D<f64>>,
        delta: Vector2D<f64>,
    ) {
        let mut moved = false;
        for (id, origin) in snapshot {
            if let Some(node) = self.nodes.get_mut(id).filter(|node| node.is_skill()) {
                let target = *origin + delta;
                if node.x != target.x || node.y != target.y {
                    node.x = target.x;
                    node.y = target.y;
                    moved = true;
                }
            }
        }
        if moved {
            self.bump();
        }
    }

    // --------------------------------------------------------------
    // Edges
    // --------------------------------------------------------------

    /// Record that `from` must come before `to`. No-op on unknown ids,
    /// self-loops, and existing links.
    pub fn link(&mut self, from: &str, to: &str) -> bool {
        if from == to || !self.nodes.contains_key(from) {
            return false;
        }
        let Some(node) = self.nodes.get_mut(to) else {
            return false;
        };
        if node.prerequisites.iter().any(|id| id == from) {
            return false;
        }
        node.prerequisites.push(from.to_string());
        self.rederive();
        true
    }

    pub fn unlink(&mut self, from: &str, to: &str) -> bool {
        let Some(node) = self.nodes.get_mut(to) else {
            return false;
        };
        let before = node.prerequisites.len();
        node.prerequisites.retain(|id| id != from);
        if node.prerequisites.len() == before {
            return false;
        }
        self.rederive();
        true
    }

    /// Delete a node and prune every dangling prerequisite reference
    /// to it. Idempotent: removing an unknown id reports `false`.
    pub fn remove(&mut self, id: &str) -> bool {
        if self.nodes.shift_remove(id).is_none() {
            return false;
        }
        for node in self.nodes.values_mut() {
            node.prerequisites.retain(|prereq| prereq != id);
        }
        if self.last_skill.as_deref() == Some(id) {
            self.last_skill = self
                .nodes
                .values()
                .rev()
                .find(|node| node.is_skill())
                .map(|node| node.id.clone());
        }
        self.rederive();
        true
    }

    // --------------------------------------------------------------
    // Connection flags
    // --------------------------------------------------------------

    pub fn set_connection_hovered(&mut self, id: &str, hovered: bool) -> bool {
        match self.connections.iter_mut().find(|conn| conn.id == id) {
            Some(conn) if conn.hovered != hovered => {
                conn.hovered = hovered;
                self.bump();
                true
            }
            _ => false,
        }
    }

    /// Mark one connection selected and clear the flag everywhere else.
    pub fn select_connection(&mut self, id: &str) {
        let mut changed = false;
        for conn in &mut self.connections {
            let selected = conn.id == id;
            if conn.selected != selected {
                conn.selected = selected;
                changed = true;
            }
        }
        if changed {
            self.bump();
        }
    }

    pub fn clear_connection_selection(&mut self) {
        let mut changed = false;
        for conn in &mut self.connections {
            if conn.selected {
                conn.selected = false;
                changed = true;
            }
        }
        if changed {
            self.bump();
        }
    }

    // --------------------------------------------------------------
    // Derivation
    // --------------------------------------------------------------

    /// Recompute `dependents` for every node and rebuild the
    /// connection list. Runs synchronously after each mutation.
    fn rederive(&mut self) {
        let mut dependents: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for node in self.nodes.values() {
            for prereq in &node.prerequisites {
                let entry = dependents.entry(prereq.clone()).or_default();
                if !entry.iter().any(|id| id == &node.id) {
                    entry.push(node.id.clone());
                }
            }
        }
        let ids: Vec<NodeId> = self.nodes.keys().cloned().collect();
        for id in &ids {
            let next = dependents.remove(id).unwrap_or_default();
            let node = self.nodes.get_mut(id).expect("iterating live ids");
            node.prerequisites = dedupe_strings(&node.prerequisites);
            node.dependents = next;
        }

        self.connections = derive_connections(&self.nodes, &self.connections);
        self.bump();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn skill(id: &str) -> SkillDetails {
        SkillDetails {
            id: Some(id.to_string()),
            skill: Some(id.to_uppercase()),
            x: Some(0.0),
            y: Some(0.0),
            ..SkillDetails::default()
        }
    }

    fn assert_derived_state_consistent(graph: &SkillGraph) {
        for node in graph.nodes() {
            let expected: Vec<&str> = graph
                .nodes()
                .filter(|other| other.prerequisites.iter().any(|p| p == &node.id))
                .map(|other| other.id.as_str())
                .collect();
            let actual: Vec<&str> = node.dependents.iter().map(String::as_str).collect();
            assert_eq!(actual, expected, "dependents drifted for {}", node.id);
        }
        for conn in graph.connections() {
            let to = graph.node(&conn.to).expect("connection target exists");
            assert!(graph.contains(&conn.from));
            assert!(to.prerequisites.contains(&conn.from));
            assert_eq!(conn.id, connection_id(&conn.from, &conn.to));
        }
        let expected_count: usize = graph
            .nodes()
            .map(|node| {
                node.prerequisites
                    .iter()
                    .filter(|p| graph.contains(p))
                    .count()
            })
            .sum();
        assert_eq!(graph.connections().len(), expected_count);
    }

    #[test]
    fn link_then_remove_scenario() {
        let mut graph = SkillGraph::new();
        graph.upsert_skill(skill("a"));
        graph.upsert_skill(skill("b"));

        assert!(graph.link("a", "b"));
        assert_eq!(graph.node("b").unwrap().prerequisites, vec!["a"]);
        assert_eq!(graph.node("a").unwrap().dependents, vec!["b"]);
        assert_eq!(graph.connections().len(), 1);
        assert_eq!(graph.connections()[0].id, "conn-a-->b");
        assert_derived_state_consistent(&graph);

        assert!(graph.remove("a"));
        assert!(graph.node("b").unwrap().prerequisites.is_empty());
        assert!(graph.connections().is_empty());
        assert_derived_state_consistent(&graph);
    }

    #[test]
    fn link_rejects_self_loops_and_unknown_ids() {
        let mut graph = SkillGraph::new();
        graph.upsert_skill(skill("a"));
        assert!(!graph.link("a", "a"));
        assert!(!graph.link("a", "ghost"));
        assert!(!graph.link("ghost", "a"));
        assert!(graph.connections().is_empty());
    }

    #[test]
    fn unlink_and_remove_are_idempotent() {
        let mut graph = SkillGraph::new();
        graph.upsert_skill(skill("a"));
        graph.upsert_skill(skill("b"));
        graph.link("a", "b");

        assert!(graph.unlink("a", "b"));
        assert!(!graph.unlink("a", "b"));
        assert!(graph.remove("a"));
        assert!(!graph.remove("a"));
        assert_derived_state_consistent(&graph);
    }

    #[test]
    fn cyclic_prerequisites_do_not_loop() {
        let mut graph = SkillGraph::new();
        graph.upsert_skill(skill("a"));
        graph.upsert_skill(skill("b"));
        graph.link("a", "b");
        graph.link("b", "a");

        assert_eq!(graph.connections().len(), 2);
        assert_derived_state_consistent(&graph);
    }

    #[test]
    fn connection_flags_survive_rederivation() {
        let mut graph = SkillGraph::new();
        graph.upsert_skill(skill("a"));
        graph.upsert_skill(skill("b"));
        graph.upsert_skill(skill("c"));
        graph.link("a", "b");
        graph.select_connection("conn-a-->b");
        graph.set_connection_hovered("conn-a-->b", true);

        // An unrelated mutation re-derives everything.
        graph.link("a", "c");

        let conn = graph.connection("conn-a-->b").unwrap();
        assert!(conn.selected);
        assert!(conn.hovered);
        let other = graph.connection("conn-a-->c").unwrap();
        assert!(!other.selected);
    }

    #[test]
    fn upsert_merges_prerequisites_and_content() {
        let mut graph = SkillGraph::new();
        graph.upsert_skill(SkillDetails {
            prerequisites: vec!["x".to_string()],
            instructional_content: vec![ContentEntry::new("Intro", "Count")],
            ..skill("a")
        });
        graph.upsert_skill(SkillDetails {
            prerequisites: vec!["x".to_string(), "y".to_string()],
            instructional_content: vec![
                ContentEntry::new("Intro", "Count"),
                ContentEntry::new("More", "Practice"),
            ],
            ..skill("a")
        });

        let node = graph.node("a").unwrap();
        assert_eq!(node.prerequisites, vec!["x", "y"]);
        let data = node.skill_data().unwrap();
        assert_eq!(data.instructional_content.len(), 2);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn placement_heuristic_places_next_to_last_skill() {
        let mut graph = SkillGraph::new();
        graph.upsert_skill(SkillDetails {
            x: Some(500.0),
            y: Some(300.0),
            ..skill("first")
        });
        graph.upsert_skill(SkillDetails {
            id: Some("second".to_string()),
            ..SkillDetails::default()
        });

        let second = graph.node("second").unwrap();
        // 500 + 130 (half of first) + 80 spacing + 130 (half of new).
        assert_eq!(second.x, 840.0);
        assert_eq!(second.y, 300.0);
    }

    #[test]
    fn placement_defaults_when_canvas_is_empty() {
        let mut graph = SkillGraph::new();
        graph.upsert_skill(SkillDetails {
            id: Some("only".to_string()),
            ..SkillDetails::default()
        });
        let node = graph.node("only").unwrap();
        assert_eq!((node.x, node.y), (120.0, 120.0));
    }

    #[test]
    fn removing_last_skill_retargets_placement_anchor() {
        let mut graph = SkillGraph::new();
        graph.upsert_skill(skill("a"));
        graph.upsert_skill(skill("b"));
        assert_eq!(graph.last_skill(), Some("b"));
        graph.remove("b");
        assert_eq!(graph.last_skill(), Some("a"));
        graph.remove("a");
        assert_eq!(graph.last_skill(), None);
    }

    #[test]
    fn update_skill_supports_atomic_append() {
        let mut graph = SkillGraph::new();
        graph.upsert_skill(skill("a"));
        let updated = graph.update_skill("a", |node| {
            let mut entries = node
                .skill_data()
                .map(|data| data.practice_questions.clone())
                .unwrap_or_default();
            entries.push(ContentEntry::new("Q1", "What comes after 9?"));
            SkillPatch {
                practice_questions: Some(entries),
                ..SkillPatch::default()
            }
        });
        assert!(updated);
        assert_eq!(
            graph
                .node("a")
                .unwrap()
                .skill_data()
                .unwrap()
                .practice_questions
                .len(),
            1
        );

        // Outcome nodes and unknown ids are not updatable.
        graph.upsert_outcome(OutcomeDetails {
            id: Some("o".to_string()),
            ..OutcomeDetails::default()
        });
        assert!(!graph.update_skill("o", |_| SkillPatch::default()));
        assert!(!graph.update_skill("ghost", |_| SkillPatch::default()));
    }

    #[test]
    fn generated_ids_carry_the_variant_prefix() {
        let mut graph = SkillGraph::new();
        let id = graph.upsert_skill(SkillDetails::default());
        assert!(id.starts_with("skill-"));
        let id = graph.upsert_outcome(OutcomeDetails::default());
        assert!(id.starts_with("outcome-"));
    }

    proptest! {
        /// Derived state stays consistent under arbitrary edit sequences.
        #[test]
        fn derivation_invariants_hold(ops in proptest::collection::vec((0u8..5, 0usize..6, 0usize..6), 0..40)) {
            let ids = ["n0", "n1", "n2", "n3", "n4", "n5"];
            let mut graph = SkillGraph::new();
            for (op, a, b) in ops {
                let (a, b) = (ids[a], ids[b]);
                match op {
                    0 => {
                        graph.upsert_skill(skill(a));
                    }
                    1 => {
                        graph.link(a, b);
                    }
                    2 => {
                        graph.unlink(a, b);
                    }
                    3 => {
                        graph.remove(a);
                    }
                    _ => {
                        graph.upsert_outcome(OutcomeDetails {
                            id: Some(a.to_string()),
                            ..OutcomeDetails::default()
                        });
                    }
                }
                assert_derived_state_consistent(&graph);
            }
        }
    }
}
