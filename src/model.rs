// Canonical canvas data model - node variants, connections, outcome groups.

use euclid::default::{Box2D, Point2D};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SKILL_WIDTH: f64 = 260.0;
pub const DEFAULT_SKILL_HEIGHT: f64 = 180.0;
pub const DEFAULT_OUTCOME_RADIUS: f64 = 60.0;

pub const DEFAULT_SKILL_POSITION: (f64, f64) = (120.0, 120.0);
pub const DEFAULT_OUTCOME_POSITION: (f64, f64) = (160.0, 160.0);

pub const DEFAULT_OUTCOME_COLOR: &str = "#2563eb";
pub const DEFAULT_OUTCOME_TEXT: &str = "Outcome";
pub const DEFAULT_OUTCOME_SHAPE: &str = "circle";

pub const UNKNOWN_OUTCOME_CODE: &str = "Unknown Outcome";

pub type NodeId = String;

// ------------------------------------------------------------------
// Content entries
// ------------------------------------------------------------------

/// A titled block of text attached to a skill (instructional material
/// or a practice question).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub title: String,
    pub content: String,
}

impl ContentEntry {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

// ------------------------------------------------------------------
// Nodes
// ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillData {
    pub skill: String,
    pub width: f64,
    pub height: f64,
    pub outcome_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome_description: Option<String>,
    pub instructional_content: Vec<ContentEntry>,
    pub practice_questions: Vec<ContentEntry>,
}

impl Default for SkillData {
    fn default() -> Self {
        Self {
            skill: "New Skill".to_string(),
            width: DEFAULT_SKILL_WIDTH,
            height: DEFAULT_SKILL_HEIGHT,
            outcome_code: UNKNOWN_OUTCOME_CODE.to_string(),
            outcome_description: None,
            instructional_content: Vec::new(),
            practice_questions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeData {
    pub radius: f64,
    pub color: String,
    pub text: String,
    /// Shape kind used by the renderer ("circle", "rect", ...).
    #[serde(rename = "type")]
    pub shape: String,
}

impl Default for OutcomeData {
    fn default() -> Self {
        Self {
            radius: DEFAULT_OUTCOME_RADIUS,
            color: DEFAULT_OUTCOME_COLOR.to_string(),
            text: DEFAULT_OUTCOME_TEXT.to_string(),
            shape: DEFAULT_OUTCOME_SHAPE.to_string(),
        }
    }
}

/// Variant-specific node payload. Serialized with a `variant` tag so
/// persisted records stay distinguishable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum NodeKind {
    Skill(SkillData),
    Outcome(OutcomeData),
}

/// A canvas node. Transient UI flags (hover, selection, click counts)
/// are interaction state and deliberately absent from this type, so
/// anything reachable from here is safe to persist as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub draggable: bool,
    /// Ids of nodes that must come before this one. Deduplicated,
    /// never contains empty strings.
    pub prerequisites: Vec<NodeId>,
    /// Derived reverse edges; recomputed from every node's
    /// prerequisites after each mutation. Never authoritative.
    pub dependents: Vec<NodeId>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn is_skill(&self) -> bool {
        matches!(self.kind, NodeKind::Skill(_))
    }

    pub fn skill_data(&self) -> Option<&SkillData> {
        match &self.kind {
            NodeKind::Skill(data) => Some(data),
            NodeKind::Outcome(_) => None,
        }
    }

    pub fn skill_data_mut(&mut self) -> Option<&mut SkillData> {
        match &mut self.kind {
            NodeKind::Skill(data) => Some(data),
            NodeKind::Outcome(_) => None,
        }
    }

    pub fn outcome_data(&self) -> Option<&OutcomeData> {
        match &self.kind {
            NodeKind::Skill(_) => None,
            NodeKind::Outcome(data) => Some(data),
        }
    }

    pub fn position(&self) -> Point2D<f64> {
        Point2D::new(self.x, self.y)
    }

    /// Axis-aligned bounding box of the node geometry: skills are
    /// center-anchored rectangles, everything else a circle.
    pub fn bounds(&self) -> Box2D<f64> {
        match &self.kind {
            NodeKind::Skill(data) => Box2D::new(
                Point2D::new(self.x - data.width / 2.0, self.y - data.height / 2.0),
                Point2D::new(self.x + data.width / 2.0, self.y + data.height / 2.0),
            ),
            NodeKind::Outcome(data) => Box2D::new(
                Point2D::new(self.x - data.radius, self.y - data.radius),
                Point2D::new(self.x + data.radius, self.y + data.radius),
            ),
        }
    }
}

// ------------------------------------------------------------------
// Connections
// ------------------------------------------------------------------

/// Rendered representation of one prerequisite edge. Derived from the
/// node set, never independently authored; `hovered`/`selected` are
/// transient flags preserved across re-derivation by `(from, to)` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub from: NodeId,
    pub to: NodeId,
    pub hovered: bool,
    pub selected: bool,
}

impl Connection {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        let from = from.into();
        let to = to.into();
        Self {
            id: connection_id(&from, &to),
            from,
            to,
            hovered: false,
            selected: false,
        }
    }
}

pub fn connection_id(from: &str, to: &str) -> String {
    format!("conn-{from}-->{to}")
}

// ------------------------------------------------------------------
// Outcome groups
// ------------------------------------------------------------------

/// View-only cluster of the visible skills sharing an outcome code:
/// the padded union bounding box plus a header band, recomputed every
/// time the visible skill set changes.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeGroup {
    pub code: String,
    pub description: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub header_height: f64,
    pub skill_ids: Vec<NodeId>,
}

// ------------------------------------------------------------------
// Connection anchor geometry
// ------------------------------------------------------------------

/// Where an arrow between two nodes should leave the source shape and
/// enter the target shape, along the center-to-center angle.
pub fn connection_anchors(from: &Node, to: &Node) -> (Point2D<f64>, Point2D<f64>) {
    let angle = (to.y - from.y).atan2(to.x - from.x);
    (
        shape_edge_point(from, angle, true),
        shape_edge_point(to, angle, false),
    )
}

fn shape_edge_point(node: &Node, angle: f64, outgoing: bool) -> Point2D<f64> {
    let direction = if outgoing { 1.0 } else { -1.0 };
    let dx = angle.cos() * direction;
    let dy = angle.sin() * direction;

    match &node.kind {
        NodeKind::Outcome(data) => {
            let radius = (data.radius - 6.0).max(0.0);
            Point2D::new(node.x + dx * radius, node.y + dy * radius)
        }
        NodeKind::Skill(data) => {
            let half_width = data.width / 2.0;
            let half_height = data.height / 2.0;
            let epsilon = 1e-4;

            let x_factor = if dx.abs() > epsilon {
                half_width / dx.abs()
            } else {
                f64::INFINITY
            };
            let y_factor = if dy.abs() > epsilon {
                half_height / dy.abs()
            } else {
                f64::INFINITY
            };
            let mut scale = x_factor.min(y_factor);
            if !scale.is_finite() {
                scale = half_width.max(half_height);
            }

            let adjusted = (scale - 8.0).max(0.0);
            Point2D::new(node.x + dx * adjusted, node.y + dy * adjusted)
        }
    }
}
