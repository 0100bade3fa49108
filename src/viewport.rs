// Viewport - pan/zoom state plus the culling queries that decide
// which nodes and connections are worth handing to the renderer.

use std::collections::HashSet;

use euclid::default::{Box2D, Point2D, Vector2D};

use crate::graph::SkillGraph;
use crate::model::{Connection, Node, NodeId};

/// Margin added around the visible rectangle so nodes just off-screen
/// are still rendered and drags never pop in late.
pub const VIEW_PADDING: f64 = 400.0;

/// Zoom factor applied per wheel step.
pub const SCALE_BY: f64 = 1.05;
pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 5.0;

/// Pan/zoom state in screen space. `pan` is the screen position of
/// the canvas origin, `scale` the canvas-to-screen factor.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub pan: Vector2D<f64>,
    pub scale: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vector2D::zero(),
            scale: 1.0,
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan = Vector2D::new(x, y);
    }

    /// Screen point -> canvas coordinates under the current transform.
    pub fn to_canvas(&self, screen: Point2D<f64>) -> Point2D<f64> {
        Point2D::new(
            (screen.x - self.pan.x) / self.scale,
            (screen.y - self.pan.y) / self.scale,
        )
    }

    /// One wheel step, anchored at the pointer: the canvas point under
    /// the pointer stays fixed while the scale changes.
    pub fn zoom_at(&mut self, pointer: Point2D<f64>, delta_y: f64) {
        let anchor = self.to_canvas(pointer);
        let proposed = if delta_y > 0.0 {
            self.scale / SCALE_BY
        } else {
            self.scale * SCALE_BY
        };
        self.scale = proposed.clamp(MIN_SCALE, MAX_SCALE);
        self.pan = Vector2D::new(
            pointer.x - anchor.x * self.scale,
            pointer.y - anchor.y * self.scale,
        );
    }

    /// Visible canvas rectangle implied by the current pan/zoom.
    pub fn view_bounds(&self) -> Box2D<f64> {
        let min = Point2D::new(-self.pan.x / self.scale, -self.pan.y / self.scale);
        Box2D::new(
            min,
            Point2D::new(min.x + self.width / self.scale, min.y + self.height / self.scale),
        )
    }

    fn padded_bounds(&self) -> Box2D<f64> {
        self.view_bounds().inflate(VIEW_PADDING, VIEW_PADDING)
    }

    pub fn is_visible(&self, node: &Node) -> bool {
        self.padded_bounds().intersects(&node.bounds())
    }

    /// Nodes inside the padded view rectangle, plus every id in
    /// `forced` regardless of position (selected nodes, connection
    /// endpoints, drag participants).
    pub fn visible_nodes<'a>(
        &self,
        graph: &'a SkillGraph,
        forced: &HashSet<NodeId>,
    ) -> Vec<&'a Node> {
        let bounds = self.padded_bounds();
        let mut visible: Vec<&Node> = Vec::new();
        let mut included: HashSet<&str> = HashSet::new();
        for node in graph.nodes() {
            if bounds.intersects(&node.bounds()) {
                visible.push(node);
                included.insert(node.id.as_str());
            }
        }
        for id in forced {
            if included.contains(id.as_str()) {
                continue;
            }
            if let Some(node) = graph.node(id) {
                visible.push(node);
                included.insert(node.id.as_str());
            }
        }
        visible
    }

    /// Connections touching the visible set with either endpoint; a
    /// selected connection is always kept so its highlight cannot
    /// vanish mid-interaction.
    pub fn visible_connections<'a>(
        &self,
        connections: &'a [Connection],
        visible_ids: &HashSet<&str>,
    ) -> Vec<&'a Connection> {
        connections
            .iter()
            .filter(|conn| {
                conn.selected
                    || visible_ids.contains(conn.from.as_str())
                    || visible_ids.contains(conn.to.as_str())
            })
            .collect()
    }
}
