// Interaction store - the graph plus every piece of transient UI
// state: selection, hover, drags, the connect gesture, click counters,
// and the single-slot skill placement workflow. None of this is ever
// persisted.

use std::collections::{HashMap, HashSet};

use euclid::default::Point2D;
use thiserror::Error;

use crate::graph::{SkillDetails, SkillGraph};
use crate::model::NodeId;
use crate::viewport::Viewport;

// ------------------------------------------------------------------
// Placement workflow
// ------------------------------------------------------------------

/// Why a pending placement ended without a node being placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementCancelled {
    #[error("a skill placement is already pending")]
    Superseded,
    #[error("the placement was dismissed")]
    Dismissed,
    #[error("the canvas engine was shut down")]
    EngineClosed,
}

/// Exactly one of these reaches the waiter of every placement.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementOutcome {
    Placed { id: NodeId, x: f64, y: f64 },
    Cancelled(PlacementCancelled),
}

/// Callback notified when a placement resolves. Held by the store, not
/// cloned around, so it stays a plain `FnOnce`.
pub type PlacementWaiter = Box<dyn FnOnce(PlacementOutcome)>;

struct PendingPlacement {
    details: SkillDetails,
    waiter: Option<PlacementWaiter>,
}

impl PendingPlacement {
    fn resolve(mut self, outcome: PlacementOutcome) {
        if let Some(waiter) = self.waiter.take() {
            waiter(outcome);
        }
    }
}

// ------------------------------------------------------------------
// Drag state
// ------------------------------------------------------------------

/// Snapshot taken when an outcome-group drag starts. Positions are
/// always recomputed as snapshot + total delta, so pointer jitter can
/// never make group members drift apart.
#[derive(Debug, Clone)]
pub struct OutcomeDrag {
    pub code: String,
    pub origin: Point2D<f64>,
    pub snapshot: HashMap<NodeId, Point2D<f64>>,
}

/// Cursor the renderer should show for the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    /// A placement is pending; the next canvas click drops the skill.
    Copy,
    /// Connect mode: the next node click becomes the link target.
    Crosshair,
    Grabbing,
    Grab,
}

// ------------------------------------------------------------------
// Store
// ------------------------------------------------------------------

pub struct Store {
    pub graph: SkillGraph,
    pub viewport: Viewport,

    pub selected_node: Option<NodeId>,
    pub selected_connection: Option<String>,
    pub selected_outcome: Option<String>,
    pub connecting_from: Option<NodeId>,
    pub hovered_node: Option<NodeId>,
    pub dragging_node: Option<NodeId>,
    pub outcome_drag: Option<OutcomeDrag>,
    pub click_counts: HashMap<NodeId, u64>,

    pub error_message: Option<String>,

    pending_placement: Option<PendingPlacement>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            graph: SkillGraph::new(),
            viewport: Viewport::default(),
            selected_node: None,
            selected_connection: None,
            selected_outcome: None,
            connecting_from: None,
            hovered_node: None,
            dragging_node: None,
            outcome_drag: None,
            click_counts: HashMap::new(),
            error_message: None,
            pending_placement: None,
        }
    }

    // --------------------------------------------------------------
    // Selection
    // --------------------------------------------------------------

    pub fn select_node(&mut self, id: &str) {
        if !self.graph.contains(id) {
            return;
        }
        self.clear_selection();
        self.selected_node = Some(id.to_string());
    }

    pub fn select_connection(&mut self, id: &str) {
        if self.graph.connection(id).is_none() {
            return;
        }
        self.clear_selection();
        self.selected_connection = Some(id.to_string());
        self.graph.select_connection(id);
    }

    pub fn select_outcome(&mut self, code: &str) {
        self.clear_selection();
        self.selected_outcome = Some(code.to_string());
    }

    /// Drop every selection, including the connection flag mirrored
    /// into the graph, and leave connect mode.
    pub fn clear_selection(&mut self) {
        self.selected_node = None;
        self.selected_outcome = None;
        self.connecting_from = None;
        if self.selected_connection.take().is_some() {
            self.graph.clear_connection_selection();
        }
    }

    pub fn record_click(&mut self, id: &str) {
        *self.click_counts.entry(id.to_string()).or_insert(0) += 1;
    }

    /// Forget transient state that refers to a node that just left the
    /// graph.
    pub fn forget_node(&mut self, id: &str) {
        if self.selected_node.as_deref() == Some(id) {
            self.selected_node = None;
        }
        if self.connecting_from.as_deref() == Some(id) {
            self.connecting_from = None;
        }
        if self.hovered_node.as_deref() == Some(id) {
            self.hovered_node = None;
        }
        if self.dragging_node.as_deref() == Some(id) {
            self.dragging_node = None;
        }
        self.click_counts.remove(id);
        if let Some(selected) = self.selected_connection.clone() {
            if self.graph.connection(&selected).is_none() {
                self.selected_connection = None;
            }
        }
    }

    // --------------------------------------------------------------
    // Placement workflow
    // --------------------------------------------------------------

    /// Arm the placement slot. An already-pending placement is
    /// cancelled as `Superseded` before the new one takes the slot.
    pub fn begin_placement(&mut self, details: SkillDetails, waiter: Option<PlacementWaiter>) {
        if let Some(previous) = self.pending_placement.take() {
            log::debug!("placement superseded before being placed");
            previous.resolve(PlacementOutcome::Cancelled(PlacementCancelled::Superseded));
        }
        self.pending_placement = Some(PendingPlacement { details, waiter });
    }

    pub fn placement_pending(&self) -> bool {
        self.pending_placement.is_some()
    }

    /// Id the pending placement will use, for UI labelling.
    pub fn placement_label(&self) -> Option<&str> {
        self.pending_placement
            .as_ref()
            .and_then(|pending| pending.details.id.as_deref())
    }

    /// Drop the pending skill at a canvas position. Returns the new
    /// node id, or `None` when no placement was pending.
    pub fn complete_placement(&mut self, position: Point2D<f64>) -> Option<NodeId> {
        let pending = self.pending_placement.take()?;
        let mut details = pending.details.clone();
        details.x = Some(position.x);
        details.y = Some(position.y);
        let id = self.graph.upsert_skill(details);
        pending.resolve(PlacementOutcome::Placed {
            id: id.clone(),
            x: position.x,
            y: position.y,
        });
        Some(id)
    }

    /// Resolve the pending placement as cancelled. Returns whether a
    /// placement was pending.
    pub fn cancel_placement(&mut self, reason: PlacementCancelled) -> bool {
        match self.pending_placement.take() {
            Some(pending) => {
                pending.resolve(PlacementOutcome::Cancelled(reason));
                true
            }
            None => false,
        }
    }

    // --------------------------------------------------------------
    // Scene inputs
    // --------------------------------------------------------------

    pub fn cursor(&self) -> CursorHint {
        if self.placement_pending() {
            CursorHint::Copy
        } else if self.connecting_from.is_some() {
            CursorHint::Crosshair
        } else if self.dragging_node.is_some() || self.outcome_drag.is_some() {
            CursorHint::Grabbing
        } else {
            CursorHint::Grab
        }
    }

    /// Nodes that must stay in the visible set even when culled:
    /// selection, the connect-mode source, the active drag node, and
    /// the endpoints of the selected connection.
    pub fn forced_visible_ids(&self) -> HashSet<NodeId> {
        let mut forced = HashSet::new();
        if let Some(id) = &self.selected_node {
            forced.insert(id.clone());
        }
        if let Some(id) = &self.connecting_from {
            forced.insert(id.clone());
        }
        if let Some(id) = &self.dragging_node {
            forced.insert(id.clone());
        }
        if let Some(conn_id) = &self.selected_connection {
            if let Some(conn) = self.graph.connection(conn_id) {
                forced.insert(conn.from.clone());
                forced.insert(conn.to.clone());
            }
        }
        forced
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if let Some(pending) = self.pending_placement.take() {
            pending.resolve(PlacementOutcome::Cancelled(PlacementCancelled::EngineClosed));
        }
    }
}
