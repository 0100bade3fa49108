// Actions - every externally triggered event, and the reducer turning
// an action into store mutations plus follow-up effects. Pointer
// coordinates arrive in screen space and are converted through the
// viewport where a canvas position is needed.

use euclid::default::Point2D;

use crate::effects::Effect;
use crate::graph::{OutcomeDetails, SkillDetails, SkillPatch};
use crate::model::{ContentEntry, NodeId};
use crate::store::{PlacementCancelled, Store};

#[derive(Debug, Clone)]
pub enum Action {
    // Pointer events.
    NodeClicked { id: NodeId, x: f64, y: f64 },
    NodeHovered { id: NodeId, hovered: bool },
    NodeDragStarted { id: NodeId },
    NodeDragEnded { id: NodeId, x: f64, y: f64 },
    PointerReleased,
    ConnectionHandleClicked { id: NodeId },
    ConnectionClicked { id: String },
    ConnectionHovered { id: String, hovered: bool },
    OutcomeGroupClicked { code: String },
    OutcomeDragStarted { code: String, x: f64, y: f64 },
    OutcomeDragMoved { x: f64, y: f64 },
    OutcomeDragEnded,
    CanvasClicked { x: f64, y: f64 },

    // Viewport events.
    Wheel { x: f64, y: f64, delta_y: f64 },
    PanChanged { x: f64, y: f64 },
    Resized { width: f64, height: f64 },

    // Editing commands.
    BeginPlacement { details: SkillDetails },
    CancelPlacement,
    AddSkill { details: SkillDetails },
    AddOutcome { details: OutcomeDetails },
    UpdateSkill { id: NodeId, patch: SkillPatch },
    RemovePrerequisite { id: NodeId, prereq: NodeId },
    AddInstructionalContent { id: NodeId, entry: ContentEntry },
    AddPracticeQuestion { id: NodeId, entry: ContentEntry },
    LinkNodes { from: NodeId, to: NodeId },
    UnlinkNodes { from: NodeId, to: NodeId },
    RemoveNode { id: NodeId },
    DeleteSelected,
    ClearSelection,

    // Persistence.
    Save,
    Load,
    ClearErrorMessage,
}

/// A pending placement wins every click: the click position becomes
/// the new node's home and nothing else happens.
fn try_commit_placement(store: &mut Store, screen: Point2D<f64>) -> bool {
    if !store.placement_pending() {
        return false;
    }
    let position = store.viewport.to_canvas(screen);
    store.complete_placement(position);
    true
}

/// Append `entry` to one of a skill's content lists. Blank titles or
/// content report "no change".
fn append_content(store: &mut Store, id: &str, entry: ContentEntry, practice: bool) {
    if entry.title.trim().is_empty() || entry.content.trim().is_empty() {
        return;
    }
    store.graph.update_skill(id, |node| {
        let data = node.skill_data().expect("update_skill checks the variant");
        if practice {
            let mut entries = data.practice_questions.clone();
            entries.push(entry);
            SkillPatch {
                practice_questions: Some(entries),
                ..SkillPatch::default()
            }
        } else {
            let mut entries = data.instructional_content.clone();
            entries.push(entry);
            SkillPatch {
                instructional_content: Some(entries),
                ..SkillPatch::default()
            }
        }
    });
}

pub fn update(store: &mut Store, action: Action) -> Vec<Effect> {
    match action {
        Action::NodeClicked { id, x, y } => {
            if try_commit_placement(store, Point2D::new(x, y)) {
                return Vec::new();
            }
            if !store.graph.contains(&id) {
                return Vec::new();
            }
            store.record_click(&id);
            match store.connecting_from.take() {
                Some(from) if from != id => {
                    store.graph.link(&from, &id);
                }
                Some(_) => {
                    // Clicking the source again leaves connect mode.
                }
                None => {
                    store.select_node(&id);
                }
            }
            Vec::new()
        }
        Action::NodeHovered { id, hovered } => {
            if hovered {
                store.hovered_node = Some(id);
            } else if store.hovered_node.as_deref() == Some(id.as_str()) {
                store.hovered_node = None;
            }
            Vec::new()
        }
        Action::NodeDragStarted { id } => {
            if store.graph.node(&id).is_some_and(|node| node.draggable) {
                store.dragging_node = Some(id);
            }
            Vec::new()
        }
        Action::NodeDragEnded { id, x, y } => {
            store.graph.set_position(&id, x, y);
            store.dragging_node = None;
            Vec::new()
        }
        Action::PointerReleased => {
            // Force-end any drag whose end event got lost.
            store.dragging_node = None;
            store.outcome_drag = None;
            Vec::new()
        }
        Action::ConnectionHandleClicked { id } => {
            if store.graph.contains(&id) {
                store.clear_selection();
                store.connecting_from = Some(id);
            }
            Vec::new()
        }
        Action::ConnectionClicked { id } => {
            store.select_connection(&id);
            Vec::new()
        }
        Action::ConnectionHovered { id, hovered } => {
            store.graph.set_connection_hovered(&id, hovered);
            Vec::new()
        }
        Action::OutcomeGroupClicked { code } => {
            store.select_outcome(&code);
            Vec::new()
        }
        Action::OutcomeDragStarted { code, x, y } => {
            let forced = store.forced_visible_ids();
            let snapshot = store
                .viewport
                .visible_nodes(&store.graph, &forced)
                .into_iter()
                .filter(|node| {
                    node.skill_data()
                        .is_some_and(|data| data.outcome_code == code)
                })
                .map(|node| (node.id.clone(), node.position()))
                .collect();
            store.outcome_drag = Some(crate::store::OutcomeDrag {
                code,
                origin: Point2D::new(x, y),
                snapshot,
            });
            Vec::new()
        }
        Action::OutcomeDragMoved { x, y } => {
            if let Some(drag) = store.outcome_drag.clone() {
                let delta = Point2D::new(x, y) - drag.origin;
                store.graph.move_skills_from_snapshot(&drag.snapshot, delta);
            }
            Vec::new()
        }
        Action::OutcomeDragEnded => {
            store.outcome_drag = None;
            Vec::new()
        }
        Action::CanvasClicked { x, y } => {
            if try_commit_placement(store, Point2D::new(x, y)) {
                return Vec::new();
            }
            store.clear_selection();
            Vec::new()
        }
        Action::Wheel { x, y, delta_y } => {
            store.viewport.zoom_at(Point2D::new(x, y), delta_y);
            Vec::new()
        }
        Action::PanChanged { x, y } => {
            // A stage drag is suppressed while a node drag is live.
            if store.dragging_node.is_none() && store.outcome_drag.is_none() {
                store.viewport.set_pan(x, y);
            }
            Vec::new()
        }
        Action::Resized { width, height } => {
            store.viewport.resize(width, height);
            Vec::new()
        }
        Action::BeginPlacement { details } => {
            store.begin_placement(details, None);
            Vec::new()
        }
        Action::CancelPlacement => {
            store.cancel_placement(PlacementCancelled::Dismissed);
            Vec::new()
        }
        Action::AddSkill { details } => {
            store.graph.upsert_skill(details);
            Vec::new()
        }
        Action::AddOutcome { details } => {
            store.graph.upsert_outcome(details);
            Vec::new()
        }
        Action::UpdateSkill { id, patch } => {
            store.graph.update_skill(&id, |_| patch);
            Vec::new()
        }
        Action::RemovePrerequisite { id, prereq } => {
            store.graph.update_skill(&id, |node| SkillPatch {
                prerequisites: Some(
                    node.prerequisites
                        .iter()
                        .filter(|value| *value != &prereq)
                        .cloned()
                        .collect(),
                ),
                ..SkillPatch::default()
            });
            Vec::new()
        }
        Action::AddInstructionalContent { id, entry } => {
            append_content(store, &id, entry, false);
            Vec::new()
        }
        Action::AddPracticeQuestion { id, entry } => {
            append_content(store, &id, entry, true);
            Vec::new()
        }
        Action::LinkNodes { from, to } => {
            store.graph.link(&from, &to);
            Vec::new()
        }
        Action::UnlinkNodes { from, to } => {
            store.graph.unlink(&from, &to);
            Vec::new()
        }
        Action::RemoveNode { id } => {
            if store.graph.remove(&id) {
                store.forget_node(&id);
            }
            Vec::new()
        }
        Action::DeleteSelected => {
            if store.selected_outcome.is_some() {
                // Outcome groups are views; deleting one only drops
                // the selection.
                store.clear_selection();
            } else if let Some(id) = store.selected_node.clone() {
                store.graph.remove(&id);
                store.forget_node(&id);
                store.clear_selection();
            } else if let Some(conn_id) = store.selected_connection.clone() {
                if let Some(conn) = store.graph.connection(&conn_id).cloned() {
                    store.graph.unlink(&conn.from, &conn.to);
                }
                store.clear_selection();
            }
            Vec::new()
        }
        Action::ClearSelection => {
            store.clear_selection();
            Vec::new()
        }
        Action::Save => vec![Effect::Save],
        Action::Load => vec![Effect::Load],
        Action::ClearErrorMessage => {
            store.error_message = None;
            Vec::new()
        }
    }
}
