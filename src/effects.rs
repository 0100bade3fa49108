// Effects - side-effecting follow-ups produced by the reducer. The
// runner owns the persistence boundary: failed saves leave the
// in-memory state untouched, unparseable loads fall back to the empty
// canvas. Both surface through `store.error_message`.

use crate::persistence::{self, PersistError, PersistenceGateway};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Save,
    Load,
}

pub fn run(store: &mut Store, gateway: &mut dyn PersistenceGateway, effect: Effect) {
    match effect {
        Effect::Save => {
            let document = persistence::document_from_graph(&store.graph);
            match gateway.save(&document) {
                Ok(()) => {
                    store.error_message = None;
                }
                Err(err) => {
                    log::warn!("saving canvas state failed: {err}");
                    store.error_message = Some(format!("Failed to save progress: {err}"));
                }
            }
        }
        Effect::Load => match gateway.load() {
            Ok(value) => {
                store.graph = persistence::graph_from_value(&value);
                store.clear_selection();
                store.error_message = None;
            }
            Err(err @ PersistError::Json(_)) => {
                // Corrupt state: recover with an empty canvas instead
                // of refusing to start.
                log::warn!("persisted canvas state is corrupt: {err}");
                store.graph = crate::graph::SkillGraph::new();
                store.clear_selection();
                store.error_message = Some(format!("Failed to load progress: {err}"));
            }
            Err(err) => {
                log::warn!("loading canvas state failed: {err}");
                store.error_message = Some(format!("Failed to load progress: {err}"));
            }
        },
    }
}
