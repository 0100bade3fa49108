// Engine wrapper - the store plus the queues that make `dispatch` the
// single entry point. Actions run first and may enqueue effects;
// effects run against the persistence gateway afterwards, so a burst
// of actions settles before anything touches storage.

use std::collections::{HashSet, VecDeque};

use crate::actions::{self, Action};
use crate::cache::{Cache, Scene};
use crate::catalog::{NextSkill, SkillCatalog};
use crate::effects::{self, Effect};
use crate::model::NodeId;
use crate::persistence::{MemoryGateway, PersistenceGateway};
use crate::store::{PlacementWaiter, Store};

pub struct State {
    pub store: Store,
    cache: Cache,
    gateway: Box<dyn PersistenceGateway>,
    action_queue: VecDeque<Action>,
    effect_queue: VecDeque<Effect>,
}

impl Default for State {
    fn default() -> Self {
        Self::new(Box::new(MemoryGateway::new()))
    }
}

impl State {
    pub fn new(gateway: Box<dyn PersistenceGateway>) -> Self {
        Self {
            store: Store::new(),
            cache: Cache::new(),
            gateway,
            action_queue: VecDeque::new(),
            effect_queue: VecDeque::new(),
        }
    }

    /// Queue an action and immediately settle the queues.
    pub fn dispatch(&mut self, action: Action) {
        self.action_queue.push_back(action);
        self.flush();
    }

    /// Queue without flushing, for callers batching several actions.
    pub fn enqueue(&mut self, action: Action) {
        self.action_queue.push_back(action);
    }

    pub fn flush(&mut self) {
        self.flush_actions();
        self.flush_effects();
    }

    fn flush_actions(&mut self) {
        while let Some(action) = self.action_queue.pop_front() {
            let effects = actions::update(&mut self.store, action);
            self.effect_queue.extend(effects);
        }
    }

    fn flush_effects(&mut self) {
        while let Some(effect) = self.effect_queue.pop_front() {
            effects::run(&mut self.store, self.gateway.as_mut(), effect);
        }
    }

    /// The memoized render snapshot for the current store state.
    pub fn scene(&mut self) -> &Scene {
        self.cache.scene(&self.store)
    }

    /// Programmatic placement entry point; unlike the action form this
    /// one can register a waiter for the outcome.
    pub fn begin_placement(
        &mut self,
        details: crate::graph::SkillDetails,
        waiter: PlacementWaiter,
    ) {
        self.store.begin_placement(details, Some(waiter));
    }

    /// Catalog-driven add flow: fetch the next skill not yet on the
    /// canvas and arm a placement for it. The returned answer carries
    /// the record and how many are left; when the catalog is
    /// exhausted, nothing is armed.
    pub fn add_next_skill(
        &mut self,
        catalog: &mut dyn SkillCatalog,
        waiter: Option<PlacementWaiter>,
    ) -> NextSkill {
        let placed: HashSet<NodeId> = self
            .store
            .graph
            .nodes()
            .map(|node| node.id.clone())
            .collect();
        let next = catalog.next_unplaced(&placed);
        if let Some(record) = next.skill.clone() {
            self.store.begin_placement(record.into(), waiter);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::graph::SkillDetails;
    use crate::store::{PlacementCancelled, PlacementOutcome};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn dispatch_runs_actions_then_effects() {
        let mut state = State::default();
        state.dispatch(Action::AddSkill {
            details: SkillDetails {
                id: Some("a".to_string()),
                x: Some(0.0),
                y: Some(0.0),
                ..SkillDetails::default()
            },
        });
        state.dispatch(Action::Save);

        let mut fresh = State::default();
        fresh.dispatch(Action::Load);
        assert!(fresh.store.graph.is_empty());

        // Same engine reloads what it saved.
        state.dispatch(Action::RemoveNode {
            id: "a".to_string(),
        });
        assert!(state.store.graph.is_empty());
        state.dispatch(Action::Load);
        assert!(state.store.graph.contains("a"));
    }

    #[test]
    fn batched_actions_settle_before_effects_run() {
        let mut state = State::default();
        state.enqueue(Action::AddSkill {
            details: SkillDetails {
                id: Some("a".to_string()),
                x: Some(0.0),
                y: Some(0.0),
                ..SkillDetails::default()
            },
        });
        state.enqueue(Action::Save);
        state.enqueue(Action::LinkNodes {
            from: "a".to_string(),
            to: "a".to_string(),
        });
        state.flush();

        // The save saw the node added in the same batch.
        state.dispatch(Action::RemoveNode {
            id: "a".to_string(),
        });
        state.dispatch(Action::Load);
        assert!(state.store.graph.contains("a"));
    }

    #[test]
    fn scene_is_queryable_between_dispatches() {
        let mut state = State::default();
        state.dispatch(Action::AddSkill {
            details: SkillDetails {
                id: Some("a".to_string()),
                x: Some(0.0),
                y: Some(0.0),
                ..SkillDetails::default()
            },
        });
        assert_eq!(state.scene().nodes.len(), 1);
    }

    #[test]
    fn catalog_flow_places_skills_in_order() {
        let mut state = State::default();
        let mut catalog = StaticCatalog::default();
        let outcome = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&outcome);

        let next = state.add_next_skill(
            &mut catalog,
            Some(Box::new(move |result| {
                *slot.borrow_mut() = Some(result);
            })),
        );
        assert_eq!(next.skill.unwrap().id, "counting");
        assert!(state.store.placement_pending());

        state.dispatch(Action::CanvasClicked { x: 200.0, y: 150.0 });
        assert!(state.store.graph.contains("counting"));
        assert_eq!(
            outcome.borrow().clone(),
            Some(PlacementOutcome::Placed {
                id: "counting".to_string(),
                x: 200.0,
                y: 150.0
            })
        );

        let next = state.add_next_skill(&mut catalog, None);
        assert_eq!(next.skill.unwrap().id, "addition");
    }

    #[test]
    fn catalog_flow_preempts_an_armed_placement() {
        let mut state = State::default();
        let mut catalog = StaticCatalog::default();
        let outcome = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&outcome);

        state.add_next_skill(
            &mut catalog,
            Some(Box::new(move |result| {
                *slot.borrow_mut() = Some(result);
            })),
        );
        state.add_next_skill(&mut catalog, None);

        assert_eq!(
            outcome.borrow().clone(),
            Some(PlacementOutcome::Cancelled(PlacementCancelled::Superseded))
        );
    }

    #[test]
    fn exhausted_catalog_arms_nothing() {
        let mut state = State::default();
        let mut catalog = StaticCatalog::new(Vec::new());
        let next = state.add_next_skill(&mut catalog, None);
        assert!(next.done);
        assert!(!state.store.placement_pending());
    }
}
