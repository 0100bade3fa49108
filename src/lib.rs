//! In-memory engine for an infinite-canvas curriculum builder: skills
//! and outcomes as draggable nodes, prerequisite edges derived into
//! rendered connections, viewport culling, outcome grouping, a
//! single-slot skill placement workflow, and JSON persistence.
//!
//! The rendering layer drives the engine through [`State::dispatch`]
//! and reads the memoized [`cache::Scene`] each frame.

pub mod actions;
pub mod cache;
pub mod catalog;
pub mod effects;
pub mod graph;
pub mod model;
pub mod outcomes;
pub mod persistence;
pub mod sanitize;
pub mod state;
pub mod store;
pub mod viewport;

pub use actions::Action;
pub use cache::Scene;
pub use catalog::{SkillCatalog, StaticCatalog};
pub use effects::Effect;
pub use graph::{OutcomeDetails, SkillDetails, SkillGraph, SkillPatch};
pub use model::{Connection, ContentEntry, Node, NodeKind, OutcomeGroup};
pub use persistence::{FileGateway, MemoryGateway, PersistError, PersistenceGateway};
pub use state::State;
pub use store::{CursorHint, PlacementCancelled, PlacementOutcome, PlacementWaiter, Store};
pub use viewport::Viewport;
