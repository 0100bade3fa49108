// Persistence - versioned canvas document, schema-tolerant parsing,
// and the gateway trait the effect runner talks to.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::graph::SkillGraph;
use crate::model::{Connection, Node};
use crate::sanitize::{normalize_connections, normalize_node};

pub const SCHEMA_VERSION: u64 = 1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("canvas state io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("canvas state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The persisted canvas snapshot. Nodes carry no transient UI flags
/// (the model type has no slots for them), connections keep theirs so
/// a reload restores hover/selection hints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDocument {
    pub version: u64,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

impl CanvasDocument {
    pub fn empty() -> Self {
        Self {
            version: SCHEMA_VERSION,
            nodes: Vec::new(),
            connections: Vec::new(),
            saved_at: None,
        }
    }
}

/// Snapshot the graph with a fresh ISO-8601 timestamp.
pub fn document_from_graph(graph: &SkillGraph) -> CanvasDocument {
    CanvasDocument {
        version: SCHEMA_VERSION,
        nodes: graph.nodes().cloned().collect(),
        connections: graph.connections().to_vec(),
        saved_at: Some(chrono::Utc::now().to_rfc3339()),
    }
}

/// Parse an arbitrary JSON value into normalized nodes plus connection
/// hints. `nodes` may be an array of records or an id-keyed map (the
/// map form injects the key as the record id when the record has
/// none). Anything malformed is dropped, never an error.
pub fn parse_document(value: &Value) -> (Vec<Node>, Vec<Connection>) {
    let mut nodes: Vec<Node> = Vec::new();
    match value.get("nodes") {
        Some(Value::Array(items)) => {
            for item in items {
                if let Some(node) = normalize_node(item) {
                    nodes.push(node);
                }
            }
        }
        Some(Value::Object(map)) => {
            for (key, item) in map {
                let record = match item {
                    Value::Object(fields) if !fields.contains_key("id") => {
                        let mut fields = fields.clone();
                        fields.insert("id".to_string(), Value::String(key.clone()));
                        Value::Object(fields)
                    }
                    other => other.clone(),
                };
                if let Some(node) = normalize_node(&record) {
                    nodes.push(node);
                }
            }
        }
        _ => {}
    }

    // Later records win on id collision.
    let mut deduped: Vec<Node> = Vec::new();
    for node in nodes {
        deduped.retain(|existing| existing.id != node.id);
        deduped.push(node);
    }

    let ids: HashSet<String> = deduped.iter().map(|node| node.id.clone()).collect();
    let connections = normalize_connections(value.get("connections"), &ids);
    (deduped, connections)
}

/// Build a graph from a raw persisted value; derivation runs once the
/// nodes are in, so stale persisted `dependents` are recomputed.
pub fn graph_from_value(value: &Value) -> SkillGraph {
    let (nodes, connections) = parse_document(value);
    SkillGraph::from_nodes(nodes, &connections)
}

// ------------------------------------------------------------------
// Gateways
// ------------------------------------------------------------------

pub trait PersistenceGateway {
    /// The raw persisted value. A gateway with nothing stored yet
    /// returns an empty document value, not an error.
    fn load(&mut self) -> Result<Value, PersistError>;
    fn save(&mut self, document: &CanvasDocument) -> Result<(), PersistError>;
}

/// Stores the document as pretty-printed JSON at a fixed path. A
/// missing file reads as the empty document.
pub struct FileGateway {
    path: PathBuf,
}

impl FileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl PersistenceGateway for FileGateway {
    fn load(&mut self) -> Result<Value, PersistError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(serde_json::to_value(CanvasDocument::empty())?);
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&mut self, document: &CanvasDocument) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&self.path)?;
        let text = serde_json::to_string_pretty(document)?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }
}

/// In-memory gateway for tests and demos.
#[derive(Default)]
pub struct MemoryGateway {
    stored: Option<Value>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: Value) -> Self {
        Self {
            stored: Some(value),
        }
    }

    pub fn stored(&self) -> Option<&Value> {
        self.stored.as_ref()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load(&mut self) -> Result<Value, PersistError> {
        match &self.stored {
            Some(value) => Ok(value.clone()),
            None => Ok(serde_json::to_value(CanvasDocument::empty())?),
        }
    }

    fn save(&mut self, document: &CanvasDocument) -> Result<(), PersistError> {
        self.stored = Some(serde_json::to_value(document)?);
        Ok(())
    }
}
