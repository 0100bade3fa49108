// Sanitizer - total functions turning arbitrary JSON-shaped records
// into well-typed model values. Nothing in here ever fails loudly:
// malformed records are dropped, malformed fields fall back to
// defaults, so the engine stays usable on partially-corrupt data.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::model::{
    Connection, ContentEntry, Node, NodeKind, OutcomeData, SkillData, connection_id,
    DEFAULT_OUTCOME_POSITION, DEFAULT_SKILL_POSITION, UNKNOWN_OUTCOME_CODE,
};

/// Static outcome code -> display description table, used when a
/// record carries a code but no resolvable description.
static OUTCOME_DESCRIPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("1.N.1", "Say the number sequence 0 to 100 by 1s, 5s, and 10s"),
        ("1.N.2", "Subitize familiar arrangements of 1 to 10 objects"),
        ("1.N.3", "Demonstrate an understanding of counting to 20"),
        ("1.N.4", "Represent and describe numbers to 20 concretely and symbolically"),
        ("1.N.5", "Compare sets containing up to 20 elements"),
        ("1.PR.1", "Translate repeating patterns using objects, diagrams, and actions"),
        ("2.N.1", "Say the number sequence 0 to 200 by 5s, 10s, and 25s"),
        ("2.N.2", "Demonstrate an understanding of addition and subtraction to 100"),
        ("2.N.3", "Apply mental mathematics strategies for basic addition facts"),
        ("2.SS.1", "Relate the number of days to a week and months to a year"),
        ("3.N.1", "Demonstrate an understanding of multiplication to 5 x 5"),
        ("3.N.2", "Demonstrate an understanding of fractions as part of a whole"),
    ])
});

pub fn lookup_outcome_description(code: &str) -> Option<&'static str> {
    OUTCOME_DESCRIPTIONS.get(code).copied()
}

// ------------------------------------------------------------------
// Scalar helpers
// ------------------------------------------------------------------

fn as_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|n| n.is_finite())
}

fn as_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

/// First non-null field among `keys`, so callers can express the
/// canonical-name-then-legacy-alias precedence in one place.
fn pick<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| !value.is_null())
}

// ------------------------------------------------------------------
// List sanitizers
// ------------------------------------------------------------------

/// Trim, drop empties, keep first occurrence order.
pub fn dedupe_strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for value in values {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
            continue;
        }
        result.push(trimmed.to_string());
    }
    result
}

/// `dedupe_strings` over a JSON value: non-arrays and non-string
/// elements are silently dropped.
pub fn dedupe_json_strings(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    dedupe_strings(items.iter().filter_map(Value::as_str))
}

/// Keep entries that still have both a title and content after trim.
pub fn sanitize_content_entries(entries: &[ContentEntry]) -> Vec<ContentEntry> {
    entries
        .iter()
        .filter_map(|entry| {
            let title = entry.title.trim();
            let content = entry.content.trim();
            if title.is_empty() || content.is_empty() {
                None
            } else {
                Some(ContentEntry::new(title, content))
            }
        })
        .collect()
}

pub fn content_entries_from_json(value: Option<&Value>) -> Vec<ContentEntry> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    let raw: Vec<ContentEntry> = items
        .iter()
        .filter_map(|item| {
            let title = as_string(item.get("title"))?;
            let content = as_string(item.get("content"))?;
            Some(ContentEntry::new(title, content))
        })
        .collect();
    sanitize_content_entries(&raw)
}

/// Union by `(title, content)` pair: base order preserved, new unique
/// entries appended.
pub fn merge_content_entries(base: &[ContentEntry], incoming: &[ContentEntry]) -> Vec<ContentEntry> {
    let mut merged = sanitize_content_entries(base);
    let additions = sanitize_content_entries(incoming);
    if additions.is_empty() {
        return merged;
    }

    let mut seen: HashSet<(String, String)> = merged
        .iter()
        .map(|entry| (entry.title.clone(), entry.content.clone()))
        .collect();
    for entry in additions {
        if seen.insert((entry.title.clone(), entry.content.clone())) {
            merged.push(entry);
        }
    }
    merged
}

// ------------------------------------------------------------------
// Outcome description resolution
// ------------------------------------------------------------------

/// Accept a bare string, an object carrying `description`/`title`, or
/// fall back to the static lookup table for `outcome_code`.
pub fn resolve_outcome_description(value: Option<&Value>, outcome_code: &str) -> Option<String> {
    match value {
        Some(Value::String(text)) => return Some(text.clone()),
        Some(Value::Object(map)) => {
            if let Some(description) = map.get("description").and_then(Value::as_str) {
                return Some(description.to_string());
            }
            if let Some(title) = map.get("title").and_then(Value::as_str) {
                return Some(title.to_string());
            }
        }
        _ => {}
    }
    lookup_outcome_description(outcome_code).map(str::to_string)
}

// ------------------------------------------------------------------
// Node normalization
// ------------------------------------------------------------------

/// Turn an arbitrary persisted/input record into a canonical node.
/// Returns `None` when the record has no string id. Transient UI
/// flags (`hovered`, `selected`, `clicks`, `isConnectionSource`) are
/// dropped by construction: the typed model has no slots for them.
pub fn normalize_node(raw: &Value) -> Option<Node> {
    if !raw.is_object() {
        log::debug!("dropping non-object node record");
        return None;
    }
    let id = as_string(raw.get("id")).filter(|id| !id.trim().is_empty())?;

    let variant = as_string(raw.get("variant")).unwrap_or_else(|| {
        if pick(raw, &["skill", "name"]).is_some() {
            "skill".to_string()
        } else {
            "outcome".to_string()
        }
    });

    let prerequisites = dedupe_json_strings(raw.get("prerequisites"));
    let dependents = dedupe_json_strings(raw.get("dependents"));
    let draggable = raw
        .get("draggable")
        .and_then(Value::as_bool)
        .unwrap_or(true);

    let kind = if variant == "skill" {
        let outcome_code = as_string(pick(raw, &["outcomeCode", "outcome_code"]))
            .unwrap_or_else(|| UNKNOWN_OUTCOME_CODE.to_string());
        let outcome_description = resolve_outcome_description(
            pick(
                raw,
                &["outcomeDescription", "outcomeTitle", "outcome_description"],
            ),
            &outcome_code,
        );
        NodeKind::Skill(SkillData {
            skill: as_string(pick(raw, &["skill", "name"]))
                .unwrap_or_else(|| "New Skill".to_string()),
            width: as_number(raw.get("width")).unwrap_or(crate::model::DEFAULT_SKILL_WIDTH),
            height: as_number(raw.get("height")).unwrap_or(crate::model::DEFAULT_SKILL_HEIGHT),
            outcome_code,
            outcome_description,
            instructional_content: content_entries_from_json(pick(
                raw,
                &["instructionalContent", "instructional_content"],
            )),
            practice_questions: content_entries_from_json(pick(
                raw,
                &["practiceQuestions", "practice_questions"],
            )),
        })
    } else {
        NodeKind::Outcome(OutcomeData {
            radius: as_number(raw.get("radius")).unwrap_or(crate::model::DEFAULT_OUTCOME_RADIUS),
            color: as_string(raw.get("color"))
                .unwrap_or_else(|| crate::model::DEFAULT_OUTCOME_COLOR.to_string()),
            text: as_string(pick(raw, &["text", "name"]))
                .unwrap_or_else(|| crate::model::DEFAULT_OUTCOME_TEXT.to_string()),
            shape: as_string(raw.get("type"))
                .unwrap_or_else(|| crate::model::DEFAULT_OUTCOME_SHAPE.to_string()),
        })
    };

    let default_position = if matches!(kind, NodeKind::Skill(_)) {
        DEFAULT_SKILL_POSITION
    } else {
        DEFAULT_OUTCOME_POSITION
    };

    Some(Node {
        id,
        x: as_number(raw.get("x")).unwrap_or(default_position.0),
        y: as_number(raw.get("y")).unwrap_or(default_position.1),
        draggable,
        prerequisites,
        dependents,
        kind,
    })
}

/// Persisted connections are only a hint for restoring UI flags, so
/// this keeps just well-formed records between live nodes, one per
/// `(from, to)` pair.
pub fn normalize_connections(raw: Option<&Value>, valid_ids: &HashSet<String>) -> Vec<Connection> {
    let Some(Value::Array(items)) = raw else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut connections = Vec::new();
    for item in items {
        let Some(from) = as_string(item.get("from")) else {
            continue;
        };
        let Some(to) = as_string(item.get("to")) else {
            continue;
        };
        if !valid_ids.contains(&from) || !valid_ids.contains(&to) {
            continue;
        }
        let key = connection_id(&from, &to);
        if !seen.insert(key.clone()) {
            continue;
        }
        connections.push(Connection {
            id: as_string(item.get("id")).unwrap_or(key),
            from,
            to,
            hovered: item
                .get("hovered")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            selected: item
                .get("selected")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        });
    }
    connections
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn dedupe_trims_and_keeps_first_occurrence() {
        assert_eq!(dedupe_strings(["a", " a ", "a", "b"]), vec!["a", "b"]);
    }

    #[test]
    fn dedupe_json_drops_non_strings() {
        let value = json!(["x", 4, null, " x", "", "y"]);
        assert_eq!(dedupe_json_strings(Some(&value)), vec!["x", "y"]);
        assert!(dedupe_json_strings(Some(&json!("not-a-list"))).is_empty());
        assert!(dedupe_json_strings(None).is_empty());
    }

    #[test]
    fn content_entries_require_title_and_content() {
        let value = json!([
            { "title": "Intro", "content": "Count out loud." },
            { "title": "  ", "content": "orphan" },
            { "title": "No content", "content": "" },
            { "title": "Missing" },
            "garbage"
        ]);
        let entries = content_entries_from_json(Some(&value));
        assert_eq!(entries, vec![ContentEntry::new("Intro", "Count out loud.")]);
    }

    #[test]
    fn merge_unions_by_title_content_pair() {
        let base = vec![ContentEntry::new("A", "1"), ContentEntry::new("B", "2")];
        let incoming = vec![
            ContentEntry::new("B", "2"),
            ContentEntry::new("C", "3"),
            ContentEntry::new("", "ignored"),
        ];
        let merged = merge_content_entries(&base, &incoming);
        assert_eq!(
            merged,
            vec![
                ContentEntry::new("A", "1"),
                ContentEntry::new("B", "2"),
                ContentEntry::new("C", "3"),
            ]
        );
    }

    #[test]
    fn outcome_description_accepts_string_object_and_table() {
        assert_eq!(
            resolve_outcome_description(Some(&json!("direct")), "1.N.1"),
            Some("direct".to_string())
        );
        assert_eq!(
            resolve_outcome_description(Some(&json!({ "description": "from object" })), "1.N.1"),
            Some("from object".to_string())
        );
        assert_eq!(
            resolve_outcome_description(Some(&json!({ "title": "from title" })), "1.N.1"),
            Some("from title".to_string())
        );
        assert_eq!(
            resolve_outcome_description(None, "1.N.1"),
            Some("Say the number sequence 0 to 100 by 1s, 5s, and 10s".to_string())
        );
        assert_eq!(resolve_outcome_description(None, "no-such-code"), None);
    }

    #[test]
    fn normalize_rejects_missing_id() {
        assert!(normalize_node(&json!({ "skill": "Counting" })).is_none());
        assert!(normalize_node(&json!({ "id": 42 })).is_none());
        assert!(normalize_node(&json!("scalar")).is_none());
    }

    #[test]
    fn normalize_infers_skill_variant_from_name() {
        let node = normalize_node(&json!({ "id": "counting", "name": "Counting" })).unwrap();
        assert!(node.is_skill());
        let data = node.skill_data().unwrap();
        assert_eq!(data.skill, "Counting");
        assert_eq!(data.width, 260.0);
        assert_eq!(data.height, 180.0);
        assert_eq!(node.x, 120.0);
        assert_eq!(node.y, 120.0);
        assert!(node.draggable);
    }

    #[test]
    fn normalize_maps_snake_case_aliases() {
        let node = normalize_node(&json!({
            "id": "s1",
            "skill": "Skip counting",
            "outcome_code": "1.N.1",
            "outcome_description": "legacy description",
            "instructional_content": [{ "title": "T", "content": "C" }],
            "practice_questions": [{ "title": "Q", "content": "A" }],
        }))
        .unwrap();
        let data = node.skill_data().unwrap();
        assert_eq!(data.outcome_code, "1.N.1");
        assert_eq!(data.outcome_description.as_deref(), Some("legacy description"));
        assert_eq!(data.instructional_content.len(), 1);
        assert_eq!(data.practice_questions.len(), 1);
    }

    #[test]
    fn normalize_prefers_camel_case_over_aliases() {
        let node = normalize_node(&json!({
            "id": "s1",
            "skill": "S",
            "outcomeCode": "2.N.1",
            "outcome_code": "1.N.1",
            "outcomeDescription": "camel",
            "outcome_description": "snake",
        }))
        .unwrap();
        let data = node.skill_data().unwrap();
        assert_eq!(data.outcome_code, "2.N.1");
        assert_eq!(data.outcome_description.as_deref(), Some("camel"));
    }

    #[test]
    fn normalize_defaults_outcome_variant() {
        let node = normalize_node(&json!({ "id": "o1" })).unwrap();
        assert!(!node.is_skill());
        let data = node.outcome_data().unwrap();
        assert_eq!(data.radius, 60.0);
        assert_eq!(data.color, "#2563eb");
        assert_eq!(data.text, "Outcome");
        assert_eq!(data.shape, "circle");
        assert_eq!((node.x, node.y), (160.0, 160.0));
    }

    #[test]
    fn normalize_dedupes_prerequisites_and_ignores_transient_flags() {
        let node = normalize_node(&json!({
            "id": "s1",
            "skill": "S",
            "prerequisites": ["a", "a", " b ", 3, ""],
            "hovered": true,
            "selected": true,
            "clicks": 12,
            "isConnectionSource": true,
        }))
        .unwrap();
        assert_eq!(node.prerequisites, vec!["a", "b"]);
        let value = serde_json::to_value(&node).unwrap();
        assert!(value.get("hovered").is_none());
        assert!(value.get("clicks").is_none());
    }

    #[test]
    fn normalize_connections_filters_dangling_and_duplicates() {
        let ids: HashSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let raw = json!([
            { "from": "a", "to": "b", "selected": true },
            { "from": "a", "to": "b" },
            { "from": "a", "to": "ghost" },
            { "from": "a" },
        ]);
        let connections = normalize_connections(Some(&raw), &ids);
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].id, "conn-a-->b");
        assert!(connections[0].selected);
    }
}
