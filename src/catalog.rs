// Skill catalog - where candidate skills come from. The engine only
// needs "the next skill not yet on the canvas"; a static built-in
// catalog covers demos and tests.

use std::collections::HashSet;

use serde::Deserialize;

use crate::graph::SkillDetails;
use crate::model::{ContentEntry, NodeId};

/// One catalog record. Deserializes from the same tolerant shape the
/// sanitizer accepts, so a JSON catalog file can feed the canvas
/// directly.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRecord {
    pub id: NodeId,
    pub skill: String,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default, alias = "outcome_code")]
    pub outcome_code: Option<String>,
    #[serde(default, alias = "outcome_description")]
    pub outcome_description: Option<String>,
    #[serde(default)]
    pub prerequisites: Vec<NodeId>,
    #[serde(default, alias = "instructional_content")]
    pub instructional_content: Vec<ContentEntry>,
    #[serde(default, alias = "practice_questions")]
    pub practice_questions: Vec<ContentEntry>,
}

impl From<SkillRecord> for SkillDetails {
    fn from(record: SkillRecord) -> Self {
        SkillDetails {
            id: Some(record.id),
            skill: Some(record.skill),
            x: record.x,
            y: record.y,
            width: record.width,
            height: record.height,
            outcome_code: record.outcome_code,
            outcome_description: record.outcome_description,
            draggable: None,
            prerequisites: record.prerequisites,
            instructional_content: record.instructional_content,
            practice_questions: record.practice_questions,
        }
    }
}

/// Answer to a "next unplaced skill" query.
#[derive(Debug, Clone, PartialEq)]
pub struct NextSkill {
    pub skill: Option<SkillRecord>,
    /// True when the whole catalog is already on the canvas.
    pub done: bool,
    /// Unplaced records left after (and including) this one is used.
    pub remaining: usize,
}

pub trait SkillCatalog {
    /// First catalog record whose id is not in `placed`, in catalog
    /// order.
    fn next_unplaced(&mut self, placed: &HashSet<NodeId>) -> NextSkill;
}

/// Fixed elementary-math progression used by the demo canvas.
pub struct StaticCatalog {
    records: Vec<SkillRecord>,
}

impl StaticCatalog {
    pub fn new(records: Vec<SkillRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SkillRecord] {
        &self.records
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        fn record(
            id: &str,
            skill: &str,
            code: &str,
            position: (f64, f64),
            prerequisites: &[&str],
        ) -> SkillRecord {
            SkillRecord {
                id: id.to_string(),
                skill: skill.to_string(),
                outcome_code: Some(code.to_string()),
                x: Some(position.0),
                y: Some(position.1),
                prerequisites: prerequisites.iter().map(|s| s.to_string()).collect(),
                ..SkillRecord::default()
            }
        }

        Self::new(vec![
            record("counting", "Counting", "1.N.1", (120.0, 120.0), &[]),
            record("addition", "Addition", "2.N.2", (420.0, 60.0), &["counting"]),
            record(
                "subtraction",
                "Subtraction",
                "2.N.2",
                (420.0, 260.0),
                &["counting"],
            ),
            record(
                "multiplication",
                "Multiplication",
                "3.N.1",
                (720.0, 60.0),
                &["addition"],
            ),
            record(
                "division",
                "Division",
                "3.N.1",
                (720.0, 260.0),
                &["subtraction", "multiplication"],
            ),
            record(
                "fractions",
                "Fractions",
                "3.N.2",
                (1020.0, 160.0),
                &["division"],
            ),
            record(
                "decimals",
                "Decimals",
                "3.N.2",
                (1320.0, 60.0),
                &["fractions"],
            ),
            record(
                "percentages",
                "Percentages",
                "3.N.2",
                (1320.0, 260.0),
                &["fractions"],
            ),
            record(
                "algebra",
                "Basic Algebra",
                "Unknown Outcome",
                (1620.0, 160.0),
                &["decimals", "percentages"],
            ),
        ])
    }
}

impl SkillCatalog for StaticCatalog {
    fn next_unplaced(&mut self, placed: &HashSet<NodeId>) -> NextSkill {
        let unplaced: Vec<&SkillRecord> = self
            .records
            .iter()
            .filter(|record| !placed.contains(&record.id))
            .collect();
        match unplaced.first() {
            Some(record) => NextSkill {
                skill: Some((*record).clone()),
                done: false,
                remaining: unplaced.len() - 1,
            },
            None => NextSkill {
                skill: None,
                done: true,
                remaining: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn next_unplaced_walks_the_catalog_in_order() {
        let mut catalog = StaticCatalog::default();
        let total = catalog.records().len();

        let first = catalog.next_unplaced(&HashSet::new());
        assert_eq!(first.skill.as_ref().unwrap().id, "counting");
        assert_eq!(first.remaining, total - 1);
        assert!(!first.done);

        let placed: HashSet<NodeId> = ["counting".to_string()].into();
        let second = catalog.next_unplaced(&placed);
        assert_eq!(second.skill.as_ref().unwrap().id, "addition");
        assert_eq!(second.remaining, total - 2);
    }

    #[test]
    fn exhausted_catalog_reports_done() {
        let mut catalog = StaticCatalog::default();
        let placed: HashSet<NodeId> = catalog
            .records()
            .iter()
            .map(|record| record.id.clone())
            .collect();
        let result = catalog.next_unplaced(&placed);
        assert!(result.done);
        assert!(result.skill.is_none());
        assert_eq!(result.remaining, 0);
    }

    #[test]
    fn records_deserialize_with_snake_case_aliases() {
        let record: SkillRecord = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "skill": "S",
            "outcome_code": "1.N.1",
            "instructional_content": [{ "title": "T", "content": "C" }],
        }))
        .unwrap();
        assert_eq!(record.outcome_code.as_deref(), Some("1.N.1"));
        assert_eq!(record.instructional_content.len(), 1);
    }
}
