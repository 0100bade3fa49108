// Outcome aggregator - groups the visible skills by outcome code and
// computes the padded union bounding box drawn behind each group.

use euclid::default::Box2D;
use indexmap::IndexMap;

use crate::model::{Node, OutcomeGroup};
use crate::sanitize::lookup_outcome_description;

pub const GROUP_PADDING_X: f64 = 80.0;
pub const GROUP_PADDING_Y: f64 = 110.0;
pub const GROUP_HEADER_HEIGHT: f64 = 56.0;

/// One group per outcome code present among `visible` skills, in
/// first-appearance order. Outcome nodes never join a group. The
/// description comes from the last member carrying one, then the
/// static lookup table, then stays empty.
pub fn outcome_groups(visible: &[&Node]) -> Vec<OutcomeGroup> {
    struct Accum {
        bounds: Box2D<f64>,
        description: Option<String>,
        skill_ids: Vec<String>,
    }

    let mut groups: IndexMap<String, Accum> = IndexMap::new();
    for node in visible {
        let Some(data) = node.skill_data() else {
            continue;
        };
        let bounds = node.bounds();
        let entry = groups
            .entry(data.outcome_code.clone())
            .and_modify(|accum| {
                accum.bounds = accum.bounds.union(&bounds);
                if data.outcome_description.is_some() {
                    accum.description = data.outcome_description.clone();
                }
                accum.skill_ids.push(node.id.clone());
            });
        entry.or_insert_with(|| Accum {
            bounds,
            description: data.outcome_description.clone(),
            skill_ids: vec![node.id.clone()],
        });
    }

    groups
        .into_iter()
        .map(|(code, accum)| {
            let description = accum
                .description
                .or_else(|| lookup_outcome_description(&code).map(str::to_string))
                .unwrap_or_default();
            OutcomeGroup {
                x: accum.bounds.min.x - GROUP_PADDING_X,
                y: accum.bounds.min.y - GROUP_PADDING_Y,
                width: accum.bounds.width() + GROUP_PADDING_X * 2.0,
                height: accum.bounds.height() + GROUP_PADDING_Y * 2.0,
                header_height: GROUP_HEADER_HEIGHT,
                code,
                description,
                skill_ids: accum.skill_ids,
            }
        })
        .collect()
}
