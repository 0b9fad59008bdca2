//! Department fan-out.
//!
//! Expands one logical occurrence into one document per target department.

use crate::event::Event;
use crate::ids::{new_group_id, sibling_id};

/// Department whose document keeps the base id.
///
/// The template's own department when it is targeted, otherwise the first
/// target, so every fan-out has exactly one document at `base_id`.
pub fn primary_department<'a>(template: &'a Event, targets: &'a [String]) -> &'a str {
    if targets.iter().any(|d| *d == template.department_id) {
        template.department_id.as_str()
    } else {
        targets
            .first()
            .map(String::as_str)
            .unwrap_or(template.department_id.as_str())
    }
}

/// Plan one document per department in `targets`, in target order.
///
/// Multi-department plans share the template's `related_group_id`, or a
/// freshly generated one when the template has none. A single-department
/// plan carries no group.
pub fn plan_fanout(template: &Event, base_id: &str, targets: &[String]) -> Vec<Event> {
    let related_group_id = if targets.len() > 1 {
        Some(
            template
                .related_group_id
                .clone()
                .unwrap_or_else(new_group_id),
        )
    } else {
        None
    };
    let primary = primary_department(template, targets);

    targets
        .iter()
        .map(|department_id| {
            let mut doc = template.clone();
            doc.id = sibling_id(base_id, department_id, primary);
            doc.department_id = department_id.clone();
            doc.department_ids = targets.to_vec();
            doc.related_group_id = related_group_id.clone();
            doc
        })
        .collect()
}
