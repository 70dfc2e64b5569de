//! Selection of tasks that still need processing.
//!
//! The `api_updated` enum field doubles as the processed marker: a task
//! qualifies while that field's value is unset. Once an update writes the
//! "yes" option, the same check permanently excludes the task -- there is
//! no other de-duplication mechanism.

use crate::types::{FieldKind, Task, API_UPDATED_FIELD};

/// Filters fully expanded tasks down to those not yet marked as processed.
pub fn select_updateable(tasks: Vec<Task>) -> Vec<Task> {
    tasks.into_iter().filter(is_updateable).collect()
}

/// True if the task carries an unset `api_updated` enum field.
pub fn is_updateable(task: &Task) -> bool {
    task.custom_fields.iter().any(|field| {
        field.resource_subtype == FieldKind::Enum
            && field.name == API_UPDATED_FIELD
            && field.enum_value.is_none()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CustomFieldValue, EnumValue};

    fn task(gid: &str, fields: Vec<CustomFieldValue>) -> Task {
        Task {
            gid: gid.to_string(),
            name: String::new(),
            notes: String::new(),
            custom_fields: fields,
        }
    }

    fn sentinel_field(value: Option<&str>) -> CustomFieldValue {
        CustomFieldValue {
            gid: "f9".to_string(),
            name: API_UPDATED_FIELD.to_string(),
            resource_subtype: FieldKind::Enum,
            enum_value: value.map(|gid| EnumValue {
                gid: gid.to_string(),
                name: "yes".to_string(),
            }),
        }
    }

    #[test]
    fn selects_task_with_unset_sentinel() {
        let selected = select_updateable(vec![task("t1", vec![sentinel_field(None)])]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].gid, "t1");
    }

    #[test]
    fn excludes_task_with_set_sentinel() {
        let selected = select_updateable(vec![task("t1", vec![sentinel_field(Some("optyes"))])]);
        assert!(selected.is_empty());
    }

    #[test]
    fn excludes_task_without_sentinel_field() {
        let other = CustomFieldValue {
            gid: "f1".to_string(),
            name: "Priority".to_string(),
            resource_subtype: FieldKind::Enum,
            enum_value: None,
        };
        let selected = select_updateable(vec![task("t1", vec![other])]);
        assert!(selected.is_empty());
    }

    #[test]
    fn sentinel_name_on_non_enum_field_does_not_qualify() {
        let text_lookalike = CustomFieldValue {
            gid: "f3".to_string(),
            name: API_UPDATED_FIELD.to_string(),
            resource_subtype: FieldKind::Text,
            enum_value: None,
        };
        let selected = select_updateable(vec![task("t1", vec![text_lookalike])]);
        assert!(selected.is_empty());
    }

    #[test]
    fn other_field_states_do_not_override_set_sentinel() {
        let unset_priority = CustomFieldValue {
            gid: "f1".to_string(),
            name: "Priority".to_string(),
            resource_subtype: FieldKind::Enum,
            enum_value: None,
        };
        let selected = select_updateable(vec![task(
            "t1",
            vec![unset_priority, sentinel_field(Some("optyes"))],
        )]);
        assert!(selected.is_empty());
    }

    #[test]
    fn keeps_order_of_qualifying_tasks() {
        let selected = select_updateable(vec![
            task("t1", vec![sentinel_field(None)]),
            task("t2", vec![sentinel_field(Some("optyes"))]),
            task("t3", vec![sentinel_field(None)]),
        ]);
        let gids: Vec<&str> = selected.iter().map(|t| t.gid.as_str()).collect();
        assert_eq!(gids, ["t1", "t3"]);
    }
}
