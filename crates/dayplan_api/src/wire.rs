//! Request and response shapes.

use dayplan_core::{Task, TaskDraft};
use serde::{Deserialize, Serialize};

/// Task submission as sent by clients.
///
/// Every field is optional on the wire; missing text fields become empty
/// strings and are judged by task validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    /// Required by update, ignored by add.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub repeat: String,
}

impl TaskPayload {
    pub(crate) fn into_draft(self) -> TaskDraft {
        TaskDraft::new(self.title)
            .with_date(self.date)
            .with_comment(self.comment)
            .with_rule(self.repeat)
    }
}

/// `{"id": "..."}` returned after a successful add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTask {
    pub id: String,
}

/// `{"tasks": [...]}` returned by list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

/// `{}` returned by operations without a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

#[cfg(test)]
mod tests {
    use super::{Empty, TaskPayload};

    #[test]
    fn payload_fields_default_to_empty() {
        let payload: TaskPayload = serde_json::from_str(r#"{"title":"call mom"}"#).unwrap();
        assert_eq!(payload.id, None);
        assert_eq!(payload.title, "call mom");
        assert!(payload.date.is_empty());
        assert!(payload.repeat.is_empty());
    }

    #[test]
    fn payload_maps_repeat_onto_draft_rule() {
        let payload: TaskPayload =
            serde_json::from_str(r#"{"date":"20240101","title":"t","repeat":"d 5"}"#).unwrap();
        let draft = payload.into_draft();
        assert_eq!(draft.date, "20240101");
        assert_eq!(draft.rule, "d 5");
    }

    #[test]
    fn empty_serializes_as_empty_object() {
        assert_eq!(serde_json::to_string(&Empty {}).unwrap(), "{}");
    }
}
