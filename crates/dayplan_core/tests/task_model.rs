use chrono::NaiveDate;
use dayplan_core::model::task::MAX_RULE_LEN;
use dayplan_core::{parse_day, RuleParseError, Task, TaskDraft, TaskValidationError};
use uuid::Uuid;

fn today() -> NaiveDate {
    parse_day("20240315").unwrap()
}

fn validate(draft: TaskDraft) -> Result<Task, TaskValidationError> {
    draft.validate(Uuid::new_v4(), today())
}

#[test]
fn blank_title_is_rejected() {
    assert_eq!(
        validate(TaskDraft::new("")).unwrap_err(),
        TaskValidationError::EmptyTitle
    );
    assert_eq!(
        validate(TaskDraft::new("  \t")).unwrap_err(),
        TaskValidationError::EmptyTitle
    );
}

#[test]
fn empty_date_defaults_to_today() {
    let task = validate(TaskDraft::new("buy milk")).unwrap();
    assert_eq!(task.date, today());
}

#[test]
fn malformed_date_is_rejected() {
    let err = validate(TaskDraft::new("buy milk").with_date("15.03.2024")).unwrap_err();
    assert!(matches!(err, TaskValidationError::InvalidDate(ref inner) if inner.value == "15.03.2024"));
}

#[test]
fn past_date_without_rule_snaps_to_today() {
    let task = validate(TaskDraft::new("call bank").with_date("20240101")).unwrap();
    assert_eq!(task.date, today());
}

#[test]
fn past_date_with_rule_moves_to_next_occurrence() {
    let weekly = validate(TaskDraft::new("gym").with_date("20240301").with_rule("d 7")).unwrap();
    assert_eq!(weekly.date, parse_day("20240322").unwrap());

    let daily = validate(TaskDraft::new("pills").with_date("20240301").with_rule("d 1")).unwrap();
    assert_eq!(daily.date, today());
}

#[test]
fn today_and_future_dates_are_kept() {
    let on_today = validate(TaskDraft::new("a").with_date("20240315").with_rule("y")).unwrap();
    assert_eq!(on_today.date, today());

    let future = validate(TaskDraft::new("b").with_date("20240401")).unwrap();
    assert_eq!(future.date, parse_day("20240401").unwrap());
}

#[test]
fn invalid_rule_is_rejected_even_for_future_dates() {
    let err = validate(TaskDraft::new("x").with_date("20300101").with_rule("w 9")).unwrap_err();
    assert!(matches!(
        err,
        TaskValidationError::InvalidRule(RuleParseError::OutOfRange { .. })
    ));
}

#[test]
fn overlong_rule_is_rejected() {
    let rule = format!("w {}", vec!["1"; MAX_RULE_LEN].join(","));
    let err = validate(TaskDraft::new("x").with_rule(rule)).unwrap_err();
    assert!(matches!(err, TaskValidationError::RuleTooLong { .. }));
}

#[test]
fn validation_is_idempotent() {
    let drafts = [
        TaskDraft::new("one-off").with_date("20240101"),
        TaskDraft::new("weekly").with_date("20240301").with_rule("w 1,3"),
        TaskDraft::new("leap").with_date("20200229").with_rule("y"),
        TaskDraft::new("month end").with_date("20240131").with_rule("m -1"),
        TaskDraft::new("summer").with_date("20230615").with_rule("m 15 1,6"),
        TaskDraft::new("future").with_date("20991231").with_comment("later"),
    ];

    for draft in drafts {
        let first = validate(draft).unwrap();
        let second = first.revalidate(today()).unwrap();
        assert_eq!(second, first);
        assert!(first.date >= today());
    }
}

#[test]
fn task_serializes_with_wire_field_names() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let task = TaskDraft::new("standup")
        .with_date("20240318")
        .with_comment("room 4")
        .with_rule("w 1")
        .validate(id, today())
        .unwrap();

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["date"], "20240318");
    assert_eq!(json["title"], "standup");
    assert_eq!(json["comment"], "room 4");
    assert_eq!(json["repeat"], "w 1");

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn task_deserialization_rejects_bad_day_token() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "date": "2024-03-18",
        "title": "standup",
        "comment": "",
        "repeat": ""
    });

    let err = serde_json::from_value::<Task>(value).unwrap_err();
    assert!(err.to_string().contains("YYYYMMDD"), "unexpected error: {err}");
}

#[test]
fn draft_fields_default_when_missing() {
    let draft: TaskDraft = serde_json::from_value(serde_json::json!({ "title": "x" })).unwrap();
    assert_eq!(draft, TaskDraft::new("x"));
}
