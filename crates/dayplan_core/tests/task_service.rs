use chrono::NaiveDate;
use dayplan_core::db::open_db_in_memory;
use dayplan_core::{
    parse_day, Completion, RecurrenceError, SqliteTaskRepository, Task, TaskDraft, TaskRepository,
    TaskService, TaskServiceError, TaskValidationError,
};
use rusqlite::Connection;
use uuid::Uuid;

// 2024-03-15 is a Friday.
fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

fn service(conn: &Connection) -> TaskService<SqliteTaskRepository<'_>> {
    TaskService::with_clock(SqliteTaskRepository::try_new(conn).unwrap(), fixed_today)
}

/// Stores a task bypassing validation, e.g. one that became overdue.
fn insert_raw(conn: &Connection, date: &str, rule: &str) -> Task {
    let task = Task {
        id: Uuid::new_v4(),
        date: parse_day(date).unwrap(),
        title: "stored".to_string(),
        comment: String::new(),
        rule: rule.to_string(),
    };
    SqliteTaskRepository::try_new(conn)
        .unwrap()
        .create_task(&task)
        .unwrap();
    task
}

#[test]
fn create_validates_and_persists() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .create_task(TaskDraft::new("water plants").with_rule("d 3"))
        .unwrap();
    assert_eq!(created.date, fixed_today());

    let loaded = service.get_task(created.id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn create_rejects_invalid_draft_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.create_task(TaskDraft::new("")).unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::Validation(TaskValidationError::EmptyTitle)
    ));

    let err = service
        .create_task(TaskDraft::new("x").with_rule("m 0"))
        .unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::Validation(TaskValidationError::InvalidRule(_))
    ));

    assert!(service.search_tasks("").unwrap().is_empty());
}

#[test]
fn update_runs_the_same_validation_as_create() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .create_task(TaskDraft::new("report").with_date("20240320"))
        .unwrap();

    let updated = service
        .update_task(
            created.id,
            TaskDraft::new("report v2")
                .with_date("20240301")
                .with_rule("w 1"),
        )
        .unwrap();
    assert_eq!(updated.date, parse_day("20240318").unwrap());
    assert_eq!(service.get_task(created.id).unwrap(), updated);

    let err = service
        .update_task(created.id, TaskDraft::new("report").with_date("tomorrow"))
        .unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::Validation(TaskValidationError::InvalidDate(_))
    ));
}

#[test]
fn update_of_missing_task_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let id = Uuid::new_v4();
    let err = service.update_task(id, TaskDraft::new("ghost")).unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(missing) if missing == id));
}

#[test]
fn completing_one_off_task_deletes_it() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service.create_task(TaskDraft::new("pay rent")).unwrap();
    assert_eq!(service.complete_task(created.id).unwrap(), Completion::Deleted);

    let err = service.get_task(created.id).unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(_)));
}

#[test]
fn completing_recurring_task_moves_it_forward() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .create_task(TaskDraft::new("laundry").with_rule("d 7"))
        .unwrap();
    let outcome = service.complete_task(created.id).unwrap();
    let expected = parse_day("20240322").unwrap();
    assert_eq!(outcome, Completion::Rescheduled(expected));
    assert_eq!(service.get_task(created.id).unwrap().date, expected);

    let outcome = service.complete_task(created.id).unwrap();
    assert_eq!(
        outcome,
        Completion::Rescheduled(parse_day("20240329").unwrap())
    );
}

#[test]
fn completing_future_recurring_task_skips_its_current_date() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    // 2024-04-01 is a Monday.
    let created = service
        .create_task(TaskDraft::new("standup").with_date("20240401").with_rule("w 1"))
        .unwrap();
    assert_eq!(
        service.complete_task(created.id).unwrap(),
        Completion::Rescheduled(parse_day("20240408").unwrap())
    );
}

#[test]
fn completing_overdue_recurring_task_advances_from_stored_date() {
    let conn = open_db_in_memory().unwrap();
    let overdue = insert_raw(&conn, "20240310", "d 7");
    let leap = insert_raw(&conn, "20240229", "y");
    let service = service(&conn);

    assert_eq!(
        service.complete_task(overdue.id).unwrap(),
        Completion::Rescheduled(parse_day("20240317").unwrap())
    );
    assert_eq!(
        service.complete_task(leap.id).unwrap(),
        Completion::Rescheduled(parse_day("20250301").unwrap())
    );
}

#[test]
fn completing_task_on_last_calendar_day_fails_without_changes() {
    let conn = open_db_in_memory().unwrap();
    let last = insert_raw(&conn, "99991231", "y");
    let service = service(&conn);

    let err = service.complete_task(last.id).unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::Recurrence(RecurrenceError::NoOccurrence { .. })
    ));
    assert_eq!(service.get_task(last.id).unwrap(), last);
}

#[test]
fn completing_missing_task_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.complete_task(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(_)));
}

#[test]
fn delete_and_search_delegate_to_repository() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let keep = service
        .create_task(TaskDraft::new("Dentist").with_comment("checkup"))
        .unwrap();
    let drop = service.create_task(TaskDraft::new("groceries")).unwrap();
    service.delete_task(drop.id).unwrap();

    let hits = service.search_tasks("CHECK").unwrap();
    assert_eq!(hits, vec![keep.clone()]);

    let by_day = service.search_tasks("15.03.2024").unwrap();
    assert_eq!(by_day, vec![keep]);

    let err = service.delete_task(drop.id).unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(_)));
}
