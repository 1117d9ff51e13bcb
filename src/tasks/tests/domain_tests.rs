//! Domain type tests for tasks and identifiers.

use crate::tasks::domain::{ParseTaskIdError, Task, TaskId};
use rstest::rstest;
use std::str::FromStr;

#[test]
fn new_tasks_receive_unique_identifiers() {
    let first = Task::new("Title1", "Description1");
    let second = Task::new("Title1", "Description1");

    assert_ne!(first.id(), second.id());
}

#[test]
fn new_tasks_start_active() {
    let task = Task::new("Buy milk", "Two litres");

    assert!(task.is_active());
    assert!(!task.is_completed());
}

#[test]
fn complete_and_activate_toggle_the_flag() {
    let mut task = Task::new("Buy milk", "Two litres");

    task.complete();
    assert!(task.is_completed());
    assert!(!task.is_active());

    task.activate();
    assert!(task.is_active());
}

#[test]
fn from_parts_preserves_every_field() {
    let id = TaskId::new();
    let task = Task::from_parts(id, "Title", "Description", true);

    assert_eq!(task.id(), id);
    assert_eq!(task.title(), "Title");
    assert_eq!(task.description(), "Description");
    assert!(task.is_completed());
}

#[rstest]
#[case("Title", "Description", "Title")]
#[case("", "Description", "Description")]
#[case("Title", "", "Title")]
fn title_for_list_prefers_the_title(
    #[case] title: &str,
    #[case] description: &str,
    #[case] expected: &str,
) {
    let task = Task::new(title, description);

    assert_eq!(task.title_for_list(), expected);
}

#[test]
fn is_empty_requires_both_fields_blank() {
    assert!(Task::new("", "").is_empty());
    assert!(!Task::new("Title", "").is_empty());
    assert!(!Task::new("", "Description").is_empty());
}

#[test]
fn task_id_round_trips_through_display_and_parse() {
    let id = TaskId::new();
    let parsed = TaskId::from_str(&id.to_string()).expect("valid identifier");

    assert_eq!(parsed, id);
}

#[test]
fn task_id_parse_rejects_garbage() {
    let result = TaskId::from_str("not-a-uuid");

    assert_eq!(result, Err(ParseTaskIdError("not-a-uuid".to_owned())));
}

#[test]
fn task_serialises_with_a_transparent_identifier() {
    let task = Task::new("Title", "Description");
    let value = serde_json::to_value(&task).expect("serialisable task");

    assert_eq!(value["id"], serde_json::json!(task.id().to_string()));
    assert_eq!(value["title"], serde_json::json!("Title"));
    assert_eq!(value["is_completed"], serde_json::json!(false));

    let decoded: Task = serde_json::from_value(value).expect("decodable task");
    assert_eq!(decoded, task);
}
