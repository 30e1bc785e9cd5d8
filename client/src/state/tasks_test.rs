use serde_json::json;

use super::*;
use crate::net::mock::Harness;
use crate::net::transport::Method;
use crate::notify::{ToastLevel, UiEvent};

fn store(h: &Harness) -> TasksStore {
    TasksStore::new(h.api.clone(), &Freshness::default())
}

fn task_json(id: &str, status: &str, progress: f64) -> serde_json::Value {
    json!({ "id": id, "status": status, "progress": progress, "channels": ["a"], "filter_ids": ["f1"] })
}

// =============================================================
// fetch_tasks
// =============================================================

#[tokio::test(start_paused = true)]
async fn fetch_tasks_hits_network_once_within_window() {
    let h = Harness::signed_in();
    h.transport.on(Method::Get, "/tasks", 200, json!([task_json("t1", "pending", 0.0)]));
    let tasks = store(&h);

    assert_eq!(tasks.fetch_tasks(false).await.map(|t| t.len()), Some(1));
    assert_eq!(tasks.fetch_tasks(false).await.map(|t| t.len()), Some(1));
    assert_eq!(h.transport.calls(Method::Get, "/tasks"), 1);
    assert_eq!(tasks.list_status(), FetchStatus::Success);
}

#[tokio::test(start_paused = true)]
async fn fetch_tasks_force_always_calls() {
    let h = Harness::signed_in();
    h.transport.on(Method::Get, "/tasks", 200, json!({ "items": [] }));
    let tasks = store(&h);

    tasks.fetch_tasks(false).await;
    tasks.fetch_tasks(true).await;
    tasks.fetch_tasks(true).await;
    assert_eq!(h.transport.calls(Method::Get, "/tasks"), 3);
}

#[tokio::test(start_paused = true)]
async fn fetch_tasks_refetches_after_window() {
    let h = Harness::signed_in();
    h.transport.on(Method::Get, "/tasks", 200, json!([]));
    let tasks = store(&h);

    tasks.fetch_tasks(false).await;
    tokio::time::advance(Duration::from_secs(31)).await;
    tasks.fetch_tasks(false).await;
    assert_eq!(h.transport.calls(Method::Get, "/tasks"), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_fetches_share_one_request() {
    let h = Harness::signed_in();
    h.transport.on_delayed(Method::Get, "/tasks", Duration::from_millis(200), json!([task_json("t1", "pending", 0.0)]));
    let tasks = store(&h);

    let (first, second) = tokio::join!(tasks.fetch_tasks(false), tasks.fetch_tasks(false));
    assert_eq!(first.map(|t| t.len()), Some(1));
    // The second caller sees the in-flight fetch and returns what is cached.
    assert_eq!(second, None);
    assert_eq!(h.transport.calls(Method::Get, "/tasks"), 1);
}

#[tokio::test(start_paused = true)]
async fn network_failure_sets_error_then_idle() {
    let mut h = Harness::signed_in();
    h.transport.fail(Method::Get, "/tasks", "connection refused");
    let tasks = store(&h);

    assert_eq!(tasks.fetch_tasks(false).await, None);
    assert_eq!(tasks.list_status(), FetchStatus::Error);
    let toasts = h.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Error);
    assert_eq!(toasts[0].title, "Failed to load tasks");

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(tasks.list_status(), FetchStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn unauthorized_navigates_to_login_without_toast() {
    let mut h = Harness::signed_in();
    h.transport.on(Method::Get, "/tasks", 401, json!({ "detail": "expired" }));
    let tasks = store(&h);

    assert_eq!(tasks.fetch_tasks(false).await, None);
    let events = h.drain_events();
    assert_eq!(events, vec![UiEvent::Navigate("/login".to_owned())]);
    assert!(!h.api.is_authenticated());
}

// =============================================================
// details
// =============================================================

#[tokio::test(start_paused = true)]
async fn details_patch_list_entry() {
    let h = Harness::signed_in();
    h.transport.on(Method::Get, "/tasks", 200, json!([task_json("t1", "pending", 0.0)]));
    h.transport.on(Method::Get, "/tasks/t1", 200, task_json("t1", "processing", 40.0));
    let tasks = store(&h);

    tasks.fetch_tasks(false).await;
    let detail = tasks.fetch_task_details("t1", false).await;
    assert_eq!(detail.map(|t| t.status), Some(wire::TaskStatus::Processing));

    let listed = tasks.tasks();
    assert_eq!(listed[0].status, wire::TaskStatus::Processing);
    assert!((listed[0].progress - 40.0).abs() < f64::EPSILON);
    assert_eq!(tasks.detail_status("t1"), FetchStatus::Success);
}

#[tokio::test(start_paused = true)]
async fn fan_out_isolates_failures() {
    let mut h = Harness::signed_in();
    h.transport.on(
        Method::Get,
        "/tasks",
        200,
        json!([task_json("t1", "pending", 0.0), task_json("t2", "pending", 0.0), task_json("t3", "pending", 0.0)]),
    );
    h.transport.on(Method::Get, "/tasks/t1", 200, task_json("t1", "completed", 100.0));
    h.transport.on(Method::Get, "/tasks/t2", 500, json!({ "detail": "boom" }));
    h.transport.on(Method::Get, "/tasks/t3", 200, task_json("t3", "processing", 10.0));
    let tasks = store(&h);

    let results = tasks.fetch_all_with_details(false).await;
    assert_eq!(results.len(), 3);
    assert!(results[0].1.is_some());
    assert!(results[1].1.is_none());
    assert!(results[2].1.is_some());

    assert!(tasks.task("t1").is_some());
    assert!(tasks.task("t3").is_some());
    assert_eq!(tasks.detail_status("t2"), FetchStatus::Error);
    assert_eq!(h.toasts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn fan_out_returns_empty_when_list_fails() {
    let h = Harness::signed_in();
    h.transport.fail(Method::Get, "/tasks", "down");
    let tasks = store(&h);

    assert!(tasks.fetch_all_with_details(false).await.is_empty());
    assert_eq!(h.transport.total_calls(), 1);
}

// =============================================================
// create / poll
// =============================================================

#[tokio::test(start_paused = true)]
async fn create_task_prepends_to_list() {
    let mut h = Harness::signed_in();
    h.transport.on(Method::Get, "/tasks", 200, json!([task_json("t1", "completed", 100.0)]));
    h.transport.on(Method::Post, "/tasks", 201, task_json("t2", "pending", 0.0));
    let tasks = store(&h);
    tasks.fetch_tasks(false).await;

    let created = tasks
        .create_task(&NewTask { channels: vec!["a".into()], filter_ids: vec!["f1".into()] })
        .await;
    assert_eq!(created.map(|t| t.id), Some("t2".to_owned()));
    let ids: Vec<String> = tasks.tasks().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["t2", "t1"]);
    assert_eq!(h.toasts()[0].level, ToastLevel::Success);

    // The list was marked stale, so the next non-forced fetch goes out.
    tasks.fetch_tasks(false).await;
    assert_eq!(h.transport.calls(Method::Get, "/tasks"), 2);
}

#[tokio::test(start_paused = true)]
async fn create_task_without_filters_never_calls() {
    let mut h = Harness::signed_in();
    let tasks = store(&h);

    let created = tasks.create_task(&NewTask { channels: vec!["a".into()], filter_ids: vec![] }).await;
    assert!(created.is_none());
    assert_eq!(h.transport.total_calls(), 0);
    assert_eq!(h.toasts()[0].description.as_deref(), Some("Select at least one filter"));
}

#[tokio::test(start_paused = true)]
async fn poll_stops_at_terminal_status() {
    let h = Harness::signed_in();
    h.transport.on(Method::Get, "/tasks/t1", 200, task_json("t1", "processing", 20.0));
    h.transport.on(Method::Get, "/tasks/t1", 200, task_json("t1", "processing", 70.0));
    h.transport.on(Method::Get, "/tasks/t1", 200, task_json("t1", "completed", 100.0));
    let tasks = store(&h);

    let last = tasks.poll_task("t1", Duration::from_secs(5), 10).await;
    assert_eq!(last.map(|t| t.status), Some(wire::TaskStatus::Completed));
    assert_eq!(h.transport.calls(Method::Get, "/tasks/t1"), 3);
}

#[tokio::test(start_paused = true)]
async fn poll_respects_budget() {
    let h = Harness::signed_in();
    h.transport.on(Method::Get, "/tasks/t1", 200, task_json("t1", "processing", 20.0));
    let tasks = store(&h);

    let last = tasks.poll_task("t1", Duration::from_secs(1), 4).await;
    assert_eq!(last.map(|t| t.status), Some(wire::TaskStatus::Processing));
    assert_eq!(h.transport.calls(Method::Get, "/tasks/t1"), 4);
}
