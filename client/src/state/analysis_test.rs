use std::time::Duration;

use serde_json::json;
use wire::AnalysisOptions;

use super::*;
use crate::config::Freshness;
use crate::net::mock::Harness;
use crate::net::transport::Method;
use crate::notify::ToastLevel;

fn stores(h: &Harness) -> (AnalysisStore, TasksStore) {
    let tasks = TasksStore::new(h.api.clone(), &Freshness::default());
    (AnalysisStore::new(h.api.clone(), tasks.clone()), tasks)
}

fn request(channels: &[&str], filters: &[&str]) -> AnalysisRequest {
    AnalysisRequest {
        channels: channels.iter().map(|c| (*c).to_owned()).collect(),
        filter_ids: filters.iter().map(|f| (*f).to_owned()).collect(),
        options: AnalysisOptions::default(),
    }
}

// =============================================================
// validation
// =============================================================

#[test]
fn validate_rejects_empty_filters_first() {
    assert_eq!(validate(&request(&[], &[])), Err("Select at least one filter"));
    assert_eq!(validate(&request(&["a"], &[])), Err("Select at least one filter"));
}

#[test]
fn validate_rejects_empty_channels() {
    assert_eq!(validate(&request(&[], &["f1"])), Err("Select at least one channel"));
}

#[test]
fn validate_bounds_max_posts() {
    let mut req = request(&["a"], &["f1"]);
    req.options.max_posts = 0;
    assert!(validate(&req).is_err());
    req.options.max_posts = 1001;
    assert!(validate(&req).is_err());
    req.options.max_posts = 1000;
    assert!(validate(&req).is_ok());
}

#[tokio::test(start_paused = true)]
async fn empty_filters_skip_network_and_toast() {
    let mut h = Harness::signed_in();
    let (analysis, _) = stores(&h);

    assert!(analysis.start_analysis(&request(&["a"], &[])).await.is_none());
    assert_eq!(h.transport.total_calls(), 0);
    let toasts = h.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Error);
    assert_eq!(toasts[0].description.as_deref(), Some("Select at least one filter"));
}

// =============================================================
// start
// =============================================================

#[tokio::test(start_paused = true)]
async fn start_posts_nested_options_and_refreshes_tasks() {
    let mut h = Harness::signed_in();
    h.transport.on(Method::Post, "/analysis/analyse", 200, json!({ "task_id": "t9", "status": "pending" }));
    h.transport.on(Method::Get, "/tasks", 200, json!([{ "id": "t9", "status": "pending" }]));
    let (analysis, tasks) = stores(&h);

    let started = analysis.start_analysis(&request(&["a", "b"], &["f1"])).await;
    assert_eq!(started.map(|s| s.task_id), Some("t9".to_owned()));
    assert_eq!(analysis.last_started().map(|s| s.task_id), Some("t9".to_owned()));

    let sent = &h.transport.requests()[0];
    let body = sent.body.clone().unwrap_or_default();
    assert_eq!(body["options"]["max_posts"], 100);
    assert_eq!(body["options"]["processing_mode"], "batch");
    assert_eq!(body["channels"], json!(["a", "b"]));

    assert_eq!(h.transport.calls(Method::Get, "/tasks"), 1);
    assert_eq!(tasks.tasks().len(), 1);
    assert_eq!(h.toasts()[0].level, ToastLevel::Info);
}

#[tokio::test(start_paused = true)]
async fn second_start_while_in_flight_is_skipped() {
    let h = Harness::signed_in();
    h.transport.on_delayed(
        Method::Post,
        "/analysis/analyse",
        Duration::from_millis(300),
        json!({ "task_id": "t1", "status": "pending" }),
    );
    h.transport.on(Method::Get, "/tasks", 200, json!([]));
    let (analysis, _) = stores(&h);
    let req = request(&["a"], &["f1"]);

    let (first, second) = tokio::join!(analysis.start_analysis(&req), analysis.start_analysis(&req));
    assert!(first.is_some());
    assert!(second.is_none());
    assert_eq!(h.transport.calls(Method::Post, "/analysis/analyse"), 1);
    assert!(!analysis.is_starting());
}

#[tokio::test(start_paused = true)]
async fn backend_rejection_toasts_detail() {
    let mut h = Harness::signed_in();
    h.transport.on(Method::Post, "/analysis/analyse", 402, json!({ "detail": "Not enough credits" }));
    let (analysis, _) = stores(&h);

    assert!(analysis.start_analysis(&request(&["a"], &["f1"])).await.is_none());
    let toasts = h.toasts();
    assert_eq!(toasts[0].title, "Failed to start analysis");
    assert_eq!(toasts[0].description.as_deref(), Some("Not enough credits"));
    assert!(!analysis.is_starting());
    assert_eq!(h.transport.calls(Method::Get, "/tasks"), 0);
}

#[tokio::test(start_paused = true)]
async fn abandoned_start_releases_in_flight_flag() {
    let h = Harness::signed_in();
    h.transport.on_delayed(
        Method::Post,
        "/analysis/analyse",
        Duration::from_secs(5),
        json!({ "task_id": "t1", "status": "pending" }),
    );
    h.transport.on(Method::Post, "/analysis/analyse", 200, json!({ "task_id": "t2", "status": "pending" }));
    h.transport.on(Method::Get, "/tasks", 200, json!([]));
    let (analysis, _) = stores(&h);
    let req = request(&["a"], &["f1"]);

    let abandoned = tokio::time::timeout(Duration::from_secs(1), analysis.start_analysis(&req)).await;
    assert!(abandoned.is_err());
    assert!(!analysis.is_starting());

    let second = analysis.start_analysis(&req).await;
    assert_eq!(second.map(|s| s.task_id), Some("t2".to_owned()));
    assert_eq!(h.transport.calls(Method::Post, "/analysis/analyse"), 2);
}
