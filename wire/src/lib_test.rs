use super::*;

// =============================================================
// decode_list envelopes
// =============================================================

#[test]
fn decode_list_accepts_bare_array() {
    let body = r#"[{"id":"f1","name":"Crypto"}]"#;
    let filters: Vec<Filter> = decode_list(body).expect("bare");
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0].category, "general");
}

#[test]
fn decode_list_accepts_items_envelope_with_extra_fields() {
    let body = r#"{"items":[{"id":"t1","amount":-5,"type":"spend"}],"total":17}"#;
    let items: Vec<CreditTransaction> = decode_list(body).expect("items");
    assert_eq!(items[0].kind, TransactionKind::Spend);
    assert_eq!(items[0].amount, -5);
}

#[test]
fn decode_list_accepts_data_envelope() {
    let body = r#"{"data":[{"action_type":"analyze","cost":3}]}"#;
    let costs: Vec<CreditCost> = decode_list(body).expect("data");
    assert_eq!(costs[0].cost, 3);
}

#[test]
fn decode_list_rejects_scalar() {
    let err = decode_list::<Filter>("42").unwrap_err();
    assert!(err.to_string().contains("failed to decode"));
}

// =============================================================
// Tasks
// =============================================================

#[test]
fn task_status_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&TaskStatus::Processing).unwrap(), "\"processing\"");
    let parsed: TaskStatus = serde_json::from_str("\"failed\"").unwrap();
    assert_eq!(parsed, TaskStatus::Failed);
}

#[test]
fn task_status_terminal_states() {
    assert!(!TaskStatus::Pending.is_terminal());
    assert!(!TaskStatus::Processing.is_terminal());
    assert!(TaskStatus::Completed.is_terminal());
    assert!(TaskStatus::Failed.is_terminal());
}

#[test]
fn task_decodes_minimal_list_entry() {
    let task: AnalysisTask = decode(r#"{"id":"t-1","status":"pending"}"#).unwrap();
    assert_eq!(task.progress, 0.0);
    assert!(task.results.is_none());
    assert!(task.error.is_none());
}

#[test]
fn task_top_scores_keeps_best_per_channel() {
    let task: AnalysisTask = decode(
        r#"{
            "id":"t-1","status":"completed","progress":100,
            "results":[
                {"channel":"a","filter_id":"f1","score":0.2},
                {"channel":"a","filter_id":"f2","score":0.9},
                {"channel":"b","filter_id":"f1","score":0.4}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(task.top_scores(), vec![("a", 0.9), ("b", 0.4)]);
}

// =============================================================
// Channel sets
// =============================================================

#[test]
fn channel_set_defaults_flags_and_channels() {
    let set: ChannelsSet = decode(r#"{"id":"s1","name":"News"}"#).unwrap();
    assert_eq!(set.channel_count, 0);
    assert!(!set.all_parsed);
    assert!(set.channels.is_empty());
    assert!(!set.can_edit);
}

#[test]
fn channel_set_draft_omits_absent_fields() {
    let draft = ChannelSetDraft { name: Some("n".to_owned()), ..ChannelSetDraft::default() };
    assert_eq!(serde_json::to_value(&draft).unwrap(), serde_json::json!({"name": "n"}));
}

#[test]
fn build_status_parses_cancelled() {
    let status: BuildStatus = decode(r#"{"status":"cancelled","progress":40}"#).unwrap();
    assert_eq!(status.status, BuildState::Cancelled);
}

// =============================================================
// Credits
// =============================================================

#[test]
fn package_total_credits_includes_bonus() {
    let pkg: CreditPackage = decode(r#"{"id":"p","name":"Pro","credits":100,"price":9.99,"bonus_credits":20}"#).unwrap();
    assert_eq!(pkg.total_credits(), 120);
    assert_eq!(pkg.currency, "USD");
}

#[test]
fn transaction_accepts_kind_alias() {
    let tx: CreditTransaction = decode(r#"{"id":"x","amount":50,"kind":"bonus"}"#).unwrap();
    assert_eq!(tx.kind, TransactionKind::Bonus);
}

// =============================================================
// Auth
// =============================================================

#[test]
fn telegram_user_display_name_prefers_username() {
    let user = TelegramUser {
        id: 7,
        username: Some("alice".to_owned()),
        first_name: Some("Alice".to_owned()),
        last_name: None,
        photo_url: None,
    };
    assert_eq!(user.display_name(), "@alice");
}

#[test]
fn telegram_user_display_name_falls_back_to_names_then_id() {
    let mut user =
        TelegramUser { id: 7, username: None, first_name: Some("Ada".to_owned()), last_name: Some("L".to_owned()), photo_url: None };
    assert_eq!(user.display_name(), "Ada L");
    user.first_name = None;
    user.last_name = None;
    assert_eq!(user.display_name(), "7");
}

#[test]
fn permission_check_accepts_has_permission_alias() {
    let check: PermissionCheck = decode(r#"{"permission":"admin","has_permission":true}"#).unwrap();
    assert!(check.granted);
}

// =============================================================
// Analysis
// =============================================================

#[test]
fn analysis_request_serializes_nested_options() {
    let req = AnalysisRequest {
        channels: vec!["durov".to_owned()],
        filter_ids: vec!["f1".to_owned()],
        options: AnalysisOptions { processing_mode: ProcessingMode::Direct, ..AnalysisOptions::default() },
    };
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["options"]["processing_mode"], "direct");
    assert_eq!(json["options"]["max_posts"], 100);
}

#[test]
fn processing_mode_from_str() {
    assert_eq!("batch".parse::<ProcessingMode>().unwrap(), ProcessingMode::Batch);
    assert!("bulk".parse::<ProcessingMode>().is_err());
}

#[test]
fn ack_defaults_success_true() {
    let ack: Ack = decode("{}").unwrap();
    assert!(ack.success);
}
