use super::*;

#[test]
fn task_path() {
    assert_eq!(task("t-9"), "/tasks/t-9");
}

#[test]
fn channel_set_sub_resources() {
    assert_eq!(channel_set("7"), "/channel-sets/7");
    assert_eq!(channel_set_channels("7"), "/channel-sets/7/channels");
    assert_eq!(channel_set_channel("7", "durov"), "/channel-sets/7/channels/durov");
    assert_eq!(channel_set_parsing_status("7"), "/channel-sets/7/parsing-status");
    assert_eq!(channel_set_analyze("7"), "/channel-sets/7/analyze");
    assert_eq!(channel_set_cancel_build("7"), "/channel-sets/7/cancel-build");
    assert_eq!(channel_set_build_status("7"), "/channel-sets/7/build-status");
}

#[test]
fn credits_paths() {
    assert_eq!(purchase_package("pro"), "/credits/packages/pro/purchase");
    assert_eq!(check_action("create_set"), "/credits/check-action/create_set");
}

#[test]
fn filter_path() {
    assert_eq!(filter("f1"), "/filters/f1");
}

#[test]
fn segments_drop_slashes_and_whitespace() {
    assert_eq!(task(" ../admin "), "/tasks/..admin");
    assert_eq!(channel_set_channel("1", "a/b"), "/channel-sets/1/channels/ab");
}

#[test]
fn auth_endpoints_are_recognized() {
    assert!(is_auth_endpoint(AUTH_REFRESH));
    assert!(is_auth_endpoint(AUTH_TELEGRAM_WEBAPP));
    assert!(!is_auth_endpoint(AUTH_CHECK_PERMISSION));
    assert!(!is_auth_endpoint(TASKS));
}
