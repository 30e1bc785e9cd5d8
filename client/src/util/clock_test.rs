use super::*;

#[test]
fn rfc3339_stamp_is_parseable_shape() {
    let stamp = now_rfc3339();
    assert!(stamp.contains('T'));
    assert!(stamp.ends_with('Z'));
}

#[test]
fn unix_now_is_after_2020() {
    assert!(now_unix() > 1_577_836_800);
}
