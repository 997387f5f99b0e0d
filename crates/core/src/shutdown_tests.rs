use super::*;

#[test]
fn first_request_always_takes_effect() {
    let mut request = ShutdownRequest::none();
    assert!(request.escalate(ShutdownLevel::Smart));
    assert_eq!(request.level(), Some(ShutdownLevel::Smart));
}

#[test]
fn a_stronger_request_overrides_a_weaker_pending_one() {
    let mut request = ShutdownRequest::none();
    request.escalate(ShutdownLevel::Smart);
    assert!(request.escalate(ShutdownLevel::Fast));
    assert_eq!(request.level(), Some(ShutdownLevel::Fast));
}

#[test]
fn a_weaker_request_is_ignored_once_a_stronger_one_is_pending() {
    let mut request = ShutdownRequest::none();
    request.escalate(ShutdownLevel::Fast);
    assert!(!request.escalate(ShutdownLevel::Smart));
    assert_eq!(request.level(), Some(ShutdownLevel::Fast));
}

#[test]
fn an_equal_request_is_ignored_as_not_strictly_stronger() {
    let mut request = ShutdownRequest::none();
    request.escalate(ShutdownLevel::Fast);
    assert!(!request.escalate(ShutdownLevel::Fast));
}

#[test]
fn smart_then_fast_yields_the_same_outcome_as_fast_alone() {
    let mut smart_then_fast = ShutdownRequest::none();
    smart_then_fast.escalate(ShutdownLevel::Smart);
    smart_then_fast.escalate(ShutdownLevel::Fast);

    let mut fast_alone = ShutdownRequest::none();
    fast_alone.escalate(ShutdownLevel::Fast);

    assert_eq!(smart_then_fast.level(), fast_alone.level());
}
