use super::*;

#[test]
fn second_acquire_is_busy_until_first_drops() {
    let flag = AtomicBool::new(false);
    let first = SubmitGuard::acquire(&flag).unwrap();
    assert!(matches!(SubmitGuard::acquire(&flag), Err(FlowError::Busy)));
    drop(first);
    assert!(SubmitGuard::acquire(&flag).is_ok());
}

#[test]
fn messages_display_verbatim() {
    assert_eq!(FlowError::invalid("Please enter a pool name").to_string(), "Please enter a pool name");
    assert_eq!(FlowError::failed("Failed to delete pool").to_string(), "Failed to delete pool");
}

#[test]
fn error_slot_tracks_latest_outcome() {
    let slot = ErrorSlot::default();
    assert_eq!(slot.record::<()>(Err(FlowError::failed("boom"))), Err(FlowError::failed("boom")));
    assert_eq!(slot.get().as_deref(), Some("boom"));
    assert_eq!(slot.record(Ok(1)), Ok(1));
    assert_eq!(slot.get(), None);
}
