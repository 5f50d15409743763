use storefront_payments::domain::payment::PaymentStatus;

#[test]
fn lattice_moves_forward() {
    assert!(PaymentStatus::Pending.accepts(PaymentStatus::Processing));
    assert!(PaymentStatus::Pending.accepts(PaymentStatus::Success));
    assert!(PaymentStatus::Processing.accepts(PaymentStatus::Failed));
    assert!(PaymentStatus::Success.accepts(PaymentStatus::Refunded));
    assert!(PaymentStatus::Failed.accepts(PaymentStatus::Refunded));
}

#[test]
fn lattice_rejects_regressions() {
    assert!(!PaymentStatus::Success.accepts(PaymentStatus::Pending));
    assert!(!PaymentStatus::Success.accepts(PaymentStatus::Processing));
    assert!(!PaymentStatus::Refunded.accepts(PaymentStatus::Success));
    assert!(!PaymentStatus::Processing.accepts(PaymentStatus::Pending));
}

#[test]
fn lattice_rejects_sibling_terminal_overwrite() {
    assert!(!PaymentStatus::Success.accepts(PaymentStatus::Failed));
    assert!(!PaymentStatus::Failed.accepts(PaymentStatus::Cancelled));
    assert!(!PaymentStatus::Cancelled.accepts(PaymentStatus::Success));
}

#[test]
fn duplicate_delivery_is_not_accepted() {
    for s in [
        PaymentStatus::Pending,
        PaymentStatus::Processing,
        PaymentStatus::Success,
        PaymentStatus::Failed,
        PaymentStatus::Cancelled,
        PaymentStatus::Refunded,
    ] {
        assert!(!s.accepts(s));
    }
}

#[test]
fn terminal_statuses() {
    assert!(!PaymentStatus::Pending.is_terminal());
    assert!(!PaymentStatus::Processing.is_terminal());
    assert!(PaymentStatus::Success.is_terminal());
    assert!(PaymentStatus::Failed.is_terminal());
    assert!(PaymentStatus::Cancelled.is_terminal());
    assert!(PaymentStatus::Refunded.is_terminal());
}

#[test]
fn db_strings_round_trip() {
    for s in [
        PaymentStatus::Pending,
        PaymentStatus::Processing,
        PaymentStatus::Success,
        PaymentStatus::Failed,
        PaymentStatus::Cancelled,
        PaymentStatus::Refunded,
    ] {
        assert_eq!(PaymentStatus::parse(s.as_str()), Some(s));
    }
    assert_eq!(PaymentStatus::parse("APPROVED"), None);
}
