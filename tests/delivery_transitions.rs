use storefront_payments::domain::delivery::{
    apply_delivery_transition, resolve_confirmation, DeliverySnapshot, TransitionError,
    CUSTOMER_PICKUP_NOTE, MAX_ATTEMPTS_NOTE,
};
use storefront_payments::domain::order::{DeliveryStatus, OrderStatus};

fn snapshot(status: DeliveryStatus, attempts: i32, confirmed: bool) -> DeliverySnapshot {
    DeliverySnapshot {
        status,
        attempts,
        receipt_confirmed: confirmed,
    }
}

#[test]
fn failed_visit_increments_attempts_and_stamps_time() {
    let now = chrono::Utc::now();
    let out = apply_delivery_transition(
        &snapshot(DeliveryStatus::Pending, 0, false),
        DeliveryStatus::VisitedNotDelivered,
        now,
    )
    .unwrap();

    assert_eq!(out.to, DeliveryStatus::VisitedNotDelivered);
    assert_eq!(out.attempts, 1);
    assert_eq!(out.last_attempt_at, Some(now));
    assert_eq!(out.system_note, None);
}

#[test]
fn two_visits_then_escalation_to_pickup() {
    let now = chrono::Utc::now();

    let first = apply_delivery_transition(
        &snapshot(DeliveryStatus::Pending, 0, false),
        DeliveryStatus::VisitedNotDelivered,
        now,
    )
    .unwrap();
    assert_eq!(first.attempts, 1);

    let second = apply_delivery_transition(
        &snapshot(first.to, first.attempts, false),
        DeliveryStatus::VisitedNotDelivered,
        now,
    )
    .unwrap();
    assert_eq!(second.to, DeliveryStatus::VisitedNotDelivered);
    assert_eq!(second.attempts, 2);

    let third = apply_delivery_transition(
        &snapshot(second.to, second.attempts, false),
        DeliveryStatus::VisitedNotDelivered,
        now,
    )
    .unwrap();
    assert_eq!(third.to, DeliveryStatus::PickupInStore);
    assert_eq!(third.attempts, 2);
    assert_eq!(third.system_note, Some(MAX_ATTEMPTS_NOTE));
    assert_eq!(third.last_attempt_at, None);
}

#[test]
fn delivery_from_any_non_terminal_state_syncs_order_status() {
    let now = chrono::Utc::now();
    for status in [
        DeliveryStatus::Pending,
        DeliveryStatus::VisitedNotDelivered,
        DeliveryStatus::PickupInStore,
    ] {
        let out =
            apply_delivery_transition(&snapshot(status, 1, false), DeliveryStatus::Delivered, now)
                .unwrap();
        assert_eq!(out.to, DeliveryStatus::Delivered);
        assert_eq!(out.order_status, Some(OrderStatus::Delivered));
    }
}

#[test]
fn cancellation_syncs_order_status() {
    let out = apply_delivery_transition(
        &snapshot(DeliveryStatus::Pending, 0, false),
        DeliveryStatus::Cancelled,
        chrono::Utc::now(),
    )
    .unwrap();
    assert_eq!(out.to, DeliveryStatus::Cancelled);
    assert_eq!(out.order_status, Some(OrderStatus::Cancelled));
}

#[test]
fn cancelled_order_rejects_everything() {
    let now = chrono::Utc::now();
    for requested in [
        DeliveryStatus::Pending,
        DeliveryStatus::VisitedNotDelivered,
        DeliveryStatus::PickupInStore,
        DeliveryStatus::Delivered,
        DeliveryStatus::Cancelled,
    ] {
        let result =
            apply_delivery_transition(&snapshot(DeliveryStatus::Cancelled, 0, false), requested, now);
        assert_eq!(result, Err(TransitionError::OrderCancelled));
    }
}

#[test]
fn delivered_order_only_reaffirms_delivery() {
    let now = chrono::Utc::now();
    let snap = snapshot(DeliveryStatus::Delivered, 1, false);

    let reaffirm = apply_delivery_transition(&snap, DeliveryStatus::Delivered, now).unwrap();
    assert_eq!(reaffirm.to, DeliveryStatus::Delivered);
    assert_eq!(reaffirm.attempts, 1);

    let result = apply_delivery_transition(&snap, DeliveryStatus::VisitedNotDelivered, now);
    assert_eq!(result, Err(TransitionError::AlreadyDelivered));
}

#[test]
fn confirmed_order_only_allows_delivered() {
    let now = chrono::Utc::now();
    let snap = snapshot(DeliveryStatus::Delivered, 0, true);

    let reaffirm = apply_delivery_transition(&snap, DeliveryStatus::Delivered, now).unwrap();
    assert_eq!(reaffirm.to, DeliveryStatus::Delivered);

    for requested in [
        DeliveryStatus::VisitedNotDelivered,
        DeliveryStatus::PickupInStore,
        DeliveryStatus::Cancelled,
    ] {
        let result = apply_delivery_transition(&snap, requested, now);
        assert_eq!(result, Err(TransitionError::AlreadyConfirmed));
    }
}

#[test]
fn moving_back_to_pending_is_invalid() {
    let result = apply_delivery_transition(
        &snapshot(DeliveryStatus::VisitedNotDelivered, 1, false),
        DeliveryStatus::Pending,
        chrono::Utc::now(),
    );
    assert_eq!(
        result,
        Err(TransitionError::InvalidTarget(DeliveryStatus::Pending))
    );
}

#[test]
fn confirmation_resolves_to_delivered() {
    let out = resolve_confirmation(&snapshot(DeliveryStatus::Delivered, 0, false)).unwrap();
    assert_eq!(out.to, DeliveryStatus::Delivered);
    assert_eq!(out.order_status, Some(OrderStatus::Delivered));
}

#[test]
fn confirmation_after_failed_attempts_resolves_to_pickup() {
    let out =
        resolve_confirmation(&snapshot(DeliveryStatus::VisitedNotDelivered, 2, false)).unwrap();
    assert_eq!(out.to, DeliveryStatus::PickupInStore);
    assert_eq!(out.system_note, Some(CUSTOMER_PICKUP_NOTE));
    assert_eq!(out.order_status, None);
}

#[test]
fn confirmation_with_remaining_attempts_still_delivers() {
    let out =
        resolve_confirmation(&snapshot(DeliveryStatus::VisitedNotDelivered, 1, false)).unwrap();
    assert_eq!(out.to, DeliveryStatus::Delivered);
}

#[test]
fn second_confirmation_is_a_conflict() {
    let result = resolve_confirmation(&snapshot(DeliveryStatus::Delivered, 0, true));
    assert_eq!(result, Err(TransitionError::AlreadyConfirmed));
}

#[test]
fn confirmation_of_cancelled_order_is_a_conflict() {
    let result = resolve_confirmation(&snapshot(DeliveryStatus::Cancelled, 0, false));
    assert_eq!(result, Err(TransitionError::OrderCancelled));
}
