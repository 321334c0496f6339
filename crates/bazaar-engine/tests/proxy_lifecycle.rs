//! Proxy-purchase lifecycle: claim, price submission, payment, fulfillment,
//! shipment, receipt confirmation with settlement.

mod common;

use bazaar_core::{ListingStatus, OrderStatus, SettlementStatus};
use bazaar_engine::requests::PaymentDetails;
use bazaar_engine::ErrorCode;

use common::{address, consent, engine, proxy_order_req, want_ad_req};

fn payment() -> PaymentDetails {
    PaymentDetails {
        shipping_address: Some(address()),
        pickup_address: None,
        client_ip: "203.0.113.7".to_string(),
        consent: Some(consent()),
    }
}

#[tokio::test]
async fn full_lifecycle_settles_for_the_fulfiller() {
    let engine = engine().await;

    let listing = engine.create_listing(want_ad_req("poster", 2)).await.unwrap();
    engine
        .accept_listing(&listing.id, "runner", "203.0.113.9", Some(&consent()))
        .await
        .unwrap();

    // unit 120.00 x2 = 240.00; service 24.00, platform 12.00, tip 8.00
    let order = engine
        .create_proxy_order(proxy_order_req(&listing.id, "runner", 2, 12_000, 800))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_cents, 24_000 + 2_400 + 1_200 + 800);
    assert_eq!(order.buyer_id, "poster");
    assert_eq!(order.seller_id, "runner");

    let order = engine.pay_order(&order.id, "poster", payment()).await.unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert!(order.paid_at.is_some());
    assert!(order.buyer_agreed_at.is_some());

    let order = engine
        .mark_purchased(&order.id, "runner", vec!["receipts/1.jpg".to_string()])
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.purchase_evidence, vec!["receipts/1.jpg".to_string()]);

    let order = engine
        .ship_order(&order.id, "runner", "SF123456", Some("SF Express"))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Shipping);

    let order = engine.confirm_receipt(&order.id, "poster").await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.settlement_status, SettlementStatus::Completed);
    // Fulfiller payout: subtotal + service fee + tip
    assert_eq!(order.settlement_amount_cents, Some(24_000 + 2_400 + 800));
    assert_eq!(order.platform_revenue_cents, Some(1_200));
    assert!(order.settled_at.is_some());

    // The total never moved through the whole lifecycle
    assert_eq!(order.total_cents, 24_000 + 2_400 + 1_200 + 800);

    // The listing tracked the fulfillment trail to completion
    let listing = engine.get_listing(&listing.id).await.unwrap();
    assert_eq!(listing.status, ListingStatus::Completed);

    // Consent trail: fulfiller at submission, buyer at payment
    let trail = engine.list_order_consents(&order.id, "poster").await.unwrap();
    assert_eq!(trail.len(), 2);
}

#[tokio::test]
async fn confirming_twice_is_rejected_with_figures_unchanged() {
    let engine = engine().await;

    let listing = engine.create_listing(want_ad_req("poster", 1)).await.unwrap();
    engine
        .accept_listing(&listing.id, "runner", "203.0.113.9", None)
        .await
        .unwrap();
    let order = engine
        .create_proxy_order(proxy_order_req(&listing.id, "runner", 1, 10_000, 0))
        .await
        .unwrap();
    engine.pay_order(&order.id, "poster", payment()).await.unwrap();
    engine
        .mark_purchased(&order.id, "runner", vec!["r.jpg".to_string()])
        .await
        .unwrap();
    engine.ship_order(&order.id, "runner", "SF1", None).await.unwrap();
    let settled = engine.confirm_receipt(&order.id, "poster").await.unwrap();

    let err = engine.confirm_receipt(&order.id, "poster").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadySettled);

    let after = engine.get_order(&order.id, "poster").await.unwrap();
    assert_eq!(after.settlement_amount_cents, settled.settlement_amount_cents);
    assert_eq!(after.settled_at, settled.settled_at);
}

#[tokio::test]
async fn cancel_restores_the_reserved_supply() {
    let engine = engine().await;

    let listing = engine.create_listing(want_ad_req("poster", 3)).await.unwrap();
    engine
        .accept_listing(&listing.id, "runner", "203.0.113.9", None)
        .await
        .unwrap();
    let order = engine
        .create_proxy_order(proxy_order_req(&listing.id, "runner", 2, 10_000, 0))
        .await
        .unwrap();

    let mid = engine.get_listing(&listing.id).await.unwrap();
    assert_eq!(mid.available_count, 1);
    assert_eq!(mid.orders_count, 2);

    let order = engine.cancel_order(&order.id, "poster").await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);

    let after = engine.get_listing(&listing.id).await.unwrap();
    assert_eq!(after.available_count, 3);
    assert_eq!(after.orders_count, 0);
    // The claim itself survives one order's cancellation
    assert_eq!(after.status, ListingStatus::Accepted);
    assert_eq!(after.accepted_by.as_deref(), Some("runner"));
}

#[tokio::test]
async fn refund_is_terminal_and_keeps_inventory_bound() {
    let engine = engine().await;

    let listing = engine.create_listing(want_ad_req("poster", 2)).await.unwrap();
    engine
        .accept_listing(&listing.id, "runner", "203.0.113.9", None)
        .await
        .unwrap();
    let order = engine
        .create_proxy_order(proxy_order_req(&listing.id, "runner", 1, 10_000, 0))
        .await
        .unwrap();
    engine.pay_order(&order.id, "poster", payment()).await.unwrap();

    // Only the fulfiller may refund
    let err = engine.refund_order(&order.id, "poster").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotPermitted);

    let order = engine.refund_order(&order.id, "runner").await.unwrap();
    assert_eq!(order.status, OrderStatus::Refunded);

    // A refunded slot stays counted against the want-ad
    let after = engine.get_listing(&listing.id).await.unwrap();
    assert_eq!(after.available_count, 1);
    assert_eq!(after.orders_count, 1);

    // Terminal: nothing moves a refunded order
    let err = engine.cancel_order(&order.id, "poster").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn only_the_claiming_fulfiller_may_submit() {
    let engine = engine().await;

    let listing = engine.create_listing(want_ad_req("poster", 2)).await.unwrap();

    // Unclaimed want-ad: submission conflicts
    let err = engine
        .create_proxy_order(proxy_order_req(&listing.id, "runner", 1, 10_000, 0))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);

    engine
        .accept_listing(&listing.id, "runner", "203.0.113.9", None)
        .await
        .unwrap();

    // A different user cannot submit against someone else's claim
    let err = engine
        .create_proxy_order(proxy_order_req(&listing.id, "impostor", 1, 10_000, 0))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotPermitted);
}

#[tokio::test]
async fn tampered_fees_are_rejected_before_any_write() {
    let engine = engine().await;

    let listing = engine.create_listing(want_ad_req("poster", 2)).await.unwrap();
    engine
        .accept_listing(&listing.id, "runner", "203.0.113.9", None)
        .await
        .unwrap();

    let mut req = proxy_order_req(&listing.id, "runner", 1, 10_000, 0);
    req.service_fee_cents = 10; // should be 1_000
    req.total_cents = 10_000 + 10 + 500;

    let err = engine.create_proxy_order(req).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::FeeMismatch);

    // Nothing was reserved
    let after = engine.get_listing(&listing.id).await.unwrap();
    assert_eq!(after.available_count, 2);
    assert_eq!(after.orders_count, 0);
}

#[tokio::test]
async fn quantity_beyond_availability_is_rejected() {
    let engine = engine().await;

    let listing = engine.create_listing(want_ad_req("poster", 2)).await.unwrap();
    engine
        .accept_listing(&listing.id, "runner", "203.0.113.9", None)
        .await
        .unwrap();

    let err = engine
        .create_proxy_order(proxy_order_req(&listing.id, "runner", 3, 10_000, 0))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientAvailability);
}

#[tokio::test]
async fn payment_requires_a_complete_shipping_address() {
    let engine = engine().await;

    let listing = engine.create_listing(want_ad_req("poster", 1)).await.unwrap();
    engine
        .accept_listing(&listing.id, "runner", "203.0.113.9", None)
        .await
        .unwrap();
    let order = engine
        .create_proxy_order(proxy_order_req(&listing.id, "runner", 1, 10_000, 0))
        .await
        .unwrap();

    let no_address = PaymentDetails {
        shipping_address: None,
        pickup_address: None,
        client_ip: "203.0.113.7".to_string(),
        consent: Some(consent()),
    };
    let err = engine.pay_order(&order.id, "poster", no_address).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let mut incomplete = payment();
    incomplete.shipping_address.as_mut().unwrap().district = String::new();
    let err = engine.pay_order(&order.id, "poster", incomplete).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    // Still payable once the address is complete
    let order = engine.pay_order(&order.id, "poster", payment()).await.unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
}

#[tokio::test]
async fn out_of_order_requests_leave_state_unchanged() {
    let engine = engine().await;

    let listing = engine.create_listing(want_ad_req("poster", 1)).await.unwrap();
    engine
        .accept_listing(&listing.id, "runner", "203.0.113.9", None)
        .await
        .unwrap();
    let order = engine
        .create_proxy_order(proxy_order_req(&listing.id, "runner", 1, 10_000, 0))
        .await
        .unwrap();

    // Shipping a pending order is a state conflict, whoever asks
    let err = engine
        .ship_order(&order.id, "runner", "SF1", None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);

    // Confirming receipt of a pending order likewise
    let err = engine.confirm_receipt(&order.id, "poster").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);

    let after = engine.get_order(&order.id, "poster").await.unwrap();
    assert_eq!(after.status, OrderStatus::Pending);
    assert_eq!(after.settlement_status, SettlementStatus::Pending);
    assert_eq!(after.settlement_amount_cents, None);
}

#[tokio::test]
async fn owner_cannot_claim_their_own_want_ad() {
    let engine = engine().await;

    let listing = engine.create_listing(want_ad_req("poster", 1)).await.unwrap();
    let err = engine
        .accept_listing(&listing.id, "poster", "127.0.0.1", None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SelfDealing);
}

#[tokio::test]
async fn concurrent_claims_produce_exactly_one_winner() {
    let engine = engine().await;

    let listing = engine.create_listing(want_ad_req("poster", 1)).await.unwrap();

    let a = engine.clone();
    let b = engine.clone();
    let id_a = listing.id.clone();
    let id_b = listing.id.clone();
    let (first, second) = tokio::join!(
        a.accept_listing(&id_a, "runner-a", "203.0.113.1", None),
        b.accept_listing(&id_b, "runner-b", "203.0.113.2", None),
    );

    let outcomes = [first.is_ok(), second.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);

    let loser = if first.is_err() {
        first.unwrap_err()
    } else {
        second.unwrap_err()
    };
    assert_eq!(loser.code, ErrorCode::Conflict);
    assert!(loser.is_retryable());

    let after = engine.get_listing(&listing.id).await.unwrap();
    assert_eq!(after.status, ListingStatus::Accepted);
    assert!(after.accepted_by.is_some());
}

#[tokio::test]
async fn non_parties_cannot_read_an_order() {
    let engine = engine().await;

    let listing = engine.create_listing(want_ad_req("poster", 1)).await.unwrap();
    engine
        .accept_listing(&listing.id, "runner", "203.0.113.9", None)
        .await
        .unwrap();
    let order = engine
        .create_proxy_order(proxy_order_req(&listing.id, "runner", 1, 10_000, 0))
        .await
        .unwrap();

    let err = engine.get_order(&order.id, "stranger").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotPermitted);

    assert_eq!(engine.list_orders("poster", 10).await.unwrap().len(), 1);
    assert_eq!(engine.list_orders("runner", 10).await.unwrap().len(), 1);
    assert!(engine.list_orders("stranger", 10).await.unwrap().is_empty());
}
