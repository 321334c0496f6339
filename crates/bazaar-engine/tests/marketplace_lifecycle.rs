//! Marketplace lifecycle: purchase of a listed item through payment,
//! shipment, and receipt confirmation with settlement.

mod common;

use bazaar_core::{DeliveryMethod, ListingStatus, OrderStatus, SettlementStatus};
use bazaar_engine::requests::PaymentDetails;
use bazaar_engine::ErrorCode;

use common::{address, consent, engine, item_req, marketplace_order_req};

fn payment() -> PaymentDetails {
    PaymentDetails {
        shipping_address: Some(address()),
        pickup_address: None,
        client_ip: "203.0.113.10".to_string(),
        consent: None,
    }
}

#[tokio::test]
async fn full_lifecycle_settles_for_the_seller() {
    let engine = engine().await;

    // 450.00 item sits in the 5% tier: platform fee 22.50
    let listing = engine.create_listing(item_req("seller", 45_000)).await.unwrap();
    let order = engine
        .create_marketplace_order(marketplace_order_req(&listing.id, "buyer", 45_000, 1_200))
        .await
        .unwrap();
    assert_eq!(order.platform_fee_cents, 2_250);
    assert_eq!(order.total_cents, 45_000 + 2_250 + 1_200);
    assert_eq!(order.quantity, 1);
    assert_eq!(order.seller_id, "seller");
    // Buyer consented at creation
    assert!(order.buyer_agreed_at.is_some());

    // The item came off the market immediately
    let reserved = engine.get_listing(&listing.id).await.unwrap();
    assert_eq!(reserved.status, ListingStatus::Accepted);
    assert_eq!(reserved.available_count, 0);

    let order = engine.pay_order(&order.id, "buyer", payment()).await.unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert!(order.shipping_address.is_some());

    let order = engine
        .ship_order(&order.id, "seller", "YT987", Some("YTO"))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Shipping);

    let order = engine.confirm_receipt(&order.id, "buyer").await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    // Receipt confirmation drives shipping → received → completed in one
    // operation, both instants recorded
    assert!(order.received_at.is_some());
    assert!(order.completed_at.is_some());
    // Seller payout: goods total minus commission
    assert_eq!(order.settlement_amount_cents, Some(45_000 - 2_250));
    assert_eq!(order.platform_revenue_cents, Some(2_250));
    assert_eq!(order.settlement_status, SettlementStatus::Completed);

    // Total unchanged end to end
    assert_eq!(order.total_cents, 45_000 + 2_250 + 1_200);

    let sold = engine.get_listing(&listing.id).await.unwrap();
    assert_eq!(sold.status, ListingStatus::Completed);
}

#[tokio::test]
async fn platform_fee_tiers_at_the_boundary() {
    let engine = engine().await;

    // Exactly 500.00: the 5% tier still applies
    let listing = engine.create_listing(item_req("seller", 50_000)).await.unwrap();
    let order = engine
        .create_marketplace_order(marketplace_order_req(&listing.id, "buyer", 50_000, 1_200))
        .await
        .unwrap();
    assert_eq!(order.platform_fee_cents, 2_500);

    // One cent more: the 4% tier
    let listing = engine.create_listing(item_req("seller", 50_001)).await.unwrap();
    let order = engine
        .create_marketplace_order(marketplace_order_req(&listing.id, "buyer", 50_001, 1_200))
        .await
        .unwrap();
    assert_eq!(order.platform_fee_cents, 2_000);
}

#[tokio::test]
async fn a_stale_fee_schedule_is_rejected() {
    let engine = engine().await;

    let listing = engine.create_listing(item_req("seller", 50_001)).await.unwrap();

    // Client still charging the 5% tier for a 4%-tier price
    let mut req = marketplace_order_req(&listing.id, "buyer", 50_001, 1_200);
    req.platform_fee_cents = 2_500;
    req.total_cents = 50_001 + 2_500 + 1_200;

    let err = engine.create_marketplace_order(req).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::FeeMismatch);

    // The item stayed on the market
    let after = engine.get_listing(&listing.id).await.unwrap();
    assert_eq!(after.status, ListingStatus::Pending);
}

#[tokio::test]
async fn a_reserved_item_cannot_be_ordered_again() {
    let engine = engine().await;

    let listing = engine.create_listing(item_req("seller", 10_000)).await.unwrap();
    engine
        .create_marketplace_order(marketplace_order_req(&listing.id, "first", 10_000, 1_200))
        .await
        .unwrap();

    let err = engine
        .create_marketplace_order(marketplace_order_req(&listing.id, "second", 10_000, 1_200))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn cancel_puts_the_item_back_on_the_market() {
    let engine = engine().await;

    let listing = engine.create_listing(item_req("seller", 10_000)).await.unwrap();
    let order = engine
        .create_marketplace_order(marketplace_order_req(&listing.id, "buyer", 10_000, 1_200))
        .await
        .unwrap();

    // Marketplace orders may still cancel after payment
    engine.pay_order(&order.id, "buyer", payment()).await.unwrap();
    let order = engine.cancel_order(&order.id, "seller").await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);

    let after = engine.get_listing(&listing.id).await.unwrap();
    assert_eq!(after.status, ListingStatus::Pending);
    assert_eq!(after.available_count, 1);
    assert_eq!(after.orders_count, 0);

    // And a new buyer can take it
    engine
        .create_marketplace_order(marketplace_order_req(&listing.id, "next", 10_000, 1_200))
        .await
        .unwrap();
}

#[tokio::test]
async fn cancellation_is_disallowed_once_shipped() {
    let engine = engine().await;

    let listing = engine.create_listing(item_req("seller", 10_000)).await.unwrap();
    let order = engine
        .create_marketplace_order(marketplace_order_req(&listing.id, "buyer", 10_000, 1_200))
        .await
        .unwrap();
    engine.pay_order(&order.id, "buyer", payment()).await.unwrap();
    engine.ship_order(&order.id, "seller", "YT1", None).await.unwrap();

    let err = engine.cancel_order(&order.id, "buyer").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);

    let after = engine.get_order(&order.id, "buyer").await.unwrap();
    assert_eq!(after.status, OrderStatus::Shipping);
}

#[tokio::test]
async fn sellers_cannot_buy_their_own_item() {
    let engine = engine().await;

    let listing = engine.create_listing(item_req("seller", 10_000)).await.unwrap();
    let err = engine
        .create_marketplace_order(marketplace_order_req(&listing.id, "seller", 10_000, 1_200))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SelfDealing);
}

#[tokio::test]
async fn pickup_orders_pay_without_a_shipping_address() {
    let engine = engine().await;

    let mut req = item_req("seller", 10_000);
    req.delivery_method = Some(DeliveryMethod::Pickup);
    req.shipping_fee_cents = 0;
    let listing = engine.create_listing(req).await.unwrap();

    let order = engine
        .create_marketplace_order(marketplace_order_req(&listing.id, "buyer", 10_000, 0))
        .await
        .unwrap();
    assert_eq!(order.delivery_method, Some(DeliveryMethod::Pickup));

    let details = PaymentDetails {
        shipping_address: None,
        pickup_address: Some("Metro exit C, 7pm".to_string()),
        client_ip: "203.0.113.10".to_string(),
        consent: None,
    };
    let order = engine.pay_order(&order.id, "buyer", details).await.unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.pickup_address.as_deref(), Some("Metro exit C, 7pm"));
}

#[tokio::test]
async fn snapshots_do_not_track_later_listing_edits() {
    let engine = engine().await;

    let listing = engine.create_listing(item_req("seller", 10_000)).await.unwrap();
    let order = engine
        .create_marketplace_order(marketplace_order_req(&listing.id, "buyer", 10_000, 1_200))
        .await
        .unwrap();

    assert_eq!(order.item_title.as_deref(), Some("Used camera"));
    assert_eq!(order.item_image.as_deref(), Some("img/cam.jpg"));
    assert_eq!(order.buyer_username.as_deref(), Some("buyer"));

    // The seller retitles and reshoots the listing after the sale started
    sqlx::query("UPDATE listings SET title = ?2, images = ?3 WHERE id = ?1")
        .bind(&listing.id)
        .bind("Used camera (SOLD)")
        .bind(r#"["img/cam_v2.jpg"]"#)
        .execute(engine.db().pool())
        .await
        .unwrap();

    let live = engine.get_listing(&listing.id).await.unwrap();
    assert_eq!(live.title, "Used camera (SOLD)");

    // The order keeps its point-in-time copy
    let order = engine.get_order(&order.id, "buyer").await.unwrap();
    assert_eq!(order.item_title.as_deref(), Some("Used camera"));
    assert_eq!(order.item_image.as_deref(), Some("img/cam.jpg"));
}

#[tokio::test]
async fn tracking_can_be_amended_in_transit_by_the_seller_only() {
    let engine = engine().await;

    let listing = engine.create_listing(item_req("seller", 10_000)).await.unwrap();
    let order = engine
        .create_marketplace_order(marketplace_order_req(&listing.id, "buyer", 10_000, 1_200))
        .await
        .unwrap();
    engine.pay_order(&order.id, "buyer", payment()).await.unwrap();

    // Not in transit yet
    let err = engine
        .update_tracking(&order.id, "seller", "YT2", None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);

    engine.ship_order(&order.id, "seller", "YT1", Some("YTO")).await.unwrap();

    let err = engine
        .update_tracking(&order.id, "buyer", "YT2", None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotPermitted);

    let order = engine
        .update_tracking(&order.id, "seller", "YT2", None)
        .await
        .unwrap();
    assert_eq!(order.tracking_number.as_deref(), Some("YT2"));
    assert_eq!(order.tracking_company.as_deref(), Some("YTO"));
}

#[tokio::test]
async fn removing_a_listing_is_owner_only_and_open_only() {
    let engine = engine().await;

    let listing = engine.create_listing(item_req("seller", 10_000)).await.unwrap();

    let err = engine.remove_listing(&listing.id, "stranger").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotPermitted);

    engine
        .create_marketplace_order(marketplace_order_req(&listing.id, "buyer", 10_000, 1_200))
        .await
        .unwrap();

    // Reserved items can't be pulled out from under the buyer
    let err = engine.remove_listing(&listing.id, "seller").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);
}

#[tokio::test]
async fn standalone_consent_is_appended_and_listed() {
    let engine = engine().await;

    let listing = engine.create_listing(item_req("seller", 10_000)).await.unwrap();

    // Seller consented at listing time; a terms update re-acceptance adds one
    let record = engine
        .record_consent(
            "seller",
            bazaar_core::Role::Seller,
            Some(&listing.id),
            None,
            &consent(),
            "203.0.113.7",
        )
        .await
        .unwrap();
    assert_eq!(record.version, "v1.0");

    let mine = engine.list_my_consents("seller", 10).await.unwrap();
    assert_eq!(mine.len(), 2);
}
