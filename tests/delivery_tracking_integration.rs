//! Integration tests for delivery tracking.
//!
//! Covers channel sharing between subscribers, tracking-link dedup across
//! ledger instances backed by the same store, and release of a pairing when
//! the backend refuses the send.

use std::sync::Arc;

use secrecy::Secret;
use serde_json::json;

use bizhub::adapters::backend::InMemoryTableGateway;
use bizhub::adapters::realtime::InMemoryRealtimeTransport;
use bizhub::adapters::storage::{FileKeyValueStore, KeyValueTrackingLinkLedger};
use bizhub::application::delivery::{LOCATION_EVENT, SEND_TRACKING_LINK_FN};
use bizhub::application::{ChannelRegistry, DeliveryError, DeliveryTracking, TrackingLinkOutcome};
use bizhub::domain::delivery::{CourierLocation, TrackingLinkSigner};
use bizhub::domain::foundation::{CourierId, OrderId};
use bizhub::ports::{GatewayError, KeyValueStore, RealtimeEvent};

fn signer() -> TrackingLinkSigner {
    TrackingLinkSigner::new(
        "https://track.example.com",
        Secret::new("integration-signing-secret-32-chars".to_string()),
        3_600,
    )
}

fn tracking(
    store: Arc<dyn KeyValueStore>,
    gateway: Arc<InMemoryTableGateway>,
) -> DeliveryTracking {
    let channels = Arc::new(ChannelRegistry::new(Arc::new(InMemoryRealtimeTransport::new(16))));
    DeliveryTracking::new(
        channels,
        Arc::new(KeyValueTrackingLinkLedger::new(store)),
        gateway,
        signer(),
    )
}

async fn accepting_gateway() -> Arc<InMemoryTableGateway> {
    let gateway = Arc::new(InMemoryTableGateway::new());
    gateway
        .register_function(SEND_TRACKING_LINK_FN, |_| Ok(json!({"sent": true})))
        .await;
    gateway
}

#[tokio::test]
async fn tracking_link_is_sent_once_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let order = OrderId::from("1001");
    let courier = CourierId::from("c1");
    let gateway = accepting_gateway().await;

    let first = tracking(Arc::new(FileKeyValueStore::new(dir.path())), gateway.clone());
    let outcome = first
        .send_tracking_link(&order, &courier, "+5511999990000")
        .await
        .unwrap();
    assert!(matches!(outcome, TrackingLinkOutcome::Sent { .. }));

    let restarted = tracking(Arc::new(FileKeyValueStore::new(dir.path())), gateway.clone());
    let outcome = restarted
        .send_tracking_link(&order, &courier, "+5511999990000")
        .await
        .unwrap();
    assert_eq!(outcome, TrackingLinkOutcome::AlreadySent);

    let calls = gateway.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1["order_id"], "1001");
    assert_eq!(calls[0].1["courier_id"], "c1");
}

#[tokio::test]
async fn refused_send_releases_the_pairing() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(dir.path()));
    let order = OrderId::from("1002");
    let courier = CourierId::from("c2");

    let refusing = Arc::new(InMemoryTableGateway::new());
    let delivery = tracking(store.clone(), refusing);
    let result = delivery
        .send_tracking_link(&order, &courier, "+5511999990000")
        .await;
    assert!(matches!(
        result,
        Err(DeliveryError::Gateway(GatewayError::Backend { status: 404, .. }))
    ));

    let retry = tracking(store, accepting_gateway().await);
    let outcome = retry
        .send_tracking_link(&order, &courier, "+5511999990000")
        .await
        .unwrap();
    assert!(matches!(outcome, TrackingLinkOutcome::Sent { .. }));
}

#[tokio::test]
async fn sent_link_verifies_with_the_same_signer() {
    let dir = tempfile::tempdir().unwrap();
    let delivery = tracking(
        Arc::new(FileKeyValueStore::new(dir.path())),
        accepting_gateway().await,
    );
    let order = OrderId::from("1003");
    let courier = CourierId::from("c3");

    let link = match delivery
        .send_tracking_link(&order, &courier, "+5511999990000")
        .await
        .unwrap()
    {
        TrackingLinkOutcome::Sent { link } => link,
        TrackingLinkOutcome::AlreadySent => panic!("first send must go out"),
    };

    let sig = link.url.rsplit("sig=").next().unwrap();
    let exp = link.expires_at.as_unix_secs();
    delivery
        .verify_tracking_link(&order, &courier, exp, sig)
        .unwrap();
    assert!(delivery
        .verify_tracking_link(&order, &CourierId::from("c4"), exp, sig)
        .is_err());
}

#[tokio::test]
async fn location_subscribers_share_one_channel() {
    let dir = tempfile::tempdir().unwrap();
    let delivery = tracking(
        Arc::new(FileKeyValueStore::new(dir.path())),
        accepting_gateway().await,
    );
    let order = OrderId::from("1004");

    let mut customer = delivery.start_location_tracking(&order).await.unwrap();
    let mut dispatcher = delivery.start_location_tracking(&order).await.unwrap();
    assert!(customer.newly_opened);
    assert!(!dispatcher.newly_opened);

    let location = CourierLocation::new(order.clone(), CourierId::from("c5"), -23.55, -46.63)
        .unwrap()
        .with_speed(18.0);
    delivery.update_courier_location(&location).await.unwrap();

    for events in [&mut customer.events, &mut dispatcher.events] {
        match events.recv().await.unwrap() {
            RealtimeEvent::Broadcast { event, payload } => {
                assert_eq!(event, LOCATION_EVENT);
                assert_eq!(payload["courierId"], "c5");
                assert_eq!(payload["speedKmh"], 18.0);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    assert!(delivery.end_location_tracking(&order).await);
    assert!(delivery.update_courier_location(&location).await.is_err());
}
