use rendezvous_peer::{NegotiationError, PeerEvent};

use crate::integration::init_tracing;
use crate::utils::{MockTransportFactory, RoomHarness};

#[tokio::test]
async fn test_failed_offer_abandons_only_that_session() {
    init_tracing();

    let harness = RoomHarness::new();
    let failing = MockTransportFactory::failing_offers();
    let mut host = harness.connect(failing.clone());
    let mut guest = harness.connect(MockTransportFactory::new());

    host.manager.join("r1", "host");
    guest.manager.join("r1", "guest");

    let guest_id = guest.id.clone();
    let failed = host
        .expect_event(|e| matches!(e, PeerEvent::NegotiationFailed { peer, .. } if *peer == guest_id))
        .await
        .unwrap();
    let PeerEvent::NegotiationFailed { error, .. } = failed else {
        unreachable!()
    };
    assert!(matches!(error, NegotiationError::Description { .. }));

    // Session is gone without retry; the transport was closed
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(host.manager.session_state(&guest.id), None);
    assert_eq!(failing.created(), 1);
    assert_eq!(failing.log_for(&guest.id), vec!["create-offer", "close"]);

    // Membership and chat still work for both
    host.manager.send_chat("still here");
    guest
        .expect_event(|e| matches!(e, PeerEvent::ChatMessage { message, .. } if message == "still here"))
        .await
        .unwrap();
}
