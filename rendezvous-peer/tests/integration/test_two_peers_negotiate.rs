use rendezvous_peer::{NegotiationState, PeerEvent};

use crate::integration::init_tracing;
use crate::utils::{MockTransportFactory, RoomHarness};

#[tokio::test]
async fn test_two_peers_negotiate_through_router() {
    init_tracing();

    let harness = RoomHarness::new();
    let transports_a = MockTransportFactory::new();
    let transports_b = MockTransportFactory::new();
    let mut alice = harness.connect(transports_a.clone());
    let mut bob = harness.connect(transports_b.clone());

    alice.manager.join("r1", "alice");
    alice
        .expect_event(|e| matches!(e, PeerEvent::Roster { users } if users.is_empty()))
        .await
        .unwrap();

    bob.manager.join("r1", "bob");
    let roster = bob
        .expect_event(|e| matches!(e, PeerEvent::Roster { .. }))
        .await
        .unwrap();
    let PeerEvent::Roster { users } = roster else {
        unreachable!()
    };
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].connection_id, alice.id);

    // The existing member offers, the newcomer answers
    let bob_id = bob.id.clone();
    alice
        .expect_event(|e| matches!(e, PeerEvent::PeerConnected { peer } if *peer == bob_id))
        .await
        .unwrap();
    let alice_id = alice.id.clone();
    bob.expect_event(|e| matches!(e, PeerEvent::PeerConnected { peer } if *peer == alice_id))
        .await
        .unwrap();

    assert_eq!(
        alice
            .manager
            .wait_for_state(&bob.id, NegotiationState::Established)
            .await,
        Some(NegotiationState::Established)
    );
    assert_eq!(
        bob.manager
            .wait_for_state(&alice.id, NegotiationState::Established)
            .await,
        Some(NegotiationState::Established)
    );

    let a_log = transports_a.log_for(&bob.id);
    assert_eq!(&a_log[..2], ["create-offer", "remote:Answer"]);
    let b_log = transports_b.log_for(&alice.id);
    assert_eq!(&b_log[..2], ["remote:Offer", "create-answer"]);

    // Each side trickled one candidate; the other applied it
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(
        transports_b
            .log_for(&alice.id)
            .iter()
            .any(|entry| entry.starts_with("apply:candidate:mock Offer"))
    );
    assert!(
        transports_a
            .log_for(&bob.id)
            .iter()
            .any(|entry| entry.starts_with("apply:candidate:mock Answer"))
    );
}
