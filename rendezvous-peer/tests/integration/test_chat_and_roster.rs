use rendezvous_peer::PeerEvent;

use crate::integration::init_tracing;
use crate::utils::{MockTransportFactory, RoomHarness};

#[tokio::test]
async fn test_chat_carries_display_name() {
    init_tracing();

    let harness = RoomHarness::new();
    let mut a = harness.connect(MockTransportFactory::new());
    let mut b = harness.connect(MockTransportFactory::new());
    let mut c = harness.connect(MockTransportFactory::new());

    for (peer, name) in [(&mut a, "alice"), (&mut b, "bob"), (&mut c, "carol")] {
        peer.manager.join("r1", name);
        peer.expect_event(|e| matches!(e, PeerEvent::Roster { .. }))
            .await
            .unwrap();
    }

    assert!(b.manager.send_chat("hi"));

    for peer in [&mut a, &mut c] {
        let event = peer
            .expect_event(|e| matches!(e, PeerEvent::ChatMessage { .. }))
            .await
            .unwrap();
        let PeerEvent::ChatMessage {
            room_id,
            sender,
            message,
            timestamp,
        } = event
        else {
            unreachable!()
        };
        assert_eq!(room_id, "r1".into());
        assert_eq!(sender, "bob");
        assert_eq!(message, "hi");
        assert!(timestamp > 0);
    }
}

#[tokio::test]
async fn test_chat_outside_room_is_refused_locally() {
    init_tracing();

    let harness = RoomHarness::new();
    let lonely = harness.connect(MockTransportFactory::new());

    assert!(!lonely.manager.send_chat("anyone?"));
}

#[tokio::test]
async fn test_malformed_join_surfaces_server_error() {
    init_tracing();

    let harness = RoomHarness::new();
    let mut peer = harness.connect(MockTransportFactory::new());

    peer.manager.join("r1", " ");
    let event = peer
        .expect_event(|e| matches!(e, PeerEvent::ServerError { .. }))
        .await
        .unwrap();
    assert!(matches!(event, PeerEvent::ServerError { reason } if reason.contains("username")));
}
