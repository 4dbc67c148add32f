use rendezvous_core::ServerMessage;
use rendezvous_server::{RegistryError, RouteOutcome};

use crate::integration::{create_test_server, init_tracing};
use crate::utils::join_room;

#[tokio::test]
async fn test_malformed_join_rejected() {
    init_tracing();

    let server = create_test_server();
    let mut alice = server.signaling.connect();

    let outcome = server.router.route(&alice.id, join_room("", "alice"));
    assert_eq!(
        outcome,
        RouteOutcome::Rejected(RegistryError::MalformedJoin { field: "roomId" })
    );

    let msg = alice.recv().await.expect("No error reply");
    assert!(matches!(msg, ServerMessage::Error { .. }));

    let outcome = server.router.route(&alice.id, join_room("lobby", "   "));
    assert!(matches!(outcome, RouteOutcome::Rejected(_)));

    // Nothing was created on the way
    assert_eq!(server.registry().room_count(), 0);
    assert_eq!(server.registry().room_of(&alice.id), None);
}
