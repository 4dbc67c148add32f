use rendezvous_core::{ClientMessage, Participant, ServerMessage};

use crate::integration::{create_test_server, init_tracing};
use crate::utils::{answer_sdp, join_room, offer_sdp};

#[tokio::test]
async fn test_offer_answer_exchange() {
    init_tracing();

    let server = create_test_server();
    let mut alice = server.signaling.connect();
    let mut bob = server.signaling.connect();

    server.router.route(&alice.id, join_room("r1", "alice"));
    assert_eq!(
        alice.recv().await.unwrap(),
        ServerMessage::AllUsers { users: vec![] }
    );

    server.router.route(&bob.id, join_room("r1", "bob"));
    assert_eq!(
        alice.recv().await.unwrap(),
        ServerMessage::UserConnected {
            connection_id: bob.id.clone(),
            username: "bob".into()
        }
    );
    assert_eq!(
        bob.recv().await.unwrap(),
        ServerMessage::AllUsers {
            users: vec![Participant {
                connection_id: alice.id.clone(),
                username: "alice".into()
            }]
        }
    );

    // The newcomer offers to everyone already present
    server.router.route(
        &bob.id,
        ClientMessage::Offer {
            target: alice.id.clone(),
            caller: None,
            sdp: offer_sdp("bob"),
        },
    );
    assert_eq!(
        alice.recv().await.unwrap(),
        ServerMessage::Offer {
            caller: bob.id.clone(),
            target: alice.id.clone(),
            sdp: offer_sdp("bob")
        }
    );

    server.router.route(
        &alice.id,
        ClientMessage::Answer {
            target: bob.id.clone(),
            caller: None,
            sdp: answer_sdp("alice"),
        },
    );
    assert_eq!(
        bob.recv().await.unwrap(),
        ServerMessage::Answer {
            caller: alice.id.clone(),
            target: bob.id.clone(),
            sdp: answer_sdp("alice")
        }
    );

    // Host drops: bob learns of the departure, then the closure
    server.reconciler.on_disconnect(&alice.id);
    assert_eq!(
        bob.recv().await.unwrap(),
        ServerMessage::UserDisconnected {
            connection_id: alice.id.clone()
        }
    );
    assert_eq!(bob.recv().await.unwrap(), ServerMessage::RoomClosed);
    assert!(!server.registry().contains(&"r1".into()));
    assert_eq!(server.registry().room_of(&bob.id), None);
}

#[tokio::test]
async fn test_explicit_caller_is_kept() {
    init_tracing();

    let server = create_test_server();
    let alice = server.signaling.connect();
    let mut bob = server.signaling.connect();
    let relayed_for = server.signaling.connect();

    server.router.route(
        &alice.id,
        ClientMessage::Answer {
            target: bob.id.clone(),
            caller: Some(relayed_for.id.clone()),
            sdp: answer_sdp("relay"),
        },
    );

    let msg = bob.recv().await.unwrap();
    assert!(matches!(
        msg,
        ServerMessage::Answer { caller, .. } if caller == relayed_for.id
    ));
}
