use rendezvous_core::{ClientMessage, ConnectionId, DisconnectListener, ServerMessage};
use rendezvous_server::RouteOutcome;
use std::sync::{Arc, Mutex};

use crate::integration::{create_test_server, init_tracing};
use crate::utils::{join_room, offer_sdp};

#[derive(Default)]
struct RecordingListener {
    seen: Mutex<Vec<ConnectionId>>,
}

impl DisconnectListener for RecordingListener {
    fn on_disconnect(&self, connection_id: &ConnectionId) {
        self.seen.lock().unwrap().push(connection_id.clone());
    }
}

#[tokio::test]
async fn test_peer_disconnect_leaves_room() {
    init_tracing();

    let listener = Arc::new(RecordingListener::default());
    let mut server = create_test_server();
    server.reconciler = server.reconciler.clone().with_listener(listener.clone());

    let mut host = server.signaling.connect();
    let mut guest = server.signaling.connect();

    server.router.route(&host.id, join_room("lobby", "alice"));
    server.router.route(&guest.id, join_room("lobby", "bob"));
    host.drain();
    guest.drain();

    let reconciled = server.reconciler.on_disconnect(&guest.id);
    assert!(reconciled.was_live);
    let left = reconciled.left.expect("guest was in a room");
    assert_eq!(left.room_id, "lobby".into());
    assert!(!left.room_deleted);

    let msg = host.recv().await.expect("No departure notice");
    assert_eq!(
        msg,
        ServerMessage::UserDisconnected {
            connection_id: guest.id.clone()
        }
    );
    assert_eq!(*listener.seen.lock().unwrap(), vec![guest.id.clone()]);

    // Nothing left to clean up the second time
    let again = server.reconciler.on_disconnect(&guest.id);
    assert!(!again.was_live);
    assert_eq!(again.left, None);
    host.assert_silent().await;

    // Frames racing in after the socket closed are ignored
    let late = server.router.route(
        &guest.id,
        ClientMessage::Offer {
            target: host.id.clone(),
            caller: None,
            sdp: offer_sdp("late"),
        },
    );
    assert_eq!(late, RouteOutcome::Dropped);
    host.assert_silent().await;
    assert_eq!(server.signaling.live_count(), 1);
}
