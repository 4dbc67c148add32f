use anyhow::Result;
use rendezvous_peer::{PeerClient, PeerEvent, TransportConfig};
use rendezvous_server::{AppState, ServerConfig, build_router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::integration::init_tracing;
use crate::utils::{EVENT_TIMEOUT_MS, MockTransportFactory};

async fn spawn_server() -> Result<String> {
    let state = Arc::new(AppState::new(ServerConfig::default()));
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = build_router(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("ws://{}/ws", addr))
}

async fn next_matching(
    client: &mut PeerClient,
    mut pred: impl FnMut(&PeerEvent) -> bool,
) -> Option<PeerEvent> {
    let wait = async {
        while let Some(event) = client.events.recv().await {
            if pred(&event) {
                return Some(event);
            }
        }
        None
    };
    tokio::time::timeout(Duration::from_millis(EVENT_TIMEOUT_MS), wait)
        .await
        .ok()
        .flatten()
}

#[tokio::test]
async fn test_peer_clients_connect_over_websocket() -> Result<()> {
    init_tracing();

    let url = spawn_server().await?;
    let mut alice = PeerClient::connect(
        &url,
        MockTransportFactory::new(),
        TransportConfig::without_media(),
    )
    .await?;
    let mut bob = PeerClient::connect(
        &url,
        MockTransportFactory::new(),
        TransportConfig::without_media(),
    )
    .await?;

    alice.manager.join("ws", "alice");
    assert!(
        next_matching(&mut alice, |e| matches!(e, PeerEvent::Roster { .. }))
            .await
            .is_some()
    );
    bob.manager.join("ws", "bob");

    assert!(
        next_matching(&mut alice, |e| matches!(e, PeerEvent::PeerConnected { .. }))
            .await
            .is_some()
    );
    assert!(
        next_matching(&mut bob, |e| matches!(e, PeerEvent::PeerConnected { .. }))
            .await
            .is_some()
    );
    assert!(alice.manager.local_id().is_some());

    // Host's socket goes away: bob's session and room are torn down
    alice.disconnect();
    assert!(
        next_matching(&mut bob, |e| matches!(e, PeerEvent::RoomClosed))
            .await
            .is_some()
    );
    assert_eq!(bob.manager.session_count(), 0);

    Ok(())
}
