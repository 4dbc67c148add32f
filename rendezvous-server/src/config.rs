use rendezvous_core::{DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2, IceServerConfig};
use std::net::SocketAddr;
use tracing::warn;

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";

/// Server configuration, usually read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Announced to every connection in its `ice-config` frame.
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            ice_servers: vec![IceServerConfig {
                urls: vec![DEFAULT_STUN_ADDR.to_owned(), DEFAULT_STUN_ADDR_2.to_owned()],
                username: None,
                credential: None,
            }],
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Recognized keys:
    ///
    /// - `RENDEZVOUS_BIND` listen address, `PORT` overrides only its port
    /// - `STUN_URLS` comma separated list replacing the default STUN servers
    /// - `TURN_URL`, `TURN_USERNAME`, `TURN_CREDENTIAL` add one TURN server
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("RENDEZVOUS_BIND") {
            match raw.parse::<SocketAddr>() {
                Ok(addr) => config.bind = addr,
                Err(e) => warn!("Ignoring RENDEZVOUS_BIND={:?}: {}", raw, e),
            }
        }

        if let Some(raw) = lookup("PORT") {
            match raw.parse::<u16>() {
                Ok(port) => config.bind.set_port(port),
                Err(e) => warn!("Ignoring PORT={:?}: {}", raw, e),
            }
        }

        if let Some(raw) = lookup("STUN_URLS") {
            let urls: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_owned)
                .collect();
            config.set_stun_urls(urls);
        }

        if let Some(turn_url) = lookup("TURN_URL") {
            config.ice_servers.push(IceServerConfig {
                urls: vec![turn_url],
                username: lookup("TURN_USERNAME"),
                credential: lookup("TURN_CREDENTIAL"),
            });
        }

        config
    }

    /// Replaces the credential-less STUN entries, keeping any TURN servers.
    pub fn set_stun_urls(&mut self, urls: Vec<String>) {
        self.ice_servers
            .retain(|server| server.username.is_some() || server.credential.is_some());
        if !urls.is_empty() {
            self.ice_servers.insert(
                0,
                IceServerConfig {
                    urls,
                    username: None,
                    credential: None,
                },
            );
        }
    }
}
