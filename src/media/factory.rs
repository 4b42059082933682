//! The engine-factory handle produced by the production driver.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;
use webrtc::api::API;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::RTCPeerConnection;

use super::event_log::{EventLog, RtcEvent};
use crate::config::EngineConfig;
use crate::driver::SecurityOptions;
use crate::error::{Error, Result};

/// Factory for peer connections, owning the negotiated engine configuration.
///
/// Built once per engine instance and read-only afterwards; every created
/// connection inherits the stored connection context and security profile.
pub struct WebRtcFactory {
    api: API,
    config: EngineConfig,
    security: SecurityOptions,
    event_log: EventLog,
}

impl WebRtcFactory {
    pub(crate) fn new(
        api: API,
        config: EngineConfig,
        security: SecurityOptions,
        event_log: EventLog,
    ) -> Self {
        event_log.emit(RtcEvent::FactoryCreated);
        Self {
            api,
            config,
            security,
            event_log,
        }
    }

    /// Create a peer connection from the stored connection context.
    pub async fn create_peer_connection(&self) -> Result<Arc<RTCPeerConnection>> {
        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers(&self.config),
            ..Default::default()
        };
        let connection = self
            .api
            .new_peer_connection(rtc_config)
            .await
            .map_err(|e| Error::PeerConnection(format!("failed to create peer connection: {e}")))?;

        let connection_id = Uuid::new_v4().to_string();
        debug!(connection_id = %connection_id, "peer connection created");
        self.event_log.emit(RtcEvent::PeerConnectionCreated { connection_id });

        Ok(Arc::new(connection))
    }

    /// The fixed security profile this factory was built with.
    pub fn security_options(&self) -> &SecurityOptions {
        &self.security
    }

    /// The connection context applied to every created connection.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Map the connection context onto ICE server entries.
fn ice_servers(config: &EngineConfig) -> Vec<RTCIceServer> {
    config
        .stun_servers
        .iter()
        .map(|url| RTCIceServer {
            urls: vec![url.clone()],
            ..Default::default()
        })
        .chain(config.turn_servers.iter().map(|turn| {
            #[allow(clippy::needless_update)]
            RTCIceServer {
                urls: vec![turn.url.clone()],
                username: turn.username.clone(),
                credential: turn.credential.clone(),
                ..Default::default()
            }
        }))
        .collect()
}
