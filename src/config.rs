//! Engine configuration: the connection context applied to every peer
//! connection created by the factory.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default public STUN server used when nothing else is configured.
pub const DEFAULT_STUN_SERVER: &str = "stun:stun.l.google.com:19302";

/// Connection context for the shared factory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// STUN server URLs (at least one required).
    pub stun_servers: Vec<String>,

    /// TURN server configurations (optional).
    pub turn_servers: Vec<TurnServerConfig>,
}

/// TURN server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnServerConfig {
    /// TURN server URL (turn:// or turns://)
    pub url: String,

    /// Username for TURN authentication
    pub username: String,

    /// Credential for TURN authentication
    pub credential: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stun_servers: vec![DEFAULT_STUN_SERVER.to_string()],
            turn_servers: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.stun_servers.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one STUN server is required".to_string(),
            ));
        }
        for url in &self.stun_servers {
            if !url.starts_with("stun:") && !url.starts_with("stuns:") {
                return Err(Error::InvalidConfig(format!("not a STUN url: {url}")));
            }
        }
        for turn in &self.turn_servers {
            if !turn.url.starts_with("turn:") && !turn.url.starts_with("turns:") {
                return Err(Error::InvalidConfig(format!("not a TURN url: {}", turn.url)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_empty_stun_servers() {
        let config = EngineConfig {
            stun_servers: Vec::new(),
            turn_servers: Vec::new(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_stun_scheme() {
        let config = EngineConfig {
            stun_servers: vec!["https://example.org".to_string()],
            turn_servers: Vec::new(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_turn_scheme() {
        let config = EngineConfig {
            stun_servers: vec![DEFAULT_STUN_SERVER.to_string()],
            turn_servers: vec![TurnServerConfig {
                url: "udp://relay.example.org".to_string(),
                username: "user".to_string(),
                credential: "secret".to_string(),
            }],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_json() {
        let raw = r#"{
            "stun_servers": ["stun:stun.example.org:3478"],
            "turn_servers": [
                {"url": "turn:turn.example.org:3478", "username": "u", "credential": "c"}
            ]
        }"#;
        let config: EngineConfig = serde_json::from_str(raw).unwrap();
        config.validate().unwrap();
        assert_eq!(config.turn_servers.len(), 1);
    }
}
