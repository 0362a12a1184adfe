//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the RPC server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, connection limits).
    pub listener: ListenerConfig,

    /// Wire protocol limits.
    pub protocol: ProtocolConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:50000").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:50000".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Wire protocol limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Upper bound on a frame's declared body length, in bytes. A header
    /// claiming more closes the connection instead of buffering unbounded.
    pub max_body_length: u32,

    /// Size of the per-read socket buffer, in bytes.
    pub read_buffer_bytes: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_body_length: 64 * 1024 * 1024,
            read_buffer_bytes: 4096,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_from_empty_toml() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:50000");
        assert_eq!(config.listener.max_connections, 10_000);
        assert_eq!(config.protocol.max_body_length, 64 * 1024 * 1024);
    }

    #[test]
    fn partial_override() {
        let config: ServerConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [protocol]
            max_body_length = 1024
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.listener.max_connections, 10_000);
        assert_eq!(config.protocol.max_body_length, 1024);
        assert_eq!(config.protocol.read_buffer_bytes, 4096);
    }
}
