/// Configuration management for the Stateflow engine
///
/// Handles server configuration and runtime parameters.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Engine configuration
    pub engine: EngineConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Execution engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Step-notification channel capacity; bounds how far a slow WebSocket
    /// subscriber may fall behind before it starts dropping entries
    pub notify_capacity: usize,
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for k8s/container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("STATEFLOW_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("STATEFLOW_PORT")
                    .unwrap_or_else(|_| "3010".to_string())
                    .parse()
                    .unwrap_or(3010),
            },
            engine: EngineConfig {
                notify_capacity: std::env::var("STATEFLOW_NOTIFY_CAPACITY")
                    .unwrap_or_else(|_| "256".to_string())
                    .parse()
                    .unwrap_or(256),
            },
        }
    }
}
