//! System configuration with sensible defaults (§6 "Actor-system
//! configuration").

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

pub const DEFAULT_MAX_ACTORS: usize = 1_000_000;
pub const DEFAULT_DIRECTORY_CACHE_TTL: Duration = Duration::from_millis(300_000);
pub const DEFAULT_DIRECTORY_MAX_CACHE_SIZE: usize = 10_000;
pub const DEFAULT_DIRECTORY_CLEANUP_INTERVAL: Duration = Duration::from_millis(60_000);
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_millis(30_000);
pub const DEFAULT_ASK_TIMEOUT: Duration = Duration::from_millis(5_000);
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(30_000);
pub const DEFAULT_MAILBOX_CAPACITY: usize = 1000;

/// System-wide configuration for the actor runtime (§6 table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Identifier of this node; stamped into every locally spawned actor's
    /// address. Auto-generated (a fresh UUID) if left unset.
    pub node_address: String,
    /// Nodes to contact on startup; handed to the cluster layer.
    pub seed_nodes: Vec<String>,
    /// Hard cap on live local actors; spawn beyond it fails.
    pub max_actors: usize,
    /// TTL for directory cache entries.
    pub directory_cache_ttl: Duration,
    /// Directory cache capacity.
    pub directory_max_cache_size: usize,
    /// Directory cache sweep interval.
    pub directory_cleanup_interval: Duration,
    /// Default remote-delivery timeout.
    pub message_timeout: Duration,
    /// Fallback for `ask` without an explicit timeout.
    pub default_ask_timeout: Duration,
    /// Deadline for graceful shutdown.
    pub shutdown_timeout: Duration,
    /// Default mailbox capacity for actors that don't specify one.
    pub default_mailbox_capacity: usize,
    /// Enables verbose logging.
    pub debug: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            node_address: format!("node-{}", uuid::Uuid::new_v4()),
            seed_nodes: Vec::new(),
            max_actors: DEFAULT_MAX_ACTORS,
            directory_cache_ttl: DEFAULT_DIRECTORY_CACHE_TTL,
            directory_max_cache_size: DEFAULT_DIRECTORY_MAX_CACHE_SIZE,
            directory_cleanup_interval: DEFAULT_DIRECTORY_CLEANUP_INTERVAL,
            message_timeout: DEFAULT_MESSAGE_TIMEOUT,
            default_ask_timeout: DEFAULT_ASK_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            default_mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            debug: false,
        }
    }
}

impl SystemConfig {
    pub fn builder() -> SystemConfigBuilder {
        SystemConfigBuilder::default()
    }

    /// Validates configuration values, rejecting the zero-capacity/zero-timeout
    /// misconfigurations a caller could otherwise deadlock on.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_mailbox_capacity == 0 {
            return Err("default_mailbox_capacity must be > 0".to_string());
        }
        if self.max_actors == 0 {
            return Err("max_actors must be > 0".to_string());
        }
        if self.shutdown_timeout.is_zero() {
            return Err("shutdown_timeout must be > 0".to_string());
        }
        if self.default_ask_timeout.is_zero() {
            return Err("default_ask_timeout must be > 0".to_string());
        }
        Ok(())
    }
}

/// Fluent builder for [`SystemConfig`].
#[derive(Debug, Default)]
pub struct SystemConfigBuilder {
    config: SystemConfig,
}

impl SystemConfigBuilder {
    pub fn node_address(mut self, node_address: impl Into<String>) -> Self {
        self.config.node_address = node_address.into();
        self
    }

    pub fn seed_nodes(mut self, seed_nodes: Vec<String>) -> Self {
        self.config.seed_nodes = seed_nodes;
        self
    }

    pub fn max_actors(mut self, max_actors: usize) -> Self {
        self.config.max_actors = max_actors;
        self
    }

    pub fn directory_cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.directory_cache_ttl = ttl;
        self
    }

    pub fn directory_max_cache_size(mut self, size: usize) -> Self {
        self.config.directory_max_cache_size = size;
        self
    }

    pub fn directory_cleanup_interval(mut self, interval: Duration) -> Self {
        self.config.directory_cleanup_interval = interval;
        self
    }

    pub fn message_timeout(mut self, timeout: Duration) -> Self {
        self.config.message_timeout = timeout;
        self
    }

    pub fn default_ask_timeout(mut self, timeout: Duration) -> Self {
        self.config.default_ask_timeout = timeout;
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    pub fn default_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.config.default_mailbox_capacity = capacity;
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    pub fn build(self) -> Result<SystemConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for SystemConfigBuilder {
    fn default() -> Self {
        Self {
            config: SystemConfig::default(),
        }
    }
}
