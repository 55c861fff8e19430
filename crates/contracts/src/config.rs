//! ClientConfig - Config Loader output
//!
//! Transport settings are consumed by whoever constructs the transport; the
//! client itself reads the dispatcher and pagination sections.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::DEFAULT_PAGE_SIZE;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ClientConfig {
    #[serde(default)]
    pub version: ConfigVersion,

    #[validate(nested)]
    #[serde(default)]
    pub transport: TransportConfig,

    #[validate(nested)]
    #[serde(default)]
    pub dispatcher: DispatcherConfig,

    #[validate(nested)]
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Connection settings applied once, at transport construction
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransportConfig {
    /// Service address (e.g. "localhost:17080")
    #[validate(length(min = 1, message = "address cannot be empty"))]
    #[serde(default = "default_address")]
    pub address: String,

    /// Connection/call deadline in milliseconds
    #[serde(default)]
    pub deadline_ms: Option<u64>,

    /// Maximum message size in bytes; `None` = unlimited
    #[serde(default)]
    pub max_message_bytes: Option<usize>,

    /// Per-instance routing metadata attached to every call
    #[validate(nested)]
    #[serde(default)]
    pub routing_header: Option<RoutingHeader>,
}

fn default_address() -> String {
    "localhost:17080".to_string()
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            deadline_ms: None,
            max_message_bytes: None,
            routing_header: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RoutingHeader {
    #[validate(length(min = 1, message = "routing header key cannot be empty"))]
    pub key: String,
    pub value: String,
}

/// Async dispatch settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DispatcherConfig {
    /// Admission limit on outstanding async calls; `None` = unbounded
    #[validate(range(min = 1, message = "max_in_flight must be >= 1"))]
    #[serde(default)]
    pub max_in_flight: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PaginationConfig {
    /// Page size used when a query sets none
    #[validate(range(min = 1, message = "default_page_size must be >= 1"))]
    #[serde(default)]
    pub default_page_size: Option<u32>,
}

impl PaginationConfig {
    pub fn effective_page_size(&self) -> u32 {
        self.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}
