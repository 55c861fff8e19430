//! # Logger Client
//!
//! Client for the structured logging service.
//!
//! Responsibilities:
//! - Dispatch log items, synchronously or fire-and-forget with a completion
//! - Page through stored items by source and time window
//! - Trigger sync/rotation of server-side storage
//! - Read and write per-source log options
//!
//! The transport is injected through [`LoggerTransport`]; the client adds no
//! caching and no retries.

pub mod dispatcher;
pub mod metrics;
pub mod mock_transport;
pub mod options;
pub mod pagination;
pub mod rotation;

mod cursor;
mod pending;

pub use contracts::{
    LogItem, LogOptions, LogPayload, LoggerTransport, LoggingError, Result, StatusCode, TimeWindow,
};
pub use dispatcher::{LoggerClient, LoggerClientBuilder};
pub use metrics::{CallMetrics, MetricsSnapshot};
pub use mock_transport::{InMemoryLogger, MockLoggerConfig};
pub use pagination::{GetResult, LogItemPages, Query};
pub use pending::Completion;
