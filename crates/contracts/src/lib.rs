//! # Contracts
//!
//! Frozen interface contracts for the structured logging client.
//! Defines the data model, the error taxonomy, the injected transport
//! capability and the client configuration. All other crates depend on this
//! crate; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Item timestamps and query windows use `chrono::DateTime<Utc>`
//! - A time window is half-open: `[start, end)`, each bound optional

mod config;
mod error;
mod item;
mod options;
mod query;
mod transport;

pub use config::*;
pub use error::*;
pub use item::*;
pub use options::*;
pub use query::*;
pub use transport::{LocalLoggerTransport, LoggerTransport};
