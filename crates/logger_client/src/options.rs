//! Options accessor
//!
//! Reads and writes per-source LogOptions. Independent of the item path;
//! nothing is cached and a later set always overwrites an earlier one.

use contracts::{LogOptions, LoggerTransport, Result, SetLogOptionsRequest};
use tracing::instrument;

use crate::dispatcher::LoggerClient;

impl<T> LoggerClient<T>
where
    T: LoggerTransport + Sync + 'static,
{
    #[instrument(name = "logger_client_set_log_options", skip(self, options))]
    pub async fn set_log_options(&self, event_source: &str, options: LogOptions) -> Result<()> {
        let request = SetLogOptionsRequest {
            event_source: event_source.to_string(),
            log_options: options,
        };
        self.call("SetLogOptions", self.transport.set_log_options(request))
            .await
    }

    /// # Errors
    /// `NotFound` if options were never set for `event_source`
    #[instrument(name = "logger_client_get_log_options", skip(self))]
    pub async fn get_log_options(&self, event_source: &str) -> Result<LogOptions> {
        self.call("GetLogOptions", self.transport.get_log_options(event_source))
            .await
    }
}
