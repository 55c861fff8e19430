//! Sync/Rotate coordinator
//!
//! Forces the server to flush buffered items and rotate storage segments.
//! A source with nothing pending is simply absent from the result; that is
//! not an error, and repeating the call is harmless.

use std::collections::HashSet;

use contracts::{LoggerTransport, Result, SyncRequest};
use tracing::{info, instrument, warn};

use crate::dispatcher::LoggerClient;

impl<T> LoggerClient<T>
where
    T: LoggerTransport + Sync + 'static,
{
    /// Sync and rotate the given sources.
    ///
    /// Returns the subset of `event_sources` that were actually rotated, in
    /// server order, without duplicates.
    #[instrument(
        name = "logger_client_sync_and_rotate_logs",
        skip(self, event_sources),
        fields(requested = event_sources.len())
    )]
    pub async fn sync_and_rotate_logs<S: AsRef<str>>(
        &self,
        event_sources: &[S],
    ) -> Result<Vec<String>> {
        let requested: Vec<String> = event_sources
            .iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        let request = SyncRequest {
            event_sources: requested.clone(),
            sync_all: false,
        };
        let response = self
            .call("SyncAndRotateLogs", self.transport.sync_and_rotate_logs(request))
            .await?;

        let allowed: HashSet<&str> = requested.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        let mut synced = Vec::with_capacity(response.event_sources.len());
        for source in response.event_sources {
            if !allowed.contains(source.as_str()) {
                warn!(event_source = %source, "Server reported rotation for a source that was not requested");
                continue;
            }
            if seen.insert(source.clone()) {
                synced.push(source);
            }
        }

        observability::record_rotation(synced.len());
        info!(synced = synced.len(), "Logs synced and rotated");
        Ok(synced)
    }

    /// Sync and rotate every source with pending data.
    #[instrument(name = "logger_client_sync_and_rotate_all_logs", skip(self))]
    pub async fn sync_and_rotate_all_logs(&self) -> Result<Vec<String>> {
        let request = SyncRequest {
            event_sources: Vec::new(),
            sync_all: true,
        };
        let response = self
            .call("SyncAndRotateLogs", self.transport.sync_and_rotate_logs(request))
            .await?;

        let mut seen = HashSet::new();
        let synced: Vec<String> = response
            .event_sources
            .into_iter()
            .filter(|source| seen.insert(source.clone()))
            .collect();

        observability::record_rotation(synced.len());
        info!(synced = synced.len(), "All logs synced and rotated");
        Ok(synced)
    }
}
