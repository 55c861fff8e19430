//! Pagination protocol
//!
//! `get_log_items` fetches one page; `LogItemPages` follows page tokens until
//! the server reports the last page. Items are never re-sorted client-side:
//! the server's order is stable within one paging session, so concatenating
//! all pages yields the full, duplicate-free result for the query.

use std::collections::HashSet;

use contracts::{
    GetLogItemsRequest, LogItem, LoggerTransport, LoggingError, Result, TimeWindow,
};
use tracing::{debug, instrument};

use crate::cursor;
use crate::dispatcher::LoggerClient;

/// Parameters of a GetLogItems call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub event_sources: Vec<String>,
    /// `[start, end)`, unbounded by default
    pub window: TimeWindow,
    /// `None` uses the client default (i32::MAX unless configured)
    pub page_size: Option<u32>,
    /// Empty for the first page; otherwise a token returned for this same
    /// query
    pub page_token: String,
}

impl Query {
    pub fn new(event_source: impl Into<String>) -> Self {
        Self {
            event_sources: vec![event_source.into()],
            ..Default::default()
        }
    }

    pub fn sources<I, S>(event_sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            event_sources: event_sources.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn page_token(mut self, page_token: impl Into<String>) -> Self {
        self.page_token = page_token.into();
        self
    }
}

/// One page of items
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetResult {
    pub log_items: Vec<LogItem>,
    /// Empty when there are no further pages
    pub next_page_token: String,
}

impl GetResult {
    pub fn has_next_page(&self) -> bool {
        !self.next_page_token.is_empty()
    }
}

impl<T> LoggerClient<T>
where
    T: LoggerTransport + Sync + 'static,
{
    /// Fetch one page of items for `query`.
    ///
    /// # Errors
    /// - `InvalidArgument` if `page_token` is malformed or belongs to another
    ///   (sources, window) query; no RPC is issued in that case
    /// - transport/server errors verbatim
    #[instrument(
        name = "logger_client_get_log_items",
        skip(self, query),
        fields(
            event_sources = ?query.event_sources,
            page_size = ?query.page_size,
            first_page = query.page_token.is_empty()
        )
    )]
    pub async fn get_log_items(&self, query: &Query) -> Result<GetResult> {
        let cursor = cursor::decode(&query.page_token, &query.event_sources, &query.window)?;

        let request = GetLogItemsRequest {
            event_sources: query.event_sources.clone(),
            window: query.window,
            max_num_items: query
                .page_size
                .unwrap_or_else(|| self.pagination.effective_page_size()),
            cursor,
        };
        let response = self
            .call("GetLogItems", self.transport.get_log_items(request))
            .await?;

        observability::record_page_fetched(response.log_items.len());
        debug!(
            items = response.log_items.len(),
            last_page = response.cursor.is_empty(),
            "Page fetched"
        );

        Ok(GetResult {
            next_page_token: cursor::encode(
                &response.cursor,
                &query.event_sources,
                &query.window,
            ),
            log_items: response.log_items,
        })
    }

    /// All items of one source, default page size, unbounded window
    pub async fn get_log_items_for(&self, event_source: &str) -> Result<GetResult> {
        self.get_log_items(&Query::new(event_source)).await
    }

    /// Iterate the pages of `query`, starting at its `page_token`
    pub fn pages(&self, query: Query) -> LogItemPages<'_, T> {
        let mut seen_tokens = HashSet::new();
        if !query.page_token.is_empty() {
            seen_tokens.insert(query.page_token.clone());
        }
        LogItemPages {
            client: self,
            query,
            seen_tokens,
            finished: false,
        }
    }
}

/// Resumable page iterator
///
/// A server cursor that repeats any earlier token of the session ends the
/// iteration with `Internal`.
pub struct LogItemPages<'a, T> {
    client: &'a LoggerClient<T>,
    query: Query,
    seen_tokens: HashSet<String>,
    finished: bool,
}

impl<T> LogItemPages<'_, T>
where
    T: LoggerTransport + Sync + 'static,
{
    /// Next page, or `None` after the last one.
    ///
    /// After an error the iterator can be retried; it resumes from the last
    /// successfully returned page.
    pub async fn next_page(&mut self) -> Result<Option<Vec<LogItem>>> {
        if self.finished {
            return Ok(None);
        }

        let result = self.client.get_log_items(&self.query).await?;
        if !result.has_next_page() {
            self.finished = true;
        } else if !self.seen_tokens.insert(result.next_page_token.clone()) {
            self.finished = true;
            return Err(LoggingError::internal(
                "server returned a page cursor already seen in this session",
            ));
        }
        self.query.page_token = result.next_page_token;
        Ok(Some(result.log_items))
    }

    /// Token to resume from with a fresh iterator; empty once finished
    pub fn page_token(&self) -> &str {
        &self.query.page_token
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Follow every remaining page and concatenate
    pub async fn collect_all(mut self) -> Result<Vec<LogItem>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }
}
