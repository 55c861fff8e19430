//! # Integration Tests
//!
//! End-to-end tests of the logging client over the in-memory service.
//!
//! Covers:
//! - Contract snapshot tests
//! - Log / query / sync / options scenarios
//! - Concurrent async dispatch against the transport contract

#[cfg(test)]
mod contract_tests {
    use contracts::{LoggingError, StatusCode, DEFAULT_PAGE_SIZE};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_default_page_size_is_max_int() {
        assert_eq!(DEFAULT_PAGE_SIZE, i32::MAX as u32);
    }

    #[test]
    fn test_status_labels_are_stable() {
        assert_eq!(
            LoggingError::not_found("x").code().as_str(),
            StatusCode::NotFound.as_str()
        );
        assert_eq!(StatusCode::ResourceExhausted.to_string(), "resource_exhausted");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{DateTime, TimeZone, Utc};
    use config_loader::{ConfigFormat, ConfigLoader};
    use logger_client::{
        InMemoryLogger, LogItem, LogOptions, LoggerClient, LoggingError, MockLoggerConfig, Query,
        StatusCode, TimeWindow,
    };
    use tokio::sync::mpsc;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    /// Log one item, then read it back from the most-recent cache
    #[tokio::test]
    async fn test_e2e_log_then_most_recent() {
        let client = LoggerClient::new(InMemoryLogger::new()).unwrap();
        let item = LogItem::json("arm1", serde_json::json!({ "joint": [0.1, 0.2, 0.3] }))
            .with_acquisition_time(ts(0));

        client.log(item.clone()).await.unwrap();

        assert_eq!(client.get_most_recent_item("arm1").await.unwrap(), item);
        assert_eq!(client.list_log_sources().await.unwrap(), vec!["arm1".to_string()]);
    }

    /// Five items, page size 2: pages of 2, 2, 1, then an empty token
    #[tokio::test]
    async fn test_e2e_paging_walkthrough() {
        let client = LoggerClient::new(InMemoryLogger::new()).unwrap();
        for n in 0..5 {
            client
                .log(LogItem::json("arm1", serde_json::json!(n)).with_acquisition_time(ts(n)))
                .await
                .unwrap();
        }

        let mut query = Query::new("arm1").page_size(2);
        let mut sizes = Vec::new();
        let mut seen = Vec::new();
        loop {
            let page = client.get_log_items(&query).await.unwrap();
            sizes.push(page.log_items.len());
            seen.extend(page.log_items.iter().map(|i| i.acquisition_time));
            if !page.has_next_page() {
                break;
            }
            query = query.page_token(page.next_page_token);
        }

        assert_eq!(sizes, vec![2, 2, 1]);
        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(unique.len(), 5);
        assert_eq!(seen, (0..5).map(ts).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_e2e_window_query_across_sources() {
        let client = LoggerClient::new(InMemoryLogger::new()).unwrap();
        for n in 0..6 {
            let source = if n % 2 == 0 { "arm1" } else { "gripper" };
            client
                .log(LogItem::json(source, serde_json::json!(n)).with_acquisition_time(ts(n)))
                .await
                .unwrap();
        }

        let items = client
            .pages(
                Query::sources(["arm1", "gripper"])
                    .window(TimeWindow::between(ts(1), ts(5)))
                    .page_size(3),
            )
            .collect_all()
            .await
            .unwrap();
        let times: Vec<_> = items.iter().map(|i| i.acquisition_time).collect();
        assert_eq!(times, vec![ts(1), ts(2), ts(3), ts(4)]);
    }

    /// Many concurrent async calls: every completion fires once and the
    /// client is idle afterwards
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_e2e_concurrent_log_async() {
        const CALLS: usize = 64;

        let transport = InMemoryLogger::with_config(MockLoggerConfig {
            latency: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let client = LoggerClient::new(transport).unwrap();
        let completed = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel();

        for n in 0..CALLS {
            let completed = Arc::clone(&completed);
            let observer = client.clone();
            let tx = tx.clone();
            client.log_async_with(
                LogItem::json(format!("arm{}", n % 4), serde_json::json!(n)),
                move |result| {
                    completed.fetch_add(1, Ordering::SeqCst);
                    // The firing call still holds its slot
                    let _ = tx.send((result.is_ok(), observer.in_flight()));
                },
            );
        }
        drop(tx);

        let mut reports = Vec::new();
        while let Some(report) = rx.recv().await {
            reports.push(report);
        }
        client.drain().await;

        assert_eq!(completed.load(Ordering::SeqCst), CALLS);
        assert_eq!(reports.len(), CALLS);
        assert!(reports.iter().all(|(ok, in_flight)| *ok && *in_flight >= 1));
        assert_eq!(client.in_flight(), 0);
        assert_eq!(client.transport().item_count(), CALLS);
        // Calls overlapped on the transport; it was never serialized
        assert!(client.transport().peak_concurrency() > 1);

        let snapshot = client.metrics();
        assert_eq!(snapshot.async_started, CALLS as u64);
        assert_eq!(snapshot.async_succeeded, CALLS as u64);
    }

    #[tokio::test]
    async fn test_e2e_options_round_trip() {
        let client = LoggerClient::new(InMemoryLogger::new()).unwrap();
        let options = LogOptions {
            sync_active: Some(false),
            retain_on_disk: Some(true),
            retain_on_disk_based_on_priority: Some(true),
            priority: Some(7),
            ..Default::default()
        };

        client.set_log_options("camera", options.clone()).await.unwrap();
        assert_eq!(client.get_log_options("camera").await.unwrap(), options);
    }

    #[tokio::test]
    async fn test_e2e_not_found_without_prior_logs() {
        let client = LoggerClient::new(InMemoryLogger::new()).unwrap();
        let err = client.get_most_recent_item("arm1").await.unwrap_err();
        assert_eq!(err.code(), StatusCode::NotFound);

        let page = client.get_log_items_for("arm1").await.unwrap();
        assert!(page.log_items.is_empty());
        assert!(!page.has_next_page());
    }

    #[tokio::test]
    async fn test_e2e_sync_all_subset_of_known_sources() {
        let client = LoggerClient::new(InMemoryLogger::new()).unwrap();
        for source in ["arm1", "gripper", "camera"] {
            client
                .log(LogItem::json(source, serde_json::json!({})))
                .await
                .unwrap();
        }
        let known: HashSet<String> = client.list_log_sources().await.unwrap().into_iter().collect();

        let synced = client.sync_and_rotate_all_logs().await.unwrap();
        assert!(!synced.is_empty());
        assert!(synced.iter().all(|s| known.contains(s)));

        // Nothing pending any more
        assert!(client.sync_and_rotate_all_logs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_e2e_client_from_loaded_config() {
        let content = r#"
[transport]
address = "logger.local:17080"
deadline_ms = 5000

[dispatcher]
max_in_flight = 1

[pagination]
default_page_size = 2
"#;
        let config = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
        assert_eq!(config.transport.address, "logger.local:17080");

        let transport = InMemoryLogger::with_config(MockLoggerConfig {
            latency: Some(Duration::from_millis(50)),
            ..Default::default()
        });
        let client = LoggerClient::builder(transport)
            .config(&config)
            .build()
            .unwrap();

        for n in 0..3 {
            client
                .log(LogItem::json("arm1", serde_json::json!(n)).with_acquisition_time(ts(n)))
                .await
                .unwrap();
        }
        let page = client.get_log_items_for("arm1").await.unwrap();
        assert_eq!(page.log_items.len(), 2);
        assert!(page.has_next_page());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let tx1 = tx.clone();
        client.log_async_with(LogItem::json("arm1", serde_json::json!(3)), move |r| {
            let _ = tx1.send(r);
        });
        client.log_async_with(LogItem::json("arm1", serde_json::json!(4)), move |r| {
            let _ = tx.send(r);
        });

        let rejected = rx.recv().await.unwrap();
        assert!(matches!(rejected, Err(LoggingError::ResourceExhausted { .. })));
        assert!(rx.recv().await.unwrap().is_ok());
        client.drain().await;
    }

    #[test]
    fn test_e2e_invalid_config_rejected() {
        let content = r#"
[dispatcher]
max_in_flight = 0
"#;
        let err = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, LoggingError::ConfigValidation { .. }));
    }

    #[tokio::test]
    async fn test_e2e_observability_records_calls() {
        // A subscriber may already be installed by another test
        let _ = observability::init();
        let client = LoggerClient::new(InMemoryLogger::new()).unwrap();
        client
            .log(LogItem::json("arm1", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(client.metrics().sync_calls, 1);
    }
}
