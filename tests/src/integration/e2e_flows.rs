//! # End-to-End Search Flows
//!
//! Drives the bridge against a fake search worker over the in-memory bus:
//!
//! ```text
//! bridge ──lyrics:requests──→ FakeSearchWorker ──lyrics:results──→ ReplyListener
//!   ▲                                                                   │
//!   └──────────────────────── on_reply() ───────────────────────────────┘
//! ```

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use lyrics_bridge::{BridgeConfig, LyricsSearchApi, LyricsSearchResult};
    use lyrics_bus::MessagePublisher;
    use tokio::task::JoinSet;
    use tokio::time::{timeout, Instant};

    use crate::support::{request, CatalogEntry, FakeSearchWorker, Harness};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn song_x() -> CatalogEntry {
        CatalogEntry {
            title: "Song X".to_string(),
            artist: "Artist Y".to_string(),
            lyrics: Some("la la".to_string()),
            url: Some("http://x".to_string()),
            album: Some("Album Z".to_string()),
            release_date: Some("2024-01-01".to_string()),
        }
    }

    fn song_x_result() -> LyricsSearchResult {
        LyricsSearchResult {
            title: "Song X".to_string(),
            artist: "Artist Y".to_string(),
            lyrics: Some("la la".to_string()),
            url: Some("http://x".to_string()),
            album: Some("Album Z".to_string()),
            release_date: Some("2024-01-01".to_string()),
        }
    }

    // =============================================================================
    // HAPPY PATH
    // =============================================================================

    #[tokio::test]
    async fn test_publish_and_await_returns_worker_result() {
        let harness = Harness::start();
        let worker = harness.worker(FakeSearchWorker::new().with_song(song_x()));
        let req = request("Song X", "Artist Y");

        let (result, published) = tokio::join!(
            harness
                .bridge
                .await_result(&req, Some(Duration::from_secs(10))),
            async {
                tokio::task::yield_now().await;
                harness.bridge.publish(&req).await
            }
        );

        published.unwrap();
        assert_eq!(result, Some(song_x_result()));
        assert_eq!(harness.bridge.pending_count(), 0);
        assert_eq!(worker.replies(), 1);
    }

    #[tokio::test]
    async fn test_search_through_api_trait() {
        let harness = Harness::start();
        let _worker = harness.worker(FakeSearchWorker::new().with_song(song_x()));
        let api: &dyn LyricsSearchApi = &*harness.bridge;

        let result = timeout(Duration::from_secs(2), api.search(&request("Song X", "Artist Y")))
            .await
            .expect("search hung")
            .unwrap();

        assert_eq!(result, Some(song_x_result()));
    }

    #[tokio::test]
    async fn test_canonicalized_reply_matches_through_echo() {
        let harness = Harness::start();
        let _worker = harness.worker(FakeSearchWorker::new().with_song(song_x()));

        // Worker answers with "Song X"/"Artist Y" but echoes what we asked
        let result = harness
            .bridge
            .search(&request("song x", "ARTIST Y"))
            .await
            .unwrap()
            .expect("echo should correlate the canonical reply");

        assert_eq!(result.title, "Song X");
        assert_eq!(result.artist, "Artist Y");
        assert_eq!(harness.bridge.stats().orphaned(), 0);
    }

    // =============================================================================
    // TIMEOUTS
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_unknown_song_times_out_and_cleans_up() {
        let harness = Harness::start();
        let worker = harness.worker(FakeSearchWorker::new().with_song(song_x()));
        let req = request("Unknown", "Nobody");

        harness.bridge.publish(&req).await.unwrap();
        let started = Instant::now();
        let result = harness
            .bridge
            .await_result(&req, Some(Duration::from_secs(1)))
            .await;

        assert!(result.is_none());
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!harness.bridge.is_pending(&req));
        assert_eq!(harness.bridge.pending_count(), 0);
        assert_eq!(harness.bridge.stats().timeouts(), 1);
        assert_eq!(worker.replies(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_canonicalized_reply_without_echo_times_out() {
        let mut config = BridgeConfig::default();
        config.timeouts.default_secs = 1;
        let harness = Harness::with_config(config);
        let _worker = harness.worker(FakeSearchWorker::new().with_song(song_x()).without_echo());

        let result = harness
            .bridge
            .search(&request("song x", "artist y"))
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(harness.bridge.pending_count(), 0);
        // The reply arrived for "Song X:Artist Y", which nobody asked for
        assert_eq!(harness.bridge.stats().orphaned(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_reply_is_orphaned() {
        let harness = Harness::start();
        let worker = harness.worker(
            FakeSearchWorker::new()
                .with_song(song_x())
                .with_delay(Duration::from_secs(3)),
        );
        let req = request("Song X", "Artist Y");

        harness.bridge.publish(&req).await.unwrap();
        let result = harness
            .bridge
            .await_result(&req, Some(Duration::from_secs(1)))
            .await;
        assert!(result.is_none());

        // Let the worker answer after we gave up
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(worker.replies(), 1);
        tokio::task::yield_now().await;

        assert_eq!(harness.bridge.stats().orphaned(), 1);
        assert_eq!(harness.bridge.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_timeout_from_config() {
        let mut config = BridgeConfig::default();
        config.timeouts.default_secs = 4;
        let harness = Harness::with_config(config);

        let started = Instant::now();
        let result = harness.bridge.search(&request("Unknown", "Nobody")).await.unwrap();

        assert!(result.is_none());
        assert!(started.elapsed() >= Duration::from_secs(4));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test]
    async fn test_concurrent_distinct_searches_resolve_independently() {
        let harness = Harness::start();
        let mut worker = FakeSearchWorker::new();
        for i in 0..16 {
            worker = worker.with_song(CatalogEntry::new(
                &format!("Song {i}"),
                "Band",
                &format!("verse {i}"),
            ));
        }
        let _worker = harness.worker(worker);

        let mut searches = JoinSet::new();
        for i in 0..16 {
            let bridge = harness.bridge.clone();
            searches.spawn(async move {
                let result = bridge.search(&request(&format!("Song {i}"), "Band")).await;
                (i, result)
            });
        }

        let mut completed = 0;
        while let Some(joined) = searches.join_next().await {
            let (i, result) = joined.unwrap();
            let result = result.unwrap().expect("every song is in the catalog");
            assert_eq!(result.title, format!("Song {i}"));
            assert_eq!(result.lyrics, Some(format!("verse {i}")));
            completed += 1;
        }

        assert_eq!(completed, 16);
        assert_eq!(harness.bridge.pending_count(), 0);
        assert_eq!(harness.bridge.stats().resolved(), 16);
    }

    #[tokio::test]
    async fn test_same_key_waiters_share_one_reply() {
        let harness = Harness::start();
        let req = request("Song X", "Artist Y");

        let first = harness.bridge.register(&req);
        let second = harness.bridge.register(&req);
        assert_eq!(harness.bridge.pending_count(), 1);
        assert_eq!(harness.bridge.pending().waiter_count(), 2);

        let _worker = harness.worker(FakeSearchWorker::new().with_song(song_x()));
        harness.bridge.publish(&req).await.unwrap();

        let (a, b) = tokio::join!(
            harness.bridge.wait(first, Some(Duration::from_secs(2))),
            harness.bridge.wait(second, Some(Duration::from_secs(2))),
        );

        assert_eq!(a, Some(song_x_result()));
        assert_eq!(b, Some(song_x_result()));
        assert_eq!(harness.bridge.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_search_deregisters() {
        let harness = Harness::start();
        let req = request("Unknown", "Nobody");

        let bridge = harness.bridge.clone();
        let search_req = req.clone();
        let task = tokio::spawn(async move { bridge.search(&search_req).await });

        while !harness.bridge.is_pending(&req) {
            tokio::task::yield_now().await;
        }

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        assert!(!harness.bridge.is_pending(&req));
        assert_eq!(harness.bridge.stats().abandoned(), 1);
    }

    // =============================================================================
    // BAD INPUT ON THE RESULT CHANNEL
    // =============================================================================

    #[tokio::test]
    async fn test_malformed_replies_do_not_disturb_searches() {
        let harness = Harness::start();
        let req = request("Song X", "Artist Y");
        let pending = harness.bridge.register(&req);

        harness.bus.publish("lyrics:results", b"not json".to_vec()).await;
        harness
            .bus
            .publish("lyrics:results", br#"{"artist":"Artist Y"}"#.to_vec())
            .await;
        harness
            .bus
            .publish(
                "lyrics:results",
                br#"{"title":"Song X","artist":"Artist Y","lyrics":"la la"}"#.to_vec(),
            )
            .await;

        let result = harness
            .bridge
            .wait(pending, Some(Duration::from_secs(2)))
            .await
            .expect("valid reply still resolves");

        assert_eq!(result.lyrics.as_deref(), Some("la la"));
        assert_eq!(harness.bridge.stats().malformed(), 2);
    }

    // =============================================================================
    // SHUTDOWN
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_no_replies_after_shutdown() {
        let harness = Harness::start();
        let worker = harness.worker(FakeSearchWorker::new().with_song(song_x()));
        let bridge = harness.bridge.clone();

        let first = bridge.search(&request("Song X", "Artist Y")).await.unwrap();
        assert!(first.is_some());

        let bus = harness.bus.clone();
        assert_eq!(harness.shutdown().await, 1);
        let resolved = bridge.stats().resolved();

        // Worker still answers, but nobody is listening on our side
        let req = request("Song X", "Artist Y");
        let pending = bridge.register(&req);
        bridge.publish(&req).await.unwrap();
        let second = bridge.wait(pending, Some(Duration::from_secs(1))).await;

        assert!(second.is_none());
        assert_eq!(worker.replies(), 2);
        assert_eq!(bus.channel_subscribers("lyrics:results"), 0);
        assert_eq!(bridge.stats().resolved(), resolved);
        assert_eq!(bridge.stats().timeouts(), 1);
        assert_eq!(bridge.pending_count(), 0);
    }
}
