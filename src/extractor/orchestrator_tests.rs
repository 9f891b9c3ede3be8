//! Tests for the extraction orchestrator.

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::model::{ExtractionSource, Setting, SettingType};
use crate::time::FixedClock;

#[derive(Clone, Copy)]
enum Behavior {
    Succeed,
    Fail,
    Empty,
    WrongApp,
    Hang,
    Slow(Duration),
}

struct MockStrategy {
    name: &'static str,
    priority: i32,
    apps: Vec<&'static str>,
    behavior: Behavior,
    calls: AtomicUsize,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockStrategy {
    fn new(name: &'static str, priority: i32, apps: &[&'static str], behavior: Behavior) -> Self {
        Self {
            name,
            priority,
            apps: apps.to_vec(),
            behavior,
            calls: AtomicUsize::new(0),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn found(app: &str, method: &str) -> ExtractedConfig {
    let mut config = ExtractedConfig::new(app, "custom")
        .with_source(ExtractionSource::new(method, "mock", 0.5));
    config.insert(Setting::new("font-size", SettingType::Number));
    config
}

#[async_trait]
impl Strategy for MockStrategy {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_extract(&self, app: &str) -> bool {
        self.apps.contains(&app)
    }

    fn known_apps(&self) -> Vec<&str> {
        self.apps.clone()
    }

    async fn extract(&self, ctx: &Context, app: &str) -> Result<ExtractedConfig, StrategyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Succeed => Ok(found(app, self.name)),
            Behavior::Fail => Err(StrategyError::Parse("boom".to_string())),
            Behavior::Empty => Ok(ExtractedConfig::new(app, "custom")),
            Behavior::WrongApp => Ok(found("other", self.name)),
            Behavior::Hang => {
                ctx.run(std::future::pending::<()>()).await?;
                unreachable!("pending never resolves")
            }
            Behavior::Slow(delay) => {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_in_flight.fetch_max(now, Ordering::SeqCst);
                let slept = ctx.run(tokio::time::sleep(delay)).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                slept?;
                Ok(found(app, self.name))
            }
        }
    }
}

fn shared(strategy: MockStrategy) -> Arc<MockStrategy> {
    Arc::new(strategy)
}

fn extractor_with(strategies: &[Arc<MockStrategy>]) -> ExtractorBuilder {
    Extractor::builder().strategies(
        strategies
            .iter()
            .map(|s| Arc::clone(s) as Arc<dyn Strategy>),
    )
}

mod selection {
    use super::*;

    #[tokio::test]
    async fn highest_priority_wins_regardless_of_registration_order() {
        let low = shared(MockStrategy::new("low", 10, &["tmux"], Behavior::Succeed));
        let high = shared(MockStrategy::new("high", 100, &["tmux"], Behavior::Succeed));
        let extractor = extractor_with(&[Arc::clone(&low), Arc::clone(&high)]).build();

        let config = extractor.extract(&Context::new(), "tmux").await.unwrap();

        assert_eq!(config.source.method, "high");
        assert_eq!(low.calls(), 0);
        assert_eq!(extractor.strategy_names(), ["high", "low"]);
    }

    #[tokio::test]
    async fn equal_priority_follows_registration_order() {
        let first = shared(MockStrategy::new("first", 50, &["git"], Behavior::Succeed));
        let second = shared(MockStrategy::new("second", 50, &["git"], Behavior::Succeed));
        let extractor = extractor_with(&[first, second]).build();

        let config = extractor.extract(&Context::new(), "git").await.unwrap();

        assert_eq!(config.source.method, "first");
    }

    #[tokio::test]
    async fn inapplicable_strategies_are_skipped() {
        let other = shared(MockStrategy::new("other", 100, &["zed"], Behavior::Succeed));
        let fallback = shared(MockStrategy::new("fallback", 1, &["tmux"], Behavior::Succeed));
        let extractor = extractor_with(&[Arc::clone(&other), fallback]).build();

        let config = extractor.extract(&Context::new(), "tmux").await.unwrap();

        assert_eq!(config.source.method, "fallback");
        assert_eq!(other.calls(), 0);
    }

    #[tokio::test]
    async fn falls_back_when_higher_priority_fails() {
        let broken = shared(MockStrategy::new("broken", 100, &["tmux"], Behavior::Fail));
        let backup = shared(MockStrategy::new("backup", 10, &["tmux"], Behavior::Succeed));
        let extractor = extractor_with(&[Arc::clone(&broken), backup]).build();

        let config = extractor.extract(&Context::new(), "tmux").await.unwrap();

        assert_eq!(config.source.method, "backup");
        assert_eq!(broken.calls(), 1);
    }

    #[tokio::test]
    async fn empty_and_mismatched_results_count_as_failures() {
        let empty = shared(MockStrategy::new("empty", 100, &["tmux"], Behavior::Empty));
        let wrong = shared(MockStrategy::new("wrong", 90, &["tmux"], Behavior::WrongApp));
        let extractor = extractor_with(&[empty, wrong]).build();

        let err = extractor.extract(&Context::new(), "tmux").await.unwrap_err();

        let ExtractError::AllStrategiesFailed { app, failures } = err else {
            panic!("expected AllStrategiesFailed");
        };
        assert_eq!(app, "tmux");
        assert_eq!(failures.len(), 2);
        assert!(matches!(failures[0].error, StrategyError::NoSettings));
        assert!(matches!(
            failures[1].error,
            StrategyError::AppMismatch { ref actual, .. } if actual == "other"
        ));
        assert!(extractor.cache().is_empty());
    }

    #[tokio::test]
    async fn no_applicable_strategy_is_not_found() {
        let only = shared(MockStrategy::new("only", 100, &["tmux"], Behavior::Succeed));
        let extractor = extractor_with(&[only]).build();

        let err = extractor
            .extract(&Context::new(), "nonexistent-app")
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractError::NotFound { ref app } if app == "nonexistent-app"));
        assert!(err.to_string().contains("nonexistent-app"));
    }

    #[tokio::test]
    async fn all_failures_are_reported_in_attempt_order() {
        let a = shared(MockStrategy::new("a", 3, &["git"], Behavior::Fail));
        let b = shared(MockStrategy::new("b", 2, &["git"], Behavior::Fail));
        let extractor = extractor_with(&[b, a]).build();

        let err = extractor.extract(&Context::new(), "git").await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("no extraction method succeeded for 'git'"));
        assert!(message.find("a: parse error").unwrap() < message.find("b: parse error").unwrap());
        assert!(!err.is_timeout());
    }
}

mod caching {
    use super::*;

    #[tokio::test]
    async fn second_extract_is_served_from_cache() {
        let strategy = shared(MockStrategy::new("cli", 100, &["ghostty"], Behavior::Succeed));
        let extractor = extractor_with(&[Arc::clone(&strategy)]).build();
        let ctx = Context::new();

        let first = extractor.extract(&ctx, "ghostty").await.unwrap();
        let started = std::time::Instant::now();
        let second = extractor.extract(&ctx, "ghostty").await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(strategy.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(elapsed < Duration::from_millis(1), "cache hit took {elapsed:?}");
    }

    #[tokio::test]
    async fn injected_cache_is_shared_between_extractors() {
        let cache = Arc::new(ExtractionCache::new());
        let strategy = shared(MockStrategy::new("cli", 100, &["zed"], Behavior::Succeed));
        let first = extractor_with(&[Arc::clone(&strategy)])
            .cache(Arc::clone(&cache))
            .build();
        let second = extractor_with(&[Arc::clone(&strategy)])
            .cache(Arc::clone(&cache))
            .build();

        first.extract(&Context::new(), "zed").await.unwrap();
        second.extract(&Context::new(), "zed").await.unwrap();

        assert_eq!(strategy.calls(), 1);
        assert!(cache.contains("zed"));
    }

    #[tokio::test]
    async fn cache_hit_ignores_cancelled_context() {
        let strategy = shared(MockStrategy::new("cli", 100, &["git"], Behavior::Succeed));
        let extractor = extractor_with(&[strategy]).build();
        extractor.extract(&Context::new(), "git").await.unwrap();

        let ctx = Context::new();
        ctx.cancel();

        assert!(extractor.extract(&ctx, "git").await.is_ok());
    }
}

mod stamping {
    use super::*;
    use std::time::SystemTime;

    use chrono::{DateTime, Utc};

    #[tokio::test]
    async fn results_are_stamped_by_the_injected_clock() {
        let at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let strategy = shared(MockStrategy::new("builtin", 10, &["git"], Behavior::Succeed));
        let extractor = extractor_with(&[strategy])
            .clock(Arc::new(FixedClock(at)))
            .build();

        let config = extractor.extract(&Context::new(), "git").await.unwrap();

        assert_eq!(config.timestamp, DateTime::<Utc>::from(at));
        assert_eq!(config.to_reference().last_updated, Some(DateTime::<Utc>::from(at)));
    }
}

mod deadlines {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn timed_out_strategy_falls_back_to_next() {
        let stuck = shared(MockStrategy::new("stuck", 100, &["tmux"], Behavior::Hang));
        let backup = shared(MockStrategy::new("backup", 10, &["tmux"], Behavior::Succeed));
        let extractor = extractor_with(&[stuck, backup])
            .timeout(Duration::from_secs(1))
            .build();

        let config = extractor.extract(&Context::new(), "tmux").await.unwrap();

        assert_eq!(config.source.method, "backup");
    }

    #[tokio::test(start_paused = true)]
    async fn all_timeouts_report_timeout() {
        let stuck = shared(MockStrategy::new("stuck", 100, &["tmux"], Behavior::Hang));
        let extractor = extractor_with(&[stuck])
            .timeout(Duration::from_millis(100))
            .build();

        let err = extractor.extract(&Context::new(), "tmux").await.unwrap_err();

        assert!(matches!(err, ExtractError::AllStrategiesFailed { .. }));
        assert!(err.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn caller_deadline_stops_the_search() {
        let stuck = shared(MockStrategy::new("stuck", 100, &["tmux"], Behavior::Hang));
        let backup = shared(MockStrategy::new("backup", 10, &["tmux"], Behavior::Succeed));
        let extractor = extractor_with(&[stuck, Arc::clone(&backup)])
            .timeout(Duration::from_secs(30))
            .build();
        let ctx = Context::with_timeout_from_now(Duration::from_millis(50));

        let err = extractor.extract(&ctx, "tmux").await.unwrap_err();

        assert!(matches!(
            err,
            ExtractError::Interrupted {
                cause: Interrupted::DeadlineExceeded,
                ..
            }
        ));
        assert!(err.is_timeout());
        assert_eq!(backup.calls(), 0);
    }

    #[tokio::test]
    async fn cancelled_context_is_interrupted_before_any_attempt() {
        let strategy = shared(MockStrategy::new("cli", 100, &["tmux"], Behavior::Succeed));
        let extractor = extractor_with(&[Arc::clone(&strategy)]).build();
        let ctx = Context::new();
        ctx.cancel();

        let err = extractor.extract(&ctx, "tmux").await.unwrap_err();

        assert!(matches!(
            err,
            ExtractError::Interrupted {
                cause: Interrupted::Cancelled,
                ..
            }
        ));
        assert_eq!(strategy.calls(), 0);
    }
}

mod batch {
    use super::*;

    #[tokio::test]
    async fn returns_successes_and_collects_failures() {
        let strategy = shared(MockStrategy::new("builtin", 10, &["tmux", "git"], Behavior::Succeed));
        let extractor = extractor_with(&[strategy]).build();

        let batch = extractor
            .extract_batch(&Context::new(), ["tmux", "git", "nonexistent-app"])
            .await
            .unwrap();

        let mut keys: Vec<&str> = batch.configs.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["git", "tmux"]);
        for (app, config) in &batch.configs {
            assert_eq!(&config.app, app);
        }
        assert!(matches!(
            batch.failures.get("nonexistent-app"),
            Some(ExtractError::NotFound { .. })
        ));
        assert!(!batch.is_complete());
    }

    #[tokio::test]
    async fn fails_only_when_nothing_succeeds() {
        let strategy = shared(MockStrategy::new("broken", 10, &["tmux", "git"], Behavior::Fail));
        let extractor = extractor_with(&[strategy]).build();

        let err = extractor
            .extract_batch(&Context::new(), ["tmux", "git"])
            .await
            .unwrap_err();

        let ExtractError::BatchFailed { failures } = err else {
            panic!("expected BatchFailed");
        };
        assert_eq!(failures.keys().collect::<Vec<_>>(), ["git", "tmux"]);
    }

    #[tokio::test]
    async fn empty_input_is_a_batch_failure() {
        let extractor = Extractor::builder().build();

        let err = extractor
            .extract_batch(&Context::new(), Vec::<String>::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractError::BatchFailed { ref failures } if failures.is_empty()));
    }

    #[tokio::test]
    async fn duplicate_apps_are_extracted_once() {
        let strategy = shared(MockStrategy::new("cli", 100, &["tmux"], Behavior::Succeed));
        let extractor = extractor_with(&[Arc::clone(&strategy)]).build();

        let batch = extractor
            .extract_batch(&Context::new(), ["tmux", "tmux"])
            .await
            .unwrap();

        assert_eq!(batch.configs.len(), 1);
        assert_eq!(strategy.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn worker_count_bounds_parallelism() {
        let apps = ["a", "b", "c", "d", "e", "f"];
        let strategy = shared(MockStrategy::new(
            "slow",
            10,
            &apps,
            Behavior::Slow(Duration::from_millis(100)),
        ));
        let extractor = extractor_with(&[Arc::clone(&strategy)])
            .concurrency(2)
            .build();

        let started = tokio::time::Instant::now();
        let batch = extractor
            .extract_batch(&Context::new(), apps)
            .await
            .unwrap();

        assert_eq!(batch.configs.len(), 6);
        assert_eq!(strategy.max_in_flight.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_app_does_not_sink_its_siblings() {
        let stuck = shared(MockStrategy::new("cli", 100, &["tmux"], Behavior::Hang));
        let builtin = shared(MockStrategy::new("builtin", 10, &["git"], Behavior::Succeed));
        let extractor = extractor_with(&[stuck, builtin])
            .timeout(Duration::from_millis(200))
            .build();

        let batch = extractor
            .extract_batch(&Context::new(), ["tmux", "git", "nonexistent-app"])
            .await
            .unwrap();

        assert_eq!(batch.configs.keys().collect::<Vec<_>>(), ["git"]);
        assert!(batch.failures["tmux"].is_timeout());
        assert!(matches!(
            batch.failures["nonexistent-app"],
            ExtractError::NotFound { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_workers_and_reports_unstarted_apps() {
        let apps = ["a", "b", "c", "d"];
        let strategy = shared(MockStrategy::new("stuck", 10, &apps, Behavior::Hang));
        let extractor = extractor_with(&[Arc::clone(&strategy)])
            .concurrency(1)
            .timeout(Duration::from_secs(60))
            .build();
        let ctx = Context::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let err = extractor.extract_batch(&ctx, apps).await.unwrap_err();

        let ExtractError::BatchFailed { failures } = err else {
            panic!("expected BatchFailed");
        };
        assert_eq!(failures.len(), 4);
        assert!(failures.values().all(|e| matches!(
            e,
            ExtractError::Interrupted {
                cause: Interrupted::Cancelled,
                ..
            }
        )));
        assert_eq!(strategy.calls(), 1);
    }
}

mod discovery {
    use super::*;

    #[test]
    fn supported_apps_is_sorted_union() {
        let a = shared(MockStrategy::new("a", 1, &["zed", "tmux"], Behavior::Succeed));
        let b = shared(MockStrategy::new("b", 2, &["git", "tmux"], Behavior::Succeed));
        let extractor = extractor_with(&[a, b]).build();

        assert_eq!(extractor.supported_apps(), ["git", "tmux", "zed"]);
    }

    #[test]
    fn supported_apps_falls_back_to_defaults() {
        let extractor = Extractor::builder().build();

        let apps = extractor.supported_apps();

        assert_eq!(apps.len(), DEFAULT_APPS.len());
        assert!(apps.contains(&"ghostty".to_string()));
    }

    #[test]
    fn builder_clamps_concurrency_and_keeps_timeout() {
        let extractor = Extractor::builder()
            .concurrency(0)
            .timeout(Duration::from_secs(5))
            .build();

        assert_eq!(extractor.concurrency(), 1);
        assert_eq!(extractor.timeout(), Duration::from_secs(5));
        assert!(format!("{extractor:?}").contains("Extractor"));
    }
}
