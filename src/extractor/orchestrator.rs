//! Strategy selection, single extraction and bounded batch extraction.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

use super::{ExtractError, ExtractionCache, Strategy, StrategyError, StrategyFailure};
use crate::context::{Context, Interrupted};
use crate::model::ExtractedConfig;
use crate::time::{Clock, SystemClock};

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of batch workers.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Applications used when a batch is started without an explicit list, and
/// reported by [`Extractor::supported_apps`] when no strategy declares any.
pub const DEFAULT_APPS: &[&str] = &[
    "ghostty",
    "zed",
    "alacritty",
    "wezterm",
    "neovim",
    "tmux",
    "starship",
    "git",
    "mise",
    "vscode",
    "sublime",
    "kitty",
    "iterm2",
    "terminal",
];

/// Outcome of [`Extractor::extract_batch`].
#[derive(Debug, Default)]
pub struct BatchExtraction {
    /// Successful results keyed by application.
    pub configs: HashMap<String, Arc<ExtractedConfig>>,
    /// Failures keyed by application.
    pub failures: BTreeMap<String, ExtractError>,
}

impl BatchExtraction {
    /// Returns true if every requested application succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Inner {
    strategies: Vec<Arc<dyn Strategy>>,
    cache: Arc<ExtractionCache>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    concurrency: usize,
}

/// Drives extraction across the registered strategies.
///
/// Cloning is cheap; clones share strategies and cache.
///
/// # Example
///
/// ```no_run
/// use confscout::context::Context;
/// use confscout::extractor::{Extractor, strategies::BuiltinStrategy};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = Extractor::builder()
///     .strategy(BuiltinStrategy)
///     .build();
/// let config = extractor.extract(&Context::new(), "tmux").await?;
/// println!("{} settings", config.settings.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Extractor {
    inner: Arc<Inner>,
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("strategies", &self.strategy_names())
            .field("timeout", &self.inner.timeout)
            .field("concurrency", &self.inner.concurrency)
            .field("cached", &self.inner.cache.len())
            .finish()
    }
}

/// Builder for [`Extractor`].
pub struct ExtractorBuilder {
    strategies: Vec<Arc<dyn Strategy>>,
    cache: Option<Arc<ExtractionCache>>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    concurrency: usize,
}

impl Default for ExtractorBuilder {
    fn default() -> Self {
        Self {
            strategies: Vec::new(),
            cache: None,
            clock: Arc::new(SystemClock),
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl ExtractorBuilder {
    /// Registers a strategy.
    #[must_use]
    pub fn strategy<S: Strategy + 'static>(mut self, strategy: S) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Registers already-shared strategies, in order.
    #[must_use]
    pub fn strategies<I>(mut self, strategies: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Strategy>>,
    {
        self.strategies.extend(strategies);
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the number of batch workers (at least one is always used).
    #[must_use]
    pub const fn concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers;
        self
    }

    /// Uses `cache` instead of a private one.
    #[must_use]
    pub fn cache(mut self, cache: Arc<ExtractionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Stamps successful extractions with `clock`.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the extractor.
    ///
    /// Strategies are ordered by descending priority; ties keep registration
    /// order.
    #[must_use]
    pub fn build(mut self) -> Extractor {
        self.strategies
            .sort_by_key(|s| std::cmp::Reverse(s.priority()));

        Extractor {
            inner: Arc::new(Inner {
                strategies: self.strategies,
                cache: self.cache.unwrap_or_default(),
                clock: self.clock,
                timeout: self.timeout,
                concurrency: self.concurrency.max(1),
            }),
        }
    }
}

impl Extractor {
    /// Starts building an extractor with no strategies.
    #[must_use]
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::default()
    }

    /// Strategy names in the order they are tried.
    #[must_use]
    pub fn strategy_names(&self) -> Vec<&str> {
        self.inner.strategies.iter().map(|s| s.name()).collect()
    }

    /// The per-attempt timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// The number of batch workers.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.inner.concurrency
    }

    /// The shared result cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<ExtractionCache> {
        &self.inner.cache
    }

    /// Applications known to at least one strategy, sorted.
    ///
    /// Falls back to [`DEFAULT_APPS`] when no strategy declares any.
    #[must_use]
    pub fn supported_apps(&self) -> Vec<String> {
        let mut apps: BTreeSet<String> = self
            .inner
            .strategies
            .iter()
            .flat_map(|s| s.known_apps())
            .map(str::to_string)
            .collect();
        if apps.is_empty() {
            apps = DEFAULT_APPS.iter().map(|s| (*s).to_string()).collect();
        }
        apps.into_iter().collect()
    }

    /// Extracts the settings of `app`.
    ///
    /// A cached result is returned without touching any strategy. Otherwise
    /// applicable strategies are tried in priority order, each bounded by the
    /// configured timeout (or `ctx`'s deadline if sooner), and the first
    /// non-empty result is cached and returned.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::NotFound`] if no strategy applies to `app`.
    /// - [`ExtractError::AllStrategiesFailed`] if every applicable strategy failed.
    /// - [`ExtractError::Interrupted`] if `ctx` fired during the search.
    pub async fn extract(
        &self,
        ctx: &Context,
        app: &str,
    ) -> Result<Arc<ExtractedConfig>, ExtractError> {
        if let Some(hit) = self.inner.cache.get(app) {
            tracing::debug!(app, method = %hit.source.method, "Extraction cache hit");
            return Ok(hit);
        }

        let interrupted = |cause: Interrupted| ExtractError::Interrupted {
            app: app.to_string(),
            cause,
        };

        let mut failures = Vec::new();
        for strategy in self.inner.strategies.iter().filter(|s| s.can_extract(app)) {
            ctx.check().map_err(interrupted)?;

            let attempt = ctx.with_timeout(self.inner.timeout);
            let started = tokio::time::Instant::now();
            let outcome = attempt
                .run(strategy.extract(&attempt, app))
                .await
                .unwrap_or_else(|cause| Err(StrategyError::Interrupted(cause)))
                .and_then(|config| accept(app, config));

            match outcome {
                Ok(mut config) => {
                    config.timestamp = self.inner.clock.now_utc();
                    tracing::debug!(
                        app,
                        strategy = strategy.name(),
                        settings = config.settings.len(),
                        elapsed_ms = started.elapsed().as_millis(),
                        "Extraction succeeded"
                    );
                    return Ok(self.inner.cache.insert(config));
                }
                Err(error) => {
                    ctx.check().map_err(interrupted)?;
                    if error.is_timeout() {
                        tracing::warn!(app, strategy = strategy.name(), "Extraction strategy timed out");
                    } else {
                        tracing::debug!(app, strategy = strategy.name(), error = %error, "Extraction strategy failed");
                    }
                    failures.push(StrategyFailure {
                        strategy: strategy.name().to_string(),
                        error,
                    });
                }
            }
        }

        if failures.is_empty() {
            return Err(ExtractError::NotFound {
                app: app.to_string(),
            });
        }
        Err(ExtractError::AllStrategiesFailed {
            app: app.to_string(),
            failures,
        })
    }

    /// Extracts many applications with a bounded pool of workers.
    ///
    /// Each worker pulls the next application from a shared queue and runs the
    /// full [`extract`](Self::extract) flow for it. Per-application failures
    /// are collected in [`BatchExtraction::failures`]; they never stop sibling
    /// work. Cancelling `ctx` stops every worker, and applications that were
    /// never started are reported as interrupted. Duplicate names are
    /// extracted once.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::BatchFailed`] if no application succeeded
    /// (including an empty `apps` list).
    pub async fn extract_batch<I, S>(
        &self,
        ctx: &Context,
        apps: I,
    ) -> Result<BatchExtraction, ExtractError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let queue: VecDeque<String> = apps
            .into_iter()
            .map(Into::into)
            .filter(|app| seen.insert(app.clone()))
            .collect();
        let total = queue.len();
        if total == 0 {
            return Err(ExtractError::BatchFailed {
                failures: BTreeMap::new(),
            });
        }

        let workers = self.inner.concurrency.min(total);
        tracing::info!(apps = total, workers, "Starting batch extraction");

        let queue = Arc::new(Mutex::new(queue));
        let (tx, rx) = mpsc::channel(total);
        let mut pool = JoinSet::new();
        for _ in 0..workers {
            let extractor = self.clone();
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let ctx = ctx.clone();
            pool.spawn(async move {
                while ctx.check().is_ok() {
                    let Some(app) = next_app(&queue) else { break };
                    let result = extractor.extract(&ctx, &app).await;
                    if tx.send((app, result)).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let mut batch = BatchExtraction::default();
        let mut results = ReceiverStream::new(rx);
        while let Some((app, result)) = results.next().await {
            match result {
                Ok(config) => {
                    batch.configs.insert(app, config);
                }
                Err(error) => {
                    tracing::debug!(app = %app, error = %error, "Batch extraction failed for app");
                    batch.failures.insert(app, error);
                }
            }
        }
        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Batch worker aborted");
            }
        }

        let cause = ctx.check().err().unwrap_or(Interrupted::Cancelled);
        let unstarted = std::mem::take(&mut *queue.lock().unwrap_or_else(PoisonError::into_inner));
        for app in unstarted {
            batch.failures.insert(
                app.clone(),
                ExtractError::Interrupted { app, cause },
            );
        }

        tracing::info!(
            succeeded = batch.configs.len(),
            failed = batch.failures.len(),
            "Batch extraction finished"
        );

        if batch.configs.is_empty() {
            return Err(ExtractError::BatchFailed {
                failures: batch.failures,
            });
        }
        Ok(batch)
    }
}

fn next_app(queue: &Mutex<VecDeque<String>>) -> Option<String> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

fn accept(app: &str, config: ExtractedConfig) -> Result<ExtractedConfig, StrategyError> {
    if config.app != app {
        return Err(StrategyError::AppMismatch {
            expected: app.to_string(),
            actual: config.app,
        });
    }
    if config.is_empty() {
        return Err(StrategyError::NoSettings);
    }
    Ok(config)
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
