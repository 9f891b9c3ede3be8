//! The extraction strategy contract.

use async_trait::async_trait;

use super::StrategyError;
use crate::context::Context;
use crate::model::ExtractedConfig;

/// One pluggable way of discovering the settings of an application.
///
/// Strategies are registered with an [`Extractor`](super::Extractor), which
/// tries the applicable ones in descending [`priority`](Strategy::priority)
/// order until one succeeds.
///
/// # Contract
///
/// - [`can_extract`](Strategy::can_extract) is a pure membership test and must
///   not perform I/O.
/// - [`extract`](Strategy::extract) must run every blocking operation through
///   [`Context::run`] (or check [`Context::check`] between steps) so that
///   cancellation and deadlines are honoured promptly.
/// - A failure is local to the strategy; the orchestrator moves on to the next
///   candidate.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Short identifier (`cli`, `docs`, ...), also used as the method selector.
    fn name(&self) -> &str;

    /// Higher values are tried first.
    fn priority(&self) -> i32;

    /// Returns true if this strategy knows how to handle `app`.
    fn can_extract(&self, app: &str) -> bool;

    /// Applications this strategy is known to support.
    fn known_apps(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Discovers the settings of `app`.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError`] if the source is unavailable, the context
    /// fires, or the data cannot be parsed.
    async fn extract(&self, ctx: &Context, app: &str) -> Result<ExtractedConfig, StrategyError>;
}
