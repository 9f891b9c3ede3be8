//! Built-in extraction strategies.
//!
//! | strategy | priority | source |
//! |---|---|---|
//! | [`CliStrategy`] | 100 | the application's own config dump command |
//! | [`DocsStrategy`] | 50 | reference files in the source repository |
//! | [`ManStrategy`] | 40 | installed manual pages |
//! | [`FileStrategy`] | 30 | the user's existing config file |
//! | [`BuiltinStrategy`] | 10 | settings compiled into the binary |

mod builtin;
mod cli;
mod docs;
mod file;
mod man;
mod runner;

use std::sync::Arc;
use std::time::Duration;

pub use builtin::BuiltinStrategy;
pub use cli::CliStrategy;
pub use docs::{DEFAULT_URL_TEMPLATE, DocsStrategy, UrlParts, UrlTemplate};
pub use file::{FileStrategy, expand_tilde};
pub use man::ManStrategy;
pub use runner::{CommandOutput, CommandRunner, TokioCommandRunner};

use super::{Strategy, StrategyError};
use crate::context::Context;
use crate::fetch::ReqwestClient;

/// Runs a command under a per-command timeout derived from `ctx`.
///
/// Spawn failures and non-zero exits both become [`StrategyError::Command`].
async fn run_command<R: CommandRunner>(
    runner: &R,
    ctx: &Context,
    timeout: Duration,
    program: &str,
    args: &[String],
) -> Result<CommandOutput, StrategyError> {
    let output = ctx
        .with_timeout(timeout)
        .run(runner.run(program, args))
        .await?
        .map_err(|e| StrategyError::Command {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

    if !output.success {
        return Err(StrategyError::Command {
            program: program.to_string(),
            reason: output.describe_failure(),
        });
    }
    Ok(output)
}

/// Every built-in strategy, wired to real processes, HTTP and files.
#[must_use]
pub fn default_strategies(
    client: ReqwestClient,
    template: UrlTemplate,
    user_agent: impl Into<String>,
) -> Vec<Arc<dyn Strategy>> {
    vec![
        Arc::new(CliStrategy::new(TokioCommandRunner)),
        Arc::new(DocsStrategy::new(client, template, user_agent)),
        Arc::new(ManStrategy::new(TokioCommandRunner)),
        Arc::new(FileStrategy::new()),
        Arc::new(BuiltinStrategy),
    ]
}

/// Names accepted by the method selector, highest priority first.
pub const STRATEGY_NAMES: &[&str] = &["cli", "docs", "man", "file", "builtin"];
