//! Command execution.
//!
//! This module wires the validated configuration to the extractor and the
//! catalog layer, and renders results for the terminal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::signal;

use confscout::config::{Command, MethodArg, ValidatedConfig};
use confscout::context::Context;
use confscout::extractor::strategies::default_strategies;
use confscout::extractor::{ExtractError, Extractor};
use confscout::fetch::ReqwestClient;
use confscout::model::{
    AppConfig, ConfigReference, ExtractedConfig, Setting, ValidationError, display_value,
};
use confscout::reference::{
    CatalogLoader, ConfigMapper, FileCatalogStore, MappingError, ReferenceError,
    ReferenceManager, read_catalog, write_yaml,
};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Extraction failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// A catalog could not be loaded or written.
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// A catalog does not map cleanly onto the application model.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// A value was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An existing application config could not be read.
    #[error("Failed to read app config '{}': {reason}", path.display())]
    AppConfig {
        /// Path to the file
        path: PathBuf,
        /// Reason for failure
        reason: String,
    },

    /// Output could not be rendered.
    #[error("Failed to render output: {0}")]
    Render(#[from] serde_yaml::Error),
}

/// Summary of one saved catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SavedCatalog {
    path: PathBuf,
    /// Settings in the written file.
    total: usize,
    /// Settings newly added by this run.
    added: usize,
}

/// Executes one subcommand.
///
/// # Errors
///
/// Returns an error if the command fails; batch extraction only fails when
/// no application succeeded.
#[cfg(not(tarpaulin_include))]
pub async fn execute(command: Command, config: ValidatedConfig) -> Result<(), RunError> {
    let ctx = Context::new();
    cancel_on_ctrl_c(&ctx);

    match command {
        Command::Extract {
            app,
            output,
            method,
            update,
        } => {
            let extractor = build_extractor(&config, method);
            let output = output.unwrap_or_else(|| config.output_path(&app));
            let extracted = extractor.extract(&ctx, &app).await?;
            let saved = save_catalog(&extracted.to_reference(), &output, update)?;
            println!("{}", describe_extraction(&extracted));
            println!("{}", describe_saved(&saved, update));
            Ok(())
        }
        Command::Batch {
            apps,
            output_dir,
            update,
            ..
        } => {
            let extractor = build_extractor(&config, MethodArg::Auto);
            let dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
            let apps = if apps.is_empty() {
                extractor.supported_apps()
            } else {
                apps
            };
            run_batch(&extractor, &ctx, apps, &dir, update).await
        }
        Command::Validate {
            app,
            setting,
            value,
        } => {
            let manager = catalog_manager(&config);
            let value = parse_value(&value);
            let result = manager.validate_configuration(&app, &setting, &value)?;
            if result.valid {
                println!("'{setting}' = {value} is valid for {app}");
            }
            result.into_result(&setting, &value)?;
            Ok(())
        }
        Command::Search { app, query } => {
            let manager = catalog_manager(&config);
            let settings = manager.search_settings(&app, &query)?;
            if settings.is_empty() {
                println!("No settings of {app} match '{query}'");
            }
            for setting in &settings {
                println!("{}", describe_setting(setting));
            }
            Ok(())
        }
        Command::Map {
            app,
            existing,
            output,
        } => {
            let mapper = ConfigMapper::new(Arc::new(catalog_manager(&config)));
            let app_config = map_app(&mapper, &app, existing.as_deref())?;
            match output {
                Some(path) => {
                    write_yaml(&path, &app_config)?;
                    println!(
                        "Wrote {} field(s) for {app} to {}",
                        app_config.fields.len(),
                        path.display()
                    );
                }
                None => print!("{}", serde_yaml::to_string(&app_config)?),
            }
            Ok(())
        }
        Command::CheckMapping { app } => {
            let mapper = ConfigMapper::new(Arc::new(catalog_manager(&config)));
            mapper.validate_reference_mapping(&app)?;
            println!("Catalog for {app} maps cleanly onto its app config");
            Ok(())
        }
        Command::Apps => {
            let extractor = build_extractor(&config, MethodArg::Auto);
            let catalogs = catalog_manager(&config).list_apps()?;
            println!("Extractable: {}", extractor.supported_apps().join(", "));
            if catalogs.is_empty() {
                println!("Catalogs: none in {}", config.catalog_dir.display());
            } else {
                println!("Catalogs: {}", catalogs.join(", "));
            }
            Ok(())
        }
        Command::Init { .. } => Ok(()),
    }
}

/// Cancels `ctx` on Ctrl+C so in-flight extractions stop promptly.
#[cfg(not(tarpaulin_include))]
fn cancel_on_ctrl_c(ctx: &Context) {
    let ctx = ctx.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, stopping");
            ctx.cancel();
        }
    });
}

/// Builds an extractor over the built-in strategies.
///
/// A specific method keeps only the strategy of that name.
fn build_extractor(config: &ValidatedConfig, method: MethodArg) -> Extractor {
    let strategies = default_strategies(
        ReqwestClient::new(),
        config.url_template.clone(),
        config.user_agent.clone(),
    )
    .into_iter()
    .filter(|s| method.strategy_name().is_none_or(|name| s.name() == name));

    Extractor::builder()
        .strategies(strategies)
        .timeout(config.timeout)
        .concurrency(config.concurrency)
        .build()
}

fn catalog_manager(config: &ValidatedConfig) -> ReferenceManager<FileCatalogStore> {
    ReferenceManager::new(FileCatalogStore::new(&config.catalog_dir))
}

/// Extracts `apps` in parallel and saves one catalog per success.
///
/// Failures are listed on stderr. The run fails only if nothing succeeded.
async fn run_batch(
    extractor: &Extractor,
    ctx: &Context,
    apps: Vec<String>,
    dir: &Path,
    update: bool,
) -> Result<(), RunError> {
    let batch = extractor.extract_batch(ctx, apps).await?;

    let mut succeeded: Vec<_> = batch.configs.iter().collect();
    succeeded.sort_by(|a, b| a.0.cmp(b.0));

    let mut saved = 0;
    for (app, extracted) in succeeded {
        let path = dir.join(format!("{app}.yaml"));
        match save_catalog(&extracted.to_reference(), &path, update) {
            Ok(summary) => {
                saved += 1;
                println!("{}", describe_extraction(extracted));
                println!("  {}", describe_saved(&summary, update));
            }
            Err(e) => eprintln!("  {app}: {e}"),
        }
    }

    if !batch.failures.is_empty() {
        eprintln!("Failed ({}):", batch.failures.len());
        for (app, error) in &batch.failures {
            eprintln!("  {app}: {error}");
        }
    }

    println!(
        "Saved {saved} of {} catalog(s) to {}",
        batch.configs.len() + batch.failures.len(),
        dir.display()
    );
    Ok(())
}

/// Writes `reference` to `path`.
///
/// With `update` and an existing catalog at `path`, only settings missing
/// from that catalog are added; everything already there is kept.
fn save_catalog(
    reference: &ConfigReference,
    path: &Path,
    update: bool,
) -> Result<SavedCatalog, RunError> {
    if update && path.exists() {
        let mut existing = read_catalog(path)?;
        let added = existing.merge_missing(reference);
        if added > 0 {
            existing.last_updated = reference.last_updated;
        }
        write_yaml(path, &existing)?;
        return Ok(SavedCatalog {
            path: path.to_path_buf(),
            total: existing.settings.len(),
            added,
        });
    }

    write_yaml(path, reference)?;
    Ok(SavedCatalog {
        path: path.to_path_buf(),
        total: reference.settings.len(),
        added: reference.settings.len(),
    })
}

/// Parses a command-line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Generates an app config from the catalog, or merges the catalog into an
/// existing one.
fn map_app<L: CatalogLoader>(
    mapper: &ConfigMapper<L>,
    app: &str,
    existing: Option<&Path>,
) -> Result<AppConfig, RunError> {
    match existing {
        Some(path) => {
            let existing = read_app_config(path)?;
            Ok(mapper.merge_with_app_config(app, &existing)?)
        }
        None => Ok(mapper.map_reference_to_app_config(app)?),
    }
}

fn read_app_config(path: &Path) -> Result<AppConfig, RunError> {
    let invalid = |reason: String| RunError::AppConfig {
        path: path.to_path_buf(),
        reason,
    };
    let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string()))
}

fn describe_extraction(extracted: &ExtractedConfig) -> String {
    format!(
        "{}: {} setting(s) via {} (confidence {:.2})",
        extracted.app,
        extracted.settings.len(),
        extracted.source.method,
        extracted.source.confidence
    )
}

fn describe_saved(saved: &SavedCatalog, update: bool) -> String {
    if update {
        format!(
            "Updated {}: {} new, {} total",
            saved.path.display(),
            saved.added,
            saved.total
        )
    } else {
        format!("Wrote {} ({} settings)", saved.path.display(), saved.total)
    }
}

fn describe_setting(setting: &Setting) -> String {
    let mut line = format!("{} ({})", setting.name, setting.setting_type);
    if !setting.description.is_empty() {
        line = format!("{line}: {}", setting.description);
    }
    if let Some(default) = &setting.default_value {
        line = format!("{line} [default: {}]", display_value(default));
    }
    line
}
