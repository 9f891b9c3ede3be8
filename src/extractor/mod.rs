//! Multi-strategy settings extraction.
//!
//! This module provides:
//! - The pluggable extraction contract ([`Strategy`])
//! - The orchestrator that ranks strategies and runs single or batch
//!   extractions ([`Extractor`], [`ExtractorBuilder`])
//! - The shared result cache ([`ExtractionCache`])
//! - Output parsers shared by the built-in strategies ([`parse`])
//! - The built-in strategies themselves ([`strategies`])
//!
//! # Fallback order
//!
//! For one application the extractor consults the cache first, then tries
//! every applicable strategy in descending priority. Each attempt is bounded
//! by the configured timeout and by the caller's [`Context`](crate::context::Context).
//! The first attempt that yields a non-empty result for the requested
//! application wins and is cached for the life of the extractor.

mod cache;
mod error;
mod orchestrator;
pub mod parse;
mod strategy;
pub mod strategies;

pub use cache::ExtractionCache;
pub use error::{ExtractError, StrategyError, StrategyFailure};
pub use orchestrator::{
    BatchExtraction, DEFAULT_APPS, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT, Extractor,
    ExtractorBuilder,
};
pub use strategy::Strategy;
