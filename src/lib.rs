//! confscout: settings discovery for terminal tools
//!
//! A library for discovering the configurable settings of terminal
//! emulators, editors and multiplexers, and for validating values against
//! curated setting catalogs.

pub mod config;
pub mod context;
pub mod extractor;
pub mod fetch;
pub mod model;
pub mod reference;
pub mod time;
