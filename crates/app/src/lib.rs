//! Snipmark
//!
//! Screen capture with annotations. The binary front end over
//! `snipmark-core` (selection and annotation engine) and
//! `snipmark-render` (rasterization and flattening): monitor capture,
//! the capture shell, export sinks and persisted settings.

pub mod capture;
pub mod cli;
pub mod export;
pub mod settings;
pub mod shell;

pub use cli::run;
