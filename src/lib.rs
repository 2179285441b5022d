//! Core library for the panel-tools command line application.
//!
//! The library consolidates per-entity panel workbooks into one workbook per
//! country, period span, and variable group. File names are decoded in
//! [`panel::tools::filename`], scanned into groups by [`panel::tools::grouping`],
//! checked by [`panel::tools::validate`], and appended by
//! [`panel::tools::merge`]. [`panel::tools::consolidate`] drives a whole run,
//! while spreadsheet IO adapters live under [`panel::tools::io`].

pub mod panel;

pub use panel::tools::{
    Result, ToolError, ValidationError, ValidationKind, completeness, config, consolidate,
    coverage, error, filename, grouping, io, merge, model, rename, validate,
};
