//! Library crate for attitude-manager.
//!
//! This crate exposes the building blocks of the TUI:
//! - Application state and update loop (`app`)
//! - Backend record types and REST client (`api`)
//! - CLI and base-URL construction (`config`)
//! - Error and result types (`error`)
//! - Generic filter/sort/paginate controller (`listview`)
//! - Snapshot export to JSON files (`export`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `attitude-manager` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod listview;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
/// Convenient error and result types shared across the crate.
pub use error::{DynError, Result};
