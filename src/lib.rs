//! Year-in-review statistics for Neovate agent session logs.
//!
//! Session logs live under one directory per project, one JSONL file per
//! session. [`collect`] reads them into a [`Corpus`], and [`summarize`] turns
//! the corpus into an [`AnnualSummary`] for a calendar year: totals, top
//! models, providers and tools, activity streaks and weekday distribution.

pub mod aggregate;
pub mod catalog;
pub mod collector;
pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod names;
pub mod ranking;
pub mod record;
pub mod report;
pub mod streak;
pub mod summary;
pub mod theme;

pub use catalog::ModelCatalog;
pub use collector::{collect, Corpus};
pub use error::{Error, Result};
pub use names::{DisplayNames, OfflineNames};
pub use summary::{generate, summarize, AnnualSummary};
