//! # lexfocus-core
//!
//! Session statistics engine for LexFocus, a Pomodoro-style focus timer for
//! legal professionals.
//!
//! This library provides:
//! - Domain types for timer phases, lifecycle events, and session records
//! - A whole-blob key-value persistence layer (SQLite-backed or in-memory)
//! - The session event recorder that turns timer signals into durable records
//! - The period aggregator that rolls records up by day, week, month, or year
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Data flows one direction:
//!
//! ```text
//! timer events -> SessionRecorder -> BlobStore -> PeriodAggregator -> UI
//! ```
//!
//! The recorder is the only writer; the aggregator recomputes every report
//! from a full read of the store. Statistics are best-effort by design: the
//! engine absorbs malformed data and storage failures locally instead of
//! surfacing them to the person running a timer.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chrono::{Local, Utc};
//! use lexfocus_core::{
//!     BlobStore, Config, PeriodAggregator, PeriodKind, Phase, SessionEvent,
//!     SessionRecorder, SqliteStore,
//! };
//!
//! # fn main() -> lexfocus_core::Result<()> {
//! let config = Config::load()?;
//! let store: Arc<dyn BlobStore> =
//!     Arc::new(SqliteStore::open(&config.storage.database_path())?);
//!
//! let recorder = SessionRecorder::new(Arc::clone(&store));
//! let aggregator = PeriodAggregator::new(store);
//!
//! recorder.record_event(&SessionEvent::start(Phase::Work, Some("drafting"), Utc::now()))?;
//! // ... 25 minutes later ...
//! recorder.record_event(&SessionEvent::end(Phase::Work, Utc::now(), 1500))?;
//!
//! let report = aggregator.report(PeriodKind::Week, Local::now());
//! assert_eq!(report.buckets().len(), 8);
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use aggregator::{
    BucketReport, CategoryStats, PeriodAggregator, PeriodReport, PhaseSummary, SummaryStats,
};
pub use config::Config;
pub use error::{Error, Result};
pub use recorder::SessionRecorder;
pub use store::{BlobStore, MemoryStore, SqliteStore, StatisticsData, STATISTICS_KEY};
pub use types::*;

// Public modules
pub mod aggregator;
pub mod config;
pub mod error;
pub mod logging;
pub mod recorder;
pub mod store;
pub mod types;
