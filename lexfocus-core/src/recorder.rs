//! Session event recorder
//!
//! Translates timer lifecycle events into durable [`SessionRecord`]s. Each
//! call is a full read-modify-write-persist cycle against the injected
//! [`BlobStore`]: the whole collection is loaded, mutated, and written back
//! before the call returns, so a crash between calls never leaves a
//! half-written record. The cycle is not atomic against a second concurrent
//! caller; the single timer that drives events is expected to emit them
//! sequentially.

use crate::error::Result;
use crate::store::{BlobStore, StatisticsData, STATISTICS_KEY};
use crate::types::{EventKind, SessionEvent, SessionRecord, DEFAULT_CATEGORY};
use std::sync::Arc;

/// Records timer lifecycle events into the statistics store.
///
/// The recorder is the sole writer of the store; the
/// [`PeriodAggregator`](crate::aggregator::PeriodAggregator) only reads it.
pub struct SessionRecorder {
    store: Arc<dyn BlobStore>,
}

impl SessionRecorder {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Apply one lifecycle event and persist the updated collection.
    ///
    /// - `Start` opens a new record for the event's phase.
    /// - `End` closes the open record for the phase as completed.
    /// - `Interrupt` closes it as interrupted, crediting only the elapsed
    ///   wall time carried by the event.
    ///
    /// An `End`/`Interrupt` with no matching open record is a no-op, not an
    /// error: out-of-order or duplicate delivery is expected from the
    /// asynchronous timer callers. Persistence failures are logged and
    /// returned as `Err`; the in-memory mutation for that call is discarded.
    pub fn record_event(&self, event: &SessionEvent) -> Result<()> {
        self.apply(event).map_err(|e| {
            tracing::error!(
                error = %e,
                kind = ?event.kind,
                phase = %event.phase,
                "failed to record session event"
            );
            e
        })
    }

    fn apply(&self, event: &SessionEvent) -> Result<()> {
        let mut data = StatisticsData::load(self.store.as_ref())?;

        match event.kind {
            EventKind::Start => {
                if data.open_count(event.phase) > 0 {
                    tracing::warn!(
                        phase = %event.phase,
                        "starting a phase while another record for it is still open"
                    );
                }
                let category = event
                    .category
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
                data.sessions
                    .push(SessionRecord::open(event.phase, category, event.timestamp));
            }
            EventKind::End | EventKind::Interrupt => {
                let Some(open) = data.open_record_mut(event.phase) else {
                    tracing::debug!(
                        kind = ?event.kind,
                        phase = %event.phase,
                        "no open record for phase; ignoring event"
                    );
                    return Ok(());
                };

                open.end_time = Some(event.timestamp);
                open.elapsed_secs = event.elapsed_secs.unwrap_or(0).max(0);
                match event.kind {
                    EventKind::End => open.completed = true,
                    _ => open.interrupted = true,
                }
                if let Some(category) = &event.category {
                    open.category = category.clone();
                }
            }
        }

        data.save(self.store.as_ref())
    }

    /// Drop the entire statistics collection.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(STATISTICS_KEY)
    }
}
