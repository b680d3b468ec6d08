//! Period aggregator
//!
//! Computes time-bucketed rollups over the recorded session collection.
//! Every call re-reads the whole store and recomputes from scratch; there is
//! no caching or incremental maintenance, so cost is linear in the number of
//! stored records.
//!
//! Window rules (all in local wall-clock time):
//! - **day**: single ungrouped window covering the reference calendar day.
//! - **week**: the 8 most recent Monday-aligned 7-day windows, oldest first;
//!   a Sunday reference belongs to the week started the prior Monday.
//! - **month**: the 12 most recent calendar months, oldest first.
//! - **year**: the 5 most recent calendar years, oldest first.
//!
//! Grouped kinds always enumerate their fixed bucket count, even over an
//! empty store, so consumers can rely on a stable list length.

use crate::error::{Error, Result};
use crate::store::{BlobStore, StatisticsData};
use crate::types::{PeriodKind, SessionRecord};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::sync::Arc;

/// Summary for one phase partition (work or breaks) of a window.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PhaseSummary {
    /// Records started in the window, open ones included.
    pub started: usize,
    /// Records that ran to natural completion (`completed && !interrupted`).
    pub completed: usize,
    pub interrupted: usize,
    /// Whole minutes credited, floored over the partition's summed seconds.
    pub total_minutes: i64,
}

/// Summary statistics for one window of records.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SummaryStats {
    pub total_sessions: usize,
    pub work: PhaseSummary,
    pub breaks: PhaseSummary,
    /// Interrupted records across both partitions.
    pub total_interruptions: usize,
    pub total_minutes: i64,
}

/// Per-category breakdown entry, covering work records only.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryStats {
    pub category: String,
    pub total_sessions: usize,
    pub completed: usize,
    pub interrupted: usize,
    /// Minutes floored per record before summing, so category totals may
    /// undershoot the partition total computed from summed seconds.
    pub total_minutes: i64,
}

/// One sub-window of a grouped report.
#[derive(Debug, Clone, Serialize)]
pub struct BucketReport {
    /// Display label, e.g. `Week 9/3 - 15/3`, `March 2026`, `2026`.
    pub label: String,
    /// Window start (local wall clock), inclusive.
    pub start: NaiveDateTime,
    /// Window end (local wall clock), exclusive.
    pub end: NaiveDateTime,
    pub stats: SummaryStats,
    pub sessions: Vec<SessionRecord>,
}

/// Aggregation result for a requested time window.
///
/// Day reports are ungrouped; week/month/year reports carry the ordered
/// bucket list alongside the overall rollup of every contributing record.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum PeriodReport {
    Ungrouped {
        kind: PeriodKind,
        stats: SummaryStats,
        categories: Vec<CategoryStats>,
        sessions: Vec<SessionRecord>,
    },
    Grouped {
        kind: PeriodKind,
        stats: SummaryStats,
        categories: Vec<CategoryStats>,
        sessions: Vec<SessionRecord>,
        buckets: Vec<BucketReport>,
    },
}

impl PeriodReport {
    pub fn kind(&self) -> PeriodKind {
        match self {
            PeriodReport::Ungrouped { kind, .. } | PeriodReport::Grouped { kind, .. } => *kind,
        }
    }

    pub fn stats(&self) -> &SummaryStats {
        match self {
            PeriodReport::Ungrouped { stats, .. } | PeriodReport::Grouped { stats, .. } => stats,
        }
    }

    pub fn categories(&self) -> &[CategoryStats] {
        match self {
            PeriodReport::Ungrouped { categories, .. }
            | PeriodReport::Grouped { categories, .. } => categories,
        }
    }

    /// Every record that contributed to the report, in bucket order for
    /// grouped kinds.
    pub fn sessions(&self) -> &[SessionRecord] {
        match self {
            PeriodReport::Ungrouped { sessions, .. } | PeriodReport::Grouped { sessions, .. } => {
                sessions
            }
        }
    }

    /// Sub-period buckets, oldest first. Empty for ungrouped reports.
    pub fn buckets(&self) -> &[BucketReport] {
        match self {
            PeriodReport::Ungrouped { .. } => &[],
            PeriodReport::Grouped { buckets, .. } => buckets,
        }
    }

    /// Zero-valued report of the shape `kind` calls for. Used as the
    /// fallback when computation fails outright; note the bucket list is
    /// empty here, unlike a successful report over an empty store.
    pub fn empty(kind: PeriodKind) -> Self {
        if kind.is_grouped() {
            PeriodReport::Grouped {
                kind,
                stats: SummaryStats::default(),
                categories: Vec::new(),
                sessions: Vec::new(),
                buckets: Vec::new(),
            }
        } else {
            PeriodReport::Ungrouped {
                kind,
                stats: SummaryStats::default(),
                categories: Vec::new(),
                sessions: Vec::new(),
            }
        }
    }
}

/// Read-only consumer of the statistics store.
pub struct PeriodAggregator {
    store: Arc<dyn BlobStore>,
}

impl PeriodAggregator {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Compute the report for `kind` around `reference`.
    ///
    /// Never panics and never propagates an error: a storage read failure
    /// degrades to an empty-store report (fixed bucket windows over no
    /// records), and any other failure degrades to the zero-valued report of
    /// the requested shape. Both are logged at `warn`.
    pub fn report(&self, kind: PeriodKind, reference: DateTime<Local>) -> PeriodReport {
        match self.build(kind, reference) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    kind = %kind,
                    "report computation failed; returning empty report"
                );
                PeriodReport::empty(kind)
            }
        }
    }

    fn build(&self, kind: PeriodKind, reference: DateTime<Local>) -> Result<PeriodReport> {
        let sessions = match StatisticsData::load(self.store.as_ref()) {
            Ok(data) => data.sessions,
            Err(e) => {
                tracing::warn!(error = %e, "statistics read failed; reporting on an empty store");
                Vec::new()
            }
        };
        let reference = reference.naive_local();

        if kind == PeriodKind::Day {
            let day = reference.date();
            let in_day: Vec<SessionRecord> = sessions
                .iter()
                .filter(|s| s.date_key == day)
                .cloned()
                .collect();
            return Ok(PeriodReport::Ungrouped {
                kind,
                stats: calculate_stats(&in_day),
                categories: category_stats(&in_day),
                sessions: in_day,
            });
        }

        let windows = bucket_windows(kind, reference)?;
        let mut buckets = Vec::with_capacity(windows.len());
        let mut union: Vec<SessionRecord> = Vec::new();

        for window in windows {
            let in_window: Vec<SessionRecord> = sessions
                .iter()
                .filter(|s| window.contains(local_start(s)))
                .cloned()
                .collect();
            union.extend(in_window.iter().cloned());
            buckets.push(BucketReport {
                label: window.label,
                start: window.start,
                end: window.end,
                stats: calculate_stats(&in_window),
                sessions: in_window,
            });
        }

        Ok(PeriodReport::Grouped {
            kind,
            stats: calculate_stats(&union),
            categories: category_stats(&union),
            sessions: union,
            buckets,
        })
    }
}

/// A half-open local-time window plus its display label.
struct Window {
    label: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Window {
    fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Local wall-clock instant a record started.
fn local_start(record: &SessionRecord) -> NaiveDateTime {
    record.start_time.with_timezone(&Local).naive_local()
}

fn at_midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::Time(format!("no first day for {}-{}", year, month)))
}

/// Calendar month `back` months before `(year, month)`.
fn month_back(year: i32, month: u32, back: u32) -> (i32, u32) {
    let total = year * 12 + month as i32 - 1 - back as i32;
    (total.div_euclid(12), (total.rem_euclid(12) + 1) as u32)
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

/// Enumerate the fixed windows for a grouped kind, oldest first. The last
/// window always contains `reference`.
fn bucket_windows(kind: PeriodKind, reference: NaiveDateTime) -> Result<Vec<Window>> {
    let mut windows = Vec::with_capacity(kind.bucket_count());

    match kind {
        PeriodKind::Day => {}
        PeriodKind::Week => {
            let today = reference.date();
            let this_monday =
                today - Duration::days(today.weekday().num_days_from_monday() as i64);
            for back in (0..8u32).rev() {
                let start_date = this_monday - Duration::days(7 * back as i64);
                let display_end = start_date + Duration::days(6);
                windows.push(Window {
                    label: format!(
                        "Week {}/{} - {}/{}",
                        start_date.day(),
                        start_date.month(),
                        display_end.day(),
                        display_end.month()
                    ),
                    start: at_midnight(start_date),
                    end: at_midnight(start_date + Duration::days(7)),
                });
            }
        }
        PeriodKind::Month => {
            for back in (0..12u32).rev() {
                let (year, month) = month_back(reference.year(), reference.month(), back);
                let (next_year, next_month) = if month == 12 {
                    (year + 1, 1)
                } else {
                    (year, month + 1)
                };
                windows.push(Window {
                    label: format!("{} {}", month_name(month), year),
                    start: at_midnight(first_of_month(year, month)?),
                    end: at_midnight(first_of_month(next_year, next_month)?),
                });
            }
        }
        PeriodKind::Year => {
            for back in (0..5i32).rev() {
                let year = reference.year() - back;
                windows.push(Window {
                    label: year.to_string(),
                    start: at_midnight(first_of_month(year, 1)?),
                    end: at_midnight(first_of_month(year + 1, 1)?),
                });
            }
        }
    }

    Ok(windows)
}

/// Roll up one window of records into its summary.
fn calculate_stats(sessions: &[SessionRecord]) -> SummaryStats {
    let work: Vec<&SessionRecord> = sessions.iter().filter(|s| s.phase.is_work()).collect();
    let breaks: Vec<&SessionRecord> = sessions.iter().filter(|s| s.phase.is_break()).collect();

    SummaryStats {
        total_sessions: sessions.len(),
        work: phase_summary(&work),
        breaks: phase_summary(&breaks),
        total_interruptions: sessions.iter().filter(|s| s.interrupted).count(),
        total_minutes: floor_minutes(sessions.iter().map(credited_secs).sum()),
    }
}

fn phase_summary(sessions: &[&SessionRecord]) -> PhaseSummary {
    PhaseSummary {
        started: sessions.len(),
        completed: sessions.iter().filter(|s| s.is_cleanly_completed()).count(),
        interrupted: sessions.iter().filter(|s| s.interrupted).count(),
        total_minutes: floor_minutes(sessions.iter().map(|s| credited_secs(s)).sum()),
    }
}

/// Group work records by category. Categories appear in first-seen store
/// order; minutes are floored per record before summing.
fn category_stats(sessions: &[SessionRecord]) -> Vec<CategoryStats> {
    let mut out: Vec<CategoryStats> = Vec::new();

    for session in sessions
        .iter()
        .filter(|s| s.phase.is_work() && !s.category.is_empty())
    {
        let idx = match out.iter().position(|c| c.category == session.category) {
            Some(idx) => idx,
            None => {
                out.push(CategoryStats {
                    category: session.category.clone(),
                    total_sessions: 0,
                    completed: 0,
                    interrupted: 0,
                    total_minutes: 0,
                });
                out.len() - 1
            }
        };

        let entry = &mut out[idx];
        entry.total_sessions += 1;
        if session.is_cleanly_completed() {
            entry.completed += 1;
        }
        if session.interrupted {
            entry.interrupted += 1;
        }
        entry.total_minutes += credited_secs(session) / 60;
    }

    out
}

/// Seconds a record is credited with; malformed values count as 0.
fn credited_secs(record: &SessionRecord) -> i64 {
    record.elapsed_secs.max(0)
}

fn floor_minutes(secs: i64) -> i64 {
    secs / 60
}
