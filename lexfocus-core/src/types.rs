//! Core domain types for lexfocus
//!
//! These types model the statistics data captured by the timer:
//!
//! | Term | Definition |
//! |------|------------|
//! | **Phase** | One of the three timer states: work, short break, long break |
//! | **Category** | User-selected label for the kind of work being timed (work phases only) |
//! | **SessionRecord** | One physical work/break interval, durable once closed |
//! | **SessionEvent** | A timer lifecycle signal (start / end / interrupt) |
//! | **Open record** | A `SessionRecord` with no end time, i.e. an in-progress phase |

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Category recorded when a work phase is started without an explicit
/// selection. Kept as a plain sentinel so every work record groups somewhere.
pub const DEFAULT_CATEGORY: &str = "default";

/// The three timer phases.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::ShortBreak => "short-break",
            Phase::LongBreak => "long-break",
        }
    }

    /// Work phases carry a session category; breaks do not.
    pub fn is_work(&self) -> bool {
        matches!(self, Phase::Work)
    }

    pub fn is_break(&self) -> bool {
        !self.is_work()
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of timer lifecycle event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A phase began; opens a new record.
    Start,
    /// A phase ran to natural completion; closes the open record.
    End,
    /// A phase was cut short (pause or reset); closes the open record as interrupted.
    Interrupt,
}

/// A timer lifecycle event, emitted by the (out-of-scope) timer UI at
/// phase-transition instants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    pub kind: EventKind,
    pub phase: Phase,
    /// Category selected by the user. On `Start` a missing category falls
    /// back to [`DEFAULT_CATEGORY`]; on `End`/`Interrupt` a present category
    /// overwrites the one recorded at start.
    pub category: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Wall-clock seconds actually spent in the phase. Only meaningful for
    /// `End`/`Interrupt`; missing or negative values are credited as 0.
    pub elapsed_secs: Option<i64>,
}

impl SessionEvent {
    pub fn start(phase: Phase, category: Option<&str>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: EventKind::Start,
            phase,
            category: category.map(str::to_string),
            timestamp,
            elapsed_secs: None,
        }
    }

    pub fn end(phase: Phase, timestamp: DateTime<Utc>, elapsed_secs: i64) -> Self {
        Self {
            kind: EventKind::End,
            phase,
            category: None,
            timestamp,
            elapsed_secs: Some(elapsed_secs),
        }
    }

    pub fn interrupt(phase: Phase, timestamp: DateTime<Utc>, elapsed_secs: i64) -> Self {
        Self {
            kind: EventKind::Interrupt,
            phase,
            category: None,
            timestamp,
            elapsed_secs: Some(elapsed_secs),
        }
    }

    /// Attach a category to the event.
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
}

/// One physical work/break interval.
///
/// Exactly one record per phase may be open (`end_time == None`) at a time;
/// records are immutable once closed. `completed` is set only by a natural
/// `End` event, so the UI success state is `completed && !interrupted` and
/// any `interrupted` record counts as a failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    /// Unique identifier derived from the start instant (epoch milliseconds).
    pub id: String,
    pub phase: Phase,
    /// Kind of work session; meaningful only when `phase` is work.
    #[serde(default)]
    pub category: String,
    pub start_time: DateTime<Utc>,
    /// None while the phase is still running.
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds actually credited; less than the nominal phase length when
    /// the phase was interrupted.
    #[serde(default)]
    pub elapsed_secs: i64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub interrupted: bool,
    /// Local calendar date the phase started, stored for fast day filtering.
    pub date_key: NaiveDate,
}

impl SessionRecord {
    /// Create the open record for a freshly started phase.
    pub fn open(phase: Phase, category: String, start_time: DateTime<Utc>) -> Self {
        Self {
            id: start_time.timestamp_millis().to_string(),
            phase,
            category,
            start_time,
            end_time: None,
            elapsed_secs: 0,
            completed: false,
            interrupted: false,
            date_key: local_date_key(start_time),
        }
    }

    /// Whether this record represents an in-progress phase.
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// The UI success state: ran to natural completion.
    pub fn is_cleanly_completed(&self) -> bool {
        self.completed && !self.interrupted
    }
}

/// Local calendar date for an instant, used as the record's `date_key`.
pub fn local_date_key(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// Time window requested from the aggregator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// Single ungrouped window covering the reference day.
    Day,
    /// 8 Monday-aligned 7-day buckets, current week last.
    Week,
    /// 12 calendar-month buckets, current month last.
    Month,
    /// 5 calendar-year buckets, current year last.
    Year,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Day => "day",
            PeriodKind::Week => "week",
            PeriodKind::Month => "month",
            PeriodKind::Year => "year",
        }
    }

    /// Whether reports for this kind carry sub-period buckets.
    pub fn is_grouped(&self) -> bool {
        !matches!(self, PeriodKind::Day)
    }

    /// Fixed number of buckets a grouped report enumerates (0 for day).
    pub fn bucket_count(&self) -> usize {
        match self {
            PeriodKind::Day => 0,
            PeriodKind::Week => 8,
            PeriodKind::Month => 12,
            PeriodKind::Year => 5,
        }
    }
}

impl std::fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
