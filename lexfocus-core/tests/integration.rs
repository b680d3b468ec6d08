//! Integration tests for the statistics engine
//!
//! These exercise the full recorder -> SQLite store -> aggregator flow,
//! including durability across store reopen (simulating process restart).

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use lexfocus_core::{
    BlobStore, MemoryStore, PeriodAggregator, PeriodKind, Phase, SessionEvent, SessionRecorder,
    SqliteStore, STATISTICS_KEY,
};
use std::sync::Arc;
use tempfile::TempDir;

fn noon_local(y: i32, m: u32, d: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn noon_utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    noon_local(y, m, d).with_timezone(&Utc)
}

/// Drive a full work day through the recorder: two clean work sessions with
/// their breaks, plus one interrupted work session.
fn record_sample_day(recorder: &SessionRecorder, day: DateTime<Utc>) {
    let mut t = day;

    recorder
        .record_event(&SessionEvent::start(Phase::Work, Some("drafting"), t))
        .unwrap();
    t += Duration::seconds(1500);
    recorder
        .record_event(&SessionEvent::end(Phase::Work, t, 1500))
        .unwrap();

    recorder
        .record_event(&SessionEvent::start(Phase::ShortBreak, None, t))
        .unwrap();
    t += Duration::seconds(300);
    recorder
        .record_event(&SessionEvent::end(Phase::ShortBreak, t, 300))
        .unwrap();

    recorder
        .record_event(&SessionEvent::start(Phase::Work, Some("research"), t))
        .unwrap();
    t += Duration::seconds(900);
    recorder
        .record_event(&SessionEvent::end(Phase::Work, t, 900))
        .unwrap();

    recorder
        .record_event(&SessionEvent::start(Phase::Work, Some("drafting"), t))
        .unwrap();
    t += Duration::seconds(60);
    recorder
        .record_event(&SessionEvent::interrupt(Phase::Work, t, 60))
        .unwrap();
}

#[test]
fn test_record_and_report_through_sqlite() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("stats.db");

    let store: Arc<dyn BlobStore> = Arc::new(SqliteStore::open(&db_path).unwrap());
    let recorder = SessionRecorder::new(Arc::clone(&store));
    let aggregator = PeriodAggregator::new(store);

    record_sample_day(&recorder, noon_utc(2026, 3, 10));

    let report = aggregator.report(PeriodKind::Day, noon_local(2026, 3, 10));
    let stats = report.stats();

    assert_eq!(stats.total_sessions, 4);
    assert_eq!(stats.work.started, 3);
    assert_eq!(stats.work.completed, 2);
    assert_eq!(stats.work.interrupted, 1);
    assert_eq!(stats.work.total_minutes, 41); // floor((1500 + 900 + 60) / 60)
    assert_eq!(stats.breaks.started, 1);
    assert_eq!(stats.breaks.total_minutes, 5);
    assert_eq!(stats.total_interruptions, 1);
    assert_eq!(stats.total_minutes, 46);

    let categories = report.categories();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].category, "drafting");
    assert_eq!(categories[0].total_sessions, 2);
    assert_eq!(categories[0].completed, 1);
    assert_eq!(categories[0].interrupted, 1);
    assert_eq!(categories[0].total_minutes, 26); // floor(1500/60) + floor(60/60)
    assert_eq!(categories[1].category, "research");
    assert_eq!(categories[1].total_minutes, 15);

    // A different day sees none of it
    let other_day = aggregator.report(PeriodKind::Day, noon_local(2026, 3, 12));
    assert_eq!(other_day.stats().total_sessions, 0);
    assert!(other_day.sessions().is_empty());
}

#[test]
fn test_records_survive_store_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("stats.db");

    {
        let store: Arc<dyn BlobStore> = Arc::new(SqliteStore::open(&db_path).unwrap());
        let recorder = SessionRecorder::new(store);
        record_sample_day(&recorder, noon_utc(2026, 3, 10));
    }

    // Reopen at the same path, as after a process restart
    let store: Arc<dyn BlobStore> = Arc::new(SqliteStore::open(&db_path).unwrap());
    let aggregator = PeriodAggregator::new(Arc::clone(&store));

    let report = aggregator.report(PeriodKind::Day, noon_local(2026, 3, 10));
    assert_eq!(report.stats().total_sessions, 4);

    // An open phase left behind by the crash can still be closed
    let recorder = SessionRecorder::new(store);
    recorder
        .record_event(&SessionEvent::start(
            Phase::LongBreak,
            None,
            noon_utc(2026, 3, 10) + Duration::hours(1),
        ))
        .unwrap();
    recorder
        .record_event(&SessionEvent::end(
            Phase::LongBreak,
            noon_utc(2026, 3, 10) + Duration::hours(1) + Duration::seconds(900),
            900,
        ))
        .unwrap();

    let report = aggregator.report(PeriodKind::Day, noon_local(2026, 3, 10));
    assert_eq!(report.stats().total_sessions, 5);
    assert_eq!(report.stats().breaks.total_minutes, 20);
}

#[test]
fn test_grouped_reports_cover_recorded_history() {
    let store: Arc<dyn BlobStore> = Arc::new(MemoryStore::new());
    let recorder = SessionRecorder::new(Arc::clone(&store));
    let aggregator = PeriodAggregator::new(store);

    // Activity spread over three months
    record_sample_day(&recorder, noon_utc(2026, 1, 14));
    record_sample_day(&recorder, noon_utc(2026, 2, 11));
    record_sample_day(&recorder, noon_utc(2026, 3, 10));

    let now = noon_local(2026, 3, 11);

    let monthly = aggregator.report(PeriodKind::Month, now);
    assert_eq!(monthly.buckets().len(), 12);
    assert_eq!(monthly.stats().total_sessions, 12);
    let active: Vec<&str> = monthly
        .buckets()
        .iter()
        .filter(|b| !b.sessions.is_empty())
        .map(|b| b.label.as_str())
        .collect();
    assert_eq!(active, vec!["January 2026", "February 2026", "March 2026"]);

    let yearly = aggregator.report(PeriodKind::Year, now);
    assert_eq!(yearly.buckets().len(), 5);
    assert_eq!(yearly.buckets()[4].label, "2026");
    assert_eq!(yearly.buckets()[4].stats.total_sessions, 12);

    let weekly = aggregator.report(PeriodKind::Week, now);
    assert_eq!(weekly.buckets().len(), 8);
    // The 8-week range starts 2026-01-19, so the January day falls outside it
    assert_eq!(weekly.stats().total_sessions, 8);
    let current_week = weekly.buckets().last().unwrap();
    assert_eq!(current_week.stats.total_sessions, 4);
}

#[test]
fn test_clear_then_report_is_empty() {
    let store: Arc<dyn BlobStore> = Arc::new(MemoryStore::new());
    let recorder = SessionRecorder::new(Arc::clone(&store));
    let aggregator = PeriodAggregator::new(store);

    record_sample_day(&recorder, noon_utc(2026, 3, 10));
    assert_eq!(
        aggregator
            .report(PeriodKind::Day, noon_local(2026, 3, 10))
            .stats()
            .total_sessions,
        4
    );

    recorder.clear().unwrap();

    let report = aggregator.report(PeriodKind::Day, noon_local(2026, 3, 10));
    assert_eq!(report.stats().total_sessions, 0);

    // Recording still works after a clear
    record_sample_day(&recorder, noon_utc(2026, 3, 10));
    assert_eq!(
        aggregator
            .report(PeriodKind::Day, noon_local(2026, 3, 10))
            .stats()
            .total_sessions,
        4
    );
}

#[test]
fn test_corrupt_blob_resets_on_next_write() {
    let store: Arc<dyn BlobStore> = Arc::new(MemoryStore::new());
    let recorder = SessionRecorder::new(Arc::clone(&store));
    let aggregator = PeriodAggregator::new(Arc::clone(&store));

    record_sample_day(&recorder, noon_utc(2026, 3, 10));

    // Corrupt the blob behind the engine's back
    store.set(STATISTICS_KEY, "{\"sessions\": oops").unwrap();

    // Reads degrade to an empty store
    let report = aggregator.report(PeriodKind::Day, noon_local(2026, 3, 10));
    assert_eq!(report.stats().total_sessions, 0);

    // The next write starts a fresh collection
    recorder
        .record_event(&SessionEvent::start(
            Phase::Work,
            Some("drafting"),
            noon_utc(2026, 3, 11),
        ))
        .unwrap();
    recorder
        .record_event(&SessionEvent::end(
            Phase::Work,
            noon_utc(2026, 3, 11) + Duration::seconds(1500),
            1500,
        ))
        .unwrap();

    let report = aggregator.report(PeriodKind::Day, noon_local(2026, 3, 11));
    assert_eq!(report.stats().total_sessions, 1);
    assert_eq!(report.stats().work.total_minutes, 25);
}
