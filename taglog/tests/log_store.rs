//! Integration tests exercising the log store through its public API.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use taglog::{Log, MockClock, Tag, Timestamp, TimestampAllocator};

/// A log whose keys are deterministic: 0, 1, 2, ... microseconds unless
/// the clock is advanced.
fn deterministic_log() -> (Log<Timestamp, String>, Arc<MockClock>) {
    let clock = Arc::new(MockClock::with_time(UNIX_EPOCH));
    let log = Log::with_allocator(TimestampAllocator::with_clock(clock.clone()));
    (log, clock)
}

#[test]
fn empty_log_has_nothing_to_iterate() {
    let log: Log<Timestamp, String> = Log::new();

    assert_eq!(log.count(), 0);
    assert_eq!(log.iter().count(), 0);
    assert!(log.last().is_none());
}

#[test]
fn logged_entries_come_back_in_order_and_render() {
    let (log, _clock) = deterministic_log();
    log.insert("migration started".to_string());
    log.insert("copied 10k rows".to_string());
    log.insert("migration finished".to_string());

    assert_eq!(log.count(), 3);

    let mut rendered = String::new();
    for entry in &log {
        rendered.push_str(&entry.to_string());
        rendered.push('\n');
    }
    assert!(!rendered.is_empty());
    assert!(rendered.contains("copied 10k rows"));

    let values: Vec<String> = log.iter().map(|e| e.value).collect();
    assert_eq!(
        values,
        vec![
            "migration started",
            "copied 10k rows",
            "migration finished"
        ]
    );
}

#[test]
fn recent_entries_are_separable_by_key_threshold() {
    let (log, clock) = deterministic_log();
    log.insert("old news".to_string());
    log.insert("older news".to_string());

    clock.advance(Duration::from_secs(2));
    log.insert("fresh".to_string());

    let cutoff = Timestamp::from_micros(1_000_000);
    let recent: Vec<_> = log.iter().filter(|e| e.key > cutoff).collect();

    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].value, "fresh");
}

#[test]
fn tag_search_matches_current_tag_sets() {
    let (log, _clock) = deterministic_log();
    log.insert("plain status line".to_string());
    log.insert_tagged("deploy began".to_string(), ["deploy", "web"]);
    log.insert_tagged("deploy finished".to_string(), ["deploy"]);

    let deploys = log.entries_for_tag("deploy");
    assert_eq!(deploys.len(), 2);
    assert_eq!(deploys[0].value, "deploy began");
    assert_eq!(deploys[1].value, "deploy finished");

    let web = log.entries_for_tag("web");
    assert_eq!(web.len(), 1);
    assert_eq!(web[0].value, "deploy began");

    assert!(log.entries_for_tag("db").is_empty());

    let untagged = log.iter().filter(|e| e.tags.is_empty()).count();
    assert_eq!(untagged, 1);
}

#[test]
fn tagging_the_last_entry_touches_exactly_one_record() {
    let (log, _clock) = deterministic_log();
    log.insert("one".to_string());
    log.insert("two".to_string());
    let third = log.insert("three".to_string());

    log.tag_last(["done"]);

    let done = log.entries_for_tag("done");
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].key, third);
    assert_eq!(log.iter().filter(|e| e.tags.is_empty()).count(), 2);

    // Tagging last on an empty log changes nothing.
    let (empty, _clock) = deterministic_log();
    empty.tag_last(["done"]);
    assert!(empty.tags().is_empty());
}

#[test]
fn inserted_entries_round_trip_with_their_tags() {
    let (log, _clock) = deterministic_log();

    let untagged = log.insert("bare".to_string());
    let entry = log.get(&untagged).unwrap();
    assert_eq!(entry.value, "bare");
    assert!(entry.tags.is_empty());

    let tagged = log.insert_tagged("labelled".to_string(), ["a", "b"]);
    let entry = log.get(&tagged).unwrap();
    assert_eq!(entry.value, "labelled");
    let expected: Vec<Tag> = vec![Tag::new("a"), Tag::new("b")];
    assert_eq!(entry.tags.into_iter().collect::<Vec<_>>(), expected);
}

#[test]
fn rapid_inserts_produce_unique_increasing_keys() {
    // The system clock is deliberately used here: inserts far outpace its
    // resolution, and the allocator's tiebreak must absorb that.
    let log: Log<Timestamp, usize> = Log::new();

    let keys: Vec<Timestamp> = (0..1_000).map(|i| log.insert(i)).collect();

    assert_eq!(log.count(), 1_000);
    assert!(keys.windows(2).all(|w| w[0] < w[1]));

    let distinct: HashSet<Timestamp> = keys.iter().copied().collect();
    assert_eq!(distinct.len(), 1_000);
}

#[test]
fn multi_tag_queries_follow_posting_list_algebra() {
    let (log, _clock) = deterministic_log();
    log.insert_tagged("a".to_string(), ["infra", "alert"]);
    log.insert_tagged("b".to_string(), ["infra"]);
    log.insert_tagged("c".to_string(), ["alert", "paging"]);

    let both = log.entries_for_all(["infra", "alert"]);
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].value, "a");

    let any = log.entries_for_any(["infra", "paging"]);
    assert_eq!(any.len(), 3);

    assert!(log.entries_for_all(["infra", "nope"]).is_empty());
}

#[test]
fn bulk_loaded_logs_interoperate_with_generated_keys() {
    let clock = Arc::new(MockClock::with_time(UNIX_EPOCH));
    let allocator = TimestampAllocator::with_clock(clock);

    let pairs = vec![
        (Timestamp::from_micros(40), "loaded first".to_string()),
        (Timestamp::from_micros(10), "loaded second".to_string()),
    ];
    let log = Log::try_from_pairs_with(allocator, pairs).unwrap();

    // Insertion order follows the pair sequence.
    let values: Vec<String> = log.iter().map(|e| e.value).collect();
    assert_eq!(values, vec!["loaded first", "loaded second"]);

    // A generated key clears every loaded key even with a stale clock.
    let key = log.insert("generated".to_string());
    assert_eq!(key, Timestamp::from_micros(41));

    // Loaded records participate in tagging like any other.
    log.add_tags(&Timestamp::from_micros(10), ["imported"]);
    assert_eq!(log.entries_for_tag("imported").len(), 1);
}

#[test]
fn concurrent_writers_serialize_without_losing_records() {
    let log: Log<Timestamp, String> = Log::new();

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let log = &log;
            scope.spawn(move || {
                for i in 0..100 {
                    log.insert_tagged(format!("worker-{worker} event {i}"), ["load"]);
                }
            });
        }
    });

    assert_eq!(log.count(), 400);
    assert_eq!(log.entries_for_tag("load").len(), 400);

    let keys: HashSet<Timestamp> = log.iter().map(|e| e.key).collect();
    assert_eq!(keys.len(), 400);
}
