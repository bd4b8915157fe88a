//! Integration tests for the tracker facade.
//!
//! Covers the full workflow from repetition writes to derived values on
//! both stores, moving the clock, and concurrent use across habits.

use habitrack_core::{
    CheckmarkValue, Database, FixedClock, Frequency, HabitStore, HabitTracker, MemoryStore,
    NewHabit, RepetitionStatus, ScoreModel, Streak, Timestamp, TrackerConfig,
};
use std::sync::Arc;

fn today() -> Timestamp {
    Timestamp::from_ymd(2015, 1, 25).unwrap()
}

fn day(offset: i64) -> Timestamp {
    today().minus(offset)
}

type Snapshot = (Vec<habitrack_core::Checkmark>, Vec<habitrack_core::Score>, Vec<Streak>);

fn snapshot<S: HabitStore>(t: &HabitTracker<S, FixedClock>, id: i64) -> Snapshot {
    (
        t.all_checkmarks(id).unwrap(),
        t.scores(id, day(120), today()).unwrap(),
        t.streaks(id).unwrap(),
    )
}

#[test]
fn test_toggle_twice_restores_everything() {
    let t = HabitTracker::new(MemoryStore::new(), FixedClock::new(today()));
    let habit = t
        .create_habit(NewHabit::new("Stretch", Frequency::THREE_TIMES_PER_WEEK))
        .unwrap();
    for offset in [60, 58, 55, 40, 39, 38, 20, 12, 10, 9, 2] {
        t.toggle_repetition(habit.id, day(offset)).unwrap();
    }
    let before = snapshot(&t, habit.id);

    for offset in [0, 11, 39, 100] {
        t.toggle_repetition(habit.id, day(offset)).unwrap();
        // Read in between so the intermediate state is cached.
        t.today_score(habit.id).unwrap();
        t.toggle_repetition(habit.id, day(offset)).unwrap();
        assert_eq!(snapshot(&t, habit.id), before, "toggling day -{offset}");
    }
}

#[test]
fn test_daily_score_fixture_through_tracker() {
    let t = HabitTracker::new(MemoryStore::new(), FixedClock::new(today()));
    let habit = t.create_habit(NewHabit::new("Read", Frequency::DAILY)).unwrap();
    for offset in 0..20 {
        t.toggle_repetition(habit.id, day(offset)).unwrap();
    }
    let score = t.today_score(habit.id).unwrap();
    assert!((score - 0.655747).abs() < 1e-6, "{score}");
    assert_eq!(t.score(habit.id, day(20)).unwrap(), 0.0);

    let scores = t.scores(habit.id, day(2), today()).unwrap();
    let values: Vec<f64> = scores.iter().map(|s| s.value).collect();
    for (actual, expected) in values.iter().zip([0.655747, 0.636894, 0.617008]) {
        assert!((actual - expected).abs() < 1e-6);
    }
}

#[test]
fn test_legacy_model_via_config() {
    let config = TrackerConfig {
        score_model: ScoreModel::Legacy,
        ..TrackerConfig::default()
    };
    let t = HabitTracker::with_config(MemoryStore::new(), FixedClock::new(today()), config);
    let habit = t.create_habit(NewHabit::new("Read", Frequency::DAILY)).unwrap();
    for offset in 0..20 {
        t.toggle_repetition(habit.id, day(offset)).unwrap();
    }
    let score = t.today_score(habit.id).unwrap();
    assert!((score - 0.655747).abs() < 1e-5, "{score}");
}

#[test]
fn test_clock_moves_forward_and_back() {
    let clock = Arc::new(FixedClock::new(today()));
    let t = HabitTracker::new(MemoryStore::new(), Arc::clone(&clock));
    let habit = t.create_habit(NewHabit::new("Walk", Frequency::WEEKLY)).unwrap();
    t.toggle_repetition(habit.id, today()).unwrap();
    assert_eq!(t.all_checkmarks(habit.id).unwrap().len(), 1);
    let hit_score = t.today_score(habit.id).unwrap();

    clock.advance(6);
    assert_eq!(t.today_value(habit.id).unwrap(), CheckmarkValue::YesAuto);
    assert_eq!(t.all_checkmarks(habit.id).unwrap().len(), 7);
    assert!(t.today_score(habit.id).unwrap() < hit_score);
    assert_eq!(t.streaks(habit.id).unwrap(), vec![Streak::new(today(), today().plus(6))]);

    clock.advance(1);
    assert_eq!(t.today_value(habit.id).unwrap(), CheckmarkValue::Unknown);
    assert_eq!(
        t.best_streaks(habit.id, 5).unwrap(),
        vec![Streak::new(today(), today().plus(6))]
    );

    clock.set(today());
    assert_eq!(t.all_checkmarks(habit.id).unwrap().len(), 1);
    assert_eq!(t.today_score(habit.id).unwrap(), hit_score);
    assert_eq!(t.streaks(habit.id).unwrap(), vec![Streak::new(today(), today())]);
}

#[test]
fn test_sqlite_backed_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habits.db");

    let id = {
        let t = HabitTracker::new(Database::open_at(&path).unwrap(), FixedClock::new(today()));
        let habit = t
            .create_habit(NewHabit::new("Journal", Frequency::TWO_TIMES_PER_WEEK))
            .unwrap();
        t.toggle_repetition(habit.id, day(5)).unwrap();
        t.toggle_repetition(habit.id, day(3)).unwrap();
        t.set_repetition(habit.id, day(1), RepetitionStatus::Skip).unwrap();
        habit.id
    };

    let t = HabitTracker::new(Database::open_at(&path).unwrap(), FixedClock::new(today()));
    let reps = t.repetitions(id, day(10), today()).unwrap();
    let statuses: Vec<RepetitionStatus> = reps.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            RepetitionStatus::YesManual,
            RepetitionStatus::YesManual,
            RepetitionStatus::Skip
        ]
    );
    assert_eq!(
        t.checkmark_values(id, day(5), today()).unwrap(),
        vec![
            CheckmarkValue::YesAuto,
            CheckmarkValue::YesAuto,
            CheckmarkValue::YesAuto,
            CheckmarkValue::YesManual,
            CheckmarkValue::YesAuto,
            CheckmarkValue::YesManual,
        ]
    );

    let memory = HabitTracker::new(MemoryStore::new(), FixedClock::new(today()));
    let mirror = memory
        .create_habit(NewHabit::new("Journal", Frequency::TWO_TIMES_PER_WEEK))
        .unwrap();
    for rep in &reps {
        memory
            .set_repetition(mirror.id, rep.timestamp, rep.status)
            .unwrap();
    }
    assert_eq!(snapshot(&memory, mirror.id), snapshot(&t, id));
}

#[test]
fn test_habits_are_independent_across_threads() {
    let t = Arc::new(HabitTracker::new(
        MemoryStore::new(),
        FixedClock::new(today()),
    ));
    let ids: Vec<i64> = (0..4)
        .map(|i| {
            t.create_habit(NewHabit::new(format!("habit {i}"), Frequency::DAILY))
                .unwrap()
                .id
        })
        .collect();

    std::thread::scope(|scope| {
        for (n, id) in ids.iter().enumerate() {
            let t = Arc::clone(&t);
            let id = *id;
            scope.spawn(move || {
                for offset in 0..(10 * (n as i64 + 1)) {
                    t.toggle_repetition(id, day(offset)).unwrap();
                    t.today_score(id).unwrap();
                }
            });
        }
    });

    for (n, id) in ids.iter().enumerate() {
        let expected = 10 * (n as i64 + 1);
        assert_eq!(
            t.streaks(*id).unwrap(),
            vec![Streak::new(day(expected - 1), today())]
        );
        let score = t.today_score(*id).unwrap();
        let formula = 1.0 - 0.5f64.powf(expected as f64 / 13.0);
        assert!((score - formula).abs() < 1e-9);
    }
}

#[test]
fn test_concurrent_reads_and_writes_on_one_habit() {
    let t = Arc::new(HabitTracker::new(
        MemoryStore::new(),
        FixedClock::new(today()),
    ));
    let id = t
        .create_habit(NewHabit::new("Focus", Frequency::WEEKLY))
        .unwrap()
        .id;

    std::thread::scope(|scope| {
        let writer = Arc::clone(&t);
        scope.spawn(move || {
            for offset in (0..70).step_by(7) {
                writer.toggle_repetition(id, day(offset)).unwrap();
            }
        });
        for _ in 0..3 {
            let reader = Arc::clone(&t);
            scope.spawn(move || {
                for _ in 0..50 {
                    let score = reader.today_score(id).unwrap();
                    assert!((0.0..=1.0).contains(&score));
                }
            });
        }
    });

    let fresh = HabitTracker::new(MemoryStore::new(), FixedClock::new(today()));
    let mirror = fresh
        .create_habit(NewHabit::new("Focus", Frequency::WEEKLY))
        .unwrap();
    for offset in (0..70).step_by(7) {
        fresh.toggle_repetition(mirror.id, day(offset)).unwrap();
    }
    assert_eq!(snapshot(&*t, id), snapshot(&fresh, mirror.id));
}

#[test]
fn test_huge_denominator_reads_stay_cheap() {
    let t = HabitTracker::new(MemoryStore::new(), FixedClock::new(today()));
    let habit = t
        .create_habit(NewHabit::new("Rare", Frequency::new(1, 20_000_000).unwrap()))
        .unwrap();
    for offset in 0..10 {
        t.toggle_repetition(habit.id, day(offset)).unwrap();
    }
    assert_eq!(t.today_value(habit.id).unwrap(), CheckmarkValue::YesManual);
    assert_eq!(t.all_checkmarks(habit.id).unwrap().len(), 10);
    assert_eq!(t.streaks(habit.id).unwrap(), vec![Streak::new(day(9), today())]);
}
