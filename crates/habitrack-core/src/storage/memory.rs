//! In-memory [`HabitStore`], for tests and ephemeral trackers.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::HabitStore;
use crate::error::{CoreError, Result};
use crate::models::{Habit, HabitId, NewHabit, Repetition, Timestamp};

#[derive(Debug, Default)]
pub struct MemoryStore {
    habits: BTreeMap<HabitId, Habit>,
    repetitions: BTreeMap<(HabitId, Timestamp), Repetition>,
    next_id: HabitId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HabitStore for MemoryStore {
    fn create_habit(&mut self, habit: &NewHabit, created_at: DateTime<Utc>) -> Result<Habit> {
        habit.validate()?;
        self.next_id += 1;
        let created = Habit {
            id: self.next_id,
            name: habit.name.clone(),
            description: habit.description.clone(),
            frequency: habit.frequency,
            archived: false,
            position: self.habits.len() as u32,
            created_at,
        };
        self.habits.insert(created.id, created.clone());
        Ok(created)
    }

    fn get_habit(&self, id: HabitId) -> Result<Option<Habit>> {
        Ok(self.habits.get(&id).cloned())
    }

    fn list_habits(&self) -> Result<Vec<Habit>> {
        let mut habits: Vec<Habit> = self.habits.values().cloned().collect();
        habits.sort_by_key(|h| (h.position, h.id));
        Ok(habits)
    }

    fn update_habit(&mut self, habit: &Habit) -> Result<()> {
        let slot = self
            .habits
            .get_mut(&habit.id)
            .ok_or(CoreError::HabitNotFound(habit.id))?;
        *slot = habit.clone();
        Ok(())
    }

    fn delete_habit(&mut self, id: HabitId) -> Result<bool> {
        let Some(removed) = self.habits.remove(&id) else {
            return Ok(false);
        };
        for habit in self.habits.values_mut() {
            if habit.position > removed.position {
                habit.position -= 1;
            }
        }
        self.repetitions.retain(|(habit, _), _| *habit != id);
        Ok(true)
    }

    fn repetitions(
        &self,
        id: HabitId,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<Vec<Repetition>> {
        Ok(self
            .repetitions
            .range((id, Timestamp::MIN)..=(id, Timestamp::MAX))
            .map(|(_, rep)| rep)
            .filter(|rep| from.map_or(true, |f| !rep.timestamp.is_older_than(f)))
            .filter(|rep| to.map_or(true, |t| !rep.timestamp.is_newer_than(t)))
            .cloned()
            .collect())
    }

    fn repetition_at(&self, id: HabitId, day: Timestamp) -> Result<Option<Repetition>> {
        Ok(self.repetitions.get(&(id, day)).cloned())
    }

    fn upsert_repetition(&mut self, rep: &Repetition) -> Result<()> {
        if !self.habits.contains_key(&rep.habit_id) {
            return Err(CoreError::HabitNotFound(rep.habit_id));
        }
        self.repetitions
            .insert((rep.habit_id, rep.timestamp), rep.clone());
        Ok(())
    }

    fn delete_repetition(&mut self, id: HabitId, day: Timestamp) -> Result<bool> {
        Ok(self.repetitions.remove(&(id, day)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, RepetitionStatus};

    fn day(d: u32) -> Timestamp {
        Timestamp::from_ymd(2024, 5, d).unwrap()
    }

    #[test]
    fn habits_keep_positions() {
        let mut store = MemoryStore::new();
        let a = store
            .create_habit(&NewHabit::new("Run", Frequency::WEEKLY), Utc::now())
            .unwrap();
        let b = store
            .create_habit(&NewHabit::new("Read", Frequency::DAILY), Utc::now())
            .unwrap();
        let c = store
            .create_habit(&NewHabit::new("Stretch", Frequency::DAILY), Utc::now())
            .unwrap();
        assert_eq!((a.position, b.position, c.position), (0, 1, 2));

        assert!(store.delete_habit(b.id).unwrap());
        assert!(!store.delete_habit(b.id).unwrap());
        let names: Vec<(String, u32)> = store
            .list_habits()
            .unwrap()
            .into_iter()
            .map(|h| (h.name, h.position))
            .collect();
        assert_eq!(names, vec![("Run".into(), 0), ("Stretch".into(), 1)]);
    }

    #[test]
    fn repetitions_are_scoped_and_ordered() {
        let mut store = MemoryStore::new();
        let a = store
            .create_habit(&NewHabit::new("A", Frequency::DAILY), Utc::now())
            .unwrap();
        let b = store
            .create_habit(&NewHabit::new("B", Frequency::DAILY), Utc::now())
            .unwrap();
        for d in [9, 3, 6] {
            store.upsert_repetition(&Repetition::manual(a.id, day(d))).unwrap();
        }
        store.upsert_repetition(&Repetition::manual(b.id, day(1))).unwrap();
        store
            .upsert_repetition(&Repetition::new(a.id, day(6), RepetitionStatus::Skip))
            .unwrap();

        let days: Vec<Timestamp> = store
            .repetitions(a.id, None, None)
            .unwrap()
            .iter()
            .map(|r| r.timestamp)
            .collect();
        assert_eq!(days, vec![day(3), day(6), day(9)]);
        assert_eq!(
            store.repetition_at(a.id, day(6)).unwrap().map(|r| r.status),
            Some(RepetitionStatus::Skip)
        );
        assert_eq!(store.repetitions(a.id, Some(day(4)), Some(day(8))).unwrap().len(), 1);

        assert!(store.delete_repetition(a.id, day(3)).unwrap());
        assert!(!store.delete_repetition(a.id, day(3)).unwrap());
        store.delete_habit(a.id).unwrap();
        assert!(store.repetitions(a.id, None, None).unwrap().is_empty());
        assert!(matches!(
            store.upsert_repetition(&Repetition::manual(a.id, day(2))),
            Err(CoreError::HabitNotFound(_))
        ));
    }
}
