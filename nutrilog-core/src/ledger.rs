//! The meal ledger: authoritative store of meal entries and nutrition goals.
//!
//! A ledger is opened once per user context over a [`KeyValueStore`] and handed
//! to whatever needs to read or record meals. On open, the persisted snapshots
//! replace the in-memory state; on every mutation, the affected snapshot is
//! overwritten in full.
//!
//! Persistence problems never reach the caller. An unreadable snapshot is
//! logged and replaced by its default, and a failed write is logged while the
//! in-memory state stays authoritative for the rest of the session.
//!
//! There is no cross-process coordination: two ledgers over the same store
//! overwrite each other's snapshots, last writer wins.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::ValidationError;
use crate::models::{
    DailyGoals, DailyGoalsPatch, MacroGoals, MacroGoalsPatch, Macros, MealEntry, MealEntryPatch,
    MealGoals, MealType, NewMealEntry,
};
use crate::storage::{KeyValueStore, SnapshotKey};

pub struct MealLedger<S, C = SystemClock> {
    store: S,
    clock: C,
    meals: Vec<MealEntry>,
    daily_goals: DailyGoals,
    meal_goals: MealGoals,
}

impl<S: KeyValueStore> MealLedger<S, SystemClock> {
    /// Opens a ledger over `store` using the system clock.
    pub fn with_store(store: S) -> Self {
        Self::open(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> MealLedger<S, C> {
    /// Opens a ledger, loading whatever snapshots `store` holds.
    pub fn open(store: S, clock: C) -> Self {
        let mut ledger = Self {
            store,
            clock,
            meals: Vec::new(),
            daily_goals: DailyGoals::default(),
            meal_goals: MealGoals::default(),
        };
        ledger.reload();
        ledger
    }

    /// Replaces the in-memory state with the persisted snapshots.
    ///
    /// Missing or unreadable snapshots fall back to their defaults independently.
    pub fn reload(&mut self) {
        self.meals = load_snapshot(&self.store, SnapshotKey::Meals).unwrap_or_default();
        self.daily_goals = load_snapshot(&self.store, SnapshotKey::DailyGoals).unwrap_or_default();
        self.meal_goals = load_snapshot(&self.store, SnapshotKey::MealGoals).unwrap_or_default();

        tracing::debug!(meals = self.meals.len(), "Loaded meal ledger");
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Records a meal and returns it with its assigned id.
    pub fn add_meal(&mut self, new: NewMealEntry) -> Result<MealEntry, ValidationError> {
        new.validate()?;

        let id = self.fresh_id();
        let entry = MealEntry::from_new(id, new, self.clock.now());
        self.meals.push(entry.clone());
        self.persist_meals();

        tracing::debug!(%id, meal_type = %entry.meal_type, "Added meal");
        Ok(entry)
    }

    /// Deletes a meal. Returns `false` if no meal has that id.
    pub fn remove_meal(&mut self, id: Uuid) -> bool {
        let before = self.meals.len();
        self.meals.retain(|m| m.id != id);
        if self.meals.len() == before {
            return false;
        }

        self.persist_meals();
        tracing::debug!(%id, "Removed meal");
        true
    }

    /// Merges `patch` into the meal with `id`. Returns `Ok(false)` if no meal has that id.
    ///
    /// The merged entry is validated as a whole before it replaces the stored one.
    pub fn update_meal(&mut self, id: Uuid, patch: &MealEntryPatch) -> Result<bool, ValidationError> {
        let Some(index) = self.meals.iter().position(|m| m.id == id) else {
            return Ok(false);
        };

        let updated = self.meals[index].patched(patch);
        updated.validate()?;
        self.meals[index] = updated;
        self.persist_meals();

        tracing::debug!(%id, "Updated meal");
        Ok(true)
    }

    pub fn get_meal(&self, id: Uuid) -> Option<&MealEntry> {
        self.meals.iter().find(|m| m.id == id)
    }

    /// All entries in insertion order.
    pub fn meals(&self) -> &[MealEntry] {
        &self.meals
    }

    /// Entries eaten on `date` (local calendar day), in insertion order.
    pub fn get_daily_meals(&self, date: NaiveDate) -> Vec<&MealEntry> {
        self.meals.iter().filter(|m| m.is_on(date)).collect()
    }

    /// Entries eaten between `from` and `to` inclusive, in insertion order.
    pub fn get_meals_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<&MealEntry> {
        self.meals
            .iter()
            .filter(|m| (from..=to).contains(&m.day()))
            .collect()
    }

    pub fn get_daily_totals(&self, date: NaiveDate) -> Macros {
        self.meals
            .iter()
            .filter(|m| m.is_on(date))
            .map(MealEntry::macros)
            .sum()
    }

    pub fn get_meal_totals(&self, date: NaiveDate, meal_type: MealType) -> Macros {
        self.meals
            .iter()
            .filter(|m| m.is_on(date) && m.meal_type == meal_type)
            .map(MealEntry::macros)
            .sum()
    }

    pub fn daily_goals(&self) -> &DailyGoals {
        &self.daily_goals
    }

    pub fn meal_goals(&self) -> &MealGoals {
        &self.meal_goals
    }

    pub fn meal_goal(&self, meal_type: MealType) -> &MacroGoals {
        self.meal_goals.get(meal_type)
    }

    /// Overwrites the supplied daily targets, keeping the rest.
    pub fn update_daily_goals(&mut self, patch: &DailyGoalsPatch) -> Result<(), ValidationError> {
        self.daily_goals = self.daily_goals.merged(patch)?;
        persist_snapshot(&mut self.store, SnapshotKey::DailyGoals, &self.daily_goals);
        Ok(())
    }

    /// Overwrites the supplied targets of one meal type, keeping the rest.
    pub fn update_meal_goals(
        &mut self,
        meal_type: MealType,
        patch: &MacroGoalsPatch,
    ) -> Result<(), ValidationError> {
        let merged = self.meal_goals.get(meal_type).merged(patch)?;
        *self.meal_goals.get_mut(meal_type) = merged;
        persist_snapshot(&mut self.store, SnapshotKey::MealGoals, &self.meal_goals);
        Ok(())
    }

    fn fresh_id(&self) -> Uuid {
        loop {
            let id = Uuid::new_v4();
            if self.get_meal(id).is_none() {
                return id;
            }
        }
    }

    fn persist_meals(&mut self) {
        persist_snapshot(&mut self.store, SnapshotKey::Meals, &self.meals);
    }
}

fn load_snapshot<S: KeyValueStore, T: DeserializeOwned>(store: &S, key: SnapshotKey) -> Option<T> {
    let blob = match store.load(key.as_str()) {
        Ok(Some(blob)) => blob,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(%key, error = %e, "Failed to read snapshot, using defaults");
            return None;
        }
    };

    match serde_json::from_str(&blob) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(%key, error = %e, "Failed to parse snapshot, using defaults");
            None
        }
    }
}

fn persist_snapshot<S: KeyValueStore, T: Serialize>(store: &mut S, key: SnapshotKey, value: &T) {
    let blob = match serde_json::to_string(value) {
        Ok(blob) => blob,
        Err(e) => {
            tracing::error!(%key, error = %e, "Failed to serialize snapshot");
            return;
        }
    };

    if let Err(e) = store.save(key.as_str(), &blob) {
        tracing::error!(%key, error = %e, "Failed to write snapshot");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::{FileStore, MemoryStore, StorageError};
    use chrono::{DateTime, Local, TimeZone, Utc};
    use tempfile::TempDir;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
    }

    fn ledger() -> MealLedger<MemoryStore, FixedClock> {
        MealLedger::open(MemoryStore::new(), clock())
    }

    fn at(day: u32, hour: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, day, hour, min, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn oatmeal() -> NewMealEntry {
        NewMealEntry::new(
            "Oatmeal",
            MealType::Breakfast,
            at(1, 8, 0),
            Macros::new(300.0, 10.0, 50.0, 5.0),
        )
    }

    fn salad() -> NewMealEntry {
        NewMealEntry::new(
            "Chicken salad",
            MealType::Lunch,
            at(1, 12, 30),
            Macros::new(500.0, 35.0, 20.0, 25.0),
        )
    }

    /// A store whose reads and writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }

        fn save(&mut self, _key: &str, _blob: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }
    }

    #[test]
    fn test_open_empty_store_uses_defaults() {
        let ledger = ledger();
        assert!(ledger.meals().is_empty());
        assert_eq!(ledger.daily_goals(), &DailyGoals::default());
        assert_eq!(ledger.meal_goals(), &MealGoals::default());
        assert!(ledger.store().is_empty());
    }

    #[test]
    fn test_add_meal_assigns_id_and_creation_time() {
        let mut ledger = ledger();
        let entry = ledger.add_meal(oatmeal()).unwrap();

        assert_eq!(entry.food_name, "Oatmeal");
        assert_eq!(entry.created_at, clock().now());
        assert_eq!(entry.timestamp, at(1, 8, 0));
        assert_eq!(ledger.get_meal(entry.id), Some(&entry));
        assert!(ledger.store().get("meals").is_some());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ledger = ledger();
        let a = ledger.add_meal(oatmeal()).unwrap();
        let b = ledger.add_meal(oatmeal()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_add_meal_rejects_invalid_entry() {
        let mut ledger = ledger();
        let mut bad = oatmeal();
        bad.calories = -100.0;

        assert!(ledger.add_meal(bad).is_err());
        assert!(ledger.meals().is_empty());
        assert!(ledger.store().get("meals").is_none());
    }

    #[test]
    fn test_breakfast_then_lunch_totals() {
        let mut ledger = ledger();
        ledger.add_meal(oatmeal()).unwrap();
        assert_eq!(
            ledger.get_daily_totals(date(1)),
            Macros::new(300.0, 10.0, 50.0, 5.0)
        );

        ledger.add_meal(salad()).unwrap();
        assert_eq!(ledger.get_daily_totals(date(1)).calories, 800.0);
        assert_eq!(
            ledger.get_meal_totals(date(1), MealType::Breakfast).calories,
            300.0
        );
        assert_eq!(
            ledger.get_meal_totals(date(1), MealType::Lunch).calories,
            500.0
        );
    }

    #[test]
    fn test_update_then_remove_scenario() {
        let mut ledger = ledger();
        let first = ledger.add_meal(oatmeal()).unwrap();
        ledger.add_meal(salad()).unwrap();

        let patch = MealEntryPatch {
            calories: Some(600.0),
            ..Default::default()
        };
        assert!(ledger.update_meal(first.id, &patch).unwrap());
        assert_eq!(ledger.get_daily_totals(date(1)).calories, 1100.0);
        assert_eq!(
            ledger.get_meal_totals(date(1), MealType::Breakfast).calories,
            600.0
        );

        assert!(ledger.remove_meal(first.id));
        assert_eq!(ledger.get_daily_totals(date(1)).calories, 500.0);

        assert!(!ledger.remove_meal(first.id));
        assert_eq!(ledger.get_daily_totals(date(1)).calories, 500.0);
    }

    #[test]
    fn test_remove_is_idempotent_and_unknown_id_writes_nothing() {
        let mut ledger = ledger();
        assert!(!ledger.remove_meal(Uuid::new_v4()));
        assert!(ledger.store().get("meals").is_none());

        let entry = ledger.add_meal(oatmeal()).unwrap();
        ledger.remove_meal(entry.id);
        let snapshot = ledger.store().get("meals").map(str::to_string);
        ledger.remove_meal(entry.id);

        assert_eq!(ledger.store().get("meals").map(str::to_string), snapshot);
        assert!(ledger.meals().is_empty());
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut ledger = ledger();
        ledger.add_meal(oatmeal()).unwrap();
        let patch = MealEntryPatch {
            calories: Some(1.0),
            ..Default::default()
        };

        assert!(!ledger.update_meal(Uuid::new_v4(), &patch).unwrap());
        assert_eq!(ledger.get_daily_totals(date(1)).calories, 300.0);
    }

    #[test]
    fn test_update_rejects_invalid_merge_and_keeps_entry() {
        let mut ledger = ledger();
        let entry = ledger.add_meal(oatmeal()).unwrap();
        let patch = MealEntryPatch {
            fats: Some(-1.0),
            calories: Some(900.0),
            ..Default::default()
        };

        assert!(ledger.update_meal(entry.id, &patch).is_err());
        assert_eq!(ledger.get_meal(entry.id), Some(&entry));
    }

    #[test]
    fn test_rescale_through_update() {
        let mut ledger = ledger();
        let entry = ledger.add_meal(oatmeal().with_weight(200.0)).unwrap();

        let patch = entry.rescale_to_weight(100.0).unwrap();
        ledger.update_meal(entry.id, &patch).unwrap();

        let updated = ledger.get_meal(entry.id).unwrap();
        assert_eq!(updated.weight, Some(100.0));
        assert_eq!(updated.macros(), Macros::new(150.0, 5.0, 25.0, 2.5));
    }

    #[test]
    fn test_daily_meals_grouped_by_local_day() {
        let mut ledger = ledger();
        let late = NewMealEntry::new(
            "Toast",
            MealType::Snack,
            at(1, 23, 59),
            Macros::new(100.0, 3.0, 15.0, 2.0),
        );
        let early = NewMealEntry::new(
            "Yogurt",
            MealType::Breakfast,
            at(2, 0, 1),
            Macros::new(150.0, 8.0, 12.0, 4.0),
        );
        ledger.add_meal(oatmeal()).unwrap();
        ledger.add_meal(late).unwrap();
        ledger.add_meal(early).unwrap();

        let day_one: Vec<&str> = ledger
            .get_daily_meals(date(1))
            .iter()
            .map(|m| m.food_name.as_str())
            .collect();
        assert_eq!(day_one, vec!["Oatmeal", "Toast"]);

        let day_two = ledger.get_daily_meals(date(2));
        assert_eq!(day_two.len(), 1);
        assert_eq!(day_two[0].food_name, "Yogurt");

        assert_eq!(ledger.get_meals_between(date(1), date(2)).len(), 3);
        assert_eq!(ledger.get_meals_between(date(2), date(5)).len(), 1);
    }

    #[test]
    fn test_daily_meals_use_local_day_of_utc_instant() {
        let temp_dir = TempDir::new().unwrap();
        let mut ledger = MealLedger::open(FileStore::new(temp_dir.path().to_path_buf()), clock());

        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap();
        let local_day = instant.with_timezone(&Local).date_naive();
        let mut late = salad();
        late.timestamp = instant.with_timezone(&Local);
        let entry = ledger.add_meal(late).unwrap();

        assert_eq!(entry.day(), local_day);
        assert_eq!(ledger.get_daily_meals(local_day), vec![&entry]);

        let reopened = MealLedger::open(FileStore::new(temp_dir.path().to_path_buf()), clock());
        assert_eq!(reopened.get_daily_meals(local_day), vec![&entry]);
        assert_eq!(reopened.get_daily_totals(local_day).calories, 500.0);
    }

    #[test]
    fn test_empty_day_totals_are_zero() {
        let mut ledger = ledger();
        ledger.add_meal(oatmeal()).unwrap();

        assert_eq!(ledger.get_daily_totals(date(2)), Macros::zero());
        assert_eq!(
            ledger.get_meal_totals(date(1), MealType::Dinner),
            Macros::zero()
        );
        assert!(ledger.get_daily_meals(date(2)).is_empty());
    }

    #[test]
    fn test_category_totals_sum_to_daily_total() {
        let mut ledger = ledger();
        ledger.add_meal(oatmeal()).unwrap();
        ledger.add_meal(salad()).unwrap();
        ledger
            .add_meal(NewMealEntry::new(
                "Pasta",
                MealType::Dinner,
                at(1, 19, 0),
                Macros::new(650.0, 22.0, 90.0, 18.0),
            ))
            .unwrap();
        ledger
            .add_meal(NewMealEntry::new(
                "Apple",
                MealType::Snack,
                at(1, 16, 0),
                Macros::new(95.0, 0.5, 25.0, 0.3),
            ))
            .unwrap();

        let by_type: Macros = MealType::ALL
            .iter()
            .map(|t| ledger.get_meal_totals(date(1), *t))
            .sum();
        let daily = ledger.get_daily_totals(date(1));
        let from_meals: Macros = ledger
            .get_daily_meals(date(1))
            .iter()
            .map(|m| m.macros())
            .sum();

        assert_eq!(daily, from_meals);
        assert!((by_type.calories - daily.calories).abs() < 1e-9);
        assert!((by_type.protein - daily.protein).abs() < 1e-9);
        assert!((by_type.carbs - daily.carbs).abs() < 1e-9);
        assert!((by_type.fats - daily.fats).abs() < 1e-9);
    }

    #[test]
    fn test_update_daily_goals_merges() {
        let mut ledger = ledger();
        let patch = DailyGoalsPatch {
            calories: Some(1800.0),
            ..Default::default()
        };
        ledger.update_daily_goals(&patch).unwrap();

        let goals = ledger.daily_goals();
        assert_eq!(goals.calories, 1800.0);
        assert_eq!(goals.protein, 60.0);
        assert_eq!(goals.carbs, 250.0);
        assert_eq!(goals.fats, 70.0);
        assert!(ledger.store().get("dailyGoals").is_some());
    }

    #[test]
    fn test_update_meal_goals_only_touches_one_type() {
        let mut ledger = ledger();
        let patch = MacroGoalsPatch {
            protein: Some(40.0),
            ..Default::default()
        };
        ledger.update_meal_goals(MealType::Lunch, &patch).unwrap();

        assert_eq!(ledger.meal_goal(MealType::Lunch).protein, 40.0);
        assert_eq!(ledger.meal_goal(MealType::Lunch).calories, 700.0);
        assert_eq!(
            ledger.meal_goal(MealType::Dinner),
            MealGoals::default().get(MealType::Dinner)
        );
    }

    #[test]
    fn test_invalid_goal_patch_leaves_goals_untouched() {
        let mut ledger = ledger();
        let patch = DailyGoalsPatch {
            calories: Some(1500.0),
            fats: Some(-10.0),
            ..Default::default()
        };

        assert!(ledger.update_daily_goals(&patch).is_err());
        assert_eq!(ledger.daily_goals(), &DailyGoals::default());
        assert!(ledger.store().get("dailyGoals").is_none());
    }

    #[test]
    fn test_save_and_reopen_roundtrip() {
        let mut ledger = ledger();
        let a = ledger.add_meal(oatmeal().with_image("oats.jpg")).unwrap();
        let b = ledger.add_meal(salad().with_weight(320.0)).unwrap();
        ledger
            .update_daily_goals(&DailyGoalsPatch {
                sodium: Some(2300.0),
                ..Default::default()
            })
            .unwrap();
        ledger
            .update_meal_goals(
                MealType::Snack,
                &MacroGoalsPatch {
                    calories: Some(150.0),
                    ..Default::default()
                },
            )
            .unwrap();

        let reopened = MealLedger::open(ledger.into_store(), clock());

        let meals: Vec<&MealEntry> = reopened.get_daily_meals(date(1));
        assert_eq!(meals, vec![&a, &b]);
        assert_eq!(meals[0].timestamp, at(1, 8, 0));
        assert_eq!(reopened.daily_goals().sodium, Some(2300.0));
        assert_eq!(reopened.meal_goal(MealType::Snack).calories, 150.0);
    }

    #[test]
    fn test_file_store_roundtrip_keeps_subsecond_timestamps() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().to_path_buf());
        let mut ledger = MealLedger::open(store, clock());

        let mut new = oatmeal();
        new.timestamp = Local.timestamp_nanos(1_709_280_000_123_456_789);
        let entry = ledger.add_meal(new).unwrap();

        let reopened = MealLedger::open(FileStore::new(temp_dir.path().to_path_buf()), clock());
        let loaded = reopened.get_meal(entry.id).unwrap();
        assert_eq!(loaded, &entry);
        assert_eq!(
            loaded.timestamp.timestamp_nanos_opt(),
            Some(1_709_280_000_123_456_789)
        );
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_per_key() {
        let goals = DailyGoals {
            calories: 1700.0,
            ..Default::default()
        };
        let store = MemoryStore::new()
            .with_blob("meals", "{not json")
            .with_blob("dailyGoals", serde_json::to_string(&goals).unwrap())
            .with_blob("mealGoals", "42");

        let ledger = MealLedger::open(store, clock());

        assert!(ledger.meals().is_empty());
        assert_eq!(ledger.daily_goals().calories, 1700.0);
        assert_eq!(ledger.meal_goals(), &MealGoals::default());
    }

    #[test]
    fn test_reload_replaces_in_memory_state() {
        let mut ledger = ledger();
        ledger.add_meal(oatmeal()).unwrap();

        let mut other = MealLedger::open(MemoryStore::new(), clock());
        other.add_meal(salad()).unwrap();
        let snapshot = other.store().get("meals").unwrap().to_string();

        // Another session overwrites the snapshot.
        ledger.store.save("meals", &snapshot).unwrap();
        ledger.reload();

        let names: Vec<&str> = ledger.meals().iter().map(|m| m.food_name.as_str()).collect();
        assert_eq!(names, vec!["Chicken salad"]);
    }

    #[test]
    fn test_broken_store_degrades_to_in_memory() {
        let mut ledger = MealLedger::open(BrokenStore, clock());
        assert!(ledger.meals().is_empty());

        let entry = ledger.add_meal(oatmeal()).unwrap();
        ledger
            .update_daily_goals(&DailyGoalsPatch {
                calories: Some(2200.0),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(ledger.get_meal(entry.id), Some(&entry));
        assert_eq!(ledger.daily_goals().calories, 2200.0);
        assert!(ledger.remove_meal(entry.id));
    }
}
