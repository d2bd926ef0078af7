//! nutrilog core library
//!
//! Meal ledger, nutrition goals and the aggregation queries built on them.

pub mod analysis;
pub mod clock;
pub mod error;
pub mod ledger;
pub mod models;
pub mod progress;
pub mod storage;

pub use analysis::{FoodAnalysis, ScannedProduct};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::ValidationError;
pub use ledger::MealLedger;
pub use models::{
    calories_from_macros, DailyGoals, DailyGoalsPatch, EntrySource, MacroGoals, MacroGoalsPatch,
    Macros, MealEntry, MealEntryPatch, MealGoals, MealType, NewMealEntry,
};
pub use progress::{percentage_of_goal, remaining, MacroProgress, NutrientProgress};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SnapshotKey, StorageError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
