mod goals;
mod macros;
mod meal_entry;
mod meal_type;

pub use goals::{DailyGoals, DailyGoalsPatch, MacroGoals, MacroGoalsPatch, MealGoals};
pub use macros::{calories_from_macros, Macros};
pub(crate) use macros::round_tenth;
pub use meal_entry::{EntrySource, MealEntry, MealEntryPatch, NewMealEntry, DEFAULT_PORTION_GRAMS};
pub use meal_type::MealType;
