use serde::{Deserialize, Serialize};
use std::fmt;

use super::macros::Macros;
use super::meal_type::MealType;
use crate::error::{check_amount, ValidationError};

/// Target intake for a whole day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
}

impl Default for DailyGoals {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 60.0,
            carbs: 250.0,
            fats: 70.0,
            fiber: None,
            sodium: None,
        }
    }
}

impl DailyGoals {
    pub fn macros(&self) -> Macros {
        Macros::new(self.calories, self.protein, self.carbs, self.fats)
    }

    /// Returns a copy with the supplied fields overwritten.
    pub fn merged(&self, patch: &DailyGoalsPatch) -> Result<DailyGoals, ValidationError> {
        let mut goals = self.clone();
        if let Some(v) = patch.calories {
            check_amount("calories", v)?;
            goals.calories = v;
        }
        if let Some(v) = patch.protein {
            check_amount("protein", v)?;
            goals.protein = v;
        }
        if let Some(v) = patch.carbs {
            check_amount("carbs", v)?;
            goals.carbs = v;
        }
        if let Some(v) = patch.fats {
            check_amount("fats", v)?;
            goals.fats = v;
        }
        if let Some(v) = patch.fiber {
            check_amount("fiber", v)?;
            goals.fiber = Some(v);
        }
        if let Some(v) = patch.sodium {
            check_amount("sodium", v)?;
            goals.sodium = Some(v);
        }
        Ok(goals)
    }
}

impl fmt::Display for DailyGoals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.macros())?;
        if let Some(fiber) = self.fiber {
            write!(f, " | Fiber: {:.1}g", fiber)?;
        }
        if let Some(sodium) = self.sodium {
            write!(f, " | Sodium: {:.0}mg", sodium)?;
        }
        Ok(())
    }
}

/// Field-by-field override for [`DailyGoals`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyGoalsPatch {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
    pub fiber: Option<f64>,
    pub sodium: Option<f64>,
}

impl DailyGoalsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Target intake for a single meal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MacroGoals {
    pub const fn new(calories: f64, protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fats,
        }
    }

    pub fn macros(&self) -> Macros {
        Macros::new(self.calories, self.protein, self.carbs, self.fats)
    }

    pub fn merged(&self, patch: &MacroGoalsPatch) -> Result<MacroGoals, ValidationError> {
        let mut goals = *self;
        if let Some(v) = patch.calories {
            check_amount("calories", v)?;
            goals.calories = v;
        }
        if let Some(v) = patch.protein {
            check_amount("protein", v)?;
            goals.protein = v;
        }
        if let Some(v) = patch.carbs {
            check_amount("carbs", v)?;
            goals.carbs = v;
        }
        if let Some(v) = patch.fats {
            check_amount("fats", v)?;
            goals.fats = v;
        }
        Ok(goals)
    }
}

/// Field-by-field override for [`MacroGoals`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MacroGoalsPatch {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
}

impl MacroGoalsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Per-meal targets, one for each [`MealType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealGoals {
    pub breakfast: MacroGoals,
    pub lunch: MacroGoals,
    pub dinner: MacroGoals,
    pub snack: MacroGoals,
}

impl Default for MealGoals {
    fn default() -> Self {
        Self {
            breakfast: MacroGoals::new(500.0, 15.0, 65.0, 15.0),
            lunch: MacroGoals::new(700.0, 25.0, 90.0, 25.0),
            dinner: MacroGoals::new(600.0, 20.0, 75.0, 20.0),
            snack: MacroGoals::new(200.0, 5.0, 25.0, 10.0),
        }
    }
}

impl MealGoals {
    pub fn get(&self, meal_type: MealType) -> &MacroGoals {
        match meal_type {
            MealType::Breakfast => &self.breakfast,
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
            MealType::Snack => &self.snack,
        }
    }

    pub fn get_mut(&mut self, meal_type: MealType) -> &mut MacroGoals {
        match meal_type {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
            MealType::Snack => &mut self.snack,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_goals_default() {
        let goals = DailyGoals::default();
        assert_eq!(goals.macros(), Macros::new(2000.0, 60.0, 250.0, 70.0));
        assert!(goals.fiber.is_none());
        assert!(goals.sodium.is_none());
    }

    #[test]
    fn test_daily_goals_merge_only_touches_supplied_fields() {
        let goals = DailyGoals::default();
        let patch = DailyGoalsPatch {
            calories: Some(1800.0),
            fiber: Some(30.0),
            ..Default::default()
        };
        let merged = goals.merged(&patch).unwrap();

        assert_eq!(merged.calories, 1800.0);
        assert_eq!(merged.protein, 60.0);
        assert_eq!(merged.carbs, 250.0);
        assert_eq!(merged.fats, 70.0);
        assert_eq!(merged.fiber, Some(30.0));
        assert!(merged.sodium.is_none());
    }

    #[test]
    fn test_daily_goals_merge_rejects_negative() {
        let patch = DailyGoalsPatch {
            protein: Some(-5.0),
            ..Default::default()
        };
        assert!(DailyGoals::default().merged(&patch).is_err());
    }

    #[test]
    fn test_meal_goals_default_per_type() {
        let goals = MealGoals::default();
        assert_eq!(goals.get(MealType::Breakfast).calories, 500.0);
        assert_eq!(goals.get(MealType::Lunch).calories, 700.0);
        assert_eq!(goals.get(MealType::Dinner).calories, 600.0);
        assert_eq!(goals.get(MealType::Snack), &MacroGoals::new(200.0, 5.0, 25.0, 10.0));
    }

    #[test]
    fn test_macro_goals_merge() {
        let goals = MacroGoals::new(500.0, 15.0, 65.0, 15.0);
        let patch = MacroGoalsPatch {
            fats: Some(20.0),
            ..Default::default()
        };
        assert_eq!(
            goals.merged(&patch).unwrap(),
            MacroGoals::new(500.0, 15.0, 65.0, 20.0)
        );
    }

    #[test]
    fn test_goals_json_shape() {
        let json = serde_json::to_string(&MealGoals::default()).unwrap();
        assert!(json.contains("\"breakfast\":{\"calories\":500.0"));

        let daily: DailyGoals =
            serde_json::from_str(r#"{"calories":1500,"protein":80,"carbs":150,"fats":50}"#)
                .unwrap();
        assert_eq!(daily.calories, 1500.0);
        assert!(daily.fiber.is_none());
    }

    #[test]
    fn test_daily_goals_display() {
        let mut goals = DailyGoals::default();
        goals.sodium = Some(2300.0);
        let output = goals.to_string();
        assert!(output.starts_with("Calories: 2000"));
        assert!(output.ends_with("Sodium: 2300mg"));
    }
}
