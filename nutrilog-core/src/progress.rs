//! Progress-toward-goal figures for display.
//!
//! Percentages are clamped at 100 so overconsumption shows as a full bar;
//! `remaining` floors at zero. Whether a target was exceeded is reported
//! separately through [`NutrientProgress::is_over`].

use serde::Serialize;

use crate::models::{DailyGoals, MacroGoals, Macros};

/// Share of `target` reached by `value`, as a whole percentage in `0..=100`.
///
/// A non-positive target counts as met as soon as anything was consumed.
pub fn percentage_of_goal(value: f64, target: f64) -> u32 {
    if target <= 0.0 {
        return if value > 0.0 { 100 } else { 0 };
    }
    let ratio = (value / target).clamp(0.0, 1.0);
    (ratio * 100.0).round() as u32
}

/// Amount left before `target` is reached, never negative.
pub fn remaining(value: f64, target: f64) -> f64 {
    (target - value).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NutrientProgress {
    pub consumed: f64,
    pub target: f64,
    pub percent: u32,
    pub remaining: f64,
    pub is_over: bool,
}

impl NutrientProgress {
    pub fn new(consumed: f64, target: f64) -> Self {
        Self {
            consumed,
            target,
            percent: percentage_of_goal(consumed, target),
            remaining: remaining(consumed, target),
            is_over: consumed > target,
        }
    }
}

/// Progress of a set of totals against calorie and macro targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroProgress {
    pub calories: NutrientProgress,
    pub protein: NutrientProgress,
    pub carbs: NutrientProgress,
    pub fats: NutrientProgress,
}

impl MacroProgress {
    pub fn new(totals: &Macros, targets: &Macros) -> Self {
        Self {
            calories: NutrientProgress::new(totals.calories, targets.calories),
            protein: NutrientProgress::new(totals.protein, targets.protein),
            carbs: NutrientProgress::new(totals.carbs, targets.carbs),
            fats: NutrientProgress::new(totals.fats, targets.fats),
        }
    }

    pub fn against_daily(totals: &Macros, goals: &DailyGoals) -> Self {
        Self::new(totals, &goals.macros())
    }

    pub fn against_meal(totals: &Macros, goals: &MacroGoals) -> Self {
        Self::new(totals, &goals.macros())
    }
}
