//! Adapters from external nutrition estimates to ledger entries.
//!
//! Food analysis and product scans arrive as structured JSON from an outside
//! service. The ledger does not judge whether their numbers are plausible;
//! callers that want a sanity check use [`FoodAnalysis::check_plausible`]
//! before recording.

use chrono::{DateTime, Local, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{check_amount, check_weight, ValidationError};
use crate::models::{
    round_tenth, EntrySource, Macros, MealType, NewMealEntry, DEFAULT_PORTION_GRAMS,
};

const MAX_CALORIES: f64 = 5000.0;
const MAX_PROTEIN: f64 = 500.0;
const MAX_CARBS: f64 = 1000.0;
const MAX_FATS: f64 = 500.0;
const MAX_WEIGHT: f64 = 10000.0;

/// Nutrition estimate for one identified food, per analysed portion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodAnalysis {
    pub food_name: String,
    #[serde(default = "default_portion")]
    pub estimated_weight_grams: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub sugar: Option<f64>,
    #[serde(default)]
    pub sodium: Option<f64>,
    #[serde(default)]
    pub cholesterol: Option<f64>,
    /// Free-form micronutrient notes.
    #[serde(default, alias = "vitamins")]
    pub notes: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "mealType")]
    pub meal_type: Option<MealType>,
}

fn default_portion() -> f64 {
    DEFAULT_PORTION_GRAMS
}

impl FoodAnalysis {
    pub fn macros(&self) -> Macros {
        Macros::new(self.calories, self.protein, self.carbs, self.fats)
    }

    /// Rejects negative values and estimates beyond what one serving can hold.
    pub fn check_plausible(&self) -> Result<(), ValidationError> {
        if self.food_name.trim().is_empty() {
            return Err(ValidationError::EmptyFoodName);
        }
        check_weight(self.estimated_weight_grams)?;
        check_bounded("estimated_weight_grams", self.estimated_weight_grams, MAX_WEIGHT)?;
        check_bounded("calories", self.calories, MAX_CALORIES)?;
        check_bounded("protein", self.protein, MAX_PROTEIN)?;
        check_bounded("carbs", self.carbs, MAX_CARBS)?;
        check_bounded("fats", self.fats, MAX_FATS)?;
        Ok(())
    }

    /// Turns the estimate into an entry eaten at `timestamp`.
    ///
    /// The meal type is taken from `meal_type`, then from the analysis itself,
    /// then guessed from the hour of `timestamp`.
    pub fn into_new_entry(
        self,
        timestamp: DateTime<Local>,
        meal_type: Option<MealType>,
    ) -> NewMealEntry {
        let meal_type = meal_type
            .or(self.meal_type)
            .unwrap_or_else(|| MealType::from_hour(timestamp.hour()));
        let macros = self.macros();

        let mut entry = NewMealEntry::new(self.food_name, meal_type, timestamp, macros)
            .with_weight(self.estimated_weight_grams)
            .with_source(EntrySource::Analysis);
        if let Some(image) = self.image {
            entry = entry.with_image(image);
        }
        entry
    }
}

/// Nutrition facts read off a product label, per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedProduct {
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub sugar: Option<f64>,
    #[serde(default)]
    pub sodium: Option<f64>,
    #[serde(default, alias = "category")]
    pub meal_type: Option<MealType>,
}

impl ScannedProduct {
    pub fn display_name(&self) -> String {
        match &self.brand {
            Some(brand) if !brand.trim().is_empty() => format!("{} ({})", self.name, brand),
            _ => self.name.clone(),
        }
    }

    /// Scales the per-100 g label values to a `grams` portion.
    pub fn portion(&self, grams: f64) -> Result<Macros, ValidationError> {
        check_weight(grams)?;
        let ratio = grams / 100.0;
        Ok(Macros::new(
            (self.calories * ratio).round(),
            round_tenth(self.protein * ratio),
            round_tenth(self.carbs * ratio),
            round_tenth(self.fats * ratio),
        ))
    }

    /// Turns the scan into an entry of `grams` eaten at `timestamp`.
    ///
    /// Meal type resolution follows [`FoodAnalysis::into_new_entry`], with a
    /// snack as the fallback since labels carry no time of day.
    pub fn into_new_entry(
        self,
        grams: f64,
        timestamp: DateTime<Local>,
        meal_type: Option<MealType>,
    ) -> Result<NewMealEntry, ValidationError> {
        let macros = self.portion(grams)?;
        let meal_type = meal_type.or(self.meal_type).unwrap_or(MealType::Snack);

        Ok(
            NewMealEntry::new(self.display_name(), meal_type, timestamp, macros)
                .with_weight(grams)
                .with_source(EntrySource::Scan),
        )
    }
}

fn check_bounded(field: &'static str, value: f64, max: f64) -> Result<(), ValidationError> {
    check_amount(field, value)?;
    if value > max {
        return Err(ValidationError::Implausible { field, value, max });
    }
    Ok(())
}
