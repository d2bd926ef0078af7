use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::macros::{round_tenth, Macros};
use super::meal_type::MealType;
use crate::error::{check_amount, check_weight, ValidationError};

/// Weight assumed for entries recorded without one.
pub const DEFAULT_PORTION_GRAMS: f64 = 100.0;

/// How an entry came into the journal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    #[default]
    Manual,
    Analysis,
    Scan,
}

impl fmt::Display for EntrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntrySource::Manual => write!(f, "manual"),
            EntrySource::Analysis => write!(f, "analysis"),
            EntrySource::Scan => write!(f, "scan"),
        }
    }
}

/// One recorded instance of food consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealEntry {
    pub id: Uuid,
    /// When the food was eaten.
    #[serde(rename = "date")]
    pub timestamp: DateTime<Local>,
    pub meal_type: MealType,
    pub food_name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub source: EntrySource,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}

impl MealEntry {
    pub(crate) fn from_new(id: Uuid, new: NewMealEntry, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            timestamp: new.timestamp,
            meal_type: new.meal_type,
            food_name: new.food_name,
            calories: new.calories,
            protein: new.protein,
            carbs: new.carbs,
            fats: new.fats,
            weight: new.weight,
            image: new.image,
            source: new.source,
            created_at,
        }
    }

    pub fn macros(&self) -> Macros {
        Macros::new(self.calories, self.protein, self.carbs, self.fats)
    }

    /// Local calendar day the meal was eaten on.
    pub fn day(&self) -> NaiveDate {
        self.day_in(&Local)
    }

    /// Calendar day the meal was eaten on, as seen in `tz`.
    pub fn day_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.timestamp.with_timezone(tz).date_naive()
    }

    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.day() == date
    }

    pub fn portion_grams(&self) -> f64 {
        self.weight.unwrap_or(DEFAULT_PORTION_GRAMS)
    }

    /// Returns a copy with every supplied patch field applied. The id is kept.
    pub fn patched(&self, patch: &MealEntryPatch) -> MealEntry {
        let mut entry = self.clone();
        if let Some(name) = &patch.food_name {
            entry.food_name = name.clone();
        }
        if let Some(meal_type) = patch.meal_type {
            entry.meal_type = meal_type;
        }
        if let Some(timestamp) = patch.timestamp {
            entry.timestamp = timestamp;
        }
        if let Some(calories) = patch.calories {
            entry.calories = calories;
        }
        if let Some(protein) = patch.protein {
            entry.protein = protein;
        }
        if let Some(carbs) = patch.carbs {
            entry.carbs = carbs;
        }
        if let Some(fats) = patch.fats {
            entry.fats = fats;
        }
        if let Some(weight) = patch.weight {
            entry.weight = Some(weight);
        }
        if let Some(image) = &patch.image {
            entry.image = Some(image.clone());
        }
        entry
    }

    /// Builds the patch that rescales calories and macros to a new portion weight.
    ///
    /// The ratio is taken against the current weight (100 g when none was recorded).
    /// Calories round to whole kcal, macros to one decimal.
    pub fn rescale_to_weight(&self, new_weight: f64) -> Result<MealEntryPatch, ValidationError> {
        check_weight(new_weight)?;
        let ratio = new_weight / self.portion_grams();

        Ok(MealEntryPatch {
            calories: Some((self.calories * ratio).round()),
            protein: Some(round_tenth(self.protein * ratio)),
            carbs: Some(round_tenth(self.carbs * ratio)),
            fats: Some(round_tenth(self.fats * ratio)),
            weight: Some(new_weight),
            ..Default::default()
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(
            &self.food_name,
            self.calories,
            self.protein,
            self.carbs,
            self.fats,
            self.weight,
        )
    }
}

fn validate_fields(
    food_name: &str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fats: f64,
    weight: Option<f64>,
) -> Result<(), ValidationError> {
    if food_name.trim().is_empty() {
        return Err(ValidationError::EmptyFoodName);
    }
    check_amount("calories", calories)?;
    check_amount("protein", protein)?;
    check_amount("carbs", carbs)?;
    check_amount("fats", fats)?;
    if let Some(w) = weight {
        check_weight(w)?;
    }
    Ok(())
}

impl fmt::Display for MealEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.food_name, self.meal_type)?;
        writeln!(f, "  Eaten: {}", self.timestamp.format("%Y-%m-%d %H:%M"))?;
        writeln!(f, "  {}", self.macros())?;
        if let Some(weight) = self.weight {
            writeln!(f, "  Weight: {}g", weight)?;
        }
        if let Some(image) = &self.image {
            writeln!(f, "  Image: {}", image)?;
        }
        write!(f, "  ID: {}", self.id)
    }
}

/// A meal entry before the ledger has assigned it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMealEntry {
    pub timestamp: DateTime<Local>,
    pub meal_type: MealType,
    pub food_name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub weight: Option<f64>,
    pub image: Option<String>,
    #[serde(default)]
    pub source: EntrySource,
}

impl NewMealEntry {
    pub fn new(
        food_name: impl Into<String>,
        meal_type: MealType,
        timestamp: DateTime<Local>,
        macros: Macros,
    ) -> Self {
        Self {
            timestamp,
            meal_type,
            food_name: food_name.into(),
            calories: macros.calories,
            protein: macros.protein,
            carbs: macros.carbs,
            fats: macros.fats,
            weight: None,
            image: None,
            source: EntrySource::Manual,
        }
    }

    pub fn with_weight(mut self, grams: f64) -> Self {
        self.weight = Some(grams);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_source(mut self, source: EntrySource) -> Self {
        self.source = source;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(
            &self.food_name,
            self.calories,
            self.protein,
            self.carbs,
            self.fats,
            self.weight,
        )
    }
}

/// Partial replacement of a meal entry's fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealEntryPatch {
    pub food_name: Option<String>,
    pub meal_type: Option<MealType>,
    pub timestamp: Option<DateTime<Local>>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
    pub weight: Option<f64>,
    pub image: Option<String>,
}

impl MealEntryPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
