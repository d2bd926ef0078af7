use chrono::{Local, NaiveDate, Timelike};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use nutrilog_core::{
    calories_from_macros, Clock, FoodAnalysis, KeyValueStore, Macros, MealEntry, MealEntryPatch,
    MealLedger, MealType, NewMealEntry, ScannedProduct,
};

use super::{parse_date, parse_id, parse_local_datetime, OutputFormat};

#[derive(Args)]
pub struct MealCommand {
    #[command(subcommand)]
    pub command: MealSubcommand,
}

#[derive(Subcommand)]
pub enum MealSubcommand {
    /// Record a meal by hand
    Add {
        /// Food name
        #[arg(long)]
        name: String,

        /// Meal type (breakfast, lunch, dinner, snack); guessed from the time if omitted
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        meal_type: Option<MealType>,

        /// Calories (kcal), estimated from the macros if omitted
        #[arg(long)]
        calories: Option<f64>,

        /// Protein (g)
        #[arg(long, default_value_t = 0.0)]
        protein: f64,

        /// Carbohydrates (g)
        #[arg(long, default_value_t = 0.0)]
        carbs: f64,

        /// Fats (g)
        #[arg(long, default_value_t = 0.0)]
        fats: f64,

        /// Portion weight (g)
        #[arg(long)]
        weight: Option<f64>,

        /// When the meal was eaten ("YYYY-MM-DD HH:MM"), defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Image reference (path or URL)
        #[arg(long)]
        image: Option<String>,
    },

    /// Record a meal from a food analysis or product scan JSON file
    Import {
        /// Path to the JSON file
        file: PathBuf,

        /// Treat the file as a product label scan (values per 100 g)
        #[arg(long)]
        scan: bool,

        /// Portion eaten in grams (product scans only)
        #[arg(long, default_value_t = 100.0)]
        grams: f64,

        /// Meal type, overriding the one in the file
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        meal_type: Option<MealType>,

        /// When the meal was eaten ("YYYY-MM-DD HH:MM"), defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Record estimates even if they look implausible
        #[arg(long)]
        force: bool,
    },

    /// List meals for a day or a date range
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Day to list (YYYY-MM-DD), defaults to today
        #[arg(long, short, conflicts_with_all = ["from", "to"])]
        date: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<String>,

        /// Only show one meal type
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        meal_type: Option<MealType>,
    },

    /// Change fields of a recorded meal
    Edit {
        /// Meal ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long = "type", short = 't', value_name = "TYPE")]
        meal_type: Option<MealType>,

        #[arg(long)]
        calories: Option<f64>,

        #[arg(long)]
        protein: Option<f64>,

        #[arg(long)]
        carbs: Option<f64>,

        #[arg(long)]
        fats: Option<f64>,

        #[arg(long)]
        at: Option<String>,

        #[arg(long)]
        image: Option<String>,
    },

    /// Change the portion weight and rescale nutrients to match
    Rescale {
        /// Meal ID
        id: String,

        /// New portion weight (g)
        #[arg(long)]
        weight: f64,
    },

    /// Delete a recorded meal
    Remove {
        /// Meal ID
        id: String,
    },
}

impl MealCommand {
    pub fn run<S: KeyValueStore, C: Clock>(
        &self,
        ledger: &mut MealLedger<S, C>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            MealSubcommand::Add {
                name,
                meal_type,
                calories,
                protein,
                carbs,
                fats,
                weight,
                at,
                image,
            } => {
                let timestamp = match at {
                    Some(value) => parse_local_datetime(value)?,
                    None => ledger.clock().now().with_timezone(&Local),
                };
                let meal_type = meal_type.unwrap_or_else(|| MealType::from_hour(timestamp.hour()));
                let calories = calories
                    .unwrap_or_else(|| calories_from_macros(*protein, *carbs, *fats).round());

                let mut new = NewMealEntry::new(
                    name,
                    meal_type,
                    timestamp,
                    Macros::new(calories, *protein, *carbs, *fats),
                );
                if let Some(w) = weight {
                    new = new.with_weight(*w);
                }
                if let Some(img) = image {
                    new = new.with_image(img);
                }

                let entry = ledger.add_meal(new)?;
                println!("Recorded meal:");
                println!();
                println!("{}", entry);
                Ok(())
            }
            MealSubcommand::Import {
                file,
                scan,
                grams,
                meal_type,
                at,
                force,
            } => {
                let timestamp = match at {
                    Some(value) => parse_local_datetime(value)?,
                    None => ledger.clock().now().with_timezone(&Local),
                };
                let contents = std::fs::read_to_string(file)
                    .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?;

                let new = if *scan {
                    let product: ScannedProduct = serde_json::from_str(&contents)
                        .map_err(|e| format!("Invalid product scan JSON: {}", e))?;
                    product.into_new_entry(*grams, timestamp, *meal_type)?
                } else {
                    let analysis: FoodAnalysis = serde_json::from_str(&contents)
                        .map_err(|e| format!("Invalid food analysis JSON: {}", e))?;
                    if !force {
                        analysis.check_plausible().map_err(|e| {
                            format!("Analysis looks implausible: {}. Use --force to record it.", e)
                        })?;
                    }
                    analysis.into_new_entry(timestamp, *meal_type)
                };

                let entry = ledger.add_meal(new)?;
                println!("Recorded {} meal:", entry.source);
                println!();
                println!("{}", entry);
                Ok(())
            }
            MealSubcommand::List {
                format,
                date,
                from,
                to,
                meal_type,
            } => {
                let (from_date, to_date) = match (from, to) {
                    (Some(f), Some(t)) => (parse_date(f)?, parse_date(t)?),
                    _ => {
                        let day = match date {
                            Some(d) => parse_date(d)?,
                            None => ledger.clock().today(),
                        };
                        (day, day)
                    }
                };
                if from_date > to_date {
                    return Err(format!("--from {} is after --to {}", from_date, to_date).into());
                }

                let meals: Vec<&MealEntry> = ledger
                    .get_meals_between(from_date, to_date)
                    .into_iter()
                    .filter(|m| meal_type.map_or(true, |t| m.meal_type == t))
                    .collect();

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&meals)?);
                    }
                    OutputFormat::Text => print_meal_list(&meals, from_date, to_date),
                }
                Ok(())
            }
            MealSubcommand::Edit {
                id,
                name,
                meal_type,
                calories,
                protein,
                carbs,
                fats,
                at,
                image,
            } => {
                let id = parse_id(id)?;
                let patch = MealEntryPatch {
                    food_name: name.clone(),
                    meal_type: *meal_type,
                    timestamp: at.as_deref().map(parse_local_datetime).transpose()?,
                    calories: *calories,
                    protein: *protein,
                    carbs: *carbs,
                    fats: *fats,
                    weight: None,
                    image: image.clone(),
                };
                if patch.is_empty() {
                    return Err("Nothing to update. Pass at least one field to change.".into());
                }

                if !ledger.update_meal(id, &patch)? {
                    return Err(format!("Meal not found: {}", id).into());
                }
                if let Some(entry) = ledger.get_meal(id) {
                    println!("Updated meal:");
                    println!();
                    println!("{}", entry);
                }
                Ok(())
            }
            MealSubcommand::Rescale { id, weight } => {
                let id = parse_id(id)?;
                let entry = ledger
                    .get_meal(id)
                    .ok_or_else(|| format!("Meal not found: {}", id))?;
                let old_weight = entry.portion_grams();
                let patch = entry.rescale_to_weight(*weight)?;

                ledger.update_meal(id, &patch)?;
                if let Some(entry) = ledger.get_meal(id) {
                    println!("Rescaled from {}g to {}g:", old_weight, weight);
                    println!();
                    println!("{}", entry);
                }
                Ok(())
            }
            MealSubcommand::Remove { id } => {
                let id = parse_id(id)?;
                if ledger.remove_meal(id) {
                    println!("Removed meal {}", id);
                } else {
                    println!("No meal with ID {}; nothing removed", id);
                }
                Ok(())
            }
        }
    }
}

fn print_meal_list(meals: &[&MealEntry], from: NaiveDate, to: NaiveDate) {
    if meals.is_empty() {
        if from == to {
            println!("No meals recorded for {}", from);
        } else {
            println!("No meals recorded for {} to {}", from, to);
        }
        return;
    }

    let mut days: Vec<NaiveDate> = meals.iter().map(|m| m.day()).collect();
    days.sort();
    days.dedup();

    for (i, day) in days.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", day);
        println!("{}", "-".repeat(60));

        let mut day_meals: Vec<&&MealEntry> = meals.iter().filter(|m| m.day() == *day).collect();
        day_meals.sort_by_key(|m| m.timestamp);

        for meal in &day_meals {
            println!("{}", format_meal_line(meal));
        }

        let totals: Macros = day_meals.iter().map(|m| m.macros()).sum();
        println!("  {}", "-".repeat(56));
        println!("  Daily Total: {}", totals);
    }

    println!("\nTotal: {} meal(s)", meals.len());
}

/// One-line listing: "  08:00 breakfast  Oatmeal (250g)  [id]" plus a macro line.
fn format_meal_line(meal: &MealEntry) -> String {
    let weight = meal
        .weight
        .map(|w| format!(" ({}g)", w))
        .unwrap_or_default();
    format!(
        "  {} {:10} {}{}  [{}]\n             {}",
        meal.timestamp.format("%H:%M"),
        meal.meal_type.to_string(),
        meal.food_name,
        weight,
        meal.id,
        meal.macros()
    )
}
