use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

use nutrilog_core::{
    Clock, KeyValueStore, MacroProgress, Macros, MealEntry, MealLedger, MealType,
    NutrientProgress,
};

use super::{parse_date, progress_bar, OutputFormat};

const BAR_WIDTH: usize = 20;

/// Show a day's intake against daily and per-meal goals
#[derive(Args)]
pub struct SummaryCommand {
    /// Day to summarize (YYYY-MM-DD), defaults to today
    #[arg(long, short)]
    pub date: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct DaySummary {
    date: NaiveDate,
    meal_count: usize,
    totals: Macros,
    daily: MacroProgress,
    meals: Vec<MealSummary>,
}

#[derive(Debug, Serialize)]
struct MealSummary {
    meal_type: MealType,
    meal_count: usize,
    totals: Macros,
    progress: MacroProgress,
}

impl SummaryCommand {
    pub fn run<S: KeyValueStore, C: Clock>(
        &self,
        ledger: &MealLedger<S, C>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let date = match &self.date {
            Some(d) => parse_date(d)?,
            None => ledger.clock().today(),
        };
        let summary = summarize(ledger, date);

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
            OutputFormat::Text => print!("{}", render_text(&summary)),
        }
        Ok(())
    }
}

fn summarize<S: KeyValueStore, C: Clock>(
    ledger: &MealLedger<S, C>,
    date: NaiveDate,
) -> DaySummary {
    let day_meals = ledger.get_daily_meals(date);
    let totals: Macros = day_meals.iter().map(|m| m.macros()).sum();

    let meals = MealType::ALL
        .iter()
        .map(|&meal_type| {
            let of_type: Vec<&MealEntry> = day_meals
                .iter()
                .copied()
                .filter(|m| m.meal_type == meal_type)
                .collect();
            let totals: Macros = of_type.iter().map(|m| m.macros()).sum();
            MealSummary {
                meal_type,
                meal_count: of_type.len(),
                totals,
                progress: MacroProgress::against_meal(&totals, ledger.meal_goal(meal_type)),
            }
        })
        .collect();

    DaySummary {
        date,
        meal_count: day_meals.len(),
        totals,
        daily: MacroProgress::against_daily(&totals, ledger.daily_goals()),
        meals,
    }
}

fn render_text(summary: &DaySummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Nutrition summary for {}\n", summary.date));
    out.push_str(&format!("{}\n", "=".repeat(40)));

    if summary.meal_count == 0 {
        out.push_str("No meals recorded.\n\n");
    }

    out.push_str("Daily goals\n");
    push_progress(&mut out, &summary.daily);

    for meal in summary.meals.iter().filter(|m| m.meal_count > 0) {
        out.push_str(&format!("\n{} ({} item(s))\n", meal.meal_type, meal.meal_count));
        push_progress(&mut out, &meal.progress);
    }
    out
}

fn push_progress(out: &mut String, progress: &MacroProgress) {
    out.push_str(&progress_line("Calories", "kcal", &progress.calories, 0));
    out.push_str(&progress_line("Protein", "g", &progress.protein, 1));
    out.push_str(&progress_line("Carbs", "g", &progress.carbs, 1));
    out.push_str(&progress_line("Fat", "g", &progress.fats, 1));
}

/// "  Protein   [########            ]  40%  24.0 / 60.0g  (36.0g left)"
fn progress_line(label: &str, unit: &str, p: &NutrientProgress, precision: usize) -> String {
    let status = if p.is_over {
        format!("over by {:.*}{}", precision, p.consumed - p.target, unit)
    } else {
        format!("{:.*}{} left", precision, p.remaining, unit)
    };
    format!(
        "  {:<9} {} {:>3}%  {:.*} / {:.*}{}  ({})\n",
        label,
        progress_bar(p.percent, BAR_WIDTH),
        p.percent,
        precision,
        p.consumed,
        precision,
        p.target,
        unit,
        status
    )
}
