use clap::{Args, Subcommand};
use serde::Serialize;

use nutrilog_core::{
    Clock, DailyGoals, DailyGoalsPatch, KeyValueStore, MacroGoalsPatch, MealGoals, MealLedger,
    MealType,
};

use super::OutputFormat;

#[derive(Args)]
pub struct GoalsCommand {
    #[command(subcommand)]
    pub command: GoalsSubcommand,
}

#[derive(Subcommand)]
pub enum GoalsSubcommand {
    /// Show daily and per-meal goals
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Change daily targets
    SetDaily {
        #[arg(long)]
        calories: Option<f64>,

        #[arg(long)]
        protein: Option<f64>,

        #[arg(long)]
        carbs: Option<f64>,

        #[arg(long)]
        fats: Option<f64>,

        /// Fiber (g)
        #[arg(long)]
        fiber: Option<f64>,

        /// Sodium (mg)
        #[arg(long)]
        sodium: Option<f64>,
    },

    /// Change targets for one meal type
    SetMeal {
        /// Meal type (breakfast, lunch, dinner, snack)
        meal_type: MealType,

        #[arg(long)]
        calories: Option<f64>,

        #[arg(long)]
        protein: Option<f64>,

        #[arg(long)]
        carbs: Option<f64>,

        #[arg(long)]
        fats: Option<f64>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoalsView<'a> {
    daily_goals: &'a DailyGoals,
    meal_goals: &'a MealGoals,
}

impl GoalsCommand {
    pub fn run<S: KeyValueStore, C: Clock>(
        &self,
        ledger: &mut MealLedger<S, C>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            GoalsSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        let view = GoalsView {
                            daily_goals: ledger.daily_goals(),
                            meal_goals: ledger.meal_goals(),
                        };
                        println!("{}", serde_json::to_string_pretty(&view)?);
                    }
                    OutputFormat::Text => {
                        print!("{}", render_goals(ledger.daily_goals(), ledger.meal_goals()));
                    }
                }
                Ok(())
            }
            GoalsSubcommand::SetDaily {
                calories,
                protein,
                carbs,
                fats,
                fiber,
                sodium,
            } => {
                let patch = DailyGoalsPatch {
                    calories: *calories,
                    protein: *protein,
                    carbs: *carbs,
                    fats: *fats,
                    fiber: *fiber,
                    sodium: *sodium,
                };
                if patch.is_empty() {
                    return Err("Nothing to update. Pass at least one target to change.".into());
                }

                ledger.update_daily_goals(&patch)?;
                println!("Daily goals updated:");
                println!("  {}", ledger.daily_goals());
                Ok(())
            }
            GoalsSubcommand::SetMeal {
                meal_type,
                calories,
                protein,
                carbs,
                fats,
            } => {
                let patch = MacroGoalsPatch {
                    calories: *calories,
                    protein: *protein,
                    carbs: *carbs,
                    fats: *fats,
                };
                if patch.is_empty() {
                    return Err("Nothing to update. Pass at least one target to change.".into());
                }

                ledger.update_meal_goals(*meal_type, &patch)?;
                println!("{} goals updated:", meal_type);
                println!("  {}", ledger.meal_goal(*meal_type).macros());
                Ok(())
            }
        }
    }
}

fn render_goals(daily: &DailyGoals, meals: &MealGoals) -> String {
    let mut out = String::new();
    out.push_str("Daily goals\n");
    out.push_str(&format!("  {}\n", daily));
    out.push_str("\nPer-meal goals\n");
    for meal_type in MealType::ALL {
        out.push_str(&format!(
            "  {:<10} {}\n",
            meal_type.to_string(),
            meals.get(meal_type).macros()
        ));
    }
    out
}
