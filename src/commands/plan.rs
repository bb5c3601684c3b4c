use clap::{Args, Subcommand};
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use nutriplan_core::{Day, DropOutcome, Meal, MealType, WeeklyPlan};

use super::{open_session, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct PlanCommand {
    #[command(subcommand)]
    pub command: PlanSubcommand,
}

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Show the weekly plan
    Show {
        /// Only show meals whose name contains this text
        #[arg(long, short)]
        search: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Put a meal into a slot, replacing any meal already there
    Assign {
        /// Day (Monday..Sunday or Mon..Sun)
        day: Day,

        /// Meal type (breakfast, lunch, dinner)
        #[arg(value_name = "TYPE")]
        meal_type: MealType,

        /// JSON file with the meal ("-" reads stdin)
        #[arg(long = "meal-file", short = 'm', value_name = "FILE")]
        meal_file: PathBuf,
    },

    /// Empty a slot
    Clear {
        /// Day (Monday..Sunday or Mon..Sun)
        day: Day,

        /// Meal type (breakfast, lunch, dinner)
        #[arg(value_name = "TYPE")]
        meal_type: MealType,
    },

    /// Empty every slot of the week
    ClearAll {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Move a meal onto another slot, replacing whatever is there
    Move {
        /// ID of the meal to move
        meal_id: String,

        /// Target slot (e.g. "Tuesday-lunch") or the ID of the meal to replace
        target: String,
    },

    /// Show macro totals per day
    Summary {
        /// Only this day
        #[arg(long, short)]
        day: Option<Day>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl PlanCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let mut session = open_session(config).await?;

        match &self.command {
            PlanSubcommand::Show { search, format } => {
                let view = session.filtered_view(search.as_deref().unwrap_or(""));
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&*view)?),
                    OutputFormat::Text => print_plan(&view),
                }
            }

            PlanSubcommand::Assign {
                day,
                meal_type,
                meal_file,
            } => {
                let meal = read_meal(meal_file)?;
                println!("Assigned '{}' to {} {}", meal.name, day, meal_type);
                session.assign(*day, *meal_type, Arc::new(meal));
            }

            PlanSubcommand::Clear { day, meal_type } => {
                session.clear(*day, *meal_type);
                println!("Cleared {} {}", day, meal_type);
            }

            PlanSubcommand::ClearAll { force } => {
                let count = session.plan().meal_count();
                if !force {
                    print!("Remove all {} meal(s) from the week? [y/N] ", count);
                    io::stdout().flush()?;

                    if !confirmed(&mut io::stdin().lock())? {
                        println!("Clear cancelled.");
                        return Ok(());
                    }
                }
                session.clear_all();
                println!("Cleared {} meal(s)", count);
            }

            PlanSubcommand::Move { meal_id, target } => {
                session.drag_start(meal_id.clone());
                let outcome = session.drag_end(target);
                report_drop(&outcome, meal_id, target)?;
            }

            PlanSubcommand::Summary { day, format } => {
                let days: Vec<Day> = match day {
                    Some(day) => vec![*day],
                    None => Day::ALL.to_vec(),
                };
                let totals: Vec<_> = days
                    .iter()
                    .map(|day| (day.name(), session.daily_summary(*day)))
                    .collect();

                match format {
                    OutputFormat::Json => {
                        let map: serde_json::Map<String, serde_json::Value> = totals
                            .iter()
                            .map(|(name, t)| Ok((name.to_string(), serde_json::to_value(t)?)))
                            .collect::<Result<_, serde_json::Error>>()?;
                        println!("{}", serde_json::to_string_pretty(&map)?);
                    }
                    OutputFormat::Text => {
                        for (name, t) in &totals {
                            println!("{:<10} {}", name, t);
                        }
                    }
                }
            }
        }

        if session.flush().await {
            tracing::debug!("Pushed plan before exit");
        }
        Ok(())
    }
}

fn report_drop(
    outcome: &DropOutcome,
    meal_id: &str,
    target: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        DropOutcome::Moved {
            from,
            to,
            displaced,
        } => {
            println!("Moved {} from {} to {}", meal_id, from, to);
            if let Some(meal) = displaced {
                println!("Removed '{}' from {}", meal.name, to);
            }
            Ok(())
        }
        DropOutcome::SameSlot => {
            println!("Meal {} is already at {}", meal_id, target);
            Ok(())
        }
        DropOutcome::UnknownSource | DropOutcome::NotDragging => {
            Err(format!("Meal not found in plan: {}", meal_id).into())
        }
        DropOutcome::InvalidTarget => Err(format!(
            "Invalid target '{}'. Use '<Day>-<mealType>' or a planned meal's ID",
            target
        )
        .into()),
    }
}

/// Reads one answer line; only "y" or "Y" confirms.
fn confirmed(input: &mut impl BufRead) -> io::Result<bool> {
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn read_meal(path: &PathBuf) -> Result<Meal, Box<dyn std::error::Error>> {
    let contents = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?
    };
    Ok(serde_json::from_str(&contents).map_err(|e| format!("Invalid meal JSON: {}", e))?)
}

fn print_plan(plan: &WeeklyPlan) {
    for (day, meals) in plan.days() {
        println!("{}", day);
        println!("{}", "-".repeat(day.name().len()));
        for meal_type in MealType::ALL {
            match meals.get(meal_type) {
                Some(meal) => println!("  {:<10} {} [{}]", meal_type.as_str(), meal, meal.id),
                None => println!("  {:<10} (empty)", meal_type.as_str()),
            }
        }
        if !meals.is_empty() {
            println!("  {:<10} {}", "total", meals.totals());
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_meal_from_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("meal.json");
        std::fs::write(&path, r#"{"id": "m1", "name": "Oats", "calories": 300}"#).unwrap();

        let meal = read_meal(&path).unwrap();
        assert_eq!(meal.name, "Oats");
        assert_eq!(meal.calories, 300.0);
    }

    #[test]
    fn test_read_meal_invalid_json() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("meal.json");
        std::fs::write(&path, "{").unwrap();

        let err = read_meal(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid meal JSON"));
    }

    #[test]
    fn test_confirmed() {
        assert!(confirmed(&mut "y\n".as_bytes()).unwrap());
        assert!(confirmed(&mut " Y \n".as_bytes()).unwrap());
        assert!(!confirmed(&mut "n\n".as_bytes()).unwrap());
        assert!(!confirmed(&mut "yes\n".as_bytes()).unwrap());
    }

    #[test]
    fn test_confirmed_defaults_to_cancel() {
        assert!(!confirmed(&mut "\n".as_bytes()).unwrap());
        assert!(!confirmed(&mut "".as_bytes()).unwrap());
    }

    #[test]
    fn test_report_drop_errors() {
        assert!(report_drop(&DropOutcome::UnknownSource, "x", "Monday-lunch").is_err());
        assert!(report_drop(&DropOutcome::InvalidTarget, "x", "nowhere").is_err());
        assert!(report_drop(&DropOutcome::SameSlot, "x", "Monday-lunch").is_ok());
    }
}
