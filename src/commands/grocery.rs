use clap::Args;
use std::path::PathBuf;

use nutriplan_core::GroceryList;

use super::{open_session, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct GroceryCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the list to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl GroceryCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let session = open_session(config).await?;
        let list = GroceryList::from_plan(session.plan());

        let rendered = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&list)?,
            OutputFormat::Text if list.is_empty() => {
                "No ingredients in this week's plan.\n".to_string()
            }
            OutputFormat::Text => list.to_text(),
        };

        match &self.output {
            Some(path) => {
                std::fs::write(path, &rendered)
                    .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
                println!("Wrote {} item(s) to {}", list.len(), path.display());
            }
            None => println!("{}", rendered.trim_end()),
        }

        Ok(())
    }
}
