use clap::{Args, Subcommand};

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        println!(
                            "server_url: {}",
                            config.server_url.value.as_deref().unwrap_or("(not set)")
                        );
                        println!("  source: {}", config.server_url.source);
                        println!();

                        println!(
                            "user_id: {}",
                            config.user_id.value.as_deref().unwrap_or("(not set)")
                        );
                        println!("  source: {}", config.user_id.source);
                        println!();

                        println!("debounce_ms: {}", config.debounce_ms.value);
                        println!("  source: {}", config.debounce_ms.source);

                        if !config.is_remote_configured() {
                            println!();
                            println!("Remote sync is off: server_url and user_id are both required.");
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
