use clap::{Args, Subcommand};

use nutriplan_core::{check_server, HttpPlanClient, LocalPlanStorage, RemotePlanStore};

use crate::config::Config;

#[derive(Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    pub command: SyncSubcommand,
}

#[derive(Subcommand)]
pub enum SyncSubcommand {
    /// Replace the local plan with the server's copy
    Pull,
    /// Upload the local plan to the server
    Push,
    /// Show sync configuration and server reachability
    Status,
}

impl SyncCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let cache = LocalPlanStorage::new(config.data_dir.value.clone());

        match &self.command {
            SyncSubcommand::Pull => {
                let (client, user_id) = remote_target(config)?;
                match client.fetch_plan(&user_id).await? {
                    Some(plan) => {
                        cache.save(&plan)?;
                        println!(
                            "Pulled {} meal(s) for {} from {}",
                            plan.meal_count(),
                            user_id,
                            client.base_url()
                        );
                    }
                    None => println!("No plan stored on the server for {}", user_id),
                }
            }

            SyncSubcommand::Push => {
                let (client, user_id) = remote_target(config)?;
                let plan = cache.load()?.unwrap_or_default();
                client.save_plan(&user_id, &plan).await?;
                println!(
                    "Pushed {} meal(s) for {} to {}",
                    plan.meal_count(),
                    user_id,
                    client.base_url()
                );
            }

            SyncSubcommand::Status => {
                let Some(url) = &config.server_url.value else {
                    println!("Sync not configured.");
                    println!();
                    println!("Set server_url and user_id in the config file or via");
                    println!("NUTRIPLAN_SERVER_URL and NUTRIPLAN_USER_ID.");
                    return Ok(());
                };

                let reachable = check_server(url).await;
                println!("Sync Status");
                println!("-----------");
                println!("Server:     {}", url);
                println!(
                    "User:       {}",
                    config.user_id.value.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "Reachable:  {}",
                    if reachable { "yes" } else { "no" }
                );
                println!(
                    "Local plan: {}",
                    if cache.exists() {
                        cache.path().display().to_string()
                    } else {
                        "(none)".to_string()
                    }
                );
            }
        }

        Ok(())
    }
}

fn remote_target(config: &Config) -> Result<(HttpPlanClient, String), Box<dyn std::error::Error>> {
    let url = config
        .server_url
        .value
        .as_ref()
        .ok_or("Sync not configured. Set server_url in config or NUTRIPLAN_SERVER_URL")?;
    let user_id = config
        .user_id
        .value
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or("No user id. Set user_id in config or NUTRIPLAN_USER_ID")?;
    Ok((HttpPlanClient::new(url.clone())?, user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigSource, ConfigValue};
    use std::path::PathBuf;

    fn config(server_url: Option<&str>, user_id: Option<&str>) -> Config {
        Config {
            data_dir: ConfigValue::new(PathBuf::from("/tmp/nutriplan"), ConfigSource::Default),
            server_url: ConfigValue::new(server_url.map(String::from), ConfigSource::File),
            user_id: ConfigValue::new(user_id.map(String::from), ConfigSource::File),
            debounce_ms: ConfigValue::new(1000, ConfigSource::Default),
            config_file: None,
        }
    }

    #[test]
    fn test_remote_target_requires_server_url() {
        let err = remote_target(&config(None, Some("u1"))).unwrap_err();
        assert!(err.to_string().contains("server_url"));
    }

    #[test]
    fn test_remote_target_requires_user_id() {
        let err = remote_target(&config(Some("http://localhost:5000"), Some(""))).unwrap_err();
        assert!(err.to_string().contains("user id"));
    }

    #[test]
    fn test_remote_target() {
        let (client, user_id) =
            remote_target(&config(Some("http://localhost:5000/"), Some("u1"))).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(user_id, "u1");
    }
}
