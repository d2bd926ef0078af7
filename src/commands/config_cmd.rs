use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use super::OutputFormat;
use crate::config::{Config, DEFAULT_LOG_LEVEL};

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

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        config_path: Option<&Path>,
    ) -> Result<(), Box<dyn std::error::Error>> {
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

                        println!("log_level: {}", config.log_level.value);
                        println!("  source: {}", config.log_level.source);
                    }
                }
                Ok(())
            }
            ConfigSubcommand::Init { force } => {
                let path = config_path
                    .map(Path::to_path_buf)
                    .unwrap_or_else(Config::default_config_path);
                let written = write_default_config(&path, *force)?;
                println!("Wrote default config to {}", written.display());
                Ok(())
            }
        }
    }
}

fn default_config_yaml() -> String {
    format!(
        "# nutrilog configuration\n\
         \n\
         # Directory holding meals.json, dailyGoals.json and mealGoals.json\n\
         data_dir: {}\n\
         \n\
         # Log filter used when RUST_LOG is not set (error, warn, info, debug, trace)\n\
         log_level: {}\n",
        Config::default_data_dir().display(),
        DEFAULT_LOG_LEVEL
    )
}

fn write_default_config(path: &Path, force: bool) -> Result<PathBuf, String> {
    if path.exists() && !force {
        return Err(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        ));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
    Ok(path.to_path_buf())
}
