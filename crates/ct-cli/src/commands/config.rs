//! Config command
//!
//! Manage catch-thread configuration.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use std::fs;

use ct_core::config::Config;
use ct_core::export::ExportManager;

use super::GlobalOptions;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reset to default configuration
    Reset {
        /// Force reset without confirmation
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration
    Validate,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, options: &GlobalOptions) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show_config(options, json),
        ConfigCommand::Reset { force } => reset_config(options, force),
        ConfigCommand::Validate => validate_config(options),
    }
}

fn show_config(options: &GlobalOptions, as_json: bool) -> Result<()> {
    use colored::Colorize;

    let config_path = &options.config_path;
    let config = options.load_config()?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", "Configuration:".bold().underline());
    if config_path.exists() {
        println!("{}", config_path.display().to_string().dimmed());
    } else {
        println!(
            "{}",
            format!("{} not found, showing defaults", config_path.display()).dimmed()
        );
    }
    println!();
    print!(
        "{}",
        toml::to_string_pretty(&config).context("Failed to render configuration")?
    );
    println!();
    println!(
        "  Feed storage: {}",
        options.data_dir(&config).display().to_string().cyan()
    );

    Ok(())
}

fn reset_config(options: &GlobalOptions, force: bool) -> Result<()> {
    use colored::Colorize;

    let config_path = &options.config_path;

    if !force {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt("Reset configuration to defaults?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    if config_path.exists() {
        let backup_path = format!(
            "{}.backup-{}",
            config_path.display(),
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        fs::copy(config_path, &backup_path)?;
        println!("{} Backed up to {}", "✓".green(), backup_path);
    }

    Config::default()
        .save(config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("{} Configuration reset to defaults.", "✓".green());

    Ok(())
}

fn validate_config(options: &GlobalOptions) -> Result<()> {
    use colored::Colorize;

    let config_path = &options.config_path;

    if !config_path.exists() {
        println!(
            "{} No configuration at {}, defaults apply",
            "ℹ".blue(),
            config_path.display()
        );
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("{} Configuration is valid", "✓".green());
            println!(
                "  Default format: {} (available: {})",
                config.export.default_format.cyan(),
                ExportManager::new().available_formats().join(", ")
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            bail!("Invalid configuration at {}", config_path.display())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn options_in(dir: &TempDir) -> GlobalOptions {
        GlobalOptions {
            config_path: dir.path().join(".catch-thread/config.toml"),
            data_dir: Some(dir.path().join("data")),
        }
    }

    #[test]
    fn test_reset_writes_defaults() {
        let temp = TempDir::new().unwrap();
        let options = options_in(&temp);

        reset_config(&options, true).unwrap();
        assert!(options.config_path.exists());
        validate_config(&options).unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let temp = TempDir::new().unwrap();
        let options = options_in(&temp);
        fs::create_dir_all(options.config_path.parent().unwrap()).unwrap();
        fs::write(&options.config_path, "[export]\nindent_width = 0\n").unwrap();

        assert!(validate_config(&options).is_err());
    }

    #[test]
    fn test_validate_missing_file_is_ok() {
        let options = GlobalOptions {
            config_path: PathBuf::from("/nonexistent/catch-thread/config.toml"),
            data_dir: None,
        };
        assert!(validate_config(&options).is_ok());
    }
}
