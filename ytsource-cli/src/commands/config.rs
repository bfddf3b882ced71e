//! `ytsource config` - inspect and manage the config file.

use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::info;
use ytsource_store::{SourceConfig, default_config_dir};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// `config` arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration.
    Show,

    /// Print where the config file lives.
    Path,

    /// Write a configuration file with the defaults.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Init { force } => init_config(*force, cli).await,
        ConfigAction::Reset => reset_config(cli).await,
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let config = SourceConfig::load_from(&cli.config_path()).await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_config(&config));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&formatter.redacted_config(&config))?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_path = cli.config_path();

    match cli.format {
        OutputFormat::Text => {
            println!("dir   {}", config_dir.display());
            println!("file  {}{}", config_path.display(), if config_path.exists() { "" } else { " (not created)" });
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "configDir": config_dir,
                "configFile": config_path,
                "exists": config_path.exists(),
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&paths)?);
        }
    }

    Ok(())
}

async fn init_config(force: bool, cli: &Cli) -> Result<()> {
    let path = cli.config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "Configuration already exists at {}, use --force to overwrite",
            path.display()
        );
    }

    SourceConfig::default().save_to(&path).await?;

    info!(path = %path.display(), "Configuration written");
    println!("Wrote default configuration to {}", path.display());

    Ok(())
}

async fn reset_config(cli: &Cli) -> Result<()> {
    let path = cli.config_path();

    if path.exists() {
        tokio::fs::remove_file(&path).await?;
        info!(path = %path.display(), "Config file removed");
        println!("Removed {}, defaults apply", path.display());
    } else {
        println!("Nothing to reset, {} does not exist", path.display());
    }

    Ok(())
}
