//! Configuration file commands.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use cortexkey_config::{CONFIG_FILE, Settings, paths};

/// Inspect or create the configuration file.
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration file (defaults to the user config file)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Print the configuration file path
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the config command.
pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show(args.config.as_deref()),
        ConfigCommand::Path => {
            let path = args
                .config
                .clone()
                .unwrap_or_else(cortexkey_config::user_config_file);
            if !path.is_file() {
                tracing::info!(path = %path.display(), "configuration file does not exist");
            }
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommand::Init { force } => init(args.config, force),
    }
}

fn show(explicit: Option<&Path>) -> anyhow::Result<()> {
    let (settings, source) = Settings::load_or_default(explicit)?;
    let validation = settings.validate()?;

    match source {
        Some(path) => println!("# {}", path.display()),
        None => println!("# built-in defaults"),
    }
    let fallbacks = validation.fallback_bands();
    if !fallbacks.is_empty() {
        println!("# raw signal bands: {}", fallbacks.join(", "));
    }
    print!("{}", settings.to_toml()?);
    Ok(())
}

fn init(explicit: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = match explicit {
        Some(path) => path,
        None => paths::ensure_user_config_dir()?.join(CONFIG_FILE),
    };
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Settings::default().save(&path)?;
    tracing::info!(path = %path.display(), "wrote default configuration");
    println!("{}", path.display());
    Ok(())
}
