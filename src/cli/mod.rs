use crate::config::Config;
use crate::global;
use crate::panel::PanelSpec;
use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "autostager")]
#[command(about = "Auto-move raised hands to the stage on Cisco collaboration devices", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Print version information
    Version,
    /// Print the UI extension panel XML that would be saved to the device
    Panel,
    /// Show the active configuration and where it lives
    Config,
}

pub fn handle_panel_command() -> Result<()> {
    let config = Config::load()?;
    let spec = PanelSpec::from(&config.panel);
    println!("{}", spec.render(None));
    Ok(())
}

pub fn handle_config_command() -> Result<()> {
    let config = Config::load()?;
    println!("Config file: {:?}", global::config_file()?);
    println!();
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
