//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::app::AppContext;
use crate::commands::{self, ModuleCmd};

/// Declarative block-storage automation for Hitachi VSP arrays
#[derive(Parser)]
#[command(
    name = "vsp",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted before or after any subcommand.
#[derive(Args)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log REST calls at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Do not ask before deleting resources
    #[arg(short, long, global = true)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage one logical device (LDEV)
    Volume(ModuleCmd),

    /// List logical devices
    VolumeFacts(ModuleCmd),

    /// Manage one dynamic pool
    Pool(ModuleCmd),

    /// List dynamic pools
    PoolFacts(ModuleCmd),

    /// Manage one host group with its WWNs and LUN paths
    HostGroup(ModuleCmd),

    /// List host groups
    HostGroupFacts(ModuleCmd),

    /// Manage one ShadowImage pair (present, absent, split, resync)
    ShadowImage(ModuleCmd),

    /// List ShadowImage pairs
    ShadowImageFacts(ModuleCmd),

    /// Manage one NVM subsystem
    NvmSubsystem(ModuleCmd),

    /// List NVM subsystems
    NvmSubsystemFacts(ModuleCmd),

    /// List storage systems behind the REST server
    StorageFacts(ModuleCmd),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if a command fails outside a module result.
    pub fn run(self) -> Result<ExitCode> {
        crate::infra::logging::init(self.global.verbose);
        let app = AppContext::new(&self.global);

        match self.command {
            Command::Volume(cmd) => commands::volume::run(&app, &cmd),
            Command::VolumeFacts(cmd) => commands::volume::facts(&app, &cmd),
            Command::Pool(cmd) => commands::pool::run(&app, &cmd),
            Command::PoolFacts(cmd) => commands::pool::facts(&app, &cmd),
            Command::HostGroup(cmd) => commands::host_group::run(&app, &cmd),
            Command::HostGroupFacts(cmd) => commands::host_group::facts(&app, &cmd),
            Command::ShadowImage(cmd) => commands::shadow_image::run(&app, &cmd),
            Command::ShadowImageFacts(cmd) => commands::shadow_image::facts(&app, &cmd),
            Command::NvmSubsystem(cmd) => commands::nvm_subsystem::run(&app, &cmd),
            Command::NvmSubsystemFacts(cmd) => commands::nvm_subsystem::facts(&app, &cmd),
            Command::StorageFacts(cmd) => commands::storage::facts(&app, &cmd),
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => {
                commands::version::run(&app)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
