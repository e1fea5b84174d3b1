use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::roster::Preset;

#[derive(Parser, Debug)]
#[command(
    name = "multihost",
    about = "Declare multi-host VM test environments for upgrade testing"
)]
pub struct Cli {
    /// Path to roster config (default: ./multihost.toml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Use a built-in roster instead of a config file
    #[arg(short, long, global = true, conflicts_with = "config")]
    pub preset: Option<Preset>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the roster for a virtualization platform
    Render {
        /// Output flavour
        #[arg(short, long, value_enum, default_value_t = Target::Vagrant)]
        target: Target,

        /// Write to this path instead of stdout (a directory for libvirt)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List the hosts the roster declares
    Hosts {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Lint the roster and look for its provisioning scripts
    Check,

    /// Write a starter multihost.toml
    Init {
        /// Skip prompts and write the preset as-is
        #[arg(long)]
        defaults: bool,
    },

    /// Print a concise reference of the config schema and commands
    Skill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// A Vagrantfile
    Vagrant,
    /// Libvirt network and domain XML
    Libvirt,
    /// The raw declaration as JSON
    Json,
}
