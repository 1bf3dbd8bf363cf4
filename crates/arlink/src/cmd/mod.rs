use std::net::IpAddr;

use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod catalog;
pub mod connect;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the built-in message catalog.
    Catalog(CatalogArgs),
    /// Connect to a device and print events until interrupted.
    Connect(ConnectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Catalog(args) => catalog::run(args, format),
        Command::Connect(args) => connect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Restrict to one feature (e.g. ardrone3).
    #[arg(long)]
    pub feature: Option<String>,
    /// Show only commands or only events.
    #[arg(long, value_parser = ["commands", "events"])]
    pub kind: Option<String>,
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Device address, e.g. 192.168.42.1 (drone) or 192.168.53.1 (controller).
    pub device: IpAddr,
    /// Discovery TCP port.
    #[arg(long, default_value = "44444")]
    pub discovery_port: u16,
    /// Controller name announced during discovery.
    #[arg(long, default_value = "arlink", env = "ARLINK_CONTROLLER_NAME")]
    pub name: String,
    /// Request the full state and settings dumps after connecting.
    #[arg(long)]
    pub all_states: bool,
    /// Exit after receiving N property updates.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}
