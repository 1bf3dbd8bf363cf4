mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "arlink", version, about = "ARNET drone-control client")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_connect_subcommand() {
        let cli = Cli::try_parse_from([
            "arlink",
            "connect",
            "192.168.42.1",
            "--name",
            "bench-rig",
            "--count",
            "5",
        ])
        .expect("connect args should parse");

        assert!(matches!(cli.command, Command::Connect(_)));
    }

    #[test]
    fn rejects_a_bad_device_address() {
        let err = Cli::try_parse_from(["arlink", "connect", "not-an-ip"])
            .expect_err("bad address should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_catalog_filters() {
        let cli = Cli::try_parse_from([
            "arlink",
            "catalog",
            "--feature",
            "ardrone3",
            "--kind",
            "commands",
        ])
        .expect("catalog args should parse");
        assert!(matches!(cli.command, Command::Catalog(_)));
    }
}
