//! xferload CLI entry point.

mod commands;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process::ExitCode;

use commands::LogFormat;
use commands::run::RunStatus;
use xferload::config::ConfigOverrides;
use xferload::ui;

#[derive(Parser)]
#[command(name = "xferload")]
#[command(about = "Drive a file-transfer server with one client process per fixture file")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server, launch one client per fixture, then shut down
    Run {
        #[command(flatten)]
        target: TargetArgs,

        /// Server command (program followed by its leading arguments)
        #[arg(long = "server-cmd", num_args = 1.., value_name = "ARGV")]
        server_cmd: Option<Vec<String>>,

        /// Client command (program followed by its leading arguments)
        #[arg(long = "client-cmd", num_args = 1.., value_name = "ARGV")]
        client_cmd: Option<Vec<String>>,

        /// Address passed to the server and every client
        #[arg(long)]
        address: Option<String>,

        /// Port passed to the server and every client
        #[arg(short, long)]
        port: Option<u16>,

        /// Maximum transfer size passed to every client, in bytes
        #[arg(long)]
        max_transfer_size: Option<u64>,

        /// Client limit for the multiplexed server
        #[arg(long)]
        max_clients: Option<u16>,

        /// Delay between the last client exiting and joining the server
        #[arg(long)]
        settle_ms: Option<u64>,

        /// How long to wait for the server before interrupting it (0 waits forever)
        #[arg(long)]
        exit_timeout_ms: Option<u64>,

        /// Launch clients without waiting for the server to accept connections
        #[arg(long)]
        no_readiness: bool,

        /// Capture each child's output in this directory
        #[arg(long)]
        logs_dir: Option<PathBuf>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the fixtures a run would launch clients for
    Fixtures {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Options shared by every command that reads the configuration.
#[derive(Args)]
struct TargetArgs {
    /// Config file (defaults to ./xferload.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory scanned for fixture files
    #[arg(long)]
    content_root: Option<PathBuf>,

    /// Fixture file extension
    #[arg(long)]
    extension: Option<String>,
}

impl TargetArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            content_root: self.content_root.clone(),
            extension: self.extension.clone(),
            ..ConfigOverrides::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "xferload",
                &mut std::io::stdout(),
            );
            return ExitCode::SUCCESS;
        },
        Commands::Fixtures { target } => {
            commands::init_logging(cli.verbose, cli.log_format);
            commands::fixtures::execute(target.config.as_deref(), target.overrides())
                .map(|()| RunStatus::Passed)
        },
        Commands::Run {
            target,
            server_cmd,
            client_cmd,
            address,
            port,
            max_transfer_size,
            max_clients,
            settle_ms,
            exit_timeout_ms,
            no_readiness,
            logs_dir,
            json,
        } => {
            commands::init_logging(cli.verbose, cli.log_format);
            let overrides = ConfigOverrides {
                address,
                port,
                max_transfer_size,
                max_clients,
                server: server_cmd,
                client: client_cmd,
                settle_ms,
                exit_timeout_ms,
                no_readiness,
                logs_dir,
                ..target.overrides()
            };
            commands::run::execute(target.config.as_deref(), overrides, json).await
        },
    };

    match result {
        Ok(RunStatus::Passed) => ExitCode::SUCCESS,
        Ok(RunStatus::LaunchFailed) => ExitCode::FAILURE,
        Ok(RunStatus::ChildFailed) => ExitCode::from(2),
        Ok(RunStatus::Interrupted) => ExitCode::from(130),
        Err(e) => {
            ui::print_error_box("xferload failed", Some(&format!("{e:#}")));
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "xferload",
            "run",
            "--content-root",
            "books",
            "--server-cmd",
            "build/multiplex_server.o",
            "--client-cmd",
            "build/client.o",
            "--max-clients",
            "100",
            "--no-readiness",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Run {
                target,
                server_cmd,
                max_clients,
                no_readiness,
                ..
            } => {
                assert_eq!(target.content_root, Some(PathBuf::from("books")));
                assert_eq!(server_cmd, Some(vec!["build/multiplex_server.o".to_string()]));
                assert_eq!(max_clients, Some(100));
                assert!(no_readiness);
            },
            _ => panic!("expected run"),
        }
    }
}
