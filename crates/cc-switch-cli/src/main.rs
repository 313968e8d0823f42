use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    cc_switch_cli::cli::init_logging();

    // No arguments at all means interactive mode
    let interactive = std::env::args_os().len() <= 1;
    let cli = cc_switch_cli::cli::Cli::parse();

    cc_switch_cli::cli::run_cli(cli, interactive)
}
