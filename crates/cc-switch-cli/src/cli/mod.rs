//! CLI module for switching the Claude Code endpoint
//!
//! Flag mode writes the profile directly; with no arguments the user is
//! walked through a menu instead.

mod args;
mod commands;
mod interactive;

pub use args::{Cli, CliAction, MissingRequiredArgument};
pub use commands::{run_cli, run_interactive};
pub use interactive::{collect_choice, DialoguerPrompter, InteractiveOutcome, Prompter};

/// Initialise `env_logger`, filtered by `CC_SWITCH_LOG` (default `warn`).
pub fn init_logging() {
    let env = env_logger::Env::new().filter_or("CC_SWITCH_LOG", "warn");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
