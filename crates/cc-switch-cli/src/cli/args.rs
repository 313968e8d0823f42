//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::Parser;

/// cc-switch: Claude Code environment variable command line switch tool
#[derive(Parser, Debug)]
#[command(name = "cc-switch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Type: gaccode, anyrouter, kimi, custom
    #[arg(long = "type", value_name = "TYPE")]
    pub provider_type: Option<String>,

    /// ANTHROPIC_AUTH_TOKEN
    #[arg(long)]
    pub token: Option<String>,

    /// Custom BASE_URL, required if --type custom
    #[arg(long = "base_url", visible_alias = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Reset to default Claude Code and clear token
    #[arg(long)]
    pub reset: bool,

    /// Show the values currently written to the profile
    #[arg(long)]
    pub status: bool,

    /// Print the status as JSON (token is redacted); ignored without --status
    #[arg(long)]
    pub json: bool,

    /// Profile file to edit instead of the detected one
    #[arg(long, env = "CC_SWITCH_PROFILE", value_name = "PATH")]
    pub profile: Option<PathBuf>,
}

/// What a flag-mode invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Reset,
    Status {
        json: bool,
    },
    Switch {
        provider: String,
        token: String,
        custom_url: Option<String>,
    },
}

/// Flag mode without `--type`/`--token`, or `custom` without `--base_url`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingRequiredArgument;

/// Non-empty values pass through untouched.
fn present(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

impl Cli {
    /// Decide the action for flag mode. `--reset` overrides everything else.
    pub fn action(&self) -> Result<CliAction, MissingRequiredArgument> {
        if self.reset {
            return Ok(CliAction::Reset);
        }
        if self.status {
            return Ok(CliAction::Status { json: self.json });
        }

        let provider = present(&self.provider_type).ok_or(MissingRequiredArgument)?;
        let token = present(&self.token).ok_or(MissingRequiredArgument)?;
        let custom_url = present(&self.base_url);
        if provider == "custom" && custom_url.is_none() {
            return Err(MissingRequiredArgument);
        }

        Ok(CliAction::Switch {
            provider,
            token,
            custom_url,
        })
    }
}
