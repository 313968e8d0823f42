//! CLI command implementations

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::CommandFactory;
use console::{style, Term};

use cc_switch_core::{
    read_status, select_profile, write_env, EnvAssignment, HostEnv, OFFICIAL_BASE_URL,
};

use super::args::{Cli, CliAction};
use super::interactive::{
    collect_choice, DialoguerPrompter, InteractiveOutcome, LinePrompter, Prompter,
};

/// Run the CLI
///
/// `interactive` is set when the process got no arguments at all.
pub fn run_cli(cli: Cli, interactive: bool) -> ExitCode {
    let term = Term::stdout();
    let host = HostEnv::from_process().with_profile_override(cli.profile.clone());

    if interactive {
        if term.is_term() && io::stdin().is_terminal() {
            let mut prompter = DialoguerPrompter::new(&term);
            return run_interactive(&mut prompter, &host, &term);
        }
        log::debug!("stdin or stdout is not a terminal, reading answers line by line");
        let mut prompter = LinePrompter::new(io::stdin().lock(), io::stdout());
        return run_interactive(&mut prompter, &host, &term);
    }

    let action = match cli.action() {
        Ok(action) => action,
        Err(_) => {
            eprintln!(
                "{} --type and --token are required (and --base_url with --type custom)",
                style("✗").red()
            );
            let _ = Cli::command().print_help();
            println!();
            return ExitCode::from(1);
        }
    };

    exit_code(match action {
        CliAction::Reset => reset(&host, &term),
        CliAction::Status { json } => status(&host, &term, json),
        CliAction::Switch {
            provider,
            token,
            custom_url,
        } => switch(&host, &term, &provider, token, custom_url.as_deref()),
    })
}

/// Menu-driven flow used when no arguments are given.
pub fn run_interactive(prompter: &mut dyn Prompter, host: &HostEnv, term: &Term) -> ExitCode {
    exit_code(interactive(prompter, host, term))
}

fn exit_code(result: Result<(), String>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", style("✗").red());
            ExitCode::from(1)
        }
    }
}

fn interactive(prompter: &mut dyn Prompter, host: &HostEnv, term: &Term) -> Result<(), String> {
    match collect_choice(prompter, term).map_err(|e| format!("{e:#}"))? {
        InteractiveOutcome::Reset => reset(host, term),
        InteractiveOutcome::Switch(assignment) => apply(host, term, &assignment),
        InteractiveOutcome::InvalidSelection => {
            let _ = term.write_line("Invalid selection.");
            Ok(())
        }
    }
}

fn switch(
    host: &HostEnv,
    term: &Term,
    provider: &str,
    token: String,
    custom_url: Option<&str>,
) -> Result<(), String> {
    let assignment =
        EnvAssignment::for_provider(provider, token, custom_url).map_err(|e| e.to_string())?;
    log::debug!("Switching to {provider} ({})", assignment.base_url);
    apply(host, term, &assignment)
}

fn reset(host: &HostEnv, term: &Term) -> Result<(), String> {
    apply(host, term, &EnvAssignment::reset())?;
    let _ = term.write_line(&format!(
        "Reset to official Claude Code ({OFFICIAL_BASE_URL}) and cleared token."
    ));
    Ok(())
}

/// Select the profile, upsert the assignments and report where they went.
fn apply(host: &HostEnv, term: &Term, assignment: &EnvAssignment) -> Result<(), String> {
    let target = select_profile(host).map_err(|e| e.to_string())?;
    write_env(&target, assignment).map_err(|e| format!("Failed to write profile: {e}"))?;

    let _ = term.write_line(&format!(
        "{} Written to {}",
        style("✓").green(),
        target.path.display()
    ));
    let _ = term.write_line(&format!("{}", style(target.reload_hint()).dim()));
    Ok(())
}

/// Display what the profile currently assigns
fn status(host: &HostEnv, term: &Term, as_json: bool) -> Result<(), String> {
    let status = select_profile(host)
        .and_then(|target| read_status(&target))
        .map_err(|e| format!("Failed to read profile: {e}"))?
        .redacted();

    if as_json {
        let text = serde_json::to_string_pretty(&status)
            .map_err(|e| format!("Failed to serialize JSON output: {e}"))?;
        let _ = term.write_line(&text);
        return Ok(());
    }

    let not_set = || style("(not set)").dim().to_string();

    let _ = term.write_line(&format!(
        "\n{}",
        style("Profile Status").bold().underlined()
    ));
    let _ = term.write_line("");
    let _ = term.write_line(&format!(
        "  {:10} {}",
        style("Path:").bold(),
        status.path.display()
    ));
    let _ = term.write_line(&format!(
        "  {:10} {}",
        style("Exists:").bold(),
        if status.exists {
            style("yes").green().to_string()
        } else {
            style("no").dim().to_string()
        }
    ));
    let _ = term.write_line(&format!(
        "  {:10} {}",
        style("Base URL:").bold(),
        status.base_url.clone().unwrap_or_else(not_set)
    ));
    let token_text = match status.token {
        Some(t) if t.is_empty() => style("(empty)").dim().to_string(),
        Some(t) => t,
        None => not_set(),
    };
    let _ = term.write_line(&format!("  {:10} {}", style("Token:").bold(), token_text));
    let _ = term.write_line("");
    Ok(())
}
