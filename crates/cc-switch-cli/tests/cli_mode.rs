use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use cc_switch_cli::cli::{Cli, CliAction, MissingRequiredArgument};
use clap::Parser;
use tempfile::TempDir;

fn cc_switch_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cc-switch"));
    cmd.env("HOME", home);
    cmd.env("USERPROFILE", home);
    cmd.env("SHELL", "/bin/zsh");
    cmd.env_remove("CC_SWITCH_PROFILE");
    cmd.env_remove("CC_SWITCH_LOG");
    cmd.stdin(Stdio::null());
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    cc_switch_cmd(home)
        .args(args)
        .output()
        .expect("run cc-switch binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["cc-switch"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn cli_switch_parsing() {
    let cli = parse(&["--type", "kimi", "--token", "abc"]);
    assert_eq!(
        cli.action(),
        Ok(CliAction::Switch {
            provider: "kimi".to_string(),
            token: "abc".to_string(),
            custom_url: None,
        })
    );
}

#[test]
fn cli_base_url_accepts_both_spellings() {
    for flag in ["--base_url", "--base-url"] {
        let cli = parse(&["--type", "custom", "--token", "t", flag, "https://x.example"]);
        assert_eq!(cli.base_url.as_deref(), Some("https://x.example"));
        assert!(cli.action().is_ok());
    }
}

#[test]
fn cli_reset_overrides_other_flags() {
    let cli = parse(&["--reset", "--type", "custom", "--token", "abc"]);
    assert_eq!(cli.action(), Ok(CliAction::Reset));
}

#[test]
fn cli_missing_arguments_are_reported() {
    for args in [
        &["--type", "kimi"][..],
        &["--token", "abc"][..],
        &["--type", "custom", "--token", "abc"][..],
        &["--type", "kimi", "--token", ""][..],
    ] {
        assert_eq!(
            parse(args).action(),
            Err(MissingRequiredArgument),
            "{args:?}"
        );
    }
}

#[test]
fn cli_json_only_affects_status() {
    let cli = parse(&["--status", "--json"]);
    assert_eq!(cli.action(), Ok(CliAction::Status { json: true }));

    let cli = parse(&["--reset", "--json"]);
    assert_eq!(cli.action(), Ok(CliAction::Reset));

    let cli = parse(&["--json", "--type", "kimi", "--token", "abc"]);
    assert!(matches!(cli.action(), Ok(CliAction::Switch { .. })));

    assert_eq!(parse(&["--json"]).action(), Err(MissingRequiredArgument));
}

#[test]
fn cli_token_is_passed_verbatim() {
    let cli = parse(&["--type", "kimi", "--token", "  sk abc  "]);
    assert_eq!(
        cli.action(),
        Ok(CliAction::Switch {
            provider: "kimi".to_string(),
            token: "  sk abc  ".to_string(),
            custom_url: None,
        })
    );
}

#[test]
fn cli_provider_name_is_case_sensitive() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["--type", "KIMI", "--token", "abc"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid type or missing custom URL: 'KIMI'"));
    assert!(!home.path().join(".zshrc").exists());
}

#[test]
fn custom_without_base_url_prints_help_and_writes_nothing() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["--type", "custom", "--token", "abc"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Usage"));
    assert!(!home.path().join(".zshrc").exists());
    assert!(!home.path().join("Documents").exists());
}

#[test]
fn invalid_provider_exits_with_one() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["--type", "openai", "--token", "abc"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid type or missing custom URL"));
    assert!(!home.path().join(".zshrc").exists());
}

#[cfg(not(windows))]
#[test]
fn switch_writes_zshrc_and_is_idempotent() {
    let home = TempDir::new().unwrap();
    let rc = home.path().join(".zshrc");
    std::fs::write(&rc, "alias ll='ls -la'\n").unwrap();

    let output = run(home.path(), &["--type", "gaccode", "--token", "sk-test"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains(&format!("Written to {}", rc.display())));
    assert!(stdout(&output).contains("source"));

    let first = std::fs::read_to_string(&rc).unwrap();
    assert_eq!(
        first,
        "alias ll='ls -la'\n\nexport ANTHROPIC_AUTH_TOKEN=\"sk-test\"\nexport ANTHROPIC_BASE_URL=\"https://api.tu-zi.com\"\n"
    );

    let output = run(home.path(), &["--type", "gaccode", "--token", "sk-test"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(std::fs::read_to_string(&rc).unwrap(), first);
}

#[cfg(not(windows))]
#[test]
fn token_with_spaces_is_written_verbatim() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["--type", "kimi", "--token", "  sk abc  "]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let content = std::fs::read_to_string(home.path().join(".zshrc")).unwrap();
    assert!(content.contains("export ANTHROPIC_AUTH_TOKEN=\"  sk abc  \"\n"));
}

#[cfg(not(windows))]
#[test]
fn interactive_mode_reads_piped_answers() {
    let home = TempDir::new().unwrap();
    let mut child = cc_switch_cmd(home.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn cc-switch binary");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"1\n3\nkey\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains("Written to"));
    let content = std::fs::read_to_string(home.path().join(".zshrc")).unwrap();
    assert_eq!(
        content,
        "export ANTHROPIC_AUTH_TOKEN=\"key\"\nexport ANTHROPIC_BASE_URL=\"https://api.moonshot.cn/anthropic/\"\n"
    );
}

#[test]
fn interactive_mode_with_unreadable_choice_writes_nothing() {
    let home = TempDir::new().unwrap();
    let mut child = cc_switch_cmd(home.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn cc-switch binary");
    child.stdin.take().unwrap().write_all(b"x\n").unwrap();
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains("Invalid selection."));
    assert!(!home.path().join(".zshrc").exists());
    assert!(!home.path().join("Documents").exists());
}

#[cfg(not(windows))]
#[test]
fn reset_ignores_other_flags() {
    let home = TempDir::new().unwrap();
    let rc = home.path().join(".zshrc");

    let output = run(
        home.path(),
        &["--reset", "--type", "kimi", "--token", "sk-ignored"],
    );
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains("cleared token"));

    let content = std::fs::read_to_string(&rc).unwrap();
    assert!(content.contains("export ANTHROPIC_AUTH_TOKEN=\"\"\n"));
    assert!(content.contains("export ANTHROPIC_BASE_URL=\"https://api.anthropic.com\"\n"));
    assert!(!content.contains("sk-ignored"));
}

#[test]
fn profile_override_selects_powershell_syntax() {
    let home = TempDir::new().unwrap();
    let profile = home.path().join("ps").join("profile.ps1");

    let output = cc_switch_cmd(home.path())
        .env("CC_SWITCH_PROFILE", &profile)
        .args([
            "--type",
            "custom",
            "--base_url",
            "https://proxy.example/",
            "--token",
            "tok",
        ])
        .output()
        .expect("run cc-switch binary");
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains(". $PROFILE"));

    let content = std::fs::read_to_string(&profile).unwrap();
    assert_eq!(
        content,
        "$env:ANTHROPIC_AUTH_TOKEN='tok'\n$env:ANTHROPIC_BASE_URL='https://proxy.example/'\n"
    );
}

#[test]
fn status_json_redacts_token() {
    let home = TempDir::new().unwrap();
    let profile = home.path().join("env.sh");
    let profile_arg = profile.to_string_lossy().to_string();

    let output = run(
        home.path(),
        &[
            "--profile",
            &profile_arg,
            "--type",
            "anyrouter",
            "--token",
            "sk-1234567890abcd",
        ],
    );
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let output = run(home.path(), &["--profile", &profile_arg, "--status", "--json"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["exists"], true);
    assert_eq!(value["baseUrl"], "https://anyrouter.top");
    assert_eq!(value["token"], "sk-1****...abcd");
    assert!(!stdout(&output).contains("sk-1234567890abcd"));
}

#[test]
fn status_does_not_create_profile() {
    let home = TempDir::new().unwrap();
    let profile = home.path().join("missing").join(".bashrc");
    let profile_arg = profile.to_string_lossy().to_string();

    let output = run(home.path(), &["--profile", &profile_arg, "--status"]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains("Profile Status"));
    assert!(!profile.exists());
}
