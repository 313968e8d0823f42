//! Interactive CLI mode using dialoguer, with a plain line reader for
//! redirected stdin

use std::io::{BufRead, Write};

use anyhow::Context;
use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Input, Password, Select};

use cc_switch_core::{EnvAssignment, ProviderKind};

/// Source of interactive answers.
pub trait Prompter {
    /// Menu selection; `None` when the user cancels.
    fn select(&mut self, prompt: &str, items: &[&str]) -> anyhow::Result<Option<usize>>;
    fn input(&mut self, prompt: &str) -> anyhow::Result<String>;
    /// Like [`Prompter::input`] but without echoing.
    fn secret(&mut self, prompt: &str) -> anyhow::Result<String>;
}

pub struct DialoguerPrompter<'a> {
    term: &'a Term,
    theme: ColorfulTheme,
}

impl<'a> DialoguerPrompter<'a> {
    pub fn new(term: &'a Term) -> Self {
        Self {
            term,
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompter for DialoguerPrompter<'_> {
    fn select(&mut self, prompt: &str, items: &[&str]) -> anyhow::Result<Option<usize>> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_on_opt(self.term)
            .context("Selection error")
    }

    fn input(&mut self, prompt: &str) -> anyhow::Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text_on(self.term)
            .context("Input error")
    }

    fn secret(&mut self, prompt: &str) -> anyhow::Result<String> {
        Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact_on(self.term)
            .context("Input error")
    }
}

/// Numbered menus answered line by line, for when stdin or stdout is not a
/// terminal (`printf '1\n3\nkey\n' | cc-switch`).
pub struct LinePrompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Next line without its line ending; `None` at end of input.
    fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).context("Input error")? == 0 {
            return Ok(None);
        }
        let len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(len);
        Ok(Some(line))
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn select(&mut self, prompt: &str, items: &[&str]) -> anyhow::Result<Option<usize>> {
        for (idx, item) in items.iter().enumerate() {
            writeln!(self.writer, "{}) {item}", idx + 1)?;
        }
        let choices: Vec<String> = (1..=items.len()).map(|n| n.to_string()).collect();
        write!(self.writer, "{prompt} ({}): ", choices.join("/"))?;
        self.writer.flush()?;

        let choice = self
            .read_line()?
            .and_then(|line| line.trim().parse::<usize>().ok())
            .filter(|n| (1..=items.len()).contains(n))
            .map(|n| n - 1);
        Ok(choice)
    }

    fn input(&mut self, prompt: &str) -> anyhow::Result<String> {
        write!(self.writer, "{prompt}: ")?;
        self.writer.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    fn secret(&mut self, prompt: &str) -> anyhow::Result<String> {
        self.input(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveOutcome {
    Reset,
    Switch(EnvAssignment),
    /// Cancelled or out-of-range menu choice; nothing gets written.
    InvalidSelection,
}

const MAIN_MENU: [&str; 2] = [
    "Switch environment",
    "Reset to default Claude Code (official API) and clear token",
];

fn provider_label(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Custom => "custom BASE_URL",
        other => other.as_str(),
    }
}

/// Walk the user through the menus and return what should be written.
pub fn collect_choice(
    prompter: &mut dyn Prompter,
    term: &Term,
) -> anyhow::Result<InteractiveOutcome> {
    let _ = term.write_line(&format!(
        "\n{}",
        style("cc-switch interactive mode").bold().cyan()
    ));

    match prompter.select("Select an option", &MAIN_MENU)? {
        Some(0) => {}
        Some(1) => return Ok(InteractiveOutcome::Reset),
        _ => return Ok(InteractiveOutcome::InvalidSelection),
    }

    let labels: Vec<&str> = ProviderKind::ALL.iter().copied().map(provider_label).collect();
    let kind = match prompter.select("Select Claude Code type", &labels)? {
        Some(idx) => match ProviderKind::ALL.get(idx) {
            Some(kind) => *kind,
            None => return Ok(InteractiveOutcome::InvalidSelection),
        },
        None => return Ok(InteractiveOutcome::InvalidSelection),
    };

    let custom_url = if kind == ProviderKind::Custom {
        Some(prompter.input("Enter custom BASE_URL")?.trim().to_string())
    } else {
        None
    };
    let base_url = kind.base_url(custom_url.as_deref())?;

    let token = prompter
        .secret("Enter ANTHROPIC_AUTH_TOKEN")?
        .trim()
        .to_string();
    log::debug!("Interactive switch to {kind}");

    Ok(InteractiveOutcome::Switch(EnvAssignment::new(token, base_url)))
}
