//! Profile file editing
//!
//! Upserts the `ANTHROPIC_AUTH_TOKEN` / `ANTHROPIC_BASE_URL` assignment lines
//! in a shell or PowerShell profile. Matching is structural: each line is split
//! into `;`-separated statements, and a statement is an assignment when it
//! starts with optional `export` (or `$env:`), the variable name and `=`.
//! Everything else in the file is kept as is.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::AppError;
use crate::profile::{ensure_parent_dir, ProfileSyntax, ProfileTarget};
use crate::provider::{EnvAssignment, BASE_URL_VAR, TOKEN_VAR};

/// One matched assignment statement, split around its value.
#[derive(Debug, PartialEq, Eq)]
struct AssignmentLine<'a> {
    indent: &'a str,
    raw_value: &'a str,
    trailing: &'a str,
}

fn escape_char(syntax: ProfileSyntax) -> char {
    match syntax {
        ProfileSyntax::Posix => '\\',
        ProfileSyntax::PowerShell => '`',
    }
}

/// Split a line into `;`-separated statements. Separators inside quotes,
/// parentheses or a trailing `#` comment do not split.
fn split_statements(line: &str, syntax: ProfileSyntax) -> Vec<&str> {
    let escape = escape_char(syntax);
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut depth = 0usize;
    let mut prev: Option<char> = None;

    for (idx, c) in line.char_indices() {
        let before = prev.replace(c);
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            Some('\'') => {
                if c == '\'' {
                    quote = None;
                }
                continue;
            }
            Some(q) => {
                if c == escape {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            None => {}
        }
        match c {
            _ if c == escape => escaped = true,
            '\'' | '"' => quote = Some(c),
            '`' if syntax == ProfileSyntax::Posix => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '#' if before.map_or(true, char::is_whitespace) => break,
            ';' if depth == 0 => {
                pieces.push(&line[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    pieces.push(&line[start..]);
    pieces
}

fn parse_assignment<'a>(
    statement: &'a str,
    syntax: ProfileSyntax,
    name: &str,
) -> Option<AssignmentLine<'a>> {
    let body = statement.trim_start();
    let indent = &statement[..statement.len() - body.len()];
    if body.starts_with('#') {
        return None;
    }

    let rest = match syntax {
        ProfileSyntax::Posix => {
            let unexported = body
                .strip_prefix("export ")
                .map(str::trim_start)
                .unwrap_or(body);
            unexported.strip_prefix(name)?.strip_prefix('=')?
        }
        ProfileSyntax::PowerShell => {
            let after_scope = strip_prefix_ignore_case(body, "$env:")?;
            let after_name = strip_prefix_ignore_case(after_scope, name)?;
            after_name.trim_start().strip_prefix('=')?.trim_start()
        }
    };

    let value_len = value_extent(rest, syntax);
    Some(AssignmentLine {
        indent,
        raw_value: &rest[..value_len],
        trailing: &rest[value_len..],
    })
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Byte length of the value in `rest`. Only whitespace or a `#` comment may
/// follow a value; anything else means the whole rest of the statement is
/// the value, so a replacement never leaves half an expression behind.
fn value_extent(rest: &str, syntax: ProfileSyntax) -> usize {
    let token = token_extent(rest, syntax);
    let after = &rest[token..];
    let remainder = after.trim_start();
    let clean = remainder.is_empty()
        || (remainder.starts_with('#') && remainder.len() < after.len());
    if clean {
        token
    } else {
        rest.len()
    }
}

/// Byte length of the leading word, quoted string or subexpression.
fn token_extent(rest: &str, syntax: ProfileSyntax) -> usize {
    let mut chars = rest.char_indices();
    match chars.next() {
        Some((_, '"')) => {
            let escape = escape_char(syntax);
            let mut escaped = false;
            for (idx, c) in chars {
                if escaped {
                    escaped = false;
                } else if c == escape {
                    escaped = true;
                } else if c == '"' {
                    return idx + 1;
                }
            }
            rest.len()
        }
        Some((_, '\'')) => {
            let mut chars = chars.peekable();
            while let Some((idx, c)) = chars.next() {
                if c != '\'' {
                    continue;
                }
                // PowerShell doubles a quote to embed it
                if syntax == ProfileSyntax::PowerShell
                    && matches!(chars.peek(), Some((_, '\'')))
                {
                    chars.next();
                    continue;
                }
                return idx + 1;
            }
            rest.len()
        }
        Some((_, '(')) => closing_paren(rest),
        Some((_, '$')) if rest[1..].starts_with('(') => 1 + closing_paren(&rest[1..]),
        Some((_, '`')) if syntax == ProfileSyntax::Posix => rest[1..]
            .find('`')
            .map(|idx| idx + 2)
            .unwrap_or(rest.len()),
        _ => rest.find(char::is_whitespace).unwrap_or(rest.len()),
    }
}

/// `rest` starts with `(`; length up to and including its matching `)`.
fn closing_paren(rest: &str) -> usize {
    let mut depth = 0usize;
    for (idx, c) in rest.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return idx + 1;
                }
            }
            _ => {}
        }
    }
    rest.len()
}

fn unquote(raw: &str, syntax: ProfileSyntax) -> String {
    let inner = |quote: char| {
        let s = raw.strip_prefix(quote).unwrap_or(raw);
        s.strip_suffix(quote).unwrap_or(s)
    };

    match (syntax, raw.chars().next()) {
        (ProfileSyntax::Posix, Some('"')) => {
            let mut out = String::new();
            let mut chars = inner('"').chars().peekable();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    if let Some(&next) = chars.peek() {
                        if matches!(next, '\\' | '"' | '$' | '`') {
                            out.push(next);
                            chars.next();
                            continue;
                        }
                    }
                }
                out.push(c);
            }
            out
        }
        (ProfileSyntax::PowerShell, Some('\'')) => inner('\'').replace("''", "'"),
        (ProfileSyntax::PowerShell, Some('"')) => inner('"').replace("`\"", "\""),
        (_, Some('\'')) => inner('\'').to_string(),
        _ => raw.to_string(),
    }
}

fn escape_posix(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render one assignment line in the given syntax.
pub fn render_assignment(syntax: ProfileSyntax, name: &str, value: &str) -> String {
    match syntax {
        ProfileSyntax::Posix => format!(r#"export {name}="{}""#, escape_posix(value)),
        ProfileSyntax::PowerShell => format!("$env:{name}='{}'", value.replace('\'', "''")),
    }
}

enum LineEdit {
    Keep,
    Replace(String),
    Drop,
}

/// Rewrite the first assignment of `name` (tracked through `found`) and drop
/// any later ones, statement by statement.
fn rewrite_line(
    line: &str,
    syntax: ProfileSyntax,
    name: &str,
    rendered: &str,
    found: &mut bool,
) -> LineEdit {
    let statements = split_statements(line, syntax);
    let mut kept: Vec<String> = Vec::with_capacity(statements.len());
    let mut touched = false;
    let mut first_dropped = false;

    for (idx, statement) in statements.iter().enumerate() {
        match parse_assignment(statement, syntax, name) {
            Some(parsed) if !*found => {
                kept.push(format!("{}{}{}", parsed.indent, rendered, parsed.trailing));
                *found = true;
                touched = true;
            }
            Some(_) => {
                log::debug!("Removing duplicate {name} assignment");
                touched = true;
                first_dropped |= idx == 0;
            }
            None => kept.push(statement.to_string()),
        }
    }

    if !touched {
        return LineEdit::Keep;
    }
    if kept.iter().all(|s| s.trim().is_empty()) {
        return LineEdit::Drop;
    }
    if first_dropped {
        let indent = &line[..line.len() - line.trim_start().len()];
        kept[0] = format!("{indent}{}", kept[0].trim_start());
    }
    LineEdit::Replace(kept.join(";"))
}

/// Rewrite the first assignment of `name` in place and drop later duplicates.
/// Returns `false` when the variable is not assigned anywhere.
fn replace_assignment(
    lines: &mut Vec<String>,
    syntax: ProfileSyntax,
    name: &str,
    rendered: &str,
) -> bool {
    let mut found = false;
    lines.retain_mut(|line| match rewrite_line(line, syntax, name, rendered, &mut found) {
        LineEdit::Keep => true,
        LineEdit::Replace(updated) => {
            *line = updated;
            true
        }
        LineEdit::Drop => false,
    });
    found
}

/// Upsert both variables into `content` and return the new file content.
pub fn upsert_env(content: &str, assignment: &EnvAssignment, syntax: ProfileSyntax) -> String {
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let had_trailing_newline = content.ends_with('\n');
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

    let mut missing = Vec::new();
    for (name, value) in [
        (TOKEN_VAR, assignment.token.as_str()),
        (BASE_URL_VAR, assignment.base_url.as_str()),
    ] {
        let rendered = render_assignment(syntax, name, value);
        if replace_assignment(&mut lines, syntax, name, &rendered) {
            log::debug!("Replaced existing {name} assignment");
        } else {
            log::debug!("Appending {name} assignment");
            missing.push(rendered);
        }
    }

    let appended = !missing.is_empty();
    if appended && lines.last().is_some_and(|l| !l.trim().is_empty()) {
        lines.push(String::new());
    }
    lines.extend(missing);

    let mut out = lines.join(newline);
    if !lines.is_empty() && (had_trailing_newline || appended) {
        out.push_str(newline);
    }
    out
}

/// Current value of `name` in `content`, if assigned.
pub fn read_assignment(content: &str, syntax: ProfileSyntax, name: &str) -> Option<String> {
    content
        .lines()
        .flat_map(|line| split_statements(line, syntax))
        .find_map(|statement| parse_assignment(statement, syntax, name))
        .map(|parsed| unquote(parsed.raw_value, syntax))
}

fn read_existing(path: &Path) -> Result<Option<String>, AppError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::io(path, e)),
    }
}

/// Replace `path` with `contents` through a temp file in the same directory.
/// Symlinked profiles are written through to their target and the existing
/// permissions are kept.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), AppError> {
    let target: PathBuf = if path.exists() {
        fs::canonicalize(path).map_err(|e| AppError::io(path, e))?
    } else {
        path.to_path_buf()
    };
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| AppError::io(dir, e))?;
    tmp.write_all(contents)
        .map_err(|e| AppError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| AppError::io(tmp.path(), e))?;

    if let Ok(meta) = fs::metadata(&target) {
        fs::set_permissions(tmp.path(), meta.permissions())
            .map_err(|e| AppError::io(tmp.path(), e))?;
    }

    tmp.persist(&target)
        .map_err(|e| AppError::io(&target, e.error))?;
    Ok(())
}

/// Read-modify-write the profile so it carries `assignment`.
pub fn write_env(target: &ProfileTarget, assignment: &EnvAssignment) -> Result<(), AppError> {
    ensure_parent_dir(&target.path)?;
    let existing = read_existing(&target.path)?.unwrap_or_default();
    let updated = upsert_env(&existing, assignment, target.syntax);
    write_atomic(&target.path, updated.as_bytes())?;
    log::info!(
        "Updated {} ({:?} syntax, {} bytes)",
        target.path.display(),
        target.syntax,
        updated.len()
    );
    Ok(())
}

/// What the profile currently assigns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStatus {
    pub path: PathBuf,
    pub exists: bool,
    pub token: Option<String>,
    pub base_url: Option<String>,
}

impl ProfileStatus {
    /// Same status with the token masked for display.
    pub fn redacted(mut self) -> Self {
        self.token = self.token.as_deref().map(redact_secret);
        self
    }
}

pub fn read_status(target: &ProfileTarget) -> Result<ProfileStatus, AppError> {
    let content = read_existing(&target.path)?;
    let exists = content.is_some();
    let content = content.unwrap_or_default();
    Ok(ProfileStatus {
        path: target.path.clone(),
        exists,
        token: read_assignment(&content, target.syntax, TOKEN_VAR),
        base_url: read_assignment(&content, target.syntax, BASE_URL_VAR),
    })
}

/// Mask a secret for display, keeping four characters on each side.
pub fn redact_secret(secret: &str) -> String {
    let s = secret.trim();
    if s.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}****...{suffix}")
}
