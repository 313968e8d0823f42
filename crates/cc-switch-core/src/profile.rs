//! Shell profile selection
//!
//! Decides which startup file receives the environment assignments. All
//! inputs come from a [`HostEnv`] snapshot so the selection itself never
//! reads the process environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

const DEFAULT_SHELL: &str = "bash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    Unix,
}

impl HostOs {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            HostOs::Windows
        } else {
            HostOs::Unix
        }
    }
}

/// Assignment syntax used inside the profile file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSyntax {
    /// `export NAME="value"`
    Posix,
    /// `$env:NAME='value'`
    PowerShell,
}

impl ProfileSyntax {
    /// Guess the syntax from a file name; `.ps1` means PowerShell.
    pub fn for_path(path: &Path) -> Self {
        let is_ps1 = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("ps1"))
            .unwrap_or(false);
        if is_ps1 {
            ProfileSyntax::PowerShell
        } else {
            ProfileSyntax::Posix
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileTarget {
    pub path: PathBuf,
    pub syntax: ProfileSyntax,
}

impl ProfileTarget {
    /// Instruction telling the user how to pick up the new values.
    pub fn reload_hint(&self) -> String {
        match self.syntax {
            ProfileSyntax::PowerShell => {
                "Please restart PowerShell or run `. $PROFILE` to apply environment variables."
                    .to_string()
            }
            ProfileSyntax::Posix => format!(
                "Please reopen your terminal or run 'source {}' to apply environment variables.",
                self.path.display()
            ),
        }
    }
}

/// Snapshot of the environment the profile selection depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnv {
    pub os: HostOs,
    pub home: Option<PathBuf>,
    pub user_profile: Option<PathBuf>,
    /// Raw `SHELL` value, e.g. `/usr/bin/zsh`.
    pub shell: Option<String>,
    pub profile_override: Option<PathBuf>,
}

impl HostEnv {
    pub fn from_process() -> Self {
        Self {
            os: HostOs::current(),
            home: non_empty_var("HOME")
                .map(PathBuf::from)
                .or_else(dirs::home_dir),
            user_profile: non_empty_var("USERPROFILE").map(PathBuf::from),
            shell: non_empty_var("SHELL"),
            profile_override: None,
        }
    }

    pub fn with_profile_override(mut self, path: Option<PathBuf>) -> Self {
        self.profile_override = path;
        self
    }

    /// Basename of the configured shell, `bash` when unset.
    pub fn shell_name(&self) -> String {
        self.shell
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| Path::new(s).file_name())
            .and_then(|name| name.to_str())
            .unwrap_or(DEFAULT_SHELL)
            .to_string()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Pick the profile file for this host.
pub fn select_profile(env: &HostEnv) -> Result<ProfileTarget, AppError> {
    if let Some(path) = &env.profile_override {
        return Ok(ProfileTarget {
            syntax: ProfileSyntax::for_path(path),
            path: path.clone(),
        });
    }

    match env.os {
        HostOs::Windows => {
            let base = env
                .user_profile
                .clone()
                .or_else(|| env.home.clone())
                .ok_or(AppError::HomeDirNotFound)?;
            Ok(ProfileTarget {
                path: base
                    .join("Documents")
                    .join("WindowsPowerShell")
                    .join("Microsoft.PowerShell_profile.ps1"),
                syntax: ProfileSyntax::PowerShell,
            })
        }
        HostOs::Unix => {
            let home = env.home.clone().ok_or(AppError::HomeDirNotFound)?;
            let rc = match env.shell_name().as_str() {
                "zsh" => ".zshrc",
                "bash" => ".bashrc",
                _ => ".profile",
            };
            Ok(ProfileTarget {
                path: home.join(rc),
                syntax: ProfileSyntax::Posix,
            })
        }
    }
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            log::debug!("Creating profile directory {}", parent.display());
        }
        fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
    }
    Ok(())
}
