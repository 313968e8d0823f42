//! Core library for CC-Switch
//!
//! Resolves provider names to endpoints, picks the user's shell profile and
//! upserts the Claude Code environment assignments into it.

mod env_file;
mod error;
mod profile;
mod provider;

pub use env_file::{
    read_assignment, read_status, redact_secret, render_assignment, upsert_env, write_env,
    ProfileStatus,
};
pub use error::AppError;
pub use profile::{
    ensure_parent_dir, select_profile, HostEnv, HostOs, ProfileSyntax, ProfileTarget,
};
pub use provider::{
    resolve_base_url, EnvAssignment, ProviderKind, BASE_URL_VAR, OFFICIAL_BASE_URL, TOKEN_VAR,
};
