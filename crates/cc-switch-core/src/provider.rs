use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Base URL written by reset mode.
pub const OFFICIAL_BASE_URL: &str = "https://api.anthropic.com";

pub const TOKEN_VAR: &str = "ANTHROPIC_AUTH_TOKEN";
pub const BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";

/// Named endpoint the client can be switched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gaccode,
    Anyrouter,
    Kimi,
    Custom,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Gaccode,
        ProviderKind::Anyrouter,
        ProviderKind::Kimi,
        ProviderKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gaccode => "gaccode",
            ProviderKind::Anyrouter => "anyrouter",
            ProviderKind::Kimi => "kimi",
            ProviderKind::Custom => "custom",
        }
    }

    /// Fixed endpoint, `None` for `custom`.
    pub fn fixed_base_url(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Gaccode => Some("https://api.tu-zi.com"),
            ProviderKind::Anyrouter => Some("https://anyrouter.top"),
            ProviderKind::Kimi => Some("https://api.moonshot.cn/anthropic/"),
            ProviderKind::Custom => None,
        }
    }

    /// Resolve this provider to a base URL. `custom_url` is only consulted for
    /// `custom`, and is returned as given unless it is blank.
    pub fn base_url(&self, custom_url: Option<&str>) -> Result<String, AppError> {
        if let Some(url) = self.fixed_base_url() {
            return Ok(url.to_string());
        }
        match custom_url.filter(|u| !u.trim().is_empty()) {
            Some(url) => Ok(url.to_string()),
            None => Err(AppError::InvalidProvider(self.as_str().to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gaccode" => Ok(ProviderKind::Gaccode),
            "anyrouter" => Ok(ProviderKind::Anyrouter),
            "kimi" => Ok(ProviderKind::Kimi),
            "custom" => Ok(ProviderKind::Custom),
            _ => Err(AppError::InvalidProvider(s.to_string())),
        }
    }
}

/// Map a provider name (and the custom URL, if any) to the base URL to write.
pub fn resolve_base_url(name: &str, custom_url: Option<&str>) -> Result<String, AppError> {
    name.parse::<ProviderKind>()?.base_url(custom_url)
}

/// The two values persisted into the profile file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvAssignment {
    pub token: String,
    pub base_url: String,
}

impl EnvAssignment {
    pub fn new(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: base_url.into(),
        }
    }

    /// Official endpoint with the token cleared.
    pub fn reset() -> Self {
        Self::new("", OFFICIAL_BASE_URL)
    }

    pub fn for_provider(
        name: &str,
        token: impl Into<String>,
        custom_url: Option<&str>,
    ) -> Result<Self, AppError> {
        let base_url = resolve_base_url(name, custom_url)?;
        Ok(Self::new(token, base_url))
    }
}
