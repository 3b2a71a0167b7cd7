use std::env;

pub const TOKEN_ENV: &str = "DASHBOARD_FORMS_TOKEN";

/// Supplies the bearer credential for backend calls.
pub trait CredentialSource: Send + Sync {
    fn bearer(&self) -> Option<String>;
}

/// Fixed credential, typically read once from the host's cookie store.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential {
    token: Option<String>,
}

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

impl CredentialSource for StaticCredential {
    fn bearer(&self) -> Option<String> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }
}

/// Reads the credential from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new(TOKEN_ENV)
    }
}

impl CredentialSource for EnvCredential {
    fn bearer(&self) -> Option<String> {
        env::var(&self.var)
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }
}
