//! Environment configuration

use anyhow::Context;

/// Bounds for the due-items endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueLimits {
    pub default: usize,
    pub max: usize,
}

impl Default for DueLimits {
    fn default() -> Self {
        Self {
            default: 20,
            max: 200,
        }
    }
}

impl DueLimits {
    /// Resolve a requested limit against the configured bounds.
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default).min(self.max)
    }
}

/// Server configuration read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Postgres connection string. Without it the in-memory store is used.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub due_limits: DueLimits,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DueLimits::default();

        let due_limits = DueLimits {
            default: parse_or(&lookup, "DUE_LIMIT_DEFAULT", defaults.default)?,
            max: parse_or(&lookup, "DUE_LIMIT_MAX", defaults.max)?,
        };
        if due_limits.default > due_limits.max {
            anyhow::bail!(
                "DUE_LIMIT_DEFAULT ({}) must not exceed DUE_LIMIT_MAX ({})",
                due_limits.default,
                due_limits.max
            );
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 3000)?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            due_limits,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
