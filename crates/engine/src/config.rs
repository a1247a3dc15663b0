//! Engine configuration from the environment.

use anyhow::Context;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub host: String,
    pub port: u16,
}

impl EngineConfig {
    /// Read `GAMBIT_HOST` and `GAMBIT_PORT`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("GAMBIT_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.into());
        let port = match lookup("GAMBIT_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("GAMBIT_PORT is not a valid port: {raw}"))?,
            None => DEFAULT_PORT,
        };
        Ok(Self { host, port })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load `.env.local` then `.env` from the repository root, if present.
pub fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let config = EngineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");

        let config = EngineConfig::from_lookup(|key| match key {
            "GAMBIT_HOST" => Some("127.0.0.1".into()),
            "GAMBIT_PORT" => Some("9001".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9001");

        let bad_port =
            EngineConfig::from_lookup(|key| (key == "GAMBIT_PORT").then(|| "http".into()));
        assert!(bad_port.is_err());
    }
}
