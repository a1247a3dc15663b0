//! Player configuration from the environment.

use std::path::PathBuf;

use anyhow::Context;
use gambit_shared::Orientation;
use url::Url;

pub const DEFAULT_WS_URL: &str = "ws://localhost:8080/ws";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Engine WebSocket endpoint
    pub ws_url: Url,
    /// Override for the session handle file
    pub storage_path: Option<PathBuf>,
    /// Orientation to request when a new game leaves it open
    pub orientation: Option<Orientation>,
}

impl PlayerConfig {
    /// Read `GAMBIT_WS_URL`, `GAMBIT_STORAGE_PATH` and `GAMBIT_ORIENTATION`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let raw_url = non_empty(lookup("GAMBIT_WS_URL")).unwrap_or_else(|| DEFAULT_WS_URL.into());
        let ws_url = Url::parse(&raw_url)
            .with_context(|| format!("GAMBIT_WS_URL is not a valid URL: {raw_url}"))?;
        if !matches!(ws_url.scheme(), "ws" | "wss") {
            anyhow::bail!("GAMBIT_WS_URL must use ws:// or wss://, got {raw_url}");
        }

        let storage_path = non_empty(lookup("GAMBIT_STORAGE_PATH")).map(PathBuf::from);

        let orientation = non_empty(lookup("GAMBIT_ORIENTATION"))
            .map(|raw| raw.parse::<Orientation>())
            .transpose()
            .context("GAMBIT_ORIENTATION must be `white` or `black`")?;

        Ok(Self {
            ws_url,
            storage_path,
            orientation,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
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
