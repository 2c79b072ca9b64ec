use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::matcher::DEFAULT_THRESHOLD;

const APP_NAME: &str = "mcml";
const DB_FILENAME: &str = "mcml.sqlite";

const BASE_URL: &str = "https://mcml.ai";
const TEAM_ROOT: &str = "https://mcml.ai/team/";
const SEED_PAGES: &[&str] = &[
    "https://mcml.ai/team/",
    "https://mcml.ai/team/directors/",
    "https://mcml.ai/team/management/",
    "https://mcml.ai/team/researchgroups/",
    "https://mcml.ai/team/jrgs/",
    "https://mcml.ai/team/juniors/",
    "https://mcml.ai/team/tbfs/",
    "https://mcml.ai/team/strategyboard/",
    "https://mcml.ai/team/advisoryboard/",
    "https://mcml.ai/team/former/",
];

/// Process-wide settings, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub team_root: String,
    pub seed_pages: Vec<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub threshold: f64,
    pub strong_match: f64,
    pub db_path: Option<PathBuf>,
}

impl Settings {
    /// Defaults, then `./mcml.toml` if present, then `MCML_*` env vars.
    pub fn load() -> Result<Self> {
        Config::builder()
            .set_default("base_url", BASE_URL)?
            .set_default("team_root", TEAM_ROOT)?
            .set_default("seed_pages", SEED_PAGES.to_vec())?
            .set_default("user_agent", "mcml-cli/0.1 (+https://mcml.ai/team/)")?
            .set_default("timeout_secs", 30)?
            .set_default("threshold", DEFAULT_THRESHOLD)?
            .set_default("strong_match", 0.85)?
            .add_source(File::with_name(APP_NAME).required(false))
            .add_source(
                Environment::with_prefix("MCML")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("seed_pages"),
            )
            .build()?
            .try_deserialize()
            .context("Invalid mcml settings")
    }

    pub fn site(&self) -> Result<Site> {
        Site::new(&self.base_url, &self.team_root)
    }

    /// Configured path, else `$XDG_DATA_HOME/mcml/mcml.sqlite`, else `~/.local/share/...`.
    pub fn db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(default_db_path)
    }
}

pub fn default_db_path() -> PathBuf {
    let base = match std::env::var_os("XDG_DATA_HOME") {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_default()
            .join(".local")
            .join("share"),
    };
    base.join(APP_NAME).join(DB_FILENAME)
}

/// The site being scanned: its origin and the directory root under it.
#[derive(Debug, Clone)]
pub struct Site {
    pub base: Url,
    pub team_root: Url,
}

impl Site {
    pub fn new(base_url: &str, team_root: &str) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("Invalid base_url {}", base_url))?;
        let team_root =
            Url::parse(team_root).with_context(|| format!("Invalid team_root {}", team_root))?;
        Ok(Self { base, team_root })
    }

    /// True when `url` lives on the site's own host.
    pub fn is_internal(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(u) => u.host_str().is_some() && u.host_str() == self.base.host_str(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_site() -> Site {
    Site::new(BASE_URL, TEAM_ROOT).unwrap()
}
