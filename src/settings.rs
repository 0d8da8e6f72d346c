use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

pub const SOURCE_URL: &str = "https://www.telnetbbsguide.com/bbs/";
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";
pub const TIMEOUT_SECS: u64 = 15;
pub const TARGET_FILE: &str = "index.html";
pub const LOG_FILE: &str = "bbs_update.log";

/// Runtime settings: defaults, then `BBS_*` environment variables, then CLI flags.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub source_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub target_file: PathBuf,
    pub log_file: PathBuf,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let dir = program_dir();
        Config::builder()
            .set_default("source_url", SOURCE_URL)?
            .set_default("user_agent", USER_AGENT)?
            .set_default("timeout_secs", TIMEOUT_SECS as i64)?
            .set_default("target_file", path_string(&dir.join(TARGET_FILE)))?
            .set_default("log_file", path_string(&dir.join(LOG_FILE)))?
            .add_source(Environment::with_prefix("BBS"))
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Invalid BBS_* settings")
    }

    /// Settings rooted in `dir`, bypassing the environment.
    #[cfg(test)]
    pub fn in_dir(dir: &Path, source_url: &str) -> Self {
        Settings {
            source_url: source_url.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout_secs: TIMEOUT_SECS,
            target_file: dir.join(TARGET_FILE),
            log_file: dir.join(LOG_FILE),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Host of the source URL, used in log lines ("telnetbbsguide.com").
    pub fn source_label(&self) -> String {
        reqwest::Url::parse(&self.source_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
            .unwrap_or_else(|| self.source_url.clone())
    }

    /// File name of the target, used in log lines ("index.html").
    pub fn target_label(&self) -> String {
        self.target_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.target_file.display().to_string())
    }
}

/// Directory holding the executable; the target and log live next to it.
fn program_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn path_string(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}
