use clonehub::clone::{BatchConfig, CollisionPolicy};
use clonehub::listing::{GITHUB_API_URL, GitHubConfig};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub github: GithubConfig,
    pub clone: CloneConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_url: String,
    pub username: Option<String>,
    pub include_forks: bool,
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: GITHUB_API_URL.to_string(),
            username: None,
            include_forks: false,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloneConfig {
    pub directory: PathBuf,
    pub workers: usize,
    pub retries: u32,
    pub retry_delay_secs: u64,
    pub attempt_timeout_secs: Option<u64>,
    pub git_program: String,
    pub collision_policy: CollisionPolicy,
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./repos"),
            workers: 5,
            retries: 5,
            retry_delay_secs: 5,
            attempt_timeout_secs: None,
            git_program: "git".to_string(),
            collision_policy: CollisionPolicy::Suffix,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            github: GithubConfig::default(),
            clone: CloneConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig::default()
            .with_workers(self.clone.workers)
            .with_retries(self.clone.retries)
            .with_retry_delay(Duration::from_secs(self.clone.retry_delay_secs))
            .with_collision_policy(self.clone.collision_policy)
    }

    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.clone.attempt_timeout_secs.map(Duration::from_secs)
    }

    pub fn github_config(&self) -> GitHubConfig {
        GitHubConfig {
            api_url: self.github.api_url.clone(),
            include_forks: self.github.include_forks,
            timeout: Duration::from_secs(self.github.timeout_secs),
            ..GitHubConfig::default()
        }
    }
}
