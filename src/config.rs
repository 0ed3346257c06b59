use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;

pub const DEFAULT_API_ROOT: &str = "https://nextjs-skill-viewer.vercel.app";

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
	#[serde(default)]
	pub general: GeneralConfig,
	#[serde(default)]
	pub retry: RetryConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct GeneralConfig {
	pub api_root: Option<String>,
	pub session_file: Option<PathBuf>,
}

/// Retry settings for task updates, the only mutation that is retried.
#[derive(Debug, serde::Deserialize)]
pub struct RetryConfig {
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	#[serde(default = "default_initial_delay_ms")]
	pub initial_delay_ms: u64,
	#[serde(default = "default_backoff_factor")]
	pub backoff_factor: u32,
}

fn default_max_attempts() -> u32 {
	2
}

fn default_initial_delay_ms() -> u64 {
	1000
}

fn default_backoff_factor() -> u32 {
	2
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: default_max_attempts(),
			initial_delay_ms: default_initial_delay_ms(),
			backoff_factor: default_backoff_factor(),
		}
	}
}

impl Config {
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ()> {
		let path = path.as_ref();
		let data = std::fs::read_to_string(path)
			.map_err(|e| log::error!("Failed to read configuration file: {}: {e}", path.display()))?;
		let config = Self::parse(&data)
			.map_err(|e| log::error!("Failed to parse configuration file: {}: {e}", path.display()))?;
		Ok(config)
	}

	pub fn parse(data: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(data)
	}

	pub fn api_root(&self) -> &str {
		self.general.api_root.as_deref().unwrap_or(DEFAULT_API_ROOT)
	}

	/// Where the login session is kept, `skill-viewer-session.json` in the working directory by default.
	pub fn session_file(&self) -> PathBuf {
		self.general.session_file.clone().unwrap_or_else(|| PathBuf::from("skill-viewer-session.json"))
	}

	pub fn task_update_retry(&self) -> RetryPolicy {
		RetryPolicy {
			max_attempts: self.retry.max_attempts.max(1),
			initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
			backoff_factor: self.retry.backoff_factor,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn empty_config_uses_defaults() {
		let config = Config::parse("").unwrap();
		assert_eq!(config.api_root(), DEFAULT_API_ROOT);
		assert_eq!(config.session_file(), PathBuf::from("skill-viewer-session.json"));
		let retry = config.task_update_retry();
		assert_eq!(retry.max_attempts, 2);
		assert_eq!(retry.initial_delay, Duration::from_secs(1));
		assert_eq!(retry.backoff_factor, 2);
	}

	#[test]
	fn parse_full_config() {
		let config = Config::parse(r#"
			[General]
			api_root = "http://localhost:3000"
			session_file = "/tmp/session.json"

			[Retry]
			max_attempts = 4
			initial_delay_ms = 250
		"#).unwrap();
		assert_eq!(config.api_root(), "http://localhost:3000");
		assert_eq!(config.session_file(), PathBuf::from("/tmp/session.json"));
		let retry = config.task_update_retry();
		assert_eq!(retry.max_attempts, 4);
		assert_eq!(retry.initial_delay, Duration::from_millis(250));
		assert_eq!(retry.backoff_factor, 2);
	}

	#[test]
	fn zero_attempts_still_tries_once() {
		let config = Config::parse("[Retry]\nmax_attempts = 0\n").unwrap();
		assert_eq!(config.task_update_retry().max_attempts, 1);
	}

	#[test]
	fn from_file_reads_toml() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("skill-viewer.toml");
		std::fs::write(&path, "[General]\napi_root = \"https://example.com\"\n").unwrap();
		let config = Config::from_file(&path).unwrap();
		assert_eq!(config.api_root(), "https://example.com");
		assert!(Config::from_file(dir.path().join("missing.toml")).is_err());
	}
}
