// src/config.rs

use anyhow::{bail, ensure, Context, Result};
use serde::Deserialize;
use std::{collections::HashSet, env, fs, path::Path, time::Duration};
use url::Url;

use crate::reshape::TrackedColumns;

/// Env var naming an optional YAML config file.
pub const CONFIG_PATH_VAR: &str = "SHEETDASH_CONFIG";

const DEFAULT_SOURCE_URL: &str = "https://docs.google.com/spreadsheets/d/1pdThWZw8-KHaDnwP2gxLWpYsC5Y6HqLnzQYMea5hKNs/export?format=csv";
const DEFAULT_LOGO_URL: &str =
    "https://bdjobs.com/JobFair/it-job-fair-2025/bdjobs-chakri-mela-feb-2025.svg";

static DEFAULT_TRACKED_COLUMNS: &[&str] = &[
    "Total Registered",
    "Visitors",
    "Applied to Job",
    "Application",
    "Unique Applicant",
    "Total Companies Jobs Apply",
    "Direct Payment for Job Apply",
    "Paid by Applicants",
    "Became Pro User Today",
    "Amount from Today's Pro Users",
    "Pro Job Seeker Count (apply jobs)",
    "Total Amount Collected",
];

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// CSV export URL of the published sheet.
    pub source_url: String,
    pub tracked_columns: Vec<String>,
    pub refresh_interval_ms: u64,
    pub fetch_timeout_secs: u64,
    pub port: u16,
    pub page: PageConfig,
}

/// Static bits of the dashboard page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub title: String,
    pub logo_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            tracked_columns: DEFAULT_TRACKED_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            refresh_interval_ms: 30_000,
            fetch_timeout_secs: 10,
            port: 8080,
            page: PageConfig::default(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        PageConfig {
            title: "IT JobFair 2025".to_string(),
            logo_url: DEFAULT_LOGO_URL.to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the file named by `SHEETDASH_CONFIG` (if set), then
    /// individual environment variables.
    pub fn load() -> Result<Self> {
        let mut config = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Apply `SHEET_URL`, `REFRESH_INTERVAL_MS`, `FETCH_TIMEOUT_SECS`, `PORT`,
    /// `DASH_TITLE` and `DASH_LOGO_URL` from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("SHEET_URL") {
            self.source_url = v;
        }
        if let Some(v) = lookup("REFRESH_INTERVAL_MS") {
            self.refresh_interval_ms = v
                .parse()
                .with_context(|| format!("REFRESH_INTERVAL_MS={v:?} is not a number"))?;
        }
        if let Some(v) = lookup("FETCH_TIMEOUT_SECS") {
            self.fetch_timeout_secs = v
                .parse()
                .with_context(|| format!("FETCH_TIMEOUT_SECS={v:?} is not a number"))?;
        }
        if let Some(v) = lookup("PORT") {
            self.port = v
                .parse()
                .with_context(|| format!("PORT={v:?} is not a port number"))?;
        }
        if let Some(v) = lookup("DASH_TITLE") {
            self.page.title = v;
        }
        if let Some(v) = lookup("DASH_LOGO_URL") {
            self.page.logo_url = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.source_url()?;
        ensure!(
            !self.tracked_columns.is_empty(),
            "tracked_columns must not be empty"
        );
        let mut seen = HashSet::new();
        for name in &self.tracked_columns {
            let name = name.trim();
            ensure!(!name.is_empty(), "tracked_columns contains a blank name");
            ensure!(seen.insert(name), "tracked column {name:?} is listed twice");
        }
        ensure!(
            self.refresh_interval_ms > 0,
            "refresh_interval_ms must be positive"
        );
        ensure!(
            self.fetch_timeout_secs > 0,
            "fetch_timeout_secs must be positive"
        );
        Ok(())
    }

    pub fn source_url(&self) -> Result<Url> {
        let url = Url::parse(&self.source_url)
            .with_context(|| format!("source_url {:?} is not a URL", self.source_url))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => bail!("source_url must be http or https, got {other}"),
        }
    }

    pub fn tracked(&self) -> TrackedColumns {
        TrackedColumns::new(self.tracked_columns.iter().map(|s| s.trim()))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.tracked().len(), 12);
        assert_eq!(config.tracked().names()[0], "Total Registered");
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.source_url().unwrap().scheme(), "https");
    }

    #[test]
    fn test_yaml_file_overrides_some_fields() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            "source_url: http://localhost:9000/sheet.csv\ntracked_columns: [Visitors, Application]\npage:\n  title: Career Fair"
        )?;

        let config = Config::from_file(file.path())?;
        config.validate()?;
        assert_eq!(config.source_url, "http://localhost:9000/sheet.csv");
        assert_eq!(config.tracked_columns, vec!["Visitors", "Application"]);
        assert_eq!(config.page.title, "Career Fair");
        assert_eq!(config.page.logo_url, DEFAULT_LOGO_URL);
        assert_eq!(config.refresh_interval_ms, 30_000);
        Ok(())
    }

    #[test]
    fn test_unknown_yaml_field_is_rejected() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "refresh_every: 5")?;
        assert!(Config::from_file(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[
                ("SHEET_URL", "http://127.0.0.1/x.csv"),
                ("REFRESH_INTERVAL_MS", "5000"),
                ("PORT", "9090"),
                ("DASH_TITLE", "Stats"),
            ]))
            .unwrap();
        assert_eq!(config.source_url, "http://127.0.0.1/x.csv");
        assert_eq!(config.refresh_interval_ms, 5000);
        assert_eq!(config.port, 9090);
        assert_eq!(config.page.title, "Stats");
        assert_eq!(config.fetch_timeout_secs, 10);
    }

    #[test]
    fn test_bad_env_number_is_error() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(lookup_from(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_validation_failures() {
        let bad = [
            Config {
                source_url: "ftp://example.com/sheet.csv".to_string(),
                ..Config::default()
            },
            Config {
                tracked_columns: Vec::new(),
                ..Config::default()
            },
            Config {
                tracked_columns: vec!["Visitors".to_string(), " Visitors ".to_string()],
                ..Config::default()
            },
            Config {
                refresh_interval_ms: 0,
                ..Config::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?} should be invalid");
        }
    }
}
