// src/config.rs

use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};
use url::Url;

use crate::error::ConfigError;
use crate::process::clean::DEFAULT_CUTOFF_MINUTES;
use crate::stats::BinGrid;

/// Strava listing for the Chicago Marathon.
pub const DEFAULT_SOURCE_URL: &str = "https://www.strava.com/running_races/2782?hl=en-GB";

/// Safety bound on the listing walk; the listing normally ends well before.
pub const DEFAULT_MAX_PAGES: u32 = 1499;

pub const CONFIG_FILE_VAR: &str = "RACE_CONFIG";

/// Everything a run needs to know up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub source_url: String,
    pub max_pages: u32,
    pub cutoff_minutes: f64,
    /// Used in chart titles.
    pub race_name: String,
    /// Chart output; `.svg` renders SVG, anything else PNG. `None` skips plotting.
    pub plot_path: Option<PathBuf>,
    pub bins: BinGrid,
    /// Finish time, in minutes, whose percentile rank the report includes.
    pub target_minutes: Option<f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
            cutoff_minutes: DEFAULT_CUTOFF_MINUTES,
            race_name: "Chicago Marathon".to_string(),
            plot_path: Some(PathBuf::from("finish_distribution.png")),
            bins: BinGrid::default(),
            target_minutes: None,
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Value {
        key,
        value: value.to_string(),
    })
}

impl RunConfig {
    /// Defaults, then the YAML file named by `RACE_CONFIG`, then `RACE_*`
    /// environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = match env::var(CONFIG_FILE_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_yaml_file(path.trim())?,
            _ => Self::default(),
        };
        cfg.apply_overrides(|key| env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let cfg = serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), "loaded config file");
        Ok(cfg)
    }

    /// Apply `RACE_URL`, `RACE_MAX_PAGES`, `RACE_CUTOFF_MINUTES`, `RACE_NAME`,
    /// `RACE_PLOT` and `RACE_TARGET_MINUTES` as found by `lookup`. An empty
    /// `RACE_PLOT` turns plotting off; an empty target clears it.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("RACE_URL") {
            debug!(value = %v, "RACE_URL override");
            self.source_url = v.trim().to_string();
        }
        if let Some(v) = lookup("RACE_MAX_PAGES") {
            self.max_pages = parse_value("RACE_MAX_PAGES", &v)?;
        }
        if let Some(v) = lookup("RACE_CUTOFF_MINUTES") {
            self.cutoff_minutes = parse_value("RACE_CUTOFF_MINUTES", &v)?;
        }
        if let Some(v) = lookup("RACE_NAME") {
            self.race_name = v;
        }
        if let Some(v) = lookup("RACE_PLOT") {
            self.plot_path = match v.trim() {
                "" => None,
                p => Some(PathBuf::from(p)),
            };
        }
        if let Some(v) = lookup("RACE_TARGET_MINUTES") {
            self.target_minutes = match v.trim() {
                "" => None,
                t => Some(parse_value("RACE_TARGET_MINUTES", t)?),
            };
        }
        Ok(())
    }

    pub fn source_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.source_url).map_err(|source| ConfigError::Url {
            url: self.source_url.clone(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source_url()?;
        if self.max_pages == 0 {
            return Err(ConfigError::Value {
                key: "max_pages",
                value: self.max_pages.to_string(),
            });
        }
        if !self.cutoff_minutes.is_finite() || self.cutoff_minutes <= 0.0 {
            return Err(ConfigError::Value {
                key: "cutoff_minutes",
                value: self.cutoff_minutes.to_string(),
            });
        }
        if let Some(target) = self.target_minutes {
            if !target.is_finite() || target <= 0.0 {
                return Err(ConfigError::Value {
                    key: "target_minutes",
                    value: target.to_string(),
                });
            }
        }
        let BinGrid { start, end, step } = self.bins;
        if !(start.is_finite() && end.is_finite() && step.is_finite()) || step <= 0.0 || end <= start
        {
            return Err(ConfigError::Value {
                key: "bins",
                value: format!("{}..={} step {}", start, end, step),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = RunConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.max_pages, 1499);
        assert_eq!(cfg.cutoff_minutes, 420.0);
        assert_eq!(cfg.source_url().unwrap().host_str(), Some("www.strava.com"));
    }

    #[test]
    fn yaml_file_fills_missing_keys_with_defaults() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(
            f,
            "source_url: https://www.strava.com/running_races/2400\nmax_pages: 40\nbins:\n  start: 100\n  end: 400\n  step: 10"
        )
        .unwrap();

        let cfg = RunConfig::from_yaml_file(f.path()).unwrap();
        assert_eq!(cfg.source_url, "https://www.strava.com/running_races/2400");
        assert_eq!(cfg.max_pages, 40);
        assert_eq!(cfg.cutoff_minutes, DEFAULT_CUTOFF_MINUTES);
        assert_eq!(cfg.bins.step, 10.0);
        cfg.validate().unwrap();
    }

    #[test]
    fn unknown_yaml_key_is_rejected() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "max_page: 3").unwrap();
        assert!(matches!(
            RunConfig::from_yaml_file(f.path()),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn env_overrides() {
        let mut cfg = RunConfig::default();
        cfg.apply_overrides(lookup(&[
            ("RACE_URL", " https://example.com/race "),
            ("RACE_MAX_PAGES", "5"),
            ("RACE_CUTOFF_MINUTES", "390.5"),
            ("RACE_PLOT", ""),
            ("RACE_TARGET_MINUTES", "240"),
        ]))
        .unwrap();

        assert_eq!(cfg.source_url, "https://example.com/race");
        assert_eq!(cfg.max_pages, 5);
        assert_eq!(cfg.cutoff_minutes, 390.5);
        assert_eq!(cfg.plot_path, None);
        assert_eq!(cfg.target_minutes, Some(240.0));
        assert_eq!(cfg.race_name, "Chicago Marathon");
    }

    #[test]
    fn bad_override_is_reported() {
        let mut cfg = RunConfig::default();
        let err = cfg
            .apply_overrides(lookup(&[("RACE_MAX_PAGES", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("RACE_MAX_PAGES"));
    }

    #[test]
    fn validation() {
        let bad_url = RunConfig {
            source_url: "not a url".into(),
            ..RunConfig::default()
        };
        assert!(matches!(bad_url.validate(), Err(ConfigError::Url { .. })));

        let zero_pages = RunConfig {
            max_pages: 0,
            ..RunConfig::default()
        };
        assert!(zero_pages.validate().is_err());

        let negative_cutoff = RunConfig {
            cutoff_minutes: -1.0,
            ..RunConfig::default()
        };
        assert!(negative_cutoff.validate().is_err());

        let zero_target = RunConfig {
            target_minutes: Some(0.0),
            ..RunConfig::default()
        };
        assert!(zero_target.validate().is_err());

        let empty_bins = RunConfig {
            bins: BinGrid {
                start: 300.0,
                end: 60.0,
                step: 5.0,
            },
            ..RunConfig::default()
        };
        assert!(empty_bins.validate().is_err());
    }
}
