use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EffortError;

/// Period lengths (in months) that evenly divide a calendar year.
pub const VALID_PERIOD_LENGTHS: [u32; 6] = [1, 2, 3, 4, 6, 12];

/// Top-level configuration loaded from `.git2effort.toml`.
///
/// Supports layered resolution: CLI flags > config file > defaults.
///
/// # Examples
///
/// ```
/// use git2effort_core::Git2EffortConfig;
///
/// let config = Git2EffortConfig::default();
/// assert_eq!(config.effort.period_length, 6);
/// assert_eq!(config.effort.threshold, 50);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Git2EffortConfig {
    /// Effort model tunables.
    #[serde(default)]
    pub effort: EffortConfig,
    /// History mining settings.
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Git2EffortConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EffortError::FileNotFound`] if `path` does not exist,
    /// [`EffortError::Io`] if it cannot be read, or [`EffortError::Toml`]
    /// if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use git2effort_core::Git2EffortConfig;
    /// use std::path::Path;
    ///
    /// let config = Git2EffortConfig::from_file(Path::new(".git2effort.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, EffortError> {
        if !path.exists() {
            return Err(EffortError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`EffortError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use git2effort_core::Git2EffortConfig;
    ///
    /// let toml = r#"
    /// [effort]
    /// period_length = 3
    /// "#;
    /// let config = Git2EffortConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.effort.period_length, 3);
    /// assert_eq!(config.effort.threshold, 50);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, EffortError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Tunables of the effort model.
///
/// Passed explicitly into every stage of the estimation pipeline.
///
/// # Examples
///
/// ```
/// use git2effort_core::EffortConfig;
///
/// let config = EffortConfig::default();
/// assert_eq!(config.period_length, 6);
/// assert_eq!(config.threshold, 50);
/// assert!(config.active_days);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct EffortConfig {
    /// Months per bucketing period, one of 1, 2, 3, 4, 6, 12 (default: 6).
    #[serde(default = "default_period_length")]
    pub period_length: u32,
    /// Commits within a period that count as full-time work (default: 50).
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    /// Count at most one commit per author per calendar day (default: true).
    #[serde(default = "default_active_days")]
    pub active_days: bool,
}

fn default_period_length() -> u32 {
    6
}

fn default_threshold() -> u32 {
    50
}

fn default_active_days() -> bool {
    true
}

impl Default for EffortConfig {
    fn default() -> Self {
        Self {
            period_length: default_period_length(),
            threshold: default_threshold(),
            active_days: default_active_days(),
        }
    }
}

impl EffortConfig {
    /// Check the tunables before any processing starts.
    ///
    /// # Errors
    ///
    /// Returns [`EffortError::Config`] if `threshold` is zero or
    /// `period_length` does not evenly divide twelve months.
    ///
    /// # Examples
    ///
    /// ```
    /// use git2effort_core::EffortConfig;
    ///
    /// let bad = EffortConfig { period_length: 5, ..EffortConfig::default() };
    /// assert!(bad.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), EffortError> {
        if self.threshold == 0 {
            return Err(EffortError::Config(
                "threshold must be a positive number of commits".into(),
            ));
        }
        if !VALID_PERIOD_LENGTHS.contains(&self.period_length) {
            return Err(EffortError::Config(format!(
                "period_length must be one of {VALID_PERIOD_LENGTHS:?} months, got {}",
                self.period_length
            )));
        }
        Ok(())
    }
}

/// History mining configuration.
///
/// # Examples
///
/// ```
/// use git2effort_core::HistoryConfig;
///
/// let config = HistoryConfig::default();
/// assert!(config.branch.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Branch to walk instead of HEAD.
    pub branch: Option<String>,
}
