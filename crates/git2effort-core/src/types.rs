use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A fixed-length window of months within a calendar year.
///
/// Ordered by year, then by index within the year, so a `BTreeMap` keyed
/// by `Period` enumerates periods chronologically. Rendered as
/// `YEAR.INDEX` (e.g. `2020.1`) for display and serialization.
///
/// # Examples
///
/// ```
/// use git2effort_core::Period;
///
/// let p = Period::from_month(2020, 3, 6);
/// assert_eq!(p, Period::new(2020, 1));
/// assert_eq!(p.to_string(), "2020.1");
/// assert!(Period::new(2019, 2) < Period::new(2020, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    /// Calendar year.
    pub year: i32,
    /// One-based subperiod index within the year.
    pub index: u32,
}

impl Period {
    /// Create a period from its year and one-based index.
    pub fn new(year: i32, index: u32) -> Self {
        Self { year, index }
    }

    /// Period containing `month` (1-12) of `year`.
    ///
    /// The index is `floor((month - 1) / (period_length * 2)) + 1`. The
    /// doubled divisor means only the lower half of the
    /// `12 / period_length` calendar slots are ever produced; with the
    /// default six-month length every month maps to index 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use git2effort_core::Period;
    ///
    /// assert_eq!(Period::from_month(2021, 12, 6).index, 1);
    /// assert_eq!(Period::from_month(2021, 12, 3).index, 2);
    /// assert_eq!(Period::from_month(2021, 12, 1).index, 6);
    /// ```
    pub fn from_month(year: i32, month: u32, period_length: u32) -> Self {
        let width = period_length.max(1) * 2;
        Self {
            year,
            index: month.saturating_sub(1) / width + 1,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.year, self.index)
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, index) = s
            .split_once('.')
            .ok_or_else(|| format!("invalid period: {s}"))?;
        let year = year
            .parse()
            .map_err(|_| format!("invalid period year: {s}"))?;
        let index = index
            .parse()
            .map_err(|_| format!("invalid period index: {s}"))?;
        Ok(Self { year, index })
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use git2effort_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
