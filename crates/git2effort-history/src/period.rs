//! Bucketing of author activity into calendar periods.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};
use git2effort_core::{EffortConfig, Period};

use crate::authors::AuthorCommits;

/// Counted commits (or active days) per period for one author.
pub type PeriodCounter = BTreeMap<Period, u32>;

/// Count each author's commits per period.
///
/// Returns one counter per author, in the map's iteration order. With
/// `active_days` set, only the first commit of each calendar day (in the
/// commit's own timezone) is counted.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use git2effort_core::{EffortConfig, Period};
/// use git2effort_history::authors::AuthorCommits;
/// use git2effort_history::period::count_by_period;
///
/// let t = |s| DateTime::parse_from_rfc3339(s).unwrap();
/// let authors: AuthorCommits = vec![
///     ("Ann <ann@x>", t("2020-02-01T09:00:00Z")),
///     ("Ann <ann@x>", t("2020-02-01T17:00:00Z")),
///     ("Ann <ann@x>", t("2020-02-03T09:00:00Z")),
/// ]
/// .into_iter()
/// .collect();
///
/// let counters = count_by_period(&authors, &EffortConfig::default());
/// assert_eq!(counters[0][&Period::new(2020, 1)], 2);
/// ```
pub fn count_by_period(authors: &AuthorCommits, config: &EffortConfig) -> Vec<PeriodCounter> {
    authors
        .iter()
        .map(|(_, times)| {
            let mut counter = PeriodCounter::new();
            let mut seen_days: HashSet<NaiveDate> = HashSet::new();
            for at in times {
                let day = at.date_naive();
                if config.active_days && !seen_days.insert(day) {
                    continue;
                }
                let period = Period::from_month(day.year(), day.month(), config.period_length);
                *counter.entry(period).or_default() += 1;
            }
            counter
        })
        .collect()
}

/// Every calendar period from `first_year` through `last_year`.
///
/// Enumerates `12 / period_length` periods per year. This is the full
/// calendar grid used for display and deliberately differs from the
/// narrower set of indices [`count_by_period`] can produce.
///
/// # Examples
///
/// ```
/// use git2effort_history::period::calendar_periods;
///
/// let periods = calendar_periods(2019, 2020, 6);
/// let rendered: Vec<String> = periods.iter().map(ToString::to_string).collect();
/// assert_eq!(rendered, ["2019.1", "2019.2", "2020.1", "2020.2"]);
/// ```
pub fn calendar_periods(first_year: i32, last_year: i32, period_length: u32) -> Vec<Period> {
    let per_year = 12 / period_length.max(1);
    (first_year..=last_year)
        .flat_map(|year| (1..=per_year).map(move |index| Period::new(year, index)))
        .collect()
}
