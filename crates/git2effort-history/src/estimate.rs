//! Person-month effort from per-period activity.
//!
//! An author whose count in a period exceeds the full-time threshold is
//! credited the whole period length; below it, effort scales linearly
//! with the count. Summing across authors and periods gives the project
//! estimate.

use std::collections::BTreeMap;

use git2effort_core::{EffortConfig, EffortError, Period};
use serde::Serialize;
use tracing::info;

use crate::authors::{AuthorCommits, CommitTime};
use crate::identity::{merge, DuplicatePair};
use crate::period::{calendar_periods, count_by_period, PeriodCounter};

/// Effort tallies per period.
///
/// # Examples
///
/// ```
/// use git2effort_history::estimate::PeriodEffort;
///
/// let tally = PeriodEffort::default();
/// assert!(tally.effort.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodEffort {
    /// Person-months accumulated per period.
    pub effort: BTreeMap<Period, f64>,
    /// Authors above the full-time threshold per period.
    pub full_time: BTreeMap<Period, u32>,
    /// Authors below the full-time threshold per period.
    pub non_full_time: BTreeMap<Period, u32>,
}

/// Convert per-author period counters into effort per period.
///
/// `count / threshold * period_length` is capped at `period_length`
/// (counted as full-time); otherwise it is rounded to two decimals
/// (counted as non-full-time).
///
/// # Errors
///
/// Returns [`EffortError::Config`] if `config` fails validation, e.g. a
/// zero threshold.
///
/// # Examples
///
/// ```
/// use git2effort_core::{EffortConfig, Period};
/// use git2effort_history::estimate::period_effort;
/// use git2effort_history::period::PeriodCounter;
///
/// let p = Period::new(2020, 1);
/// let counters = vec![PeriodCounter::from([(p, 10)]), PeriodCounter::from([(p, 60)])];
/// let tally = period_effort(&counters, &EffortConfig::default()).unwrap();
/// assert_eq!(tally.effort[&p], 1.2 + 6.0);
/// assert_eq!(tally.full_time[&p], 1);
/// assert_eq!(tally.non_full_time[&p], 1);
/// ```
pub fn period_effort(
    counters: &[PeriodCounter],
    config: &EffortConfig,
) -> Result<PeriodEffort, EffortError> {
    config.validate()?;
    let period_length = f64::from(config.period_length);
    let threshold = f64::from(config.threshold);

    let mut tally = PeriodEffort::default();
    for counter in counters {
        for (&period, &count) in counter {
            let raw = f64::from(count) / threshold * period_length;
            let effort = if raw > period_length {
                *tally.full_time.entry(period).or_default() += 1;
                period_length
            } else {
                *tally.non_full_time.entry(period).or_default() += 1;
                round2(raw)
            };
            *tally.effort.entry(period).or_default() += effort;
        }
    }
    Ok(tally)
}

/// Upper bound on effort per period: one full period per active author.
///
/// # Examples
///
/// ```
/// use git2effort_core::{EffortConfig, Period};
/// use git2effort_history::estimate::period_max_effort;
/// use git2effort_history::period::PeriodCounter;
///
/// let p = Period::new(2020, 1);
/// let counters = vec![PeriodCounter::from([(p, 1)]), PeriodCounter::from([(p, 300)])];
/// let max = period_max_effort(&counters, &EffortConfig::default());
/// assert_eq!(max[&p], 12.0);
/// ```
pub fn period_max_effort(
    counters: &[PeriodCounter],
    config: &EffortConfig,
) -> BTreeMap<Period, f64> {
    let period_length = f64::from(config.period_length);
    let mut max: BTreeMap<Period, f64> = BTreeMap::new();
    for counter in counters {
        for &period in counter.keys() {
            *max.entry(period).or_default() += period_length;
        }
    }
    max
}

/// Sum of effort over all periods.
pub fn total_effort(effort: &BTreeMap<Period, f64>) -> f64 {
    effort.values().sum()
}

/// Round to two decimals, ties to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// One row of the per-period table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRow {
    /// Calendar period.
    pub period: Period,
    /// Authors above the full-time threshold.
    pub full_time: u32,
    /// Authors below the full-time threshold.
    pub non_full_time: u32,
    /// Estimated person-months.
    pub effort: f64,
    /// Person-months if every active author worked full time.
    pub max_effort: f64,
}

/// Full result of an estimation run.
///
/// # Examples
///
/// ```
/// use git2effort_core::EffortConfig;
/// use git2effort_history::authors::AuthorCommits;
/// use git2effort_history::estimate::estimate;
///
/// let report = estimate(AuthorCommits::new(), &EffortConfig::default()).unwrap();
/// assert_eq!(report.total_effort, 0.0);
/// assert!(report.periods.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffortReport {
    /// Tunables the estimate was computed with.
    pub config: EffortConfig,
    /// Estimated person-months, rounded to two decimals.
    pub total_effort: f64,
    /// Person-months if every active author worked full time.
    pub max_effort: f64,
    /// Commits analyzed.
    pub commits: usize,
    /// Distinct author strings before merging.
    pub authors_before_merge: usize,
    /// Distinct people after merging.
    pub authors_after_merge: usize,
    /// Identities folded into another.
    pub merged: Vec<DuplicatePair>,
    /// Earliest commit.
    pub first_commit: Option<CommitTime>,
    /// Latest commit.
    pub last_commit: Option<CommitTime>,
    /// Per-period table over the calendar years spanned by the history.
    pub periods: Vec<PeriodRow>,
}

/// Run the whole pipeline: validate, merge, bucket, aggregate.
///
/// # Errors
///
/// Returns [`EffortError::Config`] for invalid tunables (checked before
/// anything else) and [`EffortError::Identity`] for malformed authors.
pub fn estimate(
    mut authors: AuthorCommits,
    config: &EffortConfig,
) -> Result<EffortReport, EffortError> {
    config.validate()?;

    let authors_before_merge = authors.len();
    let merged = merge(&mut authors)?;
    let counters = count_by_period(&authors, config);
    let tally = period_effort(&counters, config)?;
    let max = period_max_effort(&counters, config);

    let total = round2(total_effort(&tally.effort));
    let max_total = total_effort(&max);
    info!(
        authors = authors.len(),
        merged = merged.len(),
        effort = total,
        max_effort = max_total,
        "estimated effort"
    );

    Ok(EffortReport {
        config: *config,
        total_effort: total,
        max_effort: max_total,
        commits: authors.commit_count(),
        authors_before_merge,
        authors_after_merge: authors.len(),
        merged,
        first_commit: authors.first_commit(),
        last_commit: authors.last_commit(),
        periods: build_rows(&tally, &max, config),
    })
}

fn build_rows(
    tally: &PeriodEffort,
    max: &BTreeMap<Period, f64>,
    config: &EffortConfig,
) -> Vec<PeriodRow> {
    let (Some(first), Some(last)) = (max.keys().next(), max.keys().next_back()) else {
        return Vec::new();
    };

    calendar_periods(first.year, last.year, config.period_length)
        .into_iter()
        .map(|period| PeriodRow {
            period,
            full_time: tally.full_time.get(&period).copied().unwrap_or(0),
            non_full_time: tally.non_full_time.get(&period).copied().unwrap_or(0),
            effort: tally.effort.get(&period).copied().unwrap_or(0.0),
            max_effort: max.get(&period).copied().unwrap_or(0.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration};
    use proptest::prelude::*;

    use super::*;

    fn at(s: &str) -> CommitTime {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn daily(author: &str, start: &str, days: i64) -> Vec<(String, CommitTime)> {
        let start = at(start);
        (0..days)
            .map(|d| (author.to_string(), start + Duration::days(d)))
            .collect()
    }

    #[test]
    fn sixty_distinct_days_saturate() {
        let authors: AuthorCommits = daily("Ann <a@x>", "2020-01-01T10:00:00Z", 60)
            .into_iter()
            .collect();
        let config = EffortConfig::default();
        let counters = count_by_period(&authors, &config);
        let p = Period::new(2020, 1);
        assert_eq!(counters, vec![PeriodCounter::from([(p, 60)])]);

        let tally = period_effort(&counters, &config).unwrap();
        assert_eq!(tally.effort[&p], 6.0);
        assert_eq!(tally.full_time[&p], 1);
        assert!(!tally.non_full_time.contains_key(&p));
    }

    #[test]
    fn ten_commits_give_fractional_effort() {
        let p = Period::new(2020, 1);
        let counters = vec![PeriodCounter::from([(p, 10)])];
        let tally = period_effort(&counters, &EffortConfig::default()).unwrap();
        assert_eq!(tally.effort[&p], 1.2);
        assert_eq!(tally.non_full_time[&p], 1);
        assert!(!tally.full_time.contains_key(&p));
    }

    #[test]
    fn half_cent_ties_round_to_even() {
        let p = Period::new(2020, 1);
        let counters = vec![PeriodCounter::from([(p, 1)])];
        let config = EffortConfig {
            period_length: 1,
            threshold: 8,
            ..EffortConfig::default()
        };
        // 1 / 8 * 1 = 0.125 exactly.
        let tally = period_effort(&counters, &config).unwrap();
        assert_eq!(tally.effort[&p], 0.12);

        // 3 / 8 * 1 = 0.375 rounds up to the even 0.38.
        let counters = vec![PeriodCounter::from([(p, 3)])];
        let tally = period_effort(&counters, &config).unwrap();
        assert_eq!(tally.effort[&p], 0.38);
    }

    #[test]
    fn exactly_threshold_is_not_saturated() {
        let p = Period::new(2020, 1);
        let counters = vec![PeriodCounter::from([(p, 50)])];
        let tally = period_effort(&counters, &EffortConfig::default()).unwrap();
        assert_eq!(tally.effort[&p], 6.0);
        assert_eq!(tally.non_full_time[&p], 1);
    }

    #[test]
    fn zero_threshold_is_a_config_error() {
        let config = EffortConfig {
            threshold: 0,
            ..EffortConfig::default()
        };
        let counters = vec![PeriodCounter::from([(Period::new(2020, 1), 3)])];
        let err = period_effort(&counters, &config).unwrap_err();
        assert!(matches!(err, EffortError::Config(_)));
    }

    #[test]
    fn max_effort_counts_each_active_author_once() {
        let p1 = Period::new(2020, 1);
        let p2 = Period::new(2021, 1);
        let counters = vec![
            PeriodCounter::from([(p1, 1), (p2, 80)]),
            PeriodCounter::from([(p1, 5)]),
        ];
        let max = period_max_effort(&counters, &EffortConfig::default());
        assert_eq!(max[&p1], 12.0);
        assert_eq!(max[&p2], 6.0);
        assert_eq!(total_effort(&max), 18.0);
    }

    #[test]
    fn merged_duplicates_feed_one_counter() {
        let mut commits = daily("Jane Doe <jane@x.com>", "2020-01-01T10:00:00Z", 30);
        commits.extend(daily("Jane Doe <jane@y.com>", "2020-03-01T10:00:00Z", 30));
        let authors: AuthorCommits = commits.into_iter().collect();

        let report = estimate(authors, &EffortConfig::default()).unwrap();
        assert_eq!(report.authors_before_merge, 2);
        assert_eq!(report.authors_after_merge, 1);
        // 60 active days in one period saturate; unmerged it would be 2 * 3.6.
        assert_eq!(report.total_effort, 6.0);
        assert_eq!(report.max_effort, 6.0);
    }

    #[test]
    fn report_rows_cover_calendar_years() {
        let mut commits = daily("Ann <a@x>", "2019-03-01T10:00:00Z", 5);
        commits.extend(daily("Bob <b@x>", "2021-11-01T10:00:00Z", 100));
        let authors: AuthorCommits = commits.into_iter().collect();

        let report = estimate(authors, &EffortConfig::default()).unwrap();
        let periods: Vec<String> = report.periods.iter().map(|r| r.period.to_string()).collect();
        assert_eq!(
            periods,
            ["2019.1", "2019.2", "2020.1", "2020.2", "2021.1", "2021.2", "2022.1", "2022.2"]
        );
        assert_eq!(report.periods[0].effort, 0.6);
        assert_eq!(report.periods[0].non_full_time, 1);
        assert_eq!(report.periods[2].effort, 0.0);
        // Bob's Nov-Dec 2021 days: 61 active days -> saturated.
        assert_eq!(report.periods[4].full_time, 1);
        assert_eq!(report.periods[4].effort, 6.0);
        assert_eq!(report.total_effort, round2(0.6 + 6.0 + 39.0 / 50.0 * 6.0));
        assert_eq!(report.commits, 105);
    }

    #[test]
    fn invalid_config_fails_before_merging() {
        let authors: AuthorCommits = vec![("broken", at("2020-01-01T00:00:00Z"))]
            .into_iter()
            .collect();
        let config = EffortConfig {
            period_length: 5,
            ..EffortConfig::default()
        };
        assert!(matches!(estimate(authors, &config), Err(EffortError::Config(_))));
    }

    #[test]
    fn malformed_author_is_reported() {
        let authors: AuthorCommits = vec![("broken", at("2020-01-01T00:00:00Z"))]
            .into_iter()
            .collect();
        assert!(matches!(
            estimate(authors, &EffortConfig::default()),
            Err(EffortError::Identity(_))
        ));
    }

    #[test]
    fn report_serializes_camel_case() {
        let authors: AuthorCommits = daily("Ann <a@x>", "2020-01-01T10:00:00Z", 3)
            .into_iter()
            .collect();
        let report = estimate(authors, &EffortConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("totalEffort").is_some());
        assert!(json.get("authorsAfterMerge").is_some());
        assert_eq!(json["config"]["periodLength"], 6);
        assert!(json["config"].get("period_length").is_none());
        assert_eq!(json["periods"][0]["period"], "2020.1");
        assert!(json["periods"][0].get("nonFullTime").is_some());
    }

    fn counters_strategy() -> impl Strategy<Value = Vec<PeriodCounter>> {
        prop::collection::vec(
            prop::collection::btree_map((2015i32..2020, 1u32..3), 1u32..200, 0..6),
            0..8,
        )
        .prop_map(|authors| {
            authors
                .into_iter()
                .map(|counter| {
                    counter
                        .into_iter()
                        .map(|((year, index), count)| (Period::new(year, index), count))
                        .collect::<PeriodCounter>()
                })
                .collect::<Vec<_>>()
        })
    }

    proptest! {
        #[test]
        fn single_author_effort_never_exceeds_period_length(
            count in 1u32..1000,
            threshold in 1u32..200,
            period_length in prop::sample::select(vec![1u32, 2, 3, 4, 6, 12]),
        ) {
            let config = EffortConfig { period_length, threshold, active_days: true };
            let p = Period::new(2020, 1);
            let tally = period_effort(&[PeriodCounter::from([(p, count)])], &config).unwrap();
            prop_assert!(tally.effort[&p] <= f64::from(period_length));
        }

        #[test]
        fn max_effort_bounds_estimate(
            counters in counters_strategy(),
            threshold in 1u32..120,
            period_length in prop::sample::select(vec![1u32, 2, 3, 4, 6, 12]),
        ) {
            let config = EffortConfig { period_length, threshold, active_days: true };
            let tally = period_effort(&counters, &config).unwrap();
            let max = period_max_effort(&counters, &config);
            prop_assert!(total_effort(&max) + 1e-9 >= total_effort(&tally.effort));

            let again = period_effort(&counters, &config).unwrap();
            prop_assert_eq!(tally, again);
        }
    }
}
