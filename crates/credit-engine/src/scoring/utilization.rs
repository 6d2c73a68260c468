use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::round_half_up;
use crate::accounts::AccountStatus;

/// Utilization level lenders generally treat as healthy.
pub const DEFAULT_TARGET_PERCENT: f64 = 30.0;

/// Revolving credit line (card-like account with a positive limit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevolvingLine {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub balance: f64,
    pub limit: f64,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub closed_at: Option<NaiveDate>,
}

impl RevolvingLine {
    /// A line counts while its status is open and it has no closing date on or
    /// before `as_of`.
    pub fn is_open(&self, as_of: NaiveDate) -> bool {
        self.status == AccountStatus::Open
            && self.closed_at.map_or(true, |closed_at| closed_at > as_of)
    }

    /// Balance over limit; zero when the limit cannot be divided by.
    pub fn utilization_fraction(&self) -> f64 {
        if self.limit > 0.0 {
            self.balance / self.limit
        } else {
            0.0
        }
    }

    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Aggregate utilization over the open lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilizationSummary {
    pub total_balance: f64,
    pub total_limit: f64,
    pub percent: f64,
    pub open_lines: usize,
}

impl UtilizationSummary {
    /// Balance reduction needed across the aggregate to reach `target_percent`.
    pub fn paydown_to(&self, target_percent: f64) -> f64 {
        paydown(self.total_balance, self.total_limit, target_percent)
    }
}

/// Per-line view used for ranking tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineUtilization {
    pub id: String,
    pub name: String,
    pub balance: f64,
    pub limit: f64,
    pub fraction: f64,
    pub percent: u32,
}

impl LineUtilization {
    fn from_line(line: &RevolvingLine) -> Self {
        let fraction = line.utilization_fraction();
        Self {
            id: line.id.clone(),
            name: line.display_name().to_string(),
            balance: line.balance,
            limit: line.limit,
            fraction,
            percent: round_half_up(fraction * 100.0).max(0.0) as u32,
        }
    }

    pub fn paydown_to(&self, target_percent: f64) -> f64 {
        paydown(self.balance, self.limit, target_percent)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineOrder {
    #[default]
    UtilizationDescending,
    UtilizationAscending,
    Name,
}

pub fn utilization(lines: &[RevolvingLine], as_of: NaiveDate) -> UtilizationSummary {
    let mut total_balance = 0.0;
    let mut total_limit = 0.0;
    let mut open_lines = 0;

    for line in lines.iter().filter(|line| line.is_open(as_of)) {
        total_balance += line.balance;
        total_limit += line.limit;
        open_lines += 1;
    }

    let percent = if total_limit > 0.0 {
        total_balance / total_limit * 100.0
    } else {
        0.0
    };

    UtilizationSummary {
        total_balance,
        total_limit,
        percent,
        open_lines,
    }
}

/// Paydown for one line: `max(0, balance - target% * limit)`.
pub fn paydown_target(line: &RevolvingLine, target_percent: f64) -> f64 {
    paydown(line.balance, line.limit, target_percent)
}

fn paydown(balance: f64, limit: f64, target_percent: f64) -> f64 {
    (balance - target_percent / 100.0 * limit).max(0.0)
}

/// Paydown computed on aggregate balance and limit. This is not the sum of the
/// per-line targets: under-target lines absorb part of the excess here.
pub fn aggregate_paydown(lines: &[RevolvingLine], as_of: NaiveDate, target_percent: f64) -> f64 {
    utilization(lines, as_of).paydown_to(target_percent)
}

/// Open line with the highest balance-to-limit ratio. Zero-limit lines are
/// skipped; ties keep the earliest line.
pub fn worst_line(lines: &[RevolvingLine], as_of: NaiveDate) -> Option<LineUtilization> {
    let mut worst: Option<&RevolvingLine> = None;

    for line in lines
        .iter()
        .filter(|line| line.is_open(as_of) && line.limit > 0.0)
    {
        match worst {
            Some(current) if line.utilization_fraction() <= current.utilization_fraction() => {}
            _ => worst = Some(line),
        }
    }

    worst.map(LineUtilization::from_line)
}

/// Open lines in the requested order. Sorting is stable, so equal keys keep
/// their input order.
pub fn rank_lines(
    lines: &[RevolvingLine],
    as_of: NaiveDate,
    order: LineOrder,
) -> Vec<LineUtilization> {
    let mut ranked: Vec<LineUtilization> = lines
        .iter()
        .filter(|line| line.is_open(as_of))
        .map(LineUtilization::from_line)
        .collect();

    match order {
        LineOrder::UtilizationDescending => {
            ranked.sort_by(|a, b| b.fraction.total_cmp(&a.fraction))
        }
        LineOrder::UtilizationAscending => ranked.sort_by(|a, b| a.fraction.total_cmp(&b.fraction)),
        LineOrder::Name => ranked.sort_by_key(|line| line.name.to_lowercase()),
    }

    ranked
}

/// Percentage points still above the target, floored at zero.
pub fn progress_to_target(percent: f64, target_percent: f64) -> f64 {
    (percent - target_percent).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 15).expect("valid date")
    }

    fn line(id: &str, balance: f64, limit: f64) -> RevolvingLine {
        RevolvingLine {
            id: id.to_string(),
            name: None,
            balance,
            limit,
            status: AccountStatus::Open,
            closed_at: None,
        }
    }

    fn sample_lines() -> Vec<RevolvingLine> {
        vec![
            line("sapphire", 2600.0, 6000.0),
            line("discover", 900.0, 4500.0),
            line("amex", 400.0, 3500.0),
            line("citi", 1800.0, 8000.0),
        ]
    }

    #[test]
    fn aggregates_open_lines() {
        let summary = utilization(&sample_lines(), today());

        assert_eq!(summary.total_balance, 5700.0);
        assert_eq!(summary.total_limit, 22000.0);
        assert!((summary.percent - 5700.0 / 22000.0 * 100.0).abs() < 1e-9);
        assert!((summary.percent - 25.909).abs() < 0.01);
        assert_eq!(summary.open_lines, 4);
    }

    #[test]
    fn zero_limit_yields_zero_percent() {
        let summary = utilization(&[line("empty", 150.0, 0.0)], today());
        assert_eq!(summary.percent, 0.0);

        let summary = utilization(&[], today());
        assert_eq!(summary.percent, 0.0);
        assert_eq!(summary.open_lines, 0);
    }

    #[test]
    fn closed_lines_are_excluded() {
        let mut lines = sample_lines();
        lines[0].status = AccountStatus::Closed;
        lines[1].closed_at = Some(today() - chrono::Duration::days(30));
        lines[2].closed_at = Some(today() + chrono::Duration::days(30));

        let summary = utilization(&lines, today());

        assert_eq!(summary.open_lines, 2);
        assert_eq!(summary.total_balance, 400.0 + 1800.0);
        assert_eq!(summary.total_limit, 3500.0 + 8000.0);
    }

    #[test]
    fn per_line_paydown_matches_target() {
        let target = paydown_target(&line("sapphire", 2600.0, 6000.0), 30.0);
        assert!((target - 800.0).abs() < 1e-9);

        let already_below = paydown_target(&line("amex", 400.0, 3500.0), 30.0);
        assert_eq!(already_below, 0.0);
    }

    #[test]
    fn aggregate_paydown_differs_from_sum_of_lines() {
        let lines = sample_lines();
        let aggregate = aggregate_paydown(&lines, today(), 30.0);
        let per_line_sum: f64 = lines.iter().map(|l| paydown_target(l, 30.0)).sum();

        assert_eq!(aggregate, 0.0);
        assert!(per_line_sum > 0.0);

        let aggregate = aggregate_paydown(&lines, today(), 20.0);
        assert!((aggregate - (5700.0 - 4400.0)).abs() < 1e-9);
    }

    #[test]
    fn worst_line_skips_zero_limits_and_keeps_first_tie() {
        let lines = vec![
            line("zero", 500.0, 0.0),
            line("first", 500.0, 1000.0),
            line("second", 250.0, 500.0),
        ];

        let worst = worst_line(&lines, today()).expect("worst line present");
        assert_eq!(worst.id, "first");
        assert_eq!(worst.percent, 50);

        assert!(worst_line(&[line("zero", 500.0, 0.0)], today()).is_none());
    }

    #[test]
    fn ranking_is_stable() {
        let lines = vec![
            line("b", 100.0, 1000.0),
            line("a", 500.0, 1000.0),
            line("c", 100.0, 1000.0),
            line("zero", 10.0, 0.0),
        ];

        let descending = rank_lines(&lines, today(), LineOrder::UtilizationDescending);
        let ids: Vec<_> = descending.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "zero"]);

        let ascending = rank_lines(&lines, today(), LineOrder::UtilizationAscending);
        let ids: Vec<_> = ascending.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["zero", "b", "c", "a"]);

        let by_name = rank_lines(&lines, today(), LineOrder::Name);
        let ids: Vec<_> = by_name.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "zero"]);
    }

    #[test]
    fn progress_floors_at_zero() {
        assert_eq!(progress_to_target(45.5, 30.0), 15.5);
        assert_eq!(progress_to_target(12.0, 30.0), 0.0);
    }
}
