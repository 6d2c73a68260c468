use serde::{Deserialize, Serialize};

use super::normalize::CorridorScore;

/// One line of a lender checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LenderCriterion {
    pub label: String,
    pub pass: bool,
}

impl LenderCriterion {
    pub fn new(label: impl Into<String>, pass: bool) -> Self {
        Self {
            label: label.into(),
            pass,
        }
    }
}

/// Qualitative outcome of a lender checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitTag {
    #[serde(rename = "Pre-qualified")]
    PreQualified,
    Borderline,
    Unlikely,
}

impl FitTag {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PreQualified => "Pre-qualified",
            Self::Borderline => "Borderline",
            Self::Unlikely => "Unlikely",
        }
    }

    pub const fn tone(self) -> &'static str {
        match self {
            Self::PreQualified => "good",
            Self::Borderline => "warn",
            Self::Unlikely => "bad",
        }
    }
}

impl std::fmt::Display for FitTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LenderFit {
    pub tag: FitTag,
    pub pass_count: usize,
    pub total: usize,
    pub criteria: Vec<LenderCriterion>,
}

impl LenderFit {
    pub fn summary(&self) -> String {
        format!(
            "{} ({}/{} criteria met)",
            self.tag.label(),
            self.pass_count,
            self.total
        )
    }
}

/// All criteria met is Pre-qualified, exactly one miss is Borderline, anything
/// else is Unlikely.
pub fn evaluate(criteria: Vec<LenderCriterion>) -> LenderFit {
    let total = criteria.len();
    let pass_count = criteria.iter().filter(|criterion| criterion.pass).count();

    let tag = if pass_count == total {
        FitTag::PreQualified
    } else if total.checked_sub(1) == Some(pass_count) {
        FitTag::Borderline
    } else {
        FitTag::Unlikely
    };

    LenderFit {
        tag,
        pass_count,
        total,
        criteria,
    }
}

/// Metrics behind a single-country (origin) score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OriginMetrics {
    pub utilization_pct: f64,
    pub on_time_rate: f64,
    pub avg_age_months: f64,
    pub inquiries_12m: u32,
    #[serde(default)]
    pub active_accounts: u32,
}

pub fn origin_criteria(metrics: &OriginMetrics) -> Vec<LenderCriterion> {
    vec![
        LenderCriterion::new("Utilization ≤ 30%", metrics.utilization_pct <= 30.0),
        LenderCriterion::new("On-time ≥ 95%", metrics.on_time_rate >= 95.0),
        LenderCriterion::new("Avg age ≥ 24m", metrics.avg_age_months >= 24.0),
        LenderCriterion::new("Inquiries ≤ 2 (12m)", metrics.inquiries_12m <= 2),
    ]
}

pub fn global_criteria(corridor: &CorridorScore) -> Vec<LenderCriterion> {
    vec![
        LenderCriterion::new("Global ≥ 680", corridor.global >= 680),
        LenderCriterion::new("Gap ≤ 50 pts", corridor.gap <= 50.0),
        LenderCriterion::new(
            "Both ≥ 640",
            corridor.origin >= 640.0 && corridor.destination >= 640.0,
        ),
        LenderCriterion::new("Percent ≥ 65%", corridor.percent_of_max >= 65),
    ]
}

pub fn evaluate_origin(metrics: &OriginMetrics) -> LenderFit {
    evaluate(origin_criteria(metrics))
}

pub fn evaluate_corridor(corridor: &CorridorScore) -> LenderFit {
    evaluate(global_criteria(corridor))
}
