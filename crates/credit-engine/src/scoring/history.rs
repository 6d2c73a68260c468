use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::round_half_up;
use crate::accounts::months_between;

/// Hard inquiries older than this many months no longer count.
pub const INQUIRY_WINDOW_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[serde(rename = "on")]
    OnTime,
    Late30,
    Late60,
    Late90,
    Missed,
}

/// One reported month of payment history, e.g. `{"month": "2025-03", "status": "late30"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMonth {
    pub month: String,
    pub status: PaymentStatus,
}

/// Percentage of reported months paid on time, rounded to a whole number.
/// `None` when nothing has been reported.
pub fn on_time_rate(months: &[PaymentMonth]) -> Option<f64> {
    if months.is_empty() {
        return None;
    }

    let on_time = months
        .iter()
        .filter(|month| month.status == PaymentStatus::OnTime)
        .count();
    Some(round_half_up(on_time as f64 / months.len() as f64 * 100.0))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryKind {
    #[default]
    Hard,
    Soft,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquiry {
    pub date: NaiveDate,
    #[serde(default)]
    pub kind: InquiryKind,
    #[serde(default)]
    pub bureau: Option<String>,
    #[serde(default)]
    pub requester: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InquiryImpact {
    Low,
    Moderate,
    High,
}

impl InquiryImpact {
    /// Up to one hard inquiry is low impact, up to three moderate.
    pub fn from_hard_count(hard: u32) -> Self {
        match hard {
            0..=1 => Self::Low,
            2..=3 => Self::Moderate,
            _ => Self::High,
        }
    }
}

impl fmt::Display for InquiryImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquirySummary {
    pub hard_12m: u32,
    pub soft_12m: u32,
    pub impact: InquiryImpact,
    pub last_inquiry: Option<NaiveDate>,
}

/// Counts inquiries within the trailing window. Months are calendar months, so
/// anything dated in the future counts as this month.
pub fn inquiry_summary(inquiries: &[Inquiry], as_of: NaiveDate) -> InquirySummary {
    let mut hard_12m = 0;
    let mut soft_12m = 0;

    for inquiry in inquiries
        .iter()
        .filter(|inquiry| months_between(inquiry.date, as_of) <= INQUIRY_WINDOW_MONTHS)
    {
        match inquiry.kind {
            InquiryKind::Hard => hard_12m += 1,
            InquiryKind::Soft => soft_12m += 1,
        }
    }

    InquirySummary {
        hard_12m,
        soft_12m,
        impact: InquiryImpact::from_hard_count(hard_12m),
        last_inquiry: inquiries.iter().map(|inquiry| inquiry.date).max(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn months(statuses: &[PaymentStatus]) -> Vec<PaymentMonth> {
        statuses
            .iter()
            .enumerate()
            .map(|(index, status)| PaymentMonth {
                month: format!("2024-{:02}", index % 12 + 1),
                status: *status,
            })
            .collect()
    }

    fn inquiry(date: &str, kind: InquiryKind) -> Inquiry {
        Inquiry {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid date"),
            kind,
            bureau: None,
            requester: None,
        }
    }

    #[test]
    fn on_time_rate_rounds_share_of_on_time_months() {
        use PaymentStatus::*;

        let mut history = vec![OnTime; 24];
        history[4] = Late30;
        history[10] = Late60;
        history[18] = Missed;
        // 21 of 24
        assert_eq!(on_time_rate(&months(&history)), Some(88.0));

        let mut history = vec![OnTime; 24];
        history[7] = Late30;
        assert_eq!(on_time_rate(&months(&history)), Some(96.0));

        assert_eq!(on_time_rate(&[]), None);
    }

    #[test]
    fn payment_status_uses_short_names() {
        let month: PaymentMonth =
            serde_json::from_str(r#"{"month":"2025-03","status":"on"}"#).expect("parses");
        assert_eq!(month.status, PaymentStatus::OnTime);
        let month: PaymentMonth =
            serde_json::from_str(r#"{"month":"2025-04","status":"late90"}"#).expect("parses");
        assert_eq!(month.status, PaymentStatus::Late90);
    }

    #[test]
    fn summary_counts_trailing_window_by_kind() {
        let as_of = NaiveDate::from_ymd_opt(2025, 10, 15).expect("valid date");
        let inquiries = vec![
            inquiry("2025-09-02", InquiryKind::Hard),
            inquiry("2024-10-30", InquiryKind::Hard),
            inquiry("2024-09-30", InquiryKind::Hard),
            inquiry("2025-06-11", InquiryKind::Soft),
        ];

        let summary = inquiry_summary(&inquiries, as_of);
        assert_eq!(summary.hard_12m, 2);
        assert_eq!(summary.soft_12m, 1);
        assert_eq!(summary.impact, InquiryImpact::Moderate);
        assert_eq!(summary.last_inquiry, NaiveDate::from_ymd_opt(2025, 9, 2));
    }

    #[test]
    fn impact_thresholds() {
        assert_eq!(InquiryImpact::from_hard_count(0), InquiryImpact::Low);
        assert_eq!(InquiryImpact::from_hard_count(1), InquiryImpact::Low);
        assert_eq!(InquiryImpact::from_hard_count(3), InquiryImpact::Moderate);
        assert_eq!(InquiryImpact::from_hard_count(4), InquiryImpact::High);
    }

    #[test]
    fn empty_inquiries_are_low_impact() {
        let as_of = NaiveDate::from_ymd_opt(2025, 10, 15).expect("valid date");
        let summary = inquiry_summary(&[], as_of);
        assert_eq!(summary.hard_12m, 0);
        assert_eq!(summary.impact, InquiryImpact::Low);
        assert_eq!(summary.last_inquiry, None);
    }

    #[test]
    fn kind_defaults_to_hard() {
        let parsed: Inquiry =
            serde_json::from_str(r#"{"date":"2025-01-05","requester":"Chase"}"#).expect("parses");
        assert_eq!(parsed.kind, InquiryKind::Hard);
    }
}
