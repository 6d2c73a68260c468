use super::lender_fit::OriginMetrics;
use super::normalize::CorridorScore;

/// Most chips shown for a single view.
pub const MAX_HIGHLIGHTS: usize = 5;

const ORIGIN_FALLBACK: &str = "Growing profile, keep building history";
const CORRIDOR_FALLBACK: &str = "Balanced profile, steady improvements across both regions";

/// Positive signals worth surfacing for a single-country profile.
pub fn origin_highlights(metrics: &OriginMetrics) -> Vec<String> {
    let mut list = Vec::new();

    if metrics.utilization_pct <= 30.0 {
        list.push(format!("Low utilization ({}%)", metrics.utilization_pct));
    }
    if metrics.on_time_rate >= 95.0 {
        list.push(format!(
            "Strong payment history ({}% on-time)",
            metrics.on_time_rate
        ));
    }
    if metrics.avg_age_months >= 36.0 {
        list.push(format!("Mature credit age ({}m)", metrics.avg_age_months));
    }
    if metrics.inquiries_12m <= 1 {
        list.push(format!(
            "Minimal recent inquiries ({})",
            metrics.inquiries_12m
        ));
    }
    if metrics.active_accounts >= 5 {
        list.push(format!(
            "Healthy account mix ({} active)",
            metrics.active_accounts
        ));
    }

    finish(list, ORIGIN_FALLBACK)
}

pub fn corridor_highlights(corridor: &CorridorScore) -> Vec<String> {
    let mut list = Vec::new();

    if corridor.global >= 700 {
        list.push(format!("Strong global posture ({})", corridor.global));
    }
    if corridor.gap <= 40.0 {
        list.push(format!("Low origin-destination gap ({})", corridor.gap));
    }
    if corridor.origin >= 670.0 {
        list.push(format!("Solid origin ({})", corridor.origin));
    }
    if corridor.destination >= 670.0 {
        list.push(format!("Solid destination ({})", corridor.destination));
    }

    finish(list, CORRIDOR_FALLBACK)
}

fn finish(mut list: Vec<String>, fallback: &str) -> Vec<String> {
    if list.is_empty() {
        list.push(fallback.to_string());
    }
    list.truncate(MAX_HIGHLIGHTS);
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::normalize::corridor_score;

    #[test]
    fn strong_origin_lists_every_signal() {
        let metrics = OriginMetrics {
            utilization_pct: 22.0,
            on_time_rate: 98.0,
            avg_age_months: 48.0,
            inquiries_12m: 1,
            active_accounts: 7,
        };

        let highlights = origin_highlights(&metrics);
        assert_eq!(highlights.len(), 5);
        assert_eq!(highlights[0], "Low utilization (22%)");
        assert_eq!(highlights[4], "Healthy account mix (7 active)");
    }

    #[test]
    fn thin_origin_falls_back() {
        let metrics = OriginMetrics {
            utilization_pct: 64.5,
            on_time_rate: 80.0,
            avg_age_months: 10.0,
            inquiries_12m: 4,
            active_accounts: 1,
        };

        assert_eq!(origin_highlights(&metrics), vec![ORIGIN_FALLBACK.to_string()]);
    }

    #[test]
    fn corridor_highlights_follow_thresholds() {
        let highlights = corridor_highlights(&corridor_score(680.0, 720.0));
        assert_eq!(
            highlights,
            vec![
                "Strong global posture (700)".to_string(),
                "Low origin-destination gap (40)".to_string(),
                "Solid origin (680)".to_string(),
                "Solid destination (720)".to_string(),
            ]
        );

        let weak = corridor_highlights(&corridor_score(500.0, 600.0));
        assert_eq!(weak, vec![CORRIDOR_FALLBACK.to_string()]);
    }
}
