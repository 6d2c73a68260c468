pub mod aggregate;
pub mod band;
pub mod highlights;
pub mod history;
pub mod lender_fit;
pub mod normalize;
pub mod utilization;

pub use aggregate::{aggregate, AggregateScore, ScoreComponents, ScoreFactor, WeightMap};
pub use band::{classify, percent_of_max, Band, BandName, BandScale, SCORE_MAX};
pub use history::{
    inquiry_summary, on_time_rate, Inquiry, InquiryImpact, InquiryKind, InquirySummary,
    PaymentMonth, PaymentStatus,
};
pub use lender_fit::{evaluate, FitTag, LenderCriterion, LenderFit, OriginMetrics};
pub use normalize::{
    blend_global, blend_global_with, corridor_score, pairwise_blend, AnchorMapping,
    CorridorScore, CountryProfile, RevokedConsentPolicy,
};
pub use utilization::{utilization, LineOrder, RevolvingLine, UtilizationSummary};

/// Half-up rounding on the score scale (2.5 -> 3, -2.5 -> -2).
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::round_half_up;

    #[test]
    fn rounds_halves_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.49), 2.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(275.1), 275.0);
    }
}
