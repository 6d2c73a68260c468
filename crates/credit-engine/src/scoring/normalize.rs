use serde::{Deserialize, Serialize};

use super::band::{percent_of_max, BandName, BandScale, SCORE_MAX};
use super::round_half_up;

/// Confidence grade attached to a country's normalized score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReliabilityGrade {
    A,
    B,
    C,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentState {
    #[default]
    Granted,
    Pending,
    Revoked,
}

/// Per-country entry of the multi-country passport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryProfile {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Native bureau score; absent or zero when no bureau covers the country.
    #[serde(default)]
    pub local_score: Option<f64>,
    pub normalized_score: f64,
    pub reliability: ReliabilityGrade,
    #[serde(default)]
    pub consent: ConsentState,
    /// Contribution to the portfolio blend, between 0 and 1.
    pub weight: f64,
    #[serde(default)]
    pub freshness_days: u32,
}

/// Whether revoked-consent profiles take part in the portfolio blend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevokedConsentPolicy {
    #[default]
    Include,
    Exclude,
}

impl RevokedConsentPolicy {
    pub fn admits(self, profile: &CountryProfile) -> bool {
        match self {
            Self::Include => true,
            Self::Exclude => profile.consent != ConsentState::Revoked,
        }
    }
}

/// Normalization happens upstream; the profile already carries the 0-1000 value.
pub fn normalize(profile: &CountryProfile) -> f64 {
    profile.normalized_score
}

/// Portfolio score: `round(sum(normalized * weight))` over every profile,
/// revoked consent included. Duplicate entries count twice.
pub fn blend_global(profiles: &[CountryProfile]) -> i64 {
    blend_global_with(profiles, RevokedConsentPolicy::Include)
}

pub fn blend_global_with(profiles: &[CountryProfile], policy: RevokedConsentPolicy) -> i64 {
    let sum: f64 = profiles
        .iter()
        .filter(|profile| policy.admits(profile))
        .map(|profile| normalize(profile) * profile.weight)
        .sum();
    round_half_up(sum) as i64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassportSummary {
    pub global_score: i64,
    pub policy: RevokedConsentPolicy,
    pub included: usize,
    pub excluded_revoked: usize,
    pub total_weight: f64,
}

pub fn passport_summary(
    profiles: &[CountryProfile],
    policy: RevokedConsentPolicy,
) -> PassportSummary {
    let (admitted, excluded): (Vec<&CountryProfile>, Vec<&CountryProfile>) =
        profiles.iter().partition(|profile| policy.admits(profile));

    PassportSummary {
        global_score: blend_global_with(profiles, policy),
        policy,
        included: admitted.len(),
        excluded_revoked: excluded.len(),
        total_weight: admitted.iter().map(|profile| profile.weight).sum(),
    }
}

/// Corridor score: unweighted mean of origin and destination, rounded.
/// Kept apart from [`blend_global`], which answers a portfolio question.
pub fn pairwise_blend(origin: f64, destination: f64) -> i64 {
    round_half_up((origin + destination) / 2.0) as i64
}

pub fn gap(origin: f64, destination: f64) -> f64 {
    (origin - destination).abs()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorridorScore {
    pub origin: f64,
    pub destination: f64,
    pub global: i64,
    pub gap: f64,
    pub percent_of_max: u8,
    pub band: BandName,
}

pub fn corridor_score(origin: f64, destination: f64) -> CorridorScore {
    let global = pairwise_blend(origin, destination);
    CorridorScore {
        origin,
        destination,
        global,
        gap: gap(origin, destination),
        percent_of_max: percent_of_max(global as f64),
        band: BandScale::standard().classify(global as f64),
    }
}

/// Piecewise-linear mapping from one country's score scale onto another's.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorMapping {
    anchors: Vec<(f64, f64)>,
}

impl AnchorMapping {
    /// Sorts anchors by source score and pins both ends of the scale.
    pub fn new(mut anchors: Vec<(f64, f64)>) -> Self {
        anchors.sort_by(|a, b| a.0.total_cmp(&b.0));

        if anchors.first().map_or(true, |first| first.0 > 0.0) {
            anchors.insert(0, (0.0, 0.0));
        }
        if anchors.last().map_or(true, |last| last.0 < SCORE_MAX) {
            anchors.push((SCORE_MAX, SCORE_MAX));
        }

        Self { anchors }
    }

    pub fn identity() -> Self {
        Self::new(Vec::new())
    }

    pub fn anchors(&self) -> &[(f64, f64)] {
        &self.anchors
    }

    pub fn map(&self, score: f64) -> i64 {
        let x = if score.is_finite() {
            score.clamp(0.0, SCORE_MAX)
        } else {
            0.0
        };

        for pair in self.anchors.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            if x <= x1 {
                let t = (x - x0) / (x1 - x0).max(1.0);
                return round_half_up(y0 + (y1 - y0) * t) as i64;
            }
        }

        SCORE_MAX as i64
    }

    /// How far each band threshold moves under this mapping.
    pub fn band_shifts(&self, scale: &BandScale) -> BandShifts {
        let thresholds = scale.thresholds();
        let shift = |threshold: f64| self.map(threshold) - round_half_up(threshold) as i64;

        let average = if thresholds.is_empty() {
            0
        } else {
            let total: i64 = thresholds.iter().map(|threshold| shift(*threshold)).sum();
            round_half_up(total as f64 / thresholds.len() as f64) as i64
        };

        BandShifts {
            good: shift(670.0),
            very_good: shift(740.0),
            average,
        }
    }
}

impl Default for AnchorMapping {
    fn default() -> Self {
        Self::identity()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandShifts {
    pub good: i64,
    pub very_good: i64,
    pub average: i64,
}
