use serde::{Deserialize, Serialize};

use super::band::SCORE_MAX;
use super::round_half_up;

/// Signals that move a credit score, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Payment,
    Utilization,
    Age,
    Inquiries,
    Mix,
}

impl ScoreFactor {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Payment,
            Self::Utilization,
            Self::Age,
            Self::Inquiries,
            Self::Mix,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Payment => "Payment history",
            Self::Utilization => "Utilization",
            Self::Age => "Credit age",
            Self::Inquiries => "Inquiries",
            Self::Mix => "Account mix",
        }
    }
}

/// Contributions already expressed on the 0-1000 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    #[serde(default)]
    pub payment: f64,
    #[serde(default)]
    pub utilization: f64,
    #[serde(default)]
    pub age: f64,
    #[serde(default)]
    pub inquiries: f64,
    #[serde(default)]
    pub mix: f64,
}

impl ScoreComponents {
    pub fn get(&self, factor: ScoreFactor) -> f64 {
        match factor {
            ScoreFactor::Payment => self.payment,
            ScoreFactor::Utilization => self.utilization,
            ScoreFactor::Age => self.age,
            ScoreFactor::Inquiries => self.inquiries,
            ScoreFactor::Mix => self.mix,
        }
    }

    pub fn total(&self) -> f64 {
        ScoreFactor::ordered()
            .into_iter()
            .map(|factor| self.get(factor))
            .sum()
    }
}

/// Relative display weights. They only drive the "what moves this score" bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightMap {
    #[serde(default)]
    pub payment: f64,
    #[serde(default)]
    pub utilization: f64,
    #[serde(default)]
    pub age: f64,
    #[serde(default)]
    pub inquiries: f64,
    #[serde(default)]
    pub mix: f64,
}

impl Default for WeightMap {
    fn default() -> Self {
        Self {
            payment: 40.0,
            utilization: 35.0,
            age: 15.0,
            inquiries: 10.0,
            mix: 0.0,
        }
    }
}

impl WeightMap {
    pub fn get(&self, factor: ScoreFactor) -> f64 {
        match factor {
            ScoreFactor::Payment => self.payment,
            ScoreFactor::Utilization => self.utilization,
            ScoreFactor::Age => self.age,
            ScoreFactor::Inquiries => self.inquiries,
            ScoreFactor::Mix => self.mix,
        }
    }

    fn set(&mut self, factor: ScoreFactor, value: f64) {
        match factor {
            ScoreFactor::Payment => self.payment = value,
            ScoreFactor::Utilization => self.utilization = value,
            ScoreFactor::Age => self.age = value,
            ScoreFactor::Inquiries => self.inquiries = value,
            ScoreFactor::Mix => self.mix = value,
        }
    }

    pub fn total(&self) -> f64 {
        ScoreFactor::ordered()
            .into_iter()
            .map(|factor| self.get(factor))
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightShare {
    pub factor: ScoreFactor,
    pub label: &'static str,
    pub weight: f64,
    pub share: f64,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateScore {
    /// Unclamped sum of contributions.
    pub raw: f64,
    /// `raw` clamped to the 0-1000 presentation range.
    pub score: f64,
    pub weight_shares: Vec<WeightShare>,
}

/// Sums pre-weighted contributions. `weights` only feeds the share breakdown
/// and never rescales the score.
pub fn aggregate(components: &ScoreComponents, weights: &WeightMap) -> AggregateScore {
    let raw = components.total();

    AggregateScore {
        raw,
        score: clamp_score(raw),
        weight_shares: weight_shares(weights),
    }
}

pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, SCORE_MAX)
}

/// Each factor's share of the weight total. The divisor is floored at one so an
/// all-zero map reports zero shares.
pub fn weight_shares(weights: &WeightMap) -> Vec<WeightShare> {
    let total = weights.total().max(1.0);

    ScoreFactor::ordered()
        .into_iter()
        .map(|factor| {
            let weight = weights.get(factor);
            let share = weight / total;
            WeightShare {
                factor,
                label: factor.label(),
                weight,
                share,
                percent: round_half_up(share * 100.0).clamp(0.0, 100.0) as u8,
            }
        })
        .collect()
}

/// Averages two countries' weights factor by factor for the corridor view.
pub fn blend_weights(origin: &WeightMap, destination: &WeightMap) -> WeightMap {
    let mut blended = *origin;
    for factor in ScoreFactor::ordered() {
        blended.set(
            factor,
            round_half_up((origin.get(factor) + destination.get(factor)) / 2.0),
        );
    }
    blended
}
