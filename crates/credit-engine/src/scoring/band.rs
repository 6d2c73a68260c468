use serde::{Deserialize, Serialize};

use super::round_half_up;

/// Upper bound of the common score scale.
pub const SCORE_MAX: f64 = 1000.0;

/// Named risk tier on the 0-1000 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BandName {
    Poor,
    Fair,
    Good,
    #[serde(rename = "Very Good")]
    VeryGood,
    Excellent,
}

impl BandName {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Poor => "Poor",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::VeryGood => "Very Good",
            Self::Excellent => "Excellent",
        }
    }
}

impl std::fmt::Display for BandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A band and its inclusive lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub name: BandName,
    pub min: f64,
}

/// Ordered, contiguous set of bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    bands: Vec<Band>,
}

impl BandScale {
    /// Builds a scale from arbitrary bands, ordering them by lower bound.
    pub fn new(mut bands: Vec<Band>) -> Self {
        bands.sort_by(|a, b| a.min.total_cmp(&b.min));
        Self { bands }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            Band {
                name: BandName::Poor,
                min: 0.0,
            },
            Band {
                name: BandName::Fair,
                min: 580.0,
            },
            Band {
                name: BandName::Good,
                min: 670.0,
            },
            Band {
                name: BandName::VeryGood,
                min: 740.0,
            },
            Band {
                name: BandName::Excellent,
                min: 800.0,
            },
        ])
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Returns the highest band whose lower bound is at or below `score`.
    ///
    /// Scores below the first bound (and NaN) fall into the lowest band; an
    /// empty scale reports `Poor`.
    pub fn classify(&self, score: f64) -> BandName {
        let mut selected = match self.bands.first() {
            Some(band) => band.name,
            None => return BandName::Poor,
        };

        for band in &self.bands {
            if band.min <= score {
                selected = band.name;
            }
        }

        selected
    }

    /// Lower bounds above the first band, used for chart guides and shift reports.
    pub fn thresholds(&self) -> Vec<f64> {
        self.bands.iter().skip(1).map(|band| band.min).collect()
    }
}

impl Default for BandScale {
    fn default() -> Self {
        Self::standard()
    }
}

/// Classifies against the standard scale.
pub fn classify(score: f64) -> BandName {
    BandScale::standard().classify(score)
}

/// Score expressed as a whole percentage of the 1000-point maximum.
pub fn percent_of_max(score: f64) -> u8 {
    if !score.is_finite() {
        return if score == f64::INFINITY { 100 } else { 0 };
    }
    round_half_up(score / 10.0).clamp(0.0, 100.0) as u8
}
